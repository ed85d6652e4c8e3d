use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use ecosort_core::Msg;
use ecosort_logging::{eco_debug, eco_warn};

/// Posts `Msg::CountdownTick` at a fixed interval while a countdown runs.
///
/// Every `start` or `stop` bumps the generation; a ticker thread exits as soon
/// as it sees a generation other than its own. The check and the send happen
/// under one lock, so no tick from a stopped ticker follows the `stop` call.
pub(crate) struct CountdownTicker {
    interval: Option<Duration>,
    generation: Arc<Mutex<u64>>,
    msg_tx: mpsc::Sender<Msg>,
}

impl CountdownTicker {
    /// With no interval, `start` does nothing and ticks are left to the caller.
    pub(crate) fn new(interval: Option<Duration>, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            interval,
            generation: Arc::new(Mutex::new(0)),
            msg_tx,
        }
    }

    /// Replaces any running ticker. The first tick is one interval from now.
    pub(crate) fn start(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        let own = {
            let mut generation = lock(&self.generation);
            *generation += 1;
            *generation
        };
        let generation = Arc::clone(&self.generation);
        let msg_tx = self.msg_tx.clone();
        let spawned = thread::Builder::new()
            .name("ecosort-countdown".to_string())
            .spawn(move || run(own, interval, generation, msg_tx));
        if let Err(err) = spawned {
            eco_warn!("countdown ticker not started: {}", err);
        }
    }

    pub(crate) fn stop(&self) {
        *lock(&self.generation) += 1;
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(own: u64, interval: Duration, generation: Arc<Mutex<u64>>, msg_tx: mpsc::Sender<Msg>) {
    let started = Instant::now();
    let mut deadline = started;
    loop {
        deadline += interval;
        if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
        let current = lock(&generation);
        if *current != own || msg_tx.send(Msg::CountdownTick).is_err() {
            break;
        }
    }
    eco_debug!("countdown ticker {} ended after {:?}", own, started.elapsed());
}

fn lock(generation: &Mutex<u64>) -> MutexGuard<'_, u64> {
    generation
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
