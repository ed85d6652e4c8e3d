use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use ecosort_core::{ImageArtifact, RequestId};
use thiserror::Error;

use crate::classify::Classifier;
use crate::gateway::ClassificationGateway;
use crate::EngineEvent;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(std::io::Error),
    #[error("engine thread is gone")]
    Disconnected,
}

enum EngineCommand {
    Classify {
        request_id: RequestId,
        image: ImageArtifact,
    },
}

/// Runs classification requests on a background tokio runtime.
///
/// Commands go in through [`EngineHandle::classify`]; each one produces exactly
/// one [`EngineEvent`], in completion order rather than submission order.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    events: EngineEvents,
}

/// Receiving side of the engine, shareable with a polling thread.
///
/// Reports [`EngineError::Disconnected`] once the handle is dropped and every
/// pending request has finished.
#[derive(Clone)]
pub struct EngineEvents {
    rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineEvents {
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineError> {
        let rx = self.rx.lock().map_err(|_| EngineError::Disconnected)?;
        match rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }
}

impl EngineHandle {
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let gateway = ClassificationGateway::new(classifier);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;

        thread::Builder::new()
            .name("ecosort-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let gateway = gateway.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(&gateway, command, event_tx).await;
                    });
                }
            })
            .map_err(EngineError::Spawn)?;

        Ok(Self {
            cmd_tx,
            events: EngineEvents {
                rx: Arc::new(Mutex::new(event_rx)),
            },
        })
    }

    pub fn classify(&self, request_id: RequestId, image: ImageArtifact) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Classify { request_id, image })
            .map_err(|_| EngineError::Disconnected)
    }

    pub fn events(&self) -> EngineEvents {
        self.events.clone()
    }
}

async fn handle_command(
    gateway: &ClassificationGateway,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Classify { request_id, image } => {
            let result = gateway.classify(request_id, &image).await;
            let _ = event_tx.send(EngineEvent::ClassificationCompleted { request_id, result });
        }
    }
}
