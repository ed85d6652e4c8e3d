use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use ecosort_core::{update, AppState, AppViewModel, Msg};
use ecosort_engine::{
    CaptureDevice, CaptureSource, Classifier, EngineError, EngineHandle, FileStore,
    GeminiClassifier, KeyValueStore, SessionRepository,
};
use ecosort_logging::{eco_debug, eco_warn};

use crate::config::AppConfig;
use crate::effects::EffectRunner;

/// Everything the runtime needs from the outside world.
pub struct Services<D: CaptureDevice> {
    pub classifier: Arc<dyn Classifier>,
    pub store: Arc<dyn KeyValueStore>,
    pub device: D,
    pub namespace: String,
    /// Tick period while a countdown runs. `None` leaves ticks to the caller.
    pub countdown_interval: Option<Duration>,
}

/// Owns the application state and feeds it messages one at a time.
///
/// A visual shell posts user actions through [`AppRuntime::sender`], calls
/// [`AppRuntime::process_pending`] from its loop and renders any returned view.
pub struct AppRuntime<D: CaptureDevice> {
    state: AppState,
    inbox: mpsc::Receiver<Msg>,
    msg_tx: mpsc::Sender<Msg>,
    effects: EffectRunner<D>,
}

impl<D: CaptureDevice> AppRuntime<D> {
    pub fn new(services: Services<D>) -> Result<Self, EngineError> {
        let (msg_tx, inbox) = mpsc::channel::<Msg>();
        let engine = EngineHandle::new(services.classifier)?;
        let sessions = SessionRepository::with_namespace(services.store, services.namespace);
        let effects = EffectRunner::new(
            engine,
            CaptureSource::new(services.device),
            sessions,
            services.countdown_interval,
            msg_tx.clone(),
        );

        Ok(Self {
            state: AppState::new(),
            inbox,
            msg_tx,
            effects,
        })
    }

    /// Wires the Gemini classifier and the file store from `config`.
    pub fn from_config(config: &AppConfig, device: D) -> Result<Self> {
        let settings = config.classifier_settings();
        if settings.api_key.is_empty() {
            eco_warn!("no API key set; every scan will report a failed analysis");
        }
        let services = Services {
            classifier: Arc::new(GeminiClassifier::new(settings)),
            store: Arc::new(FileStore::new(&config.data_dir)),
            device,
            namespace: config.namespace.clone(),
            countdown_interval: config.countdown_interval(),
        };
        Self::new(services).context("starting classification engine")
    }

    pub fn sender(&self) -> mpsc::Sender<Msg> {
        self.msg_tx.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Hands an uploaded file to the capture path. The result arrives as a message.
    pub fn upload_file(&self, bytes: Vec<u8>) {
        self.effects.upload(bytes);
    }

    /// Applies one message and runs its effects. Returns the new view if anything changed.
    pub fn dispatch(&mut self, msg: Msg) -> Option<AppViewModel> {
        eco_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.consume_dirty().then(|| state.view());
        self.state = state;
        self.effects.run(effects);
        view
    }

    /// Drains the inbox, including messages produced by the effects it runs.
    pub fn process_pending(&mut self) -> Option<AppViewModel> {
        let mut latest = None;
        while let Ok(msg) = self.inbox.try_recv() {
            if let Some(view) = self.dispatch(msg) {
                latest = Some(view);
            }
        }
        latest
    }

    /// Blocks up to `timeout` for the next message, then drains the inbox.
    pub fn wait_and_process(&mut self, timeout: Duration) -> Option<AppViewModel> {
        let first = self.inbox.recv_timeout(timeout).ok()?;
        let latest = self.dispatch(first);
        self.process_pending().or(latest)
    }
}
