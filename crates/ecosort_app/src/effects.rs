use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use ecosort_core::{
    ClassificationResult, Effect, ImageArtifact, Msg, RequestId, SessionState, SignInMode,
    StoredSession,
};
use ecosort_engine::{
    CaptureDevice, CaptureSource, EngineEvent, EngineEvents, EngineHandle, SessionRepository,
    FAILURE_EXPLANATION,
};
use ecosort_logging::{eco_debug, eco_error, eco_info, eco_warn};

use crate::ticker::CountdownTicker;

const EVENT_POLL: Duration = Duration::from_millis(50);

pub(crate) fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Executes core effects against the engine services. Outcomes come back to
/// the runtime as messages on `msg_tx`.
pub struct EffectRunner<D: CaptureDevice> {
    engine: EngineHandle,
    capture: CaptureSource<D>,
    sessions: SessionRepository,
    ticker: CountdownTicker,
    msg_tx: mpsc::Sender<Msg>,
}

impl<D: CaptureDevice> EffectRunner<D> {
    pub fn new(
        engine: EngineHandle,
        capture: CaptureSource<D>,
        sessions: SessionRepository,
        countdown_interval: Option<Duration>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        spawn_event_loop(engine.events(), msg_tx.clone());
        Self {
            engine,
            capture,
            sessions,
            ticker: CountdownTicker::new(countdown_interval, msg_tx.clone()),
            msg_tx,
        }
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.run_one(effect);
        }
    }

    /// Wraps an uploaded file and posts it as a captured image.
    pub fn upload(&self, bytes: Vec<u8>) {
        let msg = match self.capture.upload_file(bytes) {
            Ok(image) => Msg::ImageCaptured(image),
            Err(err) => Msg::CaptureFailed(err),
        };
        self.send(msg);
    }

    fn run_one(&mut self, effect: Effect) {
        match effect {
            Effect::LoadSession { user, mode } => {
                let stored = match mode {
                    SignInMode::Login => self.sessions.load_for_sign_in(&user.email),
                    SignInMode::Register => StoredSession::Absent,
                };
                self.send(Msg::SessionLoaded {
                    user,
                    mode,
                    stored,
                    loaded_at_ms: now_ms(),
                });
            }
            Effect::SaveSession { identity, session } => {
                if let Err(err) = self.sessions.save(&identity, &session) {
                    eco_error!("saving session for {} failed: {}", identity, err);
                    self.send(Msg::PersistenceFailed(err.to_string()));
                }
            }
            Effect::OpenCamera { facing } => {
                let msg = match self.capture.start_session(facing) {
                    Ok(()) => Msg::CameraReady { facing },
                    Err(err) => Msg::CameraFailed(err),
                };
                self.send(msg);
            }
            Effect::CloseCamera => {
                self.ticker.stop();
                self.capture.end_session();
            }
            Effect::StartCountdown => self.ticker.start(),
            Effect::StopCountdown => self.ticker.stop(),
            Effect::CaptureFrame => {
                let msg = match self.capture.capture() {
                    Ok(image) => Msg::ImageCaptured(image),
                    Err(err) => Msg::CaptureFailed(err),
                };
                self.send(msg);
            }
            Effect::Classify { request_id, image } => self.classify(request_id, image),
            Effect::ApplyDetached {
                identity,
                result,
                image_url,
                completed_at_ms,
            } => self.apply_detached(&identity, &result, &image_url, completed_at_ms),
        }
    }

    fn classify(&self, request_id: RequestId, image: ImageArtifact) {
        eco_debug!("dispatching request {} ({:?})", request_id, image);
        if let Err(err) = self.engine.classify(request_id, image) {
            eco_error!("request {} could not reach the engine: {}", request_id, err);
            self.send(Msg::ClassificationCompleted {
                request_id,
                result: ClassificationResult::failed(FAILURE_EXPLANATION),
                completed_at_ms: now_ms(),
            });
        }
    }

    /// Credits a result whose owner has signed out to that owner's stored state.
    fn apply_detached(
        &self,
        identity: &str,
        result: &ClassificationResult,
        image_url: &str,
        completed_at_ms: i64,
    ) {
        let mut session = match self.sessions.load(identity) {
            Ok(Some(session)) => session,
            Ok(None) => SessionState::fresh(),
            Err(err) => {
                eco_error!("cannot credit {}: stored state unreadable: {}", identity, err);
                return;
            }
        };
        if session
            .record_classification(result, image_url, completed_at_ms)
            .is_none()
        {
            return;
        }
        match self.sessions.save(identity, &session) {
            Ok(()) => eco_info!("credited late result to {}", identity),
            Err(err) => eco_error!("crediting late result to {} failed: {}", identity, err),
        }
    }

    fn send(&self, msg: Msg) {
        let _ = self.msg_tx.send(msg);
    }
}

fn spawn_event_loop(events: EngineEvents, msg_tx: mpsc::Sender<Msg>) {
    let spawned = thread::Builder::new()
        .name("ecosort-events".to_string())
        .spawn(move || loop {
            match events.recv_timeout(EVENT_POLL) {
                Ok(Some(EngineEvent::ClassificationCompleted { request_id, result })) => {
                    let msg = Msg::ClassificationCompleted {
                        request_id,
                        result,
                        completed_at_ms: now_ms(),
                    };
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(_) => break,
            }
        });
    if let Err(err) = spawned {
        eco_warn!("engine event loop not started: {}", err);
    }
}
