use ecosort_logging::{clear_scan_context, eco_debug, eco_info, eco_warn, set_scan_context};

use crate::state::{Analysis, InFlight, RedeemPrompt, ScannerState};
use crate::{
    catalog, resolve_sign_in, AppState, AuthError, CameraStatus, CaptureError,
    ClassificationResult, Effect, Facing, ImageArtifact, Msg, RequestId, SignInMode,
    StoredSession, TickOutcome, User, View,
};

const STILL_ANALYZING: &str = "Still analyzing the previous item. Please wait.";

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages that are not legal in the current view are ignored and leave the
/// state untouched.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AuthSubmitted {
            mode,
            name,
            email,
            password,
        } => {
            if state.view != View::Auth {
                return (state, Vec::new());
            }
            match validate_credentials(mode, &name, &email, &password) {
                Ok(user) => {
                    state.notice = None;
                    state.mark_dirty();
                    vec![Effect::LoadSession { user, mode }]
                }
                Err(err) => {
                    state.set_notice(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::SessionLoaded {
            user,
            mode,
            stored,
            loaded_at_ms,
        } => on_session_loaded(&mut state, user, mode, stored, loaded_at_ms),
        Msg::ScanSelected => {
            if !state.view.is_tab() {
                return (state, Vec::new());
            }
            if state.in_flight.is_some() {
                state.set_notice(STILL_ANALYZING);
                return (state, Vec::new());
            }
            let facing = Facing::default();
            state.view = View::Scanning;
            state.scanner = Some(ScannerState::opening(facing));
            state.redeem_prompt = None;
            state.notice = None;
            state.mark_dirty();
            vec![Effect::OpenCamera { facing }]
        }
        Msg::ScanCancelled => {
            if state.view != View::Scanning {
                return (state, Vec::new());
            }
            state.view = View::Home;
            state.scanner = None;
            state.mark_dirty();
            vec![Effect::CloseCamera]
        }
        Msg::TabSelected(tab) => {
            if state.view.is_tab() {
                state.view = tab.into();
                state.redeem_prompt = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::LogoutClicked => {
            if state.view == View::Profile {
                if let Some(user) = state.user.take() {
                    eco_info!("signed out {}", user.email);
                }
                state.session = None;
                state.redeem_prompt = None;
                state.notice = None;
                state.persistence_degraded = false;
                state.view = View::Auth;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::CameraReady { facing } => {
            if let Some(scanner) = active_scanner(&mut state) {
                if scanner.facing == facing && scanner.camera == CameraStatus::Starting {
                    scanner.camera = CameraStatus::Live;
                    scanner.auto.arm();
                    let effects = countdown_timer(scanner);
                    state.mark_dirty();
                    return (state, effects);
                }
            }
            Vec::new()
        }
        Msg::CameraFailed(err) => {
            if let Some(scanner) = active_scanner(&mut state) {
                eco_warn!("camera failed: {}", err);
                scanner.camera = CameraStatus::Failed(err.to_string());
                scanner.auto.cancel();
                state.mark_dirty();
                return (state, vec![Effect::StopCountdown]);
            }
            Vec::new()
        }
        Msg::FacingSwitched => match active_scanner(&mut state) {
            Some(scanner) => {
                scanner.facing = scanner.facing.flipped();
                scanner.camera = CameraStatus::Starting;
                scanner.auto.cancel();
                let facing = scanner.facing;
                state.mark_dirty();
                vec![Effect::CloseCamera, Effect::OpenCamera { facing }]
            }
            None => Vec::new(),
        },
        Msg::AutoCaptureToggled => {
            if let Some(scanner) = active_scanner(&mut state) {
                let enabled = !scanner.auto.is_enabled();
                let live = scanner.is_live();
                scanner.auto.set_enabled(enabled, live);
                let effects = countdown_timer(scanner);
                state.mark_dirty();
                return (state, effects);
            }
            Vec::new()
        }
        Msg::CountdownTick => {
            let Some(scanner) = active_scanner(&mut state) else {
                return (state, Vec::new());
            };
            if !scanner.is_live() {
                return (state, Vec::new());
            }
            match scanner.auto.tick() {
                TickOutcome::Idle => Vec::new(),
                TickOutcome::Counting(_) => {
                    state.mark_dirty();
                    Vec::new()
                }
                TickOutcome::Fire => {
                    eco_debug!("auto-capture countdown reached zero");
                    let mut effects = vec![Effect::StopCountdown];
                    effects.extend(request_capture(scanner));
                    state.mark_dirty();
                    effects
                }
            }
        }
        Msg::CaptureClicked => {
            let Some(scanner) = active_scanner(&mut state) else {
                return (state, Vec::new());
            };
            if scanner.capture_pending {
                return (state, Vec::new());
            }
            match scanner.camera.clone() {
                CameraStatus::Live => {
                    let effects = request_capture(scanner);
                    state.mark_dirty();
                    effects
                }
                CameraStatus::Starting => {
                    state.set_notice(CaptureError::SessionNotReady.to_string());
                    Vec::new()
                }
                CameraStatus::Failed(message) => {
                    state.set_notice(message);
                    Vec::new()
                }
            }
        }
        Msg::ImageCaptured(image) => on_image_captured(&mut state, image),
        Msg::CaptureFailed(err) => {
            if let Some(scanner) = active_scanner(&mut state) {
                scanner.capture_pending = false;
            }
            state.set_notice(err.to_string());
            Vec::new()
        }
        Msg::ClassificationCompleted {
            request_id,
            result,
            completed_at_ms,
        } => {
            set_scan_context(request_id);
            let effects =
                on_classification_completed(&mut state, request_id, result, completed_at_ms);
            clear_scan_context();
            effects
        }
        Msg::ResultDismissed => {
            if matches!(state.view, View::Analyzing | View::ResultReady) {
                state.view = View::Home;
                state.analysis = None;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RedeemRequested(reward_id) => {
            if state.view != View::Rewards {
                return (state, Vec::new());
            }
            let Some(reward) = catalog::find_reward(&reward_id) else {
                eco_warn!("redeem requested for unknown reward {}", reward_id);
                return (state, Vec::new());
            };
            let Some(session) = state.session.as_mut() else {
                return (state, Vec::new());
            };
            let checked = session.ledger().check(&reward);
            match checked {
                Ok(()) => {
                    state.redeem_prompt = Some(RedeemPrompt {
                        reward_id,
                        receipt: None,
                    });
                    state.notice = None;
                    state.mark_dirty();
                }
                Err(err) => state.set_notice(err.to_string()),
            }
            Vec::new()
        }
        Msg::RedeemConfirmed => on_redeem_confirmed(&mut state),
        Msg::RedeemPromptClosed => {
            if state.redeem_prompt.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PersistenceFailed(message) => {
            if !state.persistence_degraded {
                eco_warn!("persistence unavailable, continuing in memory: {}", message);
                state.persistence_degraded = true;
                state.set_notice(format!(
                    "Progress could not be saved ({message}). Changes are kept for this session only."
                ));
            }
            Vec::new()
        }
        Msg::NoticeDismissed => {
            if state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn validate_credentials(
    mode: SignInMode,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let name = name.trim();
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if mode == SignInMode::Register && name.is_empty() {
        return Err(AuthError::MissingFields);
    }
    let display_name = if name.is_empty() {
        email.split('@').next().unwrap_or(email)
    } else {
        name
    };
    Ok(User {
        name: display_name.to_string(),
        email: email.to_string(),
    })
}

fn on_session_loaded(
    state: &mut AppState,
    user: User,
    mode: SignInMode,
    stored: StoredSession,
    loaded_at_ms: i64,
) -> Vec<Effect> {
    if state.view != View::Auth || state.user.is_some() {
        return Vec::new();
    }

    let degraded = match &stored {
        StoredSession::Unavailable(reason) => {
            state.set_notice(format!(
                "Saved progress could not be read ({reason}). Changes are kept for this session only."
            ));
            true
        }
        StoredSession::Absent | StoredSession::Present(_) => false,
    };
    let session = resolve_sign_in(mode, stored, loaded_at_ms);
    eco_info!(
        "signed in {} ({:?}) with {} points",
        user.email,
        mode,
        session.stats().total_points
    );

    state.user = Some(user);
    state.session = Some(session);
    state.persistence_degraded = degraded;
    state.view = View::Home;
    state.mark_dirty();
    persist(state)
}

fn on_image_captured(state: &mut AppState, image: ImageArtifact) -> Vec<Effect> {
    if state.view != View::Scanning {
        eco_debug!("dropping captured image outside of an active scan");
        state.set_notice(CaptureError::ScannerClosed.to_string());
        return Vec::new();
    }
    if state.in_flight.is_some() {
        state.set_notice(STILL_ANALYZING);
        return Vec::new();
    }
    let Some(owner) = state.identity().map(str::to_owned) else {
        return Vec::new();
    };

    let request_id = state.allocate_request_id();
    eco_info!(
        "classifying scan {} ({} bytes, {})",
        request_id,
        image.bytes.len(),
        image.mime_type
    );
    state.in_flight = Some(InFlight {
        request_id,
        owner,
        image_url: image.data_uri(),
    });
    state.analysis = Some(Analysis {
        request_id,
        image: image.clone(),
        result: None,
    });
    state.scanner = None;
    state.view = View::Analyzing;
    state.notice = None;
    state.mark_dirty();
    vec![Effect::CloseCamera, Effect::Classify { request_id, image }]
}

fn on_classification_completed(
    state: &mut AppState,
    request_id: RequestId,
    result: ClassificationResult,
    completed_at_ms: i64,
) -> Vec<Effect> {
    let in_flight = match state.in_flight.take() {
        Some(in_flight) if in_flight.request_id == request_id => in_flight,
        other => {
            eco_warn!("ignoring result for request {} that is not in flight", request_id);
            state.in_flight = other;
            return Vec::new();
        }
    };
    state.mark_dirty();

    // Ledger hook: runs no matter what is on screen.
    let mut effects = Vec::new();
    if result.is_recognized() {
        let owner_signed_in = state.identity() == Some(in_flight.owner.as_str());
        match state.session.as_mut() {
            Some(session) if owner_signed_in => {
                session.record_classification(&result, &in_flight.image_url, completed_at_ms);
                effects.extend(persist(state));
            }
            _ => {
                eco_info!("owner {} signed out; applying result to stored state", in_flight.owner);
                effects.push(Effect::ApplyDetached {
                    identity: in_flight.owner,
                    result: result.clone(),
                    image_url: in_flight.image_url,
                    completed_at_ms,
                });
            }
        }
    } else {
        eco_info!("result unrecognized: {}", result.explanation);
    }

    // Render hook: only the request still on screen may show its result.
    let on_screen = state.view == View::Analyzing;
    match state.analysis.as_mut() {
        Some(analysis) if on_screen && analysis.request_id == request_id => {
            analysis.result = Some(result);
            state.view = View::ResultReady;
        }
        _ => eco_debug!("result is no longer on screen"),
    }
    effects
}

fn on_redeem_confirmed(state: &mut AppState) -> Vec<Effect> {
    let reward_id = match &state.redeem_prompt {
        Some(prompt) if prompt.receipt.is_none() => prompt.reward_id.clone(),
        _ => return Vec::new(),
    };
    let Some(reward) = catalog::find_reward(&reward_id) else {
        return Vec::new();
    };
    let Some(session) = state.session.as_mut() else {
        return Vec::new();
    };

    let redeemed = session.ledger().redeem(&reward, &mut state.vouchers);
    match redeemed {
        Ok(receipt) => {
            if let Some(prompt) = state.redeem_prompt.as_mut() {
                prompt.receipt = Some(receipt);
            }
            state.mark_dirty();
            persist(state)
        }
        Err(err) => {
            state.redeem_prompt = None;
            state.set_notice(err.to_string());
            Vec::new()
        }
    }
}

fn active_scanner(state: &mut AppState) -> Option<&mut ScannerState> {
    if state.view == View::Scanning {
        state.scanner.as_mut()
    } else {
        None
    }
}

/// Keeps the external ticker in step with the countdown.
fn countdown_timer(scanner: &ScannerState) -> Vec<Effect> {
    match scanner.auto.countdown() {
        Some(_) => vec![Effect::StartCountdown],
        None => vec![Effect::StopCountdown],
    }
}

fn request_capture(scanner: &mut ScannerState) -> Vec<Effect> {
    if scanner.capture_pending {
        return Vec::new();
    }
    scanner.capture_pending = true;
    vec![Effect::CaptureFrame]
}

/// Mirrors the session to the store unless persistence has been given up on.
fn persist(state: &AppState) -> Vec<Effect> {
    if state.persistence_degraded {
        return Vec::new();
    }
    match (state.identity(), state.session.as_ref()) {
        (Some(identity), Some(session)) => vec![Effect::SaveSession {
            identity: identity.to_string(),
            session: session.clone(),
        }],
        _ => Vec::new(),
    }
}
