use crate::{ClassificationResult, Facing, ImageArtifact, RequestId, SessionState, SignInMode, User};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Read stored progress for `user` and answer with `Msg::SessionLoaded`.
    LoadSession { user: User, mode: SignInMode },
    SaveSession {
        identity: String,
        session: SessionState,
    },
    /// Start (or restart) the camera session.
    OpenCamera { facing: Facing },
    /// Stop all camera tracks. Also stops countdown ticks.
    CloseCamera,
    /// Begin sending `Msg::CountdownTick` once per interval, the first one a
    /// full interval from now. Replaces any running ticker.
    StartCountdown,
    /// Stop countdown ticks.
    StopCountdown,
    /// Take one still from the live session.
    CaptureFrame,
    Classify {
        request_id: RequestId,
        image: ImageArtifact,
    },
    /// A scan finished after its owner signed out; apply it to their stored state.
    ApplyDetached {
        identity: String,
        result: ClassificationResult,
        image_url: String,
        completed_at_ms: i64,
    },
}
