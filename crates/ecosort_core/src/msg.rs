use crate::{
    CaptureError, ClassificationResult, Facing, ImageArtifact, RequestId, RewardId, SignInMode,
    StoredSession, Tab, User,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted the login or registration form.
    AuthSubmitted {
        mode: SignInMode,
        name: String,
        email: String,
        password: String,
    },
    /// Stored progress for a signing-in user was read (or could not be).
    SessionLoaded {
        user: User,
        mode: SignInMode,
        stored: StoredSession,
        loaded_at_ms: i64,
    },
    /// User tapped the scan button.
    ScanSelected,
    /// User closed the scanner without capturing.
    ScanCancelled,
    /// User switched to another bottom-bar section.
    TabSelected(Tab),
    LogoutClicked,
    /// Camera session for `facing` is live.
    CameraReady { facing: Facing },
    CameraFailed(CaptureError),
    /// User flipped between front and back camera.
    FacingSwitched,
    AutoCaptureToggled,
    /// One countdown unit elapsed.
    CountdownTick,
    /// User pressed the shutter.
    CaptureClicked,
    /// A still image came out of the camera or an upload.
    ImageCaptured(ImageArtifact),
    CaptureFailed(CaptureError),
    /// The gateway answered (successfully or with its failure result).
    ClassificationCompleted {
        request_id: RequestId,
        result: ClassificationResult,
        completed_at_ms: i64,
    },
    /// User closed the analysis/result screen.
    ResultDismissed,
    /// User tapped a reward in the catalog.
    RedeemRequested(RewardId),
    RedeemConfirmed,
    RedeemPromptClosed,
    /// A store read or write failed.
    PersistenceFailed(String),
    NoticeDismissed,
    /// Render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
