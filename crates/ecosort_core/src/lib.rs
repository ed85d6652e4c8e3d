//! EcoSort core: pure capture-to-reward state machine and view-model helpers.
mod auto_capture;
pub mod catalog;
mod effect;
mod error;
mod ledger;
mod model;
mod msg;
mod session;
mod state;
mod update;
mod view_model;

pub use auto_capture::{AutoCapture, TickOutcome, COUNTDOWN_START};
pub use effect::Effect;
pub use error::{AuthError, CaptureError};
pub use ledger::{LedgerError, RedemptionReceipt, RewardLedger, VoucherIssuer};
pub use model::{
    BinColor, ClassificationResult, Facing, HistoryItem, ImageArtifact, Reward, RewardId, User,
    UserStats, WasteCategory,
};
pub use msg::Msg;
pub use session::{resolve_sign_in, SessionState, SignInMode, StoredSession};
pub use state::{AppState, CameraStatus, InFlight, RequestId, ScannerState, Tab, View};
pub use update::update;
pub use view_model::{
    AnalysisView, AppViewModel, RedeemPromptView, RewardRowView, RewardStatus, ScannerView,
};
