use crate::{
    AutoCapture, ClassificationResult, Facing, ImageArtifact, RedemptionReceipt, RewardId,
    SessionState, User, VoucherIssuer,
};

pub type RequestId = u64;

/// Top-level screen. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Auth,
    Home,
    Scanning,
    Analyzing,
    ResultReady,
    Leaderboard,
    Rewards,
    Profile,
}

impl View {
    /// Screens reachable from the bottom navigation bar.
    pub fn is_tab(self) -> bool {
        matches!(
            self,
            View::Home | View::Leaderboard | View::Rewards | View::Profile
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Leaderboard,
    Rewards,
    Profile,
}

impl From<Tab> for View {
    fn from(tab: Tab) -> Self {
        match tab {
            Tab::Home => View::Home,
            Tab::Leaderboard => View::Leaderboard,
            Tab::Rewards => View::Rewards,
            Tab::Profile => View::Profile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraStatus {
    /// Opening, or restarting after a facing switch.
    Starting,
    Live,
    Failed(String),
}

/// Viewfinder state while `View::Scanning` is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerState {
    pub(crate) facing: Facing,
    pub(crate) camera: CameraStatus,
    pub(crate) auto: AutoCapture,
    pub(crate) capture_pending: bool,
}

impl ScannerState {
    pub(crate) fn opening(facing: Facing) -> Self {
        Self {
            facing,
            camera: CameraStatus::Starting,
            auto: AutoCapture::new(true),
            capture_pending: false,
        }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn camera(&self) -> &CameraStatus {
        &self.camera
    }

    pub fn auto_capture(&self) -> &AutoCapture {
        &self.auto
    }

    pub fn is_live(&self) -> bool {
        self.camera == CameraStatus::Live
    }
}

/// The classification currently being waited on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub request_id: RequestId,
    /// Email of the user who started the scan.
    pub owner: String,
    pub image_url: String,
}

/// What the Analyzing/Result screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub(crate) request_id: RequestId,
    pub(crate) image: ImageArtifact,
    pub(crate) result: Option<ClassificationResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedeemPrompt {
    pub(crate) reward_id: RewardId,
    pub(crate) receipt: Option<RedemptionReceipt>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) view: View,
    pub(crate) user: Option<User>,
    pub(crate) session: Option<SessionState>,
    pub(crate) scanner: Option<ScannerState>,
    pub(crate) in_flight: Option<InFlight>,
    pub(crate) analysis: Option<Analysis>,
    pub(crate) redeem_prompt: Option<RedeemPrompt>,
    pub(crate) vouchers: VoucherIssuer,
    pub(crate) notice: Option<String>,
    pub(crate) persistence_degraded: bool,
    pub(crate) next_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`AppState::new`] with a deterministic voucher generator.
    pub fn with_vouchers(vouchers: VoucherIssuer) -> Self {
        Self {
            vouchers,
            ..Self::default()
        }
    }

    pub fn current_view(&self) -> View {
        self.view
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn scanner(&self) -> Option<&ScannerState> {
        self.scanner.as_ref()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn dirty_flag(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        self.next_request_id
    }

    pub(crate) fn identity(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.email.as_str())
    }
}
