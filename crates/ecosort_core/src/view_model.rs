use crate::catalog::{self, CommunityTarget, LeaderboardEntry, COMMUNITY_TARGET};
use crate::{
    AppState, CameraStatus, ClassificationResult, Facing, HistoryItem, RedemptionReceipt, Reward,
    UserStats, View,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub view: View,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub stats: Option<UserStats>,
    pub history: Vec<HistoryItem>,
    pub community: Option<CommunityTarget>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rewards: Vec<RewardRowView>,
    pub redeemed_count: usize,
    pub redeem_prompt: Option<RedeemPromptView>,
    pub scanner: Option<ScannerView>,
    pub analysis: Option<AnalysisView>,
    pub notice: Option<String>,
    pub persistence_degraded: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardStatus {
    Redeemed,
    Affordable,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRowView {
    pub reward: Reward,
    pub status: RewardStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemPromptView {
    pub reward: Reward,
    pub receipt: Option<RedemptionReceipt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerView {
    pub facing: Facing,
    pub camera_live: bool,
    pub error: Option<String>,
    pub auto_capture: bool,
    pub countdown: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub image_url: String,
    pub result: ClassificationResult,
    pub is_loading: bool,
}

impl AppState {
    pub fn view(&self) -> AppViewModel {
        let mut model = AppViewModel {
            view: self.view,
            notice: self.notice.clone(),
            persistence_degraded: self.persistence_degraded,
            dirty: self.dirty_flag(),
            ..AppViewModel::default()
        };

        if let (Some(user), Some(session)) = (&self.user, &self.session) {
            let stats = *session.stats();
            model.user_name = Some(user.name.clone());
            model.user_email = Some(user.email.clone());
            model.stats = Some(stats);
            model.history = session.history().to_vec();
            model.redeemed_count = session.redeemed().len();

            match self.view {
                View::Home => model.community = Some(COMMUNITY_TARGET),
                View::Leaderboard => {
                    model.leaderboard = catalog::leaderboard(&user.name, stats.total_points);
                }
                View::Rewards => {
                    model.rewards = catalog::rewards()
                        .into_iter()
                        .map(|reward| {
                            let status = if session.redeemed().contains(&reward.id) {
                                RewardStatus::Redeemed
                            } else if stats.total_points >= reward.cost {
                                RewardStatus::Affordable
                            } else {
                                RewardStatus::Locked
                            };
                            RewardRowView { reward, status }
                        })
                        .collect();
                }
                _ => {}
            }
        }

        model.redeem_prompt = self.redeem_prompt.as_ref().and_then(|prompt| {
            catalog::find_reward(&prompt.reward_id).map(|reward| RedeemPromptView {
                reward,
                receipt: prompt.receipt.clone(),
            })
        });

        if self.view == View::Scanning {
            model.scanner = self.scanner.as_ref().map(|scanner| ScannerView {
                facing: scanner.facing,
                camera_live: scanner.is_live(),
                error: match &scanner.camera {
                    CameraStatus::Failed(message) => Some(message.clone()),
                    CameraStatus::Starting | CameraStatus::Live => None,
                },
                auto_capture: scanner.auto.is_enabled(),
                countdown: scanner.auto.countdown(),
            });
        }

        if matches!(self.view, View::Analyzing | View::ResultReady) {
            model.analysis = self.analysis.as_ref().map(|analysis| AnalysisView {
                image_url: analysis.image.data_uri(),
                result: analysis
                    .result
                    .clone()
                    .unwrap_or_else(ClassificationResult::analyzing),
                is_loading: analysis.result.is_none(),
            });
        }

        model
    }
}
