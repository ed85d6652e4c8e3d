use ecosort_logging::{eco_debug, eco_info};
use serde::{Deserialize, Serialize};

use crate::{
    BinColor, ClassificationResult, HistoryItem, RewardId, RewardLedger, UserStats, WasteCategory,
};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Everything persisted per identity: stats, scan history (newest first) and
/// the ids of redeemed rewards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    stats: UserStats,
    #[serde(default)]
    history: Vec<HistoryItem>,
    #[serde(default)]
    redeemed: Vec<RewardId>,
}

impl SessionState {
    /// Zeroed state for a new registration.
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn from_parts(
        stats: UserStats,
        history: Vec<HistoryItem>,
        redeemed: Vec<RewardId>,
    ) -> Self {
        Self {
            stats,
            history,
            redeemed,
        }
    }

    /// Sample progress shown to a returning user with nothing stored.
    pub fn demo(now_ms: i64) -> Self {
        let history = vec![
            HistoryItem {
                id: "1".to_string(),
                item_name: "Banana Peel".to_string(),
                category: WasteCategory::Organic,
                bin_color: BinColor::Green,
                confidence: 0.98,
                explanation: "Fruit scraps that break down easily.".to_string(),
                tip: "Great for compost!".to_string(),
                eco_points: 20,
                timestamp: now_ms - HOUR_MS,
                image_url: "https://picsum.photos/200/200?random=1".to_string(),
            },
            HistoryItem {
                id: "2".to_string(),
                item_name: "Plastic Bottle".to_string(),
                category: WasteCategory::Recyclable,
                bin_color: BinColor::Blue,
                confidence: 0.95,
                explanation: "PET plastic that can be recycled.".to_string(),
                tip: "Crush it to save space.".to_string(),
                eco_points: 35,
                timestamp: now_ms - DAY_MS,
                image_url: "https://picsum.photos/200/200?random=2".to_string(),
            },
        ];
        Self {
            stats: UserStats {
                total_points: 1250,
                items_scanned: 24,
                streak_days: 5,
                level: 3,
            },
            history,
            redeemed: Vec::new(),
        }
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn redeemed(&self) -> &[RewardId] {
        &self.redeemed
    }

    pub fn ledger(&mut self) -> RewardLedger<'_> {
        RewardLedger::new(&mut self.stats, &mut self.redeemed)
    }

    /// Applies a finished classification: credits the points and prepends a
    /// history entry. Unknown results change nothing and return `None`.
    pub fn record_classification(
        &mut self,
        result: &ClassificationResult,
        image_url: &str,
        completed_at_ms: i64,
    ) -> Option<&HistoryItem> {
        if !result.is_recognized() {
            eco_debug!("skipping unrecognized result '{}'", result.item_name);
            return None;
        }

        // Timestamps never go backwards even if the clock does.
        let timestamp = self
            .history
            .first()
            .map_or(completed_at_ms, |newest| newest.timestamp.max(completed_at_ms));

        self.ledger().earn(result.eco_points);
        let item = HistoryItem::from_result(
            uuid::Uuid::new_v4().to_string(),
            result,
            timestamp,
            image_url.to_string(),
        );
        eco_info!(
            "recorded {} ({}) for {} points",
            item.item_name,
            item.category,
            item.eco_points
        );
        self.history.insert(0, item);
        self.history.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInMode {
    Login,
    Register,
}

/// What the store returned for an identity at sign-in.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredSession {
    Absent,
    Present(SessionState),
    Unavailable(String),
}

/// Picks the starting state for a sign-in.
///
/// Registration always resets. A login resumes stored progress, falls back to
/// the demo data only when nothing is stored, and starts fresh when the store
/// could not be read.
pub fn resolve_sign_in(mode: SignInMode, stored: StoredSession, now_ms: i64) -> SessionState {
    match (mode, stored) {
        (SignInMode::Register, _) => SessionState::fresh(),
        (SignInMode::Login, StoredSession::Present(state)) => state,
        (SignInMode::Login, StoredSession::Absent) => SessionState::demo(now_ms),
        (SignInMode::Login, StoredSession::Unavailable(_)) => SessionState::fresh(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn organic(points: u64) -> ClassificationResult {
        ClassificationResult {
            item_name: "Apple Core".to_string(),
            category: WasteCategory::Organic,
            bin_color: BinColor::Green,
            confidence: 0.9,
            explanation: "Food scraps.".to_string(),
            tip: "Compost it.".to_string(),
            eco_points: points,
        }
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let state: SessionState = serde_json::from_str(
            r#"{"stats":{"totalPoints":150,"itemsScanned":3,"streakDays":2,"level":1}}"#,
        )
        .unwrap();
        assert_eq!(state.stats().total_points, 150);
        assert!(state.history().is_empty());
        assert!(state.redeemed().is_empty());

        let state: SessionState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, SessionState::fresh());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(SessionState::fresh()).unwrap();
        assert_eq!(json["stats"]["totalPoints"], 0);
        assert_eq!(json["stats"]["streakDays"], 1);
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!(json["redeemed"].as_array().unwrap().is_empty());
    }

    #[test]
    fn history_timestamps_never_decrease() {
        let mut state = SessionState::fresh();
        state.record_classification(&organic(10), "a", 5_000);
        state.record_classification(&organic(10), "b", 4_000);

        let stamps: Vec<_> = state.history().iter().map(|item| item.timestamp).collect();
        assert_eq!(stamps, vec![5_000, 5_000]);
        assert_ne!(state.history()[0].id, state.history()[1].id);
    }

    #[test]
    fn unknown_results_leave_state_untouched() {
        let mut state = SessionState::demo(1_000_000);
        let before = state.clone();
        assert!(state
            .record_classification(&ClassificationResult::failed("offline"), "x", 2_000_000)
            .is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn sign_in_policy() {
        let stored = SessionState::from_parts(
            UserStats {
                total_points: 150,
                ..UserStats::fresh()
            },
            Vec::new(),
            Vec::new(),
        );

        let registered =
            resolve_sign_in(SignInMode::Register, StoredSession::Present(stored.clone()), 0);
        assert_eq!(registered, SessionState::fresh());

        let resumed = resolve_sign_in(SignInMode::Login, StoredSession::Present(stored.clone()), 0);
        assert_eq!(resumed, stored);

        let demo = resolve_sign_in(SignInMode::Login, StoredSession::Absent, 0);
        assert_eq!(demo.stats().total_points, 1250);
        assert_eq!(demo.history().len(), 2);

        let degraded = resolve_sign_in(
            SignInMode::Login,
            StoredSession::Unavailable("disk".to_string()),
            0,
        );
        assert_eq!(degraded, SessionState::fresh());
    }
}
