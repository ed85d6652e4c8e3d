use std::sync::Once;

use ecosort_core::{
    update, AppState, Effect, LedgerError, Msg, RewardStatus, SessionState, SignInMode,
    StoredSession, Tab, UserStats, View, VoucherIssuer,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ecosort_logging::initialize_for_tests);
}

fn rewards_screen(points: u64) -> AppState {
    let stored = SessionState::from_parts(
        UserStats {
            total_points: points,
            ..UserStats::fresh()
        },
        Vec::new(),
        Vec::new(),
    );
    let state = AppState::with_vouchers(VoucherIssuer::seeded(7));
    let (state, effects) = update(
        state,
        Msg::AuthSubmitted {
            mode: SignInMode::Login,
            name: String::new(),
            email: "budi@example.com".to_string(),
            password: "pw".to_string(),
        },
    );
    let Some(Effect::LoadSession { user, mode }) = effects.into_iter().next() else {
        panic!("expected LoadSession");
    };
    let (state, _) = update(
        state,
        Msg::SessionLoaded {
            user,
            mode,
            stored: StoredSession::Present(stored),
            loaded_at_ms: 0,
        },
    );
    let (state, _) = update(state, Msg::TabSelected(Tab::Rewards));
    assert_eq!(state.current_view(), View::Rewards);
    state
}

fn status_of(state: &AppState, reward_id: &str) -> RewardStatus {
    state
        .view()
        .rewards
        .into_iter()
        .find(|row| row.reward.id == reward_id)
        .map(|row| row.status)
        .expect("reward row")
}

fn balance(state: &AppState) -> u64 {
    state.session().unwrap().stats().total_points
}

#[test]
fn catalog_reflects_balance_and_ledger() {
    init_logging();
    let state = rewards_screen(600);
    assert_eq!(status_of(&state, "1"), RewardStatus::Affordable);
    assert_eq!(status_of(&state, "4"), RewardStatus::Affordable);
    assert_eq!(status_of(&state, "2"), RewardStatus::Locked);
    assert_eq!(status_of(&state, "3"), RewardStatus::Locked);
}

#[test]
fn confirmed_redemption_issues_voucher_and_saves() {
    init_logging();
    let state = rewards_screen(600);
    let (state, effects) = update(state, Msg::RedeemRequested("1".to_string()));
    assert!(effects.is_empty());
    let prompt = state.view().redeem_prompt.unwrap();
    assert_eq!(prompt.reward.title, "Free Coffee");
    assert!(prompt.receipt.is_none());

    let (state, effects) = update(state, Msg::RedeemConfirmed);
    let receipt = state.view().redeem_prompt.unwrap().receipt.unwrap();
    assert!(receipt.voucher_code.starts_with("ECO-"));
    assert_eq!(receipt.voucher_code.len(), 9);
    assert_eq!(receipt.remaining_points, 100);
    assert_eq!(balance(&state), 100);
    assert_eq!(state.session().unwrap().redeemed(), ["1".to_string()]);
    match effects.as_slice() {
        [Effect::SaveSession { identity, session }] => {
            assert_eq!(identity, "budi@example.com");
            assert_eq!(session.stats().total_points, 100);
            assert_eq!(session.redeemed(), ["1".to_string()]);
        }
        other => panic!("expected SaveSession, got {other:?}"),
    }
    assert_eq!(status_of(&state, "1"), RewardStatus::Redeemed);

    // A double tap on confirm does not spend twice.
    let (state, effects) = update(state, Msg::RedeemConfirmed);
    assert!(effects.is_empty());
    assert_eq!(balance(&state), 100);

    let (state, _) = update(state, Msg::RedeemPromptClosed);
    assert!(state.view().redeem_prompt.is_none());
}

#[test]
fn redeeming_twice_reports_already_redeemed() {
    init_logging();
    let state = rewards_screen(5_000);
    let (state, _) = update(state, Msg::RedeemRequested("3".to_string()));
    let (state, _) = update(state, Msg::RedeemConfirmed);
    let (state, _) = update(state, Msg::RedeemPromptClosed);
    assert_eq!(balance(&state), 3_000);

    let (state, effects) = update(state, Msg::RedeemRequested("3".to_string()));
    assert!(effects.is_empty());
    assert!(state.view().redeem_prompt.is_none());
    let expected = LedgerError::AlreadyRedeemed {
        reward_id: "3".to_string(),
    }
    .to_string();
    assert_eq!(state.notice(), Some(expected.as_str()));
    assert_eq!(balance(&state), 3_000);
}

#[test]
fn unaffordable_reward_never_opens_prompt() {
    init_logging();
    let state = rewards_screen(299);
    let (state, effects) = update(state, Msg::RedeemRequested("4".to_string()));
    assert!(effects.is_empty());
    assert!(state.view().redeem_prompt.is_none());
    assert!(state.notice().unwrap().contains("300"));
    assert_eq!(balance(&state), 299);
}

#[test]
fn balance_is_earned_minus_spent() {
    init_logging();
    let mut state = rewards_screen(2_000);
    let mut spent = 0;
    for (reward_id, cost) in [("4", 300), ("1", 500), ("2", 800), ("3", 2000)] {
        let (next, _) = update(state, Msg::RedeemRequested(reward_id.to_string()));
        let (next, _) = update(next, Msg::RedeemConfirmed);
        let (next, _) = update(next, Msg::RedeemPromptClosed);
        if next.session().unwrap().redeemed().contains(&reward_id.to_string()) {
            spent += cost;
        }
        state = next;
    }

    assert_eq!(spent, 1_600);
    assert_eq!(balance(&state), 400);
    assert_eq!(status_of(&state, "3"), RewardStatus::Locked);
}

#[test]
fn leaving_rewards_closes_prompt() {
    init_logging();
    let state = rewards_screen(600);
    let (state, _) = update(state, Msg::RedeemRequested("1".to_string()));
    let (state, _) = update(state, Msg::TabSelected(Tab::Home));
    assert!(state.view().redeem_prompt.is_none());

    let (state, effects) = update(state, Msg::RedeemConfirmed);
    assert!(effects.is_empty());
    assert_eq!(balance(&state), 600);
}
