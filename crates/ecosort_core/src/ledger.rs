use std::collections::HashSet;

use ecosort_logging::{eco_debug, eco_info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Reward, RewardId, UserStats};

const VOUCHER_PREFIX: &str = "ECO-";
const VOUCHER_LEN: usize = 5;
const VOUCHER_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Not enough points: {cost} needed, {available} available.")]
    InsufficientPoints { cost: u64, available: u64 },
    #[error("This reward has already been redeemed.")]
    AlreadyRedeemed { reward_id: RewardId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionReceipt {
    pub reward_id: RewardId,
    pub reward_title: String,
    pub cost: u64,
    pub voucher_code: String,
    pub remaining_points: u64,
}

/// Issues voucher codes of the form `ECO-XXXXX`, never repeating one.
#[derive(Debug, Clone)]
pub struct VoucherIssuer {
    rng: StdRng,
    issued: HashSet<String>,
}

impl VoucherIssuer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            issued: HashSet::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    pub fn issue(&mut self) -> String {
        loop {
            let suffix: String = (0..VOUCHER_LEN)
                .map(|_| {
                    let idx = self.rng.gen_range(0..VOUCHER_ALPHABET.len());
                    char::from(VOUCHER_ALPHABET[idx])
                })
                .collect();
            let code = format!("{VOUCHER_PREFIX}{suffix}");
            if self.issued.insert(code.clone()) {
                return code;
            }
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

impl Default for VoucherIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for VoucherIssuer {
    fn eq(&self, other: &Self) -> bool {
        self.issued == other.issued
    }
}

/// The only writer of the point balance and the redemption set.
///
/// Borrowed from a [`crate::SessionState`] for the duration of one operation,
/// so a balance check and the matching deduction can never interleave with
/// another redemption.
#[derive(Debug)]
pub struct RewardLedger<'a> {
    stats: &'a mut UserStats,
    redeemed: &'a mut Vec<RewardId>,
}

impl<'a> RewardLedger<'a> {
    pub(crate) fn new(stats: &'a mut UserStats, redeemed: &'a mut Vec<RewardId>) -> Self {
        Self { stats, redeemed }
    }

    pub fn balance(&self) -> u64 {
        self.stats.total_points
    }

    pub fn is_redeemed(&self, reward_id: &str) -> bool {
        self.redeemed.iter().any(|id| id == reward_id)
    }

    /// Credits a recognized scan.
    pub fn earn(&mut self, points: u64) {
        self.stats.total_points = self.stats.total_points.saturating_add(points);
        self.stats.items_scanned += 1;
        eco_debug!(
            "earned {} points, balance={} scanned={}",
            points,
            self.stats.total_points,
            self.stats.items_scanned
        );
    }

    pub fn check(&self, reward: &Reward) -> Result<(), LedgerError> {
        if self.is_redeemed(&reward.id) {
            return Err(LedgerError::AlreadyRedeemed {
                reward_id: reward.id.clone(),
            });
        }
        if self.stats.total_points < reward.cost {
            return Err(LedgerError::InsufficientPoints {
                cost: reward.cost,
                available: self.stats.total_points,
            });
        }
        Ok(())
    }

    pub fn can_redeem(&self, reward: &Reward) -> bool {
        self.check(reward).is_ok()
    }

    /// Spends `reward.cost` and records the reward. Preconditions are checked
    /// here against the current balance, not whatever the caller saw earlier.
    pub fn redeem(
        &mut self,
        reward: &Reward,
        vouchers: &mut VoucherIssuer,
    ) -> Result<RedemptionReceipt, LedgerError> {
        self.check(reward)?;

        self.stats.total_points -= reward.cost;
        self.redeemed.push(reward.id.clone());
        let voucher_code = vouchers.issue();
        eco_info!(
            "redeemed reward {} for {} points, balance={}",
            reward.id,
            reward.cost,
            self.stats.total_points
        );

        Ok(RedemptionReceipt {
            reward_id: reward.id.clone(),
            reward_title: reward.title.clone(),
            cost: reward.cost,
            voucher_code,
            remaining_points: self.stats.total_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn reward(id: &str, cost: u64) -> Reward {
        Reward {
            id: id.to_string(),
            title: format!("Reward {id}"),
            cost,
            description: String::new(),
            emoji: String::new(),
        }
    }

    #[test]
    fn balance_tracks_earned_minus_redeemed() {
        let mut stats = UserStats::fresh();
        let mut redeemed = Vec::new();
        let mut vouchers = VoucherIssuer::seeded(1);
        let mut ledger = RewardLedger::new(&mut stats, &mut redeemed);

        for points in [20, 35, 0, 50, 300] {
            ledger.earn(points);
        }
        assert_eq!(ledger.balance(), 405);

        ledger.redeem(&reward("a", 300), &mut vouchers).unwrap();
        assert_eq!(ledger.balance(), 105);
        assert!(ledger.redeem(&reward("b", 200), &mut vouchers).is_err());
        assert_eq!(ledger.balance(), 105);

        assert_eq!(stats.items_scanned, 5);
        assert_eq!(redeemed, vec!["a".to_string()]);
    }

    #[test]
    fn second_redeem_is_rejected_as_already_redeemed() {
        let mut stats = UserStats {
            total_points: 10_000,
            ..UserStats::fresh()
        };
        let mut redeemed = Vec::new();
        let mut vouchers = VoucherIssuer::seeded(2);
        let coffee = catalog::find_reward("1").unwrap();
        let mut ledger = RewardLedger::new(&mut stats, &mut redeemed);

        let receipt = ledger.redeem(&coffee, &mut vouchers).unwrap();
        assert_eq!(receipt.remaining_points, 9_500);
        assert_eq!(
            ledger.redeem(&coffee, &mut vouchers),
            Err(LedgerError::AlreadyRedeemed {
                reward_id: "1".to_string()
            })
        );
        assert_eq!(ledger.balance(), 9_500);
    }

    #[test]
    fn redeem_rechecks_balance_at_call_time() {
        let mut stats = UserStats {
            total_points: 800,
            ..UserStats::fresh()
        };
        let mut redeemed = Vec::new();
        let mut vouchers = VoucherIssuer::seeded(3);
        let books = reward("books", 800);
        let bus = reward("bus", 300);
        let mut ledger = RewardLedger::new(&mut stats, &mut redeemed);

        // Prompt for the books is opened while the balance still covers it.
        assert!(ledger.can_redeem(&books));
        ledger.redeem(&bus, &mut vouchers).unwrap();

        assert_eq!(
            ledger.redeem(&books, &mut vouchers),
            Err(LedgerError::InsufficientPoints {
                cost: 800,
                available: 500
            })
        );
        assert_eq!(ledger.balance(), 500);
        assert!(!ledger.is_redeemed("books"));
    }

    #[test]
    fn voucher_codes_are_unique_and_well_formed() {
        let mut vouchers = VoucherIssuer::seeded(42);
        let codes: HashSet<String> = (0..200).map(|_| vouchers.issue()).collect();
        assert_eq!(codes.len(), 200);
        assert_eq!(vouchers.issued_count(), 200);
        for code in codes {
            let suffix = code.strip_prefix("ECO-").unwrap();
            assert_eq!(suffix.len(), 5);
            assert!(suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }
}
