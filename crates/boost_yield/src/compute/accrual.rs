//! Claimable yield for one stake: config factor -> boost factor -> personal rewards.

use crate::boost::{AccrualInput, Boost, BoostConfig, Proof, Stake};
use crate::numeric::{ArithmeticError, Numeric};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which sync snapshot was missing when the calculator short-circuited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsyncedReason {
    BoostTotalDeposits,
    BoostLastRewardsFactor,
    StakeLastRewardsFactor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "missing", rename_all = "snake_case")]
pub enum AccrualOutcome {
    /// All three stages ran.
    Accrued,
    /// Only the stored rewards are claimable.
    Unsynced(UnsyncedReason),
}

/// Intermediate values of one accrual, for display and evidence bundles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccrualBreakdown {
    pub outcome: AccrualOutcome,
    /// `stake.rewards`, already accrued on-chain.
    pub stored_rewards: u64,
    /// Config factor after folding in the proof balance.
    pub config_rewards_factor: Numeric,
    /// Boost factor after applying the config delta.
    pub boost_rewards_factor: Numeric,
    /// Newly accrued rewards, truncated to whole units.
    pub personal_rewards: u64,
    pub claimable: u64,
}

/// Amount of reward units the stake can claim right now.
pub fn compute_claimable(
    boost: &Boost,
    boost_proof: &Proof,
    stake: &Stake,
    boost_config: &BoostConfig,
) -> Result<u64, ArithmeticError> {
    accrue(boost, boost_proof, stake, boost_config).map(|b| b.claimable)
}

/// Same as [`compute_claimable`], keeping every intermediate value.
pub fn accrue(
    boost: &Boost,
    boost_proof: &Proof,
    stake: &Stake,
    boost_config: &BoostConfig,
) -> Result<AccrualBreakdown, ArithmeticError> {
    let stored_rewards = stake.rewards.unwrap_or(0);
    let mut config_factor = boost_config.rewards_factor.unwrap_or(Numeric::ZERO);
    let mut boost_factor = boost.rewards_factor.unwrap_or(Numeric::ZERO);

    let unsynced = |reason: UnsyncedReason| {
        debug!(?reason, stored_rewards, "stake not on accrual curve");
        AccrualBreakdown {
            outcome: AccrualOutcome::Unsynced(reason),
            stored_rewards,
            config_rewards_factor: config_factor,
            boost_rewards_factor: boost_factor,
            personal_rewards: 0,
            claimable: stored_rewards,
        }
    };

    // Absence only; a present zero is a real (broken) value and falls through.
    let Some(total_deposits) = boost.total_deposits else {
        return Ok(unsynced(UnsyncedReason::BoostTotalDeposits));
    };
    let Some(boost_last_factor) = boost.last_rewards_factor else {
        return Ok(unsynced(UnsyncedReason::BoostLastRewardsFactor));
    };
    let Some(stake_last_factor) = stake.last_rewards_factor else {
        return Ok(unsynced(UnsyncedReason::StakeLastRewardsFactor));
    };

    // Proof yield not yet distributed to the config.
    if let (Some(balance), Some(total_weight)) = (boost_proof.balance, boost_config.total_weight) {
        if balance > 0 && total_weight > 0 {
            let extra = Numeric::from_fraction(balance, total_weight)?;
            config_factor = config_factor.checked_add(extra)?;
            debug!(balance, total_weight, %extra, "folded proof balance into config factor");
        }
    }

    if config_factor > boost_last_factor {
        let accumulated = config_factor.checked_sub(boost_last_factor)?;
        let boost_rewards = accumulated.checked_mul(Numeric::from_u64(boost.weight.unwrap_or(0)))?;
        let delta = boost_rewards.checked_div(Numeric::from_u64(total_deposits))?;
        boost_factor = boost_factor.checked_add(delta)?;
    }

    let mut personal_rewards = 0;
    if boost_factor > stake_last_factor {
        let accumulated = boost_factor.checked_sub(stake_last_factor)?;
        let personal = accumulated.checked_mul(Numeric::from_u64(stake.balance.unwrap_or(0)))?;
        personal_rewards = personal.to_u64()?;
    }

    let claimable = stored_rewards
        .checked_add(personal_rewards)
        .ok_or(ArithmeticError::Overflow)?;
    debug!(
        stored_rewards,
        personal_rewards,
        claimable,
        %config_factor,
        %boost_factor,
        "accrued"
    );

    Ok(AccrualBreakdown {
        outcome: AccrualOutcome::Accrued,
        stored_rewards,
        config_rewards_factor: config_factor,
        boost_rewards_factor: boost_factor,
        personal_rewards,
        claimable,
    })
}

/// [`accrue`] over a bundled snapshot set.
pub fn accrue_input(input: &AccrualInput) -> Result<AccrualBreakdown, ArithmeticError> {
    accrue(
        &input.boost,
        &input.boost_proof,
        &input.stake,
        &input.boost_config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::SCALE;
    use proptest::prelude::*;

    fn half() -> Numeric {
        Numeric::from_fraction(500, 1000).unwrap()
    }

    /// Pool with 1000 deposited, weight 1000, staker holding 200, all synced at 0.
    fn synced_input() -> AccrualInput {
        AccrualInput {
            boost_config: BoostConfig {
                rewards_factor: Some(half()),
                total_weight: None,
            },
            boost: Boost {
                rewards_factor: None,
                last_rewards_factor: Some(Numeric::ZERO),
                weight: Some(1000),
                total_deposits: Some(1000),
            },
            boost_proof: Proof::default(),
            stake: Stake {
                rewards: None,
                last_rewards_factor: Some(Numeric::ZERO),
                balance: Some(200),
            },
        }
    }

    #[test]
    fn unsynced_returns_stored_rewards() {
        let input = AccrualInput {
            stake: Stake {
                rewards: Some(100),
                ..Default::default()
            },
            ..Default::default()
        };
        let b = accrue_input(&input).unwrap();
        assert_eq!(b.claimable, 100);
        assert_eq!(
            b.outcome,
            AccrualOutcome::Unsynced(UnsyncedReason::BoostTotalDeposits)
        );
    }

    #[test]
    fn each_guard_reports_its_reason() {
        let mut input = synced_input();
        input.boost.last_rewards_factor = None;
        assert_eq!(
            accrue_input(&input).unwrap().outcome,
            AccrualOutcome::Unsynced(UnsyncedReason::BoostLastRewardsFactor)
        );

        let mut input = synced_input();
        input.stake.last_rewards_factor = None;
        assert_eq!(
            accrue_input(&input).unwrap().outcome,
            AccrualOutcome::Unsynced(UnsyncedReason::StakeLastRewardsFactor)
        );
    }

    #[test]
    fn unsynced_without_rewards_is_zero() {
        let mut input = synced_input();
        input.boost.total_deposits = None;
        assert_eq!(accrue_input(&input).unwrap().claimable, 0);
    }

    #[test]
    fn accrues_config_delta_through_boost() {
        let b = accrue_input(&synced_input()).unwrap();
        assert_eq!(b.outcome, AccrualOutcome::Accrued);
        assert_eq!(b.boost_rewards_factor, half());
        assert_eq!(b.personal_rewards, 100);
        assert_eq!(b.claimable, 100);
    }

    #[test]
    fn proof_balance_folds_into_config_factor() {
        let mut input = synced_input();
        input.boost_proof.balance = Some(50);
        input.boost_config.total_weight = Some(100);
        let b = accrue_input(&input).unwrap();
        assert_eq!(b.config_rewards_factor, Numeric::ONE);
        assert_eq!(b.boost_rewards_factor, Numeric::ONE);
        assert_eq!(b.claimable, 200);
    }

    #[test]
    fn proof_fold_needs_balance_and_weight() {
        let cases = [
            (Some(50), None),
            (Some(0), Some(100)),
            (None, Some(100)),
            (Some(50), Some(0)),
        ];
        for (balance, weight) in cases {
            let mut input = synced_input();
            input.boost_proof.balance = balance;
            input.boost_config.total_weight = weight;
            let b = accrue_input(&input).unwrap();
            assert_eq!(b.claimable, 100, "balance {:?} weight {:?}", balance, weight);
        }
    }

    #[test]
    fn stored_rewards_are_added() {
        let mut input = synced_input();
        input.stake.rewards = Some(7);
        let b = accrue_input(&input).unwrap();
        assert_eq!(b.stored_rewards, 7);
        assert_eq!(b.claimable, 107);
    }

    #[test]
    fn no_accrual_when_config_not_ahead_of_boost() {
        let mut input = synced_input();
        input.boost.last_rewards_factor = Some(half());
        let b = accrue_input(&input).unwrap();
        assert_eq!(b.outcome, AccrualOutcome::Accrued);
        assert_eq!(b.boost_rewards_factor, Numeric::ZERO);
        assert_eq!(b.claimable, 0);
    }

    #[test]
    fn boost_factor_alone_still_pays_stake() {
        let mut input = synced_input();
        input.boost_config.rewards_factor = None;
        input.boost.rewards_factor = Some(Numeric::from_u64(2));
        input.stake.last_rewards_factor = Some(Numeric::ONE);
        assert_eq!(accrue_input(&input).unwrap().claimable, 200);
    }

    #[test]
    fn personal_rewards_truncate() {
        let mut input = synced_input();
        input.boost_config.rewards_factor = None;
        input.boost.rewards_factor = Some(Numeric::from_fraction(1, 3).unwrap());
        input.stake.balance = Some(3);
        input.stake.rewards = Some(5);
        let b = accrue_input(&input).unwrap();
        // 3 * (2^48 / 3) is one raw unit short of 1.0.
        assert_eq!(b.boost_rewards_factor.to_bits(), SCALE / 3);
        assert_eq!(b.personal_rewards, 0);
        assert_eq!(b.claimable, 5);
    }

    #[test]
    fn missing_weight_and_balance_count_as_zero() {
        let mut input = synced_input();
        input.boost.weight = None;
        assert_eq!(accrue_input(&input).unwrap().claimable, 0);

        let mut input = synced_input();
        input.stake.balance = None;
        assert_eq!(accrue_input(&input).unwrap().claimable, 0);
    }

    #[test]
    fn zero_total_deposits_is_division_by_zero() {
        let mut input = synced_input();
        input.boost.total_deposits = Some(0);
        assert_eq!(
            accrue_input(&input),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn zero_total_deposits_without_config_delta_does_not_divide() {
        let mut input = synced_input();
        input.boost.total_deposits = Some(0);
        input.boost_config.rewards_factor = None;
        assert_eq!(accrue_input(&input).unwrap().claimable, 0);
    }

    #[test]
    fn claimable_overflow_is_reported() {
        let mut input = synced_input();
        input.stake.rewards = Some(u64::MAX);
        assert_eq!(accrue_input(&input), Err(ArithmeticError::Overflow));
    }

    #[test]
    fn compute_claimable_matches_breakdown() {
        let input = synced_input();
        let amount = compute_claimable(
            &input.boost,
            &input.boost_proof,
            &input.stake,
            &input.boost_config,
        )
        .unwrap();
        assert_eq!(amount, accrue_input(&input).unwrap().claimable);
    }

    fn factor() -> impl Strategy<Value = Numeric> {
        (0i128..(1 << 52)).prop_map(Numeric::from_bits)
    }

    prop_compose! {
        fn bounded_input()(
            config_factor in factor(),
            total_weight in proptest::option::of(0u64..(1 << 20)),
            boost_factor in proptest::option::of(factor()),
            boost_last in factor(),
            weight in proptest::option::of(0u64..(1 << 20)),
            total_deposits in 1u64..(1 << 20),
            proof_balance in proptest::option::of(0u64..(1 << 20)),
            rewards in proptest::option::of(0u64..(1 << 32)),
            stake_last in factor(),
            balance in proptest::option::of(0u64..(1 << 20)),
        ) -> AccrualInput {
            AccrualInput {
                boost_config: BoostConfig {
                    rewards_factor: Some(config_factor),
                    total_weight,
                },
                boost: Boost {
                    rewards_factor: boost_factor,
                    last_rewards_factor: Some(boost_last),
                    weight,
                    total_deposits: Some(total_deposits),
                },
                boost_proof: Proof { balance: proof_balance },
                stake: Stake {
                    rewards,
                    last_rewards_factor: Some(stake_last),
                    balance,
                },
            }
        }
    }

    proptest! {
        #[test]
        fn deterministic(input in bounded_input()) {
            let first = accrue_input(&input).unwrap();
            let second = accrue_input(&input.clone()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn never_below_stored_rewards(input in bounded_input()) {
            let b = accrue_input(&input).unwrap();
            prop_assert!(b.claimable >= input.stake.rewards.unwrap_or(0));
        }

        #[test]
        fn missing_sync_snapshot_returns_stored(input in bounded_input(), which in 0usize..3) {
            let mut input = input;
            match which {
                0 => input.boost.total_deposits = None,
                1 => input.boost.last_rewards_factor = None,
                _ => input.stake.last_rewards_factor = None,
            }
            let b = accrue_input(&input).unwrap();
            prop_assert_eq!(b.claimable, input.stake.rewards.unwrap_or(0));
            prop_assert_eq!(b.personal_rewards, 0);
        }

        #[test]
        fn monotonic_in_config_factor(input in bounded_input(), bump in factor()) {
            let low = accrue_input(&input).unwrap().claimable;
            let mut raised = input;
            raised.boost_config.rewards_factor = raised
                .boost_config
                .rewards_factor
                .map(|f| f.checked_add(bump).unwrap());
            let high = accrue_input(&raised).unwrap().claimable;
            prop_assert!(high >= low);
        }

        #[test]
        fn monotonic_in_proof_balance(input in bounded_input(), bump in 0u64..(1 << 20)) {
            let low = accrue_input(&input).unwrap().claimable;
            let mut raised = input;
            raised.boost_proof.balance = Some(raised.boost_proof.balance.unwrap_or(0) + bump);
            let high = accrue_input(&raised).unwrap().claimable;
            prop_assert!(high >= low);
        }
    }
}
