//! # Difficulty Calculator
//!
//! Pure recomputation of the difficulty a child header must carry. This is
//! consensus-critical: any divergence from the network's arithmetic forks the
//! node, so the function is deterministic, total, and exercised by property
//! tests.

use shared_types::{BlockHeader, U256};

use crate::chain_spec::ChainSpec;

/// Computes the expected difficulty of a child header from its parent and
/// the chain specification.
#[derive(Debug, Clone)]
pub struct DifficultyCalculator {
    spec: ChainSpec,
}

impl DifficultyCalculator {
    /// Create a calculator over `spec`.
    pub fn new(spec: ChainSpec) -> Self {
        Self { spec }
    }

    /// Expected difficulty for a child of `parent` stamped `timestamp`.
    ///
    /// `parent.difficulty ± parent.difficulty / bound_divisor * factor`,
    /// where the factor is `1 - elapsed / step` floored at
    /// `-max_adjustment_drop`, plus the periodic bomb term, clamped to the
    /// chain's minimum.
    pub fn calculate(&self, parent: &BlockHeader, timestamp: u64) -> U256 {
        let elapsed = timestamp.saturating_sub(parent.timestamp);
        let step = self.spec.adjustment_timestamp_step.max(1);

        let steps = (elapsed / step).min(i64::MAX as u64) as i64;
        let factor = 1i64
            .saturating_sub(steps)
            .max(-self.spec.max_adjustment_drop);
        let unit = parent.difficulty / U256::from(self.spec.difficulty_bound_divisor);

        let adjusted = if factor >= 0 {
            parent
                .difficulty
                .saturating_add(unit.saturating_mul(U256::from(factor as u64)))
        } else {
            parent
                .difficulty
                .checked_sub(unit.saturating_mul(U256::from((-factor) as u64)))
                .unwrap_or_default()
        };

        let with_bomb = adjusted.saturating_add(self.bomb(parent.number + 1));

        with_bomb.max(self.spec.min_difficulty)
    }

    /// Exponential bomb term for `number`, zero until the delay block.
    fn bomb(&self, number: u64) -> U256 {
        if self.spec.bomb_period == 0 || number < self.spec.bomb_delay {
            return U256::zero();
        }
        let period_count = (number - self.spec.bomb_delay) / self.spec.bomb_period;
        // 2^period_count; saturates at the top of U256 rather than wrapping.
        if period_count >= 255 {
            return U256::MAX;
        }
        U256::one() << (period_count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calculator() -> DifficultyCalculator {
        DifficultyCalculator::new(ChainSpec::default())
    }

    fn parent_with(difficulty: u64, timestamp: u64, number: u64) -> BlockHeader {
        BlockHeader {
            difficulty: U256::from(difficulty),
            timestamp,
            number,
            ..Default::default()
        }
    }

    #[test]
    fn test_fast_child_raises_difficulty() {
        let calc = calculator();
        let parent = parent_with(1_000_000, 1_000, 0);

        let fast = calc.calculate(&parent, 1_005);
        assert!(fast > parent.difficulty);
    }

    #[test]
    fn test_slow_child_lowers_difficulty() {
        let calc = calculator();
        let parent = parent_with(1_000_000, 1_000, 0);

        let slow = calc.calculate(&parent, 1_100);
        assert!(slow < parent.difficulty);
    }

    #[test]
    fn test_floor_is_enforced() {
        let calc = calculator();
        let spec = ChainSpec::default();
        let parent = parent_with(1, 1_000, 0);

        // A tiny parent difficulty with an enormous gap still clamps up.
        let result = calc.calculate(&parent, 1_000_000);
        assert_eq!(result, spec.min_difficulty);
    }

    #[test]
    fn test_adjustment_drop_is_bounded() {
        let calc = calculator();
        let parent = parent_with(100_000_000, 1_000, 0);

        // Beyond 100 steps the factor stops falling.
        let at_bound = calc.calculate(&parent, 1_000 + 10 * 100);
        let past_bound = calc.calculate(&parent, 1_000 + 10 * 10_000);
        assert_eq!(at_bound, past_bound);
    }

    #[test]
    fn test_bomb_kicks_in_after_delay() {
        let spec = ChainSpec::default();
        let calc = DifficultyCalculator::new(spec.clone());
        let before = parent_with(10_000_000, 1_000, spec.bomb_delay - 2);
        let after = parent_with(10_000_000, 1_000, spec.bomb_delay + spec.bomb_period * 20);

        let quiet = calc.calculate(&before, 1_010);
        let loud = calc.calculate(&after, 1_010);
        assert!(loud > quiet);
    }

    #[test]
    fn test_disabled_bomb_never_fires() {
        let calc = DifficultyCalculator::new(ChainSpec::for_testing());
        let parent = parent_with(1_000_000, 1_000, u64::MAX - 1);
        let with = calc.calculate(&parent, 1_005);

        let parent_low = parent_with(1_000_000, 1_000, 5);
        let without = calc.calculate(&parent_low, 1_005);
        assert_eq!(with, without);
    }

    proptest! {
        /// Identical inputs always yield identical outputs, independent of
        /// call order or repetition.
        #[test]
        fn prop_calculation_is_pure(
            difficulty in 1u64..u64::MAX,
            parent_ts in 0u64..u64::MAX / 2,
            delta in 0u64..100_000,
            number in 0u64..10_000_000,
        ) {
            let calc = calculator();
            let parent = parent_with(difficulty, parent_ts, number);
            let ts = parent_ts + delta;

            let first = calc.calculate(&parent, ts);
            let second = calc.calculate(&parent, ts);
            prop_assert_eq!(first, second);
        }

        /// The result never falls below the configured floor.
        #[test]
        fn prop_floor_always_holds(
            difficulty in 1u64..u64::MAX,
            parent_ts in 0u64..u64::MAX / 2,
            delta in 0u64..1_000_000,
        ) {
            let spec = ChainSpec::default();
            let calc = DifficultyCalculator::new(spec.clone());
            let parent = parent_with(difficulty, parent_ts, 0);

            prop_assert!(calc.calculate(&parent, parent_ts + delta) >= spec.min_difficulty);
        }
    }
}
