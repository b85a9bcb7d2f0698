//! # Chain Specification
//!
//! Read-only consensus parameters. The formula shapes are fixed in code;
//! everything tunable per chain lives here.

use serde::{Deserialize, Serialize};
use shared_types::U256;

/// Chain-wide consensus parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Chain identifier committed to by transaction signatures.
    pub chain_id: u64,

    /// Difficulty never drops below this floor.
    pub min_difficulty: U256,
    /// Divisor for the per-block difficulty adjustment step
    /// (`parent.difficulty / difficulty_bound_divisor`).
    pub difficulty_bound_divisor: u64,
    /// Seconds per adjustment-factor decrement: a child arriving within one
    /// step raises difficulty, each further full step lowers it by one unit.
    pub adjustment_timestamp_step: u64,
    /// Adjustment factor floor (steepest allowed drop per block).
    pub max_adjustment_drop: i64,
    /// Block number at which the difficulty bomb starts counting.
    pub bomb_delay: u64,
    /// Bomb doubling period in blocks; 0 disables the bomb.
    pub bomb_period: u64,

    /// Maximum ommers a block may carry.
    pub max_ommer_count: usize,
    /// How many generations back an ommer's parent may sit.
    pub max_ommer_depth: u64,

    /// Upper bound on header extra data.
    pub max_extra_data_len: usize,
    /// Base intrinsic gas charged to every transaction.
    pub intrinsic_gas_base: u64,
    /// Intrinsic gas charged per byte of call data.
    pub intrinsic_gas_per_byte: u64,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            chain_id: 64,
            min_difficulty: U256::from(131_072u64),
            difficulty_bound_divisor: 2_048,
            adjustment_timestamp_step: 10,
            max_adjustment_drop: 99,
            bomb_delay: 200_000,
            bomb_period: 100_000,
            max_ommer_count: 2,
            max_ommer_depth: 6,
            max_extra_data_len: 32,
            intrinsic_gas_base: 21_000,
            intrinsic_gas_per_byte: 68,
        }
    }
}

impl ChainSpec {
    /// A spec for tests: tiny difficulty floor so fixtures can seal blocks,
    /// bomb disabled.
    pub fn for_testing() -> Self {
        Self {
            chain_id: 77,
            min_difficulty: U256::one(),
            bomb_delay: u64::MAX,
            bomb_period: 0,
            ..Default::default()
        }
    }
}
