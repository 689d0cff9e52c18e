// blockchain-core/src/settings.rs

use serde::{Deserialize, Serialize};

use crate::BlockchainError;

/// Height at which `generating_balance` switches its confirmation lookback
/// from 50 blocks to 1000. Before this height the chain is young enough
/// that a 1000-block lookback would reach past genesis for most accounts.
pub const SHORT_CONFIRMATION_DEPTH: i32 = 50;
pub const LONG_CONFIRMATION_DEPTH: i32 = 1000;

/// Chain-wide tunables the Kernel, Pool, Forger and Validator all read.
///
/// Mirrors the node's on-disk configuration file: load with
/// [`Settings::from_file`], persist with [`Settings::to_file`], fall back to
/// [`Settings::default`] when nothing is configured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Target average seconds between blocks. Feeds both `base_target`
    /// retargeting and the `normalize()` scaling of its bounds.
    pub average_block_delay_seconds: u64,
    /// Height at which `generating_balance` switches from the 50-block to
    /// the 1000-block confirmation lookback.
    pub generating_balance_depth_bump_height: i32,
    /// Block timestamp (chain time, ms) after which the minimum generating
    /// balance rule is enforced at all.
    pub minimal_generating_balance_after_timestamp: i64,
    /// Block timestamp (chain time, ms) after which transactions within a
    /// block must appear in `BlockOrdering`.
    pub require_sorted_transactions_after: i64,
    /// Balance below which an account may not forge, once enforced.
    pub min_generating_balance: u64,
    /// Maximum number of transactions `Pool::pack` returns for one block.
    pub max_tx_per_block: usize,
    /// Maximum allowed drift (ms) between a block's timestamp and the
    /// validator's corrected local time.
    pub max_time_drift_ms: i64,
    /// How far in the past (ms) an unconfirmed transaction may sit before
    /// `Pool::prune` drops it.
    pub max_tx_age_past_ms: i64,
    /// How far in the future (ms) an unconfirmed transaction's timestamp
    /// may be before `Pool::prune` drops it.
    pub max_tx_age_future_ms: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            average_block_delay_seconds: 60,
            generating_balance_depth_bump_height: 0,
            minimal_generating_balance_after_timestamp: 0,
            require_sorted_transactions_after: 0,
            min_generating_balance: 0,
            max_tx_per_block: 255,
            max_time_drift_ms: 15_000,
            max_tx_age_past_ms: 60 * 60 * 1_000,
            max_tx_age_future_ms: 15 * 60 * 1_000,
        }
    }
}

impl Settings {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The confirmation depth `generating_balance` should look back, given
    /// the height the lookup is being made at.
    pub fn generating_balance_depth(&self, at_height: i32) -> i32 {
        if at_height >= self.generating_balance_depth_bump_height {
            LONG_CONFIRMATION_DEPTH
        } else {
            SHORT_CONFIRMATION_DEPTH
        }
    }

    /// The largest `base_target` retargeting is allowed to reach:
    /// `i64::MAX / average_block_delay_seconds`.
    pub fn max_base_target(&self) -> u64 {
        i64::MAX as u64 / self.average_block_delay_seconds.max(1)
    }

    pub fn validate(&self) -> Result<(), BlockchainError> {
        if !(1..=600).contains(&self.average_block_delay_seconds) {
            return Err(BlockchainError::InvalidConfig(
                "average_block_delay_seconds must be in [1, 600]".into(),
            ));
        }
        if self.max_tx_per_block == 0 {
            return Err(BlockchainError::InvalidConfig(
                "max_tx_per_block must be nonzero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn depth_bumps_at_configured_height() {
        let mut settings = Settings::default();
        settings.generating_balance_depth_bump_height = 1000;
        assert_eq!(settings.generating_balance_depth(999), SHORT_CONFIRMATION_DEPTH);
        assert_eq!(settings.generating_balance_depth(1000), LONG_CONFIRMATION_DEPTH);
    }

    #[test]
    fn zero_block_delay_is_rejected() {
        let mut settings = Settings::default();
        settings.average_block_delay_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn block_delay_above_600_is_rejected() {
        let mut settings = Settings::default();
        settings.average_block_delay_seconds = 601;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn block_delay_of_600_is_accepted() {
        let mut settings = Settings::default();
        settings.average_block_delay_seconds = 600;
        assert!(settings.validate().is_ok());
    }
}
