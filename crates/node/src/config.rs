// node/src/config.rs
use serde::{Deserialize, Serialize};

/// Everything the demo binary needs beyond the consensus `Settings` it
/// loads separately: where to find that `Settings` file, and how to seed
/// the in-memory chain it forges on top of.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// Path to a `Settings` TOML file, used when the CLI's `--settings` flag
    /// is not given. Falls back to `Settings::default()` when neither is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,
    /// Number of demo accounts to generate and fund at genesis.
    pub account_count: usize,
    /// Balance each demo account is funded with.
    pub seed_balance: u64,
    /// How often the forging loop wakes up to check eligibility.
    pub tick_interval_ms: u64,
    /// Stop after forging this many blocks.
    pub max_blocks: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            settings_path: None,
            account_count: 3,
            seed_balance: 10_000_000,
            tick_interval_ms: 1_000,
            max_blocks: 20,
        }
    }
}

impl DemoConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
