use std::env;

use anyhow::bail;
use tracing::warn;

pub const DEFAULT_COINS_PER_SALE: u64 = 10;
pub const DEFAULT_XP_PER_SALE: u64 = 20;
pub const DEFAULT_BULK_MULTIPLIER: u64 = 10;
pub const DEFAULT_XP_PER_LEVEL: u64 = 100;

/// Reward and leveling tuning shared by the client and the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub coins_per_sale: u64,
    pub xp_per_sale: u64,
    /// Number of pizzas a bulk sell counts as.
    pub bulk_multiplier: u64,
    /// Base xp per level; the threshold for level `n` is `n * xp_per_level`.
    pub xp_per_level: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            coins_per_sale: DEFAULT_COINS_PER_SALE,
            xp_per_sale: DEFAULT_XP_PER_SALE,
            bulk_multiplier: DEFAULT_BULK_MULTIPLIER,
            xp_per_level: DEFAULT_XP_PER_LEVEL,
        }
    }
}

impl GameConfig {
    /// Read tuning values from `COINS_PER_SALE`, `XP_PER_SALE`, `BULK_MULTIPLIER`
    /// and `XP_PER_LEVEL`, keeping defaults for anything unset or malformed.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self {
            coins_per_sale: env_u64("COINS_PER_SALE", DEFAULT_COINS_PER_SALE),
            xp_per_sale: env_u64("XP_PER_SALE", DEFAULT_XP_PER_SALE),
            bulk_multiplier: env_u64("BULK_MULTIPLIER", DEFAULT_BULK_MULTIPLIER),
            xp_per_level: env_u64("XP_PER_LEVEL", DEFAULT_XP_PER_LEVEL),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.xp_per_level == 0 {
            bail!("XP_PER_LEVEL must be greater than zero");
        }
        if self.bulk_multiplier == 0 {
            bail!("BULK_MULTIPLIER must be greater than zero");
        }
        Ok(())
    }

    /// Xp needed to leave `level`.
    pub fn level_threshold(&self, level: u64) -> u64 {
        level.max(1).saturating_mul(self.xp_per_level)
    }
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

pub fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value = %value, default, "ignoring malformed numeric setting");
                default
            }
        },
        Err(_) => default,
    }
}

/// Read a string setting, treating blank values as unset.
pub fn env_string(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}
