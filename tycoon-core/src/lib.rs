/// Game tuning values and environment helpers.
pub mod config;
/// Escalating-threshold level resolution.
pub mod leveling;
/// Player progress and identity records shared across crates.
pub mod model;
/// Coin/xp rewards for sell actions.
pub mod reward;
/// Shared time helpers.
pub mod time;

pub use config::GameConfig;
pub use leveling::{LevelUp, resolve_level_up};
pub use model::{ExternalIdentity, PlayerProfile, ProgressSource, ProgressTotals, UserProgress};
pub use reward::{Reward, SaleAction, compute_reward};

pub type Error = anyhow::Error;
