use serde::{Deserialize, Serialize};

use crate::config::GameConfig;

/// A sell action triggered by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleAction {
    Sell,
    BulkSell,
}

impl SaleAction {
    /// Number of pizzas the action counts toward the sold statistic.
    pub fn pizzas(self, config: &GameConfig) -> u64 {
        match self {
            Self::Sell => 1,
            Self::BulkSell => config.bulk_multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub coins: u64,
    pub xp: u64,
}

pub fn compute_reward(config: &GameConfig, action: SaleAction) -> Reward {
    let pizzas = action.pizzas(config);

    Reward {
        coins: config.coins_per_sale.saturating_mul(pizzas),
        xp: config.xp_per_sale.saturating_mul(pizzas),
    }
}

#[cfg(test)]
mod tests {
    use super::{Reward, SaleAction, compute_reward};
    use crate::config::GameConfig;

    #[test]
    fn single_sale_uses_base_reward() {
        let config = GameConfig::default();
        assert_eq!(
            compute_reward(&config, SaleAction::Sell),
            Reward { coins: 10, xp: 20 }
        );
        assert_eq!(SaleAction::Sell.pizzas(&config), 1);
    }

    #[test]
    fn bulk_sale_multiplies_both_rewards() {
        let config = GameConfig {
            bulk_multiplier: 4,
            ..GameConfig::default()
        };
        assert_eq!(
            compute_reward(&config, SaleAction::BulkSell),
            Reward { coins: 40, xp: 80 }
        );
        assert_eq!(SaleAction::BulkSell.pizzas(&config), 4);
    }
}
