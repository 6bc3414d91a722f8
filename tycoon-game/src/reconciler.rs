use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{debug, info, warn};
use tycoon_api::AuthoritativeService;
use tycoon_core::{GameConfig, ProgressTotals, Reward, SaleAction, compute_reward, resolve_level_up};
use tycoon_store::{LocalProgressStore, ProgressField};

/// Totals after a sale, whichever path produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SaleOutcome {
    pub action: SaleAction,
    pub reward: Reward,
    pub pizzas: u64,
    pub balance: u64,
    pub xp: u64,
    pub level: u64,
    pub levels_gained: u64,
    /// Lifetime pizzas sold, or `None` when the local counter could not be updated.
    pub pizzas_sold: Option<u64>,
    pub authoritative: bool,
}

impl SaleOutcome {
    pub fn totals(&self) -> ProgressTotals {
        ProgressTotals {
            balance: self.balance,
            xp: self.xp,
            level: self.level,
        }
    }

    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Clears the busy flag when the sale settles, including on early return.
struct SaleGuard<'a> {
    busy: &'a AtomicBool,
}

impl<'a> SaleGuard<'a> {
    fn acquire(busy: &'a AtomicBool) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy })
    }
}

impl Drop for SaleGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Applies sell actions for one player session.
///
/// The backend is tried first; when it cannot answer, the reward is applied to
/// the local store instead. Only one sale may be in flight at a time.
#[derive(Debug)]
pub struct ProgressReconciler<S> {
    service: Arc<S>,
    store: LocalProgressStore,
    config: GameConfig,
    busy: AtomicBool,
}

impl<S> ProgressReconciler<S>
where
    S: AuthoritativeService,
{
    pub fn new(service: Arc<S>, store: LocalProgressStore, config: GameConfig) -> Self {
        Self {
            service,
            store,
            config,
            busy: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Apply a sale for `user_id`.
    ///
    /// Returns `Ok(None)` without touching any state when another sale is
    /// still pending. Errors come only from the local store.
    pub async fn apply_sale(
        &self,
        user_id: &str,
        action: SaleAction,
    ) -> anyhow::Result<Option<SaleOutcome>> {
        let Some(_guard) = SaleGuard::acquire(&self.busy) else {
            debug!(user_id, ?action, "sale already in flight; ignoring");
            return Ok(None);
        };

        let reward = compute_reward(&self.config, action);
        let pizzas = action.pizzas(&self.config);

        let (totals, levels_gained, authoritative) =
            match self.service.finish_game(user_id, reward).await {
                Ok(finished) => {
                    if let Err(e) = self.store.write_totals(finished.totals).await {
                        warn!(?e, user_id, "failed to mirror backend totals locally");
                    }
                    (finished.totals, finished.levels_gained, true)
                }
                Err(source) => {
                    warn!(%source, user_id, "backend unavailable; applying sale locally");
                    let (totals, levels_gained) = self.apply_locally(reward).await?;
                    (totals, levels_gained, false)
                }
            };

        // The reward is already credited at this point.
        let pizzas_sold = match self.store.increment(ProgressField::PizzasSold, pizzas).await {
            Ok(total) => Some(total),
            Err(e) => {
                warn!(?e, user_id, pizzas, "failed to record pizzas sold locally");
                None
            }
        };

        info!(
            user_id,
            ?action,
            coins = reward.coins,
            xp = reward.xp,
            balance = totals.balance,
            level = totals.level,
            levels_gained,
            ?pizzas_sold,
            authoritative,
            "sale applied"
        );

        Ok(Some(SaleOutcome {
            action,
            reward,
            pizzas,
            balance: totals.balance,
            xp: totals.xp,
            level: totals.level,
            levels_gained,
            pizzas_sold,
            authoritative,
        }))
    }

    async fn apply_locally(&self, reward: Reward) -> anyhow::Result<(ProgressTotals, u64)> {
        let current = self.store.read_totals().await?;
        let resolved = resolve_level_up(
            current.xp,
            current.level,
            reward.xp,
            self.config.xp_per_level,
        );

        let totals = ProgressTotals {
            balance: current.balance.saturating_add(reward.coins),
            xp: resolved.new_xp,
            level: resolved.new_level,
        };
        self.store.write_totals(totals).await?;

        Ok((totals, resolved.levels_gained))
    }
}
