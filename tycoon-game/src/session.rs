use std::sync::Arc;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tycoon_api::AuthoritativeService;
use tycoon_core::leveling::XpProgress;
use tycoon_core::{ExternalIdentity, GameConfig, PlayerProfile, ProgressSource, SaleAction, UserProgress, time};
use tycoon_store::LocalProgressStore;

use crate::profile::resolve_user;
use crate::reconciler::{ProgressReconciler, SaleOutcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Kitchen,
    Shop,
    Profile,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::Kitchen, Self::Shop, Self::Profile];

    pub fn name(self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Shop => "shop",
            Self::Profile => "profile",
        }
    }

    /// Accepts a tab name or its 1-based position.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "kitchen" | "1" => Some(Self::Kitchen),
            "shop" | "2" => Some(Self::Shop),
            "profile" | "3" => Some(Self::Profile),
            _ => None,
        }
    }
}

/// Everything the front end needs for one signed-in player.
///
/// Owned by the caller and passed into every operation; nothing here is
/// process-global.
#[derive(Debug)]
pub struct GameSession<S> {
    service: Arc<S>,
    store: LocalProgressStore,
    reconciler: ProgressReconciler<S>,
    profile: Option<PlayerProfile>,
    tab: Tab,
    offline: bool,
}

impl<S> GameSession<S>
where
    S: AuthoritativeService,
{
    pub fn new(service: Arc<S>, store: LocalProgressStore, config: GameConfig) -> Self {
        let reconciler = ProgressReconciler::new(service.clone(), store.clone(), config);
        Self {
            service,
            store,
            reconciler,
            profile: None,
            tab: Tab::default(),
            offline: false,
        }
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn config(&self) -> &GameConfig {
        self.reconciler.config()
    }

    pub fn xp_progress(&self) -> Option<XpProgress> {
        self.profile.as_ref().map(|profile| {
            XpProgress::new(
                profile.progress.xp,
                profile.progress.level,
                self.config().xp_per_level,
            )
        })
    }

    /// Probe the backend and set offline mode accordingly.
    pub async fn check_backend(&mut self) -> bool {
        match self.service.health().await {
            Ok(()) => {
                info!("backend reachable");
                self.offline = false;
                true
            }
            Err(err) => {
                warn!(%err, "backend unavailable; running in offline mode");
                self.offline = true;
                false
            }
        }
    }

    pub async fn sign_in(&mut self, identity: &ExternalIdentity) -> anyhow::Result<PlayerProfile> {
        self.sign_in_on(identity, time::today()).await
    }

    /// Sign in, counting `today` (a unix day number) as a day played.
    pub async fn sign_in_on(
        &mut self,
        identity: &ExternalIdentity,
        today: u64,
    ) -> anyhow::Result<PlayerProfile> {
        identity.validate()?;
        self.store.record_play_day(today).await?;

        let profile = resolve_user(self.service.as_ref(), &self.store, identity).await?;
        self.offline = !profile.progress.source.is_authoritative();

        if let Err(e) = self.store.save_profile(&profile).await {
            warn!(?e, user_id = %identity.id, "failed to cache signed-in profile");
        }

        self.tab = Tab::default();
        self.profile = Some(profile.clone());
        Ok(profile)
    }

    /// Resume the player cached by a previous sign-in, if any.
    pub async fn restore(&mut self) -> anyhow::Result<Option<PlayerProfile>> {
        let Some(cached) = self.store.load_profile().await? else {
            return Ok(None);
        };

        info!(user_id = %cached.identity.id, "restoring cached session");
        self.sign_in(&cached.identity).await.map(Some)
    }

    /// Forget the signed-in player. Local progress fields are left intact.
    pub async fn sign_out(&mut self) -> anyhow::Result<()> {
        if let Some(profile) = self.profile.take() {
            info!(user_id = %profile.identity.id, "player signed out");
        }
        self.tab = Tab::default();
        self.store.clear_profile().await
    }

    /// Sell for the signed-in player; `Ok(None)` when a sale is already pending.
    pub async fn sell(&mut self, action: SaleAction) -> anyhow::Result<Option<SaleOutcome>> {
        let Some(user_id) = self.profile.as_ref().map(|profile| profile.identity.id.clone())
        else {
            bail!("no player is signed in");
        };

        let Some(outcome) = self.reconciler.apply_sale(&user_id, action).await? else {
            return Ok(None);
        };

        self.offline = !outcome.authoritative;
        if let Some(profile) = self.profile.as_mut() {
            profile.progress.apply_totals(
                outcome.totals(),
                ProgressSource::from_authoritative(outcome.authoritative),
            );
            profile.progress.pizzas_sold = outcome
                .pizzas_sold
                .unwrap_or_else(|| profile.progress.pizzas_sold.saturating_add(outcome.pizzas));
        }
        self.cache_profile().await;

        Ok(Some(outcome))
    }

    /// Reload totals from the backend, keeping local ones when it is away.
    pub async fn refresh(&mut self) -> anyhow::Result<UserProgress> {
        let Some(user_id) = self.profile.as_ref().map(|profile| profile.identity.id.clone())
        else {
            bail!("no player is signed in");
        };

        let (totals, source) = match self.service.get_user(&user_id).await {
            Ok(record) => {
                let totals = record.totals();
                if let Err(e) = self.store.write_totals(totals).await {
                    warn!(?e, user_id = %user_id, "failed to mirror backend totals locally");
                }
                (totals, ProgressSource::Authoritative)
            }
            Err(err) => {
                warn!(%err, user_id = %user_id, "backend unavailable; keeping local progress");
                (self.store.read_totals().await?, ProgressSource::Provisional)
            }
        };

        self.offline = !source.is_authoritative();
        let Some(profile) = self.profile.as_mut() else {
            bail!("no player is signed in");
        };
        profile.progress.apply_totals(totals, source);
        let progress = profile.progress.clone();
        self.cache_profile().await;

        Ok(progress)
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    async fn cache_profile(&self) {
        let Some(profile) = self.profile.as_ref() else {
            return;
        };
        if let Err(e) = self.store.save_profile(profile).await {
            warn!(?e, user_id = %profile.identity.id, "failed to cache profile");
        }
    }
}
