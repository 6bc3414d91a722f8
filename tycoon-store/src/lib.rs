mod file_store;
mod memory_store;
mod redis_store;

use std::path::PathBuf;

use tracing::warn;
use tycoon_core::model::{
    DEFAULT_BALANCE, DEFAULT_DAYS_PLAYED, DEFAULT_LEVEL, DEFAULT_PIZZAS_SOLD, DEFAULT_XP,
};
use tycoon_core::{PlayerProfile, ProgressTotals};

use file_store::FileStore;
use memory_store::MemoryStore;
use redis_store::RedisStore;

pub const DEFAULT_KEY_PREFIX: &str = "pizza:local";
pub const DEFAULT_STORE_PATH: &str = ".tycoon/progress.json";

const PROFILE_KEY: &str = "profile";
const LAST_PLAYED_DAY_KEY: &str = "last_played_day";

/// The numeric fields kept in the local store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressField {
    Balance,
    Xp,
    Level,
    PizzasSold,
    DaysPlayed,
}

impl ProgressField {
    pub const ALL: [Self; 5] = [
        Self::Balance,
        Self::Xp,
        Self::Level,
        Self::PizzasSold,
        Self::DaysPlayed,
    ];

    pub fn key_suffix(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Xp => "xp",
            Self::Level => "level",
            Self::PizzasSold => "pizzas_sold",
            Self::DaysPlayed => "days_played",
        }
    }

    /// Value reported when the key has never been written.
    pub fn fallback(self) -> u64 {
        match self {
            Self::Balance => DEFAULT_BALANCE,
            Self::Xp => DEFAULT_XP,
            Self::Level => DEFAULT_LEVEL,
            Self::PizzasSold => DEFAULT_PIZZAS_SOLD,
            Self::DaysPlayed => DEFAULT_DAYS_PLAYED,
        }
    }
}

#[derive(Clone, Debug)]
enum StoreBackend {
    Memory(MemoryStore),
    File(FileStore),
    Redis(RedisStore),
}

/// Local progress persistence used when the backend cannot be reached.
///
/// Values are stored as decimal strings under `<prefix>:<field>`.
#[derive(Clone, Debug)]
pub struct LocalProgressStore {
    key_prefix: String,
    backend: StoreBackend,
}

impl LocalProgressStore {
    pub fn memory(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: StoreBackend::Memory(MemoryStore::default()),
        }
    }

    /// Durable store backed by a JSON file; created on first write.
    pub async fn file(path: impl Into<PathBuf>, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: StoreBackend::File(FileStore::open(path).await?),
        })
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: StoreBackend::Redis(RedisStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, StoreBackend::Redis(_))
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            StoreBackend::Memory(_) | StoreBackend::File(_) => Ok(()),
            StoreBackend::Redis(store) => store.ping().await,
        }
    }

    async fn get_raw(&self, key: &str) -> anyhow::Result<Option<String>> {
        match &self.backend {
            StoreBackend::Memory(store) => store.get(key).await,
            StoreBackend::File(store) => store.get(key).await,
            StoreBackend::Redis(store) => store.get(key).await,
        }
    }

    async fn set_raw(&self, key: &str, value: String) -> anyhow::Result<()> {
        match &self.backend {
            StoreBackend::Memory(store) => store.set(key, value).await,
            StoreBackend::File(store) => store.set(key, value).await,
            StoreBackend::Redis(store) => store.set(key, value).await,
        }
    }

    async fn del_raw(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            StoreBackend::Memory(store) => store.del(key).await,
            StoreBackend::File(store) => store.del(key).await,
            StoreBackend::Redis(store) => store.del(key).await,
        }
    }

    async fn get_number(&self, key: &str) -> anyhow::Result<Option<u64>> {
        let Some(raw) = self.get_raw(key).await? else {
            return Ok(None);
        };

        match raw.trim().parse::<u64>() {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(?e, store_key = key, raw = %raw, "ignoring corrupt local value");
                Ok(None)
            }
        }
    }

    /// Read a field, returning its fallback when absent or unreadable.
    pub async fn get(&self, field: ProgressField) -> anyhow::Result<u64> {
        let key = self.key(field.key_suffix());
        Ok(self.get_number(&key).await?.unwrap_or(field.fallback()))
    }

    pub async fn set(&self, field: ProgressField, value: u64) -> anyhow::Result<()> {
        let key = self.key(field.key_suffix());
        self.set_raw(&key, value.to_string()).await
    }

    /// Add `amount` to a field and return the stored result.
    pub async fn increment(&self, field: ProgressField, amount: u64) -> anyhow::Result<u64> {
        let next = self.get(field).await?.saturating_add(amount);
        self.set(field, next).await?;
        Ok(next)
    }

    pub async fn read_totals(&self) -> anyhow::Result<ProgressTotals> {
        Ok(ProgressTotals {
            balance: self.get(ProgressField::Balance).await?,
            xp: self.get(ProgressField::Xp).await?,
            level: self.get(ProgressField::Level).await?,
        })
    }

    pub async fn write_totals(&self, totals: ProgressTotals) -> anyhow::Result<()> {
        self.set(ProgressField::Balance, totals.balance).await?;
        self.set(ProgressField::Xp, totals.xp).await?;
        self.set(ProgressField::Level, totals.level).await
    }

    /// Count a visit on `today` (a unix day number) and return days played.
    ///
    /// The first recorded visit keeps the fallback count; later visits add one
    /// only when the day has advanced.
    pub async fn record_play_day(&self, today: u64) -> anyhow::Result<u64> {
        let last_key = self.key(LAST_PLAYED_DAY_KEY);
        let last_day = self.get_number(&last_key).await?;
        let days_played = self.get(ProgressField::DaysPlayed).await?;

        let days_played = match last_day {
            Some(last) if today > last => days_played.saturating_add(1),
            _ => days_played,
        };

        self.set(ProgressField::DaysPlayed, days_played).await?;
        if last_day.is_none_or(|last| today > last) {
            self.set_raw(&last_key, today.to_string()).await?;
        }

        Ok(days_played)
    }

    pub async fn save_profile(&self, profile: &PlayerProfile) -> anyhow::Result<()> {
        let key = self.key(PROFILE_KEY);
        let payload = serde_json::to_string(profile)
            .map_err(|e| anyhow::anyhow!("failed to serialize profile for `{key}`: {e}"))?;
        self.set_raw(&key, payload).await
    }

    pub async fn load_profile(&self) -> anyhow::Result<Option<PlayerProfile>> {
        let key = self.key(PROFILE_KEY);
        match self.get_raw(&key).await? {
            Some(payload) => {
                let parsed = serde_json::from_str(&payload).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize profile for `{key}`: {e}")
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Drop the cached signed-in profile. Progress fields are kept.
    pub async fn clear_profile(&self) -> anyhow::Result<()> {
        let key = self.key(PROFILE_KEY);
        self.del_raw(&key).await
    }
}
