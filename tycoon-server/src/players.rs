use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::warn;
use tycoon_api::{CreateUserRequest, PlayerRecord};
use tycoon_core::model::{DEFAULT_BALANCE, DEFAULT_LEVEL, DEFAULT_XP};
use tycoon_core::time::now_unix_secs;
use tycoon_core::{GameConfig, LevelUp, resolve_level_up};

use crate::database::Database;
use crate::queries;

/// Player persistence: Postgres when configured, with an in-memory map used
/// when no database is set or a query fails.
#[derive(Clone, Debug)]
pub struct PlayerRepository {
    db: Option<Database>,
    memory: Arc<Mutex<HashMap<String, PlayerRecord>>>,
    config: GameConfig,
}

impl PlayerRepository {
    pub fn in_memory(config: GameConfig) -> Self {
        Self {
            db: None,
            memory: Arc::default(),
            config,
        }
    }

    pub fn with_database(db: Database, config: GameConfig) -> Self {
        Self {
            db: Some(db),
            memory: Arc::default(),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_database_enabled(&self) -> bool {
        self.db.is_some()
    }

    fn memory(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, PlayerRecord>>> {
        self.memory
            .lock()
            .map_err(|_| anyhow::anyhow!("in-memory player map lock poisoned"))
    }

    pub async fn create_or_get(&self, request: &CreateUserRequest) -> anyhow::Result<PlayerRecord> {
        let created_at = now_unix_secs();

        if let Some(db) = &self.db {
            match queries::create_or_get_player(
                db,
                &request.id,
                request.username.as_deref(),
                request.email.as_deref(),
                created_at,
            )
            .await
            {
                Ok(record) => return Ok(record),
                Err(e) => warn!(?e, user_id = %request.id, "database create failed; using in-memory players"),
            }
        }

        let mut players = self.memory()?;
        let record = players
            .entry(request.id.clone())
            .or_insert_with(|| PlayerRecord {
                user_id: request.id.clone(),
                username: request.username.clone(),
                email: request.email.clone(),
                balance: DEFAULT_BALANCE,
                xp: DEFAULT_XP,
                level: DEFAULT_LEVEL,
                created_at: Some(created_at),
            });
        Ok(record.clone())
    }

    pub async fn get(&self, user_id: &str) -> anyhow::Result<Option<PlayerRecord>> {
        if let Some(db) = &self.db {
            match queries::get_player(db, user_id).await {
                Ok(record) => return Ok(record),
                Err(e) => warn!(?e, user_id, "database read failed; using in-memory players"),
            }
        }

        Ok(self.memory()?.get(user_id).cloned())
    }

    /// Credit a reward and level the player up. `None` when the player is unknown.
    pub async fn credit(
        &self,
        user_id: &str,
        coins: u64,
        xp: u64,
    ) -> anyhow::Result<Option<(PlayerRecord, LevelUp)>> {
        if let Some(db) = &self.db {
            match queries::credit_player(db, user_id, coins, xp, self.config.xp_per_level).await {
                Ok(result) => return Ok(result),
                Err(e) => warn!(?e, user_id, "database update failed; using in-memory players"),
            }
        }

        let mut players = self.memory()?;
        let Some(player) = players.get_mut(user_id) else {
            return Ok(None);
        };

        let resolved = resolve_level_up(player.xp, player.level, xp, self.config.xp_per_level);
        player.balance = player.balance.saturating_add(coins);
        player.xp = resolved.new_xp;
        player.level = resolved.new_level;

        Ok(Some((player.clone(), resolved)))
    }
}

#[cfg(test)]
mod tests {
    use tycoon_api::CreateUserRequest;
    use tycoon_core::GameConfig;

    use super::PlayerRepository;

    fn request(id: &str) -> CreateUserRequest {
        CreateUserRequest {
            id: id.to_owned(),
            username: Some("chef".to_owned()),
            email: None,
        }
    }

    #[tokio::test]
    async fn create_is_idempotent() {
        let players = PlayerRepository::in_memory(GameConfig::default());
        let first = players.create_or_get(&request("u1")).await.unwrap();
        players.credit("u1", 10, 20).await.unwrap();
        let second = players.create_or_get(&request("u1")).await.unwrap();

        assert_eq!(first.balance, 100);
        assert_eq!(second.balance, 110);
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn credit_applies_escalating_levels() {
        let players = PlayerRepository::in_memory(GameConfig::default());
        players.create_or_get(&request("u1")).await.unwrap();

        let (record, resolved) = players.credit("u1", 100, 300).await.unwrap().unwrap();
        assert_eq!(record.balance, 200);
        assert_eq!(record.level, 3);
        assert_eq!(record.xp, 0);
        assert_eq!(resolved.levels_gained, 2);
        assert_eq!(players.get("u1").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn unknown_players_are_reported() {
        let players = PlayerRepository::in_memory(GameConfig::default());
        assert!(players.credit("ghost", 10, 20).await.unwrap().is_none());
        assert!(players.get("ghost").await.unwrap().is_none());
        assert!(!players.is_database_enabled());
    }
}
