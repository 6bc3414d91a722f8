use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::Semaphore;
use tycoon_api::{
    AuthoritativeService, CreateUserRequest, FinishedGame, PlayerRecord, ServiceError,
    ServiceResult,
};
use tycoon_core::model::{DEFAULT_BALANCE, DEFAULT_LEVEL, DEFAULT_XP};
use tycoon_core::{GameConfig, Reward, resolve_level_up};

/// In-process backend double with an online switch and an optional gate
/// that holds `finish_game` until permits are added.
pub(crate) struct StubService {
    online: AtomicBool,
    config: GameConfig,
    players: Mutex<HashMap<String, PlayerRecord>>,
    pub(crate) create_calls: AtomicUsize,
    pub(crate) finish_calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl StubService {
    pub(crate) fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
            config: GameConfig::default(),
            players: Mutex::new(HashMap::new()),
            create_calls: AtomicUsize::new(0),
            finish_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub(crate) fn offline() -> Self {
        let service = Self::online();
        service.set_online(false);
        service
    }

    pub(crate) fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::online()
        }
    }

    pub(crate) fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub(crate) fn seed(&self, record: PlayerRecord) {
        self.players
            .lock()
            .unwrap()
            .insert(record.user_id.clone(), record);
    }

    pub(crate) fn player(&self, user_id: &str) -> Option<PlayerRecord> {
        self.players.lock().unwrap().get(user_id).cloned()
    }

    pub(crate) fn player_count(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    fn check_online(&self) -> ServiceResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: 503,
                message: None,
            })
        }
    }
}

pub(crate) fn record(user_id: &str, balance: u64, xp: u64, level: u64) -> PlayerRecord {
    PlayerRecord {
        user_id: user_id.to_owned(),
        username: Some("chef".to_owned()),
        email: None,
        balance,
        xp,
        level,
        created_at: None,
    }
}

impl AuthoritativeService for StubService {
    async fn health(&self) -> ServiceResult<()> {
        self.check_online()
    }

    async fn create_or_get_user(&self, request: &CreateUserRequest) -> ServiceResult<PlayerRecord> {
        self.check_online()?;
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        let mut players = self.players.lock().unwrap();
        let record = players
            .entry(request.id.clone())
            .or_insert_with(|| PlayerRecord {
                user_id: request.id.clone(),
                username: request.username.clone(),
                email: request.email.clone(),
                balance: DEFAULT_BALANCE,
                xp: DEFAULT_XP,
                level: DEFAULT_LEVEL,
                created_at: None,
            });
        Ok(record.clone())
    }

    async fn finish_game(&self, user_id: &str, reward: Reward) -> ServiceResult<FinishedGame> {
        if let Some(gate) = &self.gate {
            let _permit = gate.acquire().await.unwrap();
        }
        self.check_online()?;
        self.finish_calls.fetch_add(1, Ordering::SeqCst);

        let mut players = self.players.lock().unwrap();
        let Some(player) = players.get_mut(user_id) else {
            return Err(ServiceError::Status {
                status: 404,
                message: Some("user not found".to_owned()),
            });
        };

        let resolved =
            resolve_level_up(player.xp, player.level, reward.xp, self.config.xp_per_level);
        player.balance += reward.coins;
        player.xp = resolved.new_xp;
        player.level = resolved.new_level;

        Ok(FinishedGame {
            totals: player.totals(),
            levels_gained: resolved.levels_gained,
        })
    }

    async fn get_user(&self, user_id: &str) -> ServiceResult<PlayerRecord> {
        self.check_online()?;
        self.player(user_id).ok_or(ServiceError::Status {
            status: 404,
            message: None,
        })
    }
}
