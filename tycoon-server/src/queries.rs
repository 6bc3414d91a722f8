use anyhow::Context as _;
use tycoon_api::PlayerRecord;
use tycoon_core::model::{DEFAULT_BALANCE, DEFAULT_LEVEL, DEFAULT_XP};
use tycoon_core::{LevelUp, resolve_level_up};

use crate::database::Database;

#[derive(sqlx::FromRow)]
struct PlayerRow {
    user_id: String,
    username: Option<String>,
    email: Option<String>,
    balance: i64,
    xp: i64,
    level: i64,
    created_at: i64,
}

impl PlayerRow {
    fn into_record(self) -> anyhow::Result<PlayerRecord> {
        Ok(PlayerRecord {
            balance: u64::try_from(self.balance).context("balance row out of u64 range")?,
            xp: u64::try_from(self.xp).context("xp row out of u64 range")?,
            level: u64::try_from(self.level).context("level row out of u64 range")?,
            created_at: Some(
                u64::try_from(self.created_at).context("created_at row out of u64 range")?,
            ),
            user_id: self.user_id,
            username: self.username,
            email: self.email,
        })
    }
}

const SELECT_PLAYER: &str = "SELECT user_id, username, email, balance, xp, level, created_at
     FROM players
     WHERE user_id = $1";

pub async fn get_player(db: &Database, user_id: &str) -> anyhow::Result<Option<PlayerRecord>> {
    let row: Option<PlayerRow> = sqlx::query_as(SELECT_PLAYER)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;

    row.map(PlayerRow::into_record).transpose()
}

/// Insert the player with starting totals unless it already exists, then
/// return the stored row.
pub async fn create_or_get_player(
    db: &Database,
    user_id: &str,
    username: Option<&str>,
    email: Option<&str>,
    created_at: u64,
) -> anyhow::Result<PlayerRecord> {
    let created_at_i64 = i64::try_from(created_at).context("created_at out of i64 range")?;
    let balance_i64 = i64::try_from(DEFAULT_BALANCE).context("balance out of i64 range")?;
    let xp_i64 = i64::try_from(DEFAULT_XP).context("xp out of i64 range")?;
    let level_i64 = i64::try_from(DEFAULT_LEVEL).context("level out of i64 range")?;

    sqlx::query(
        "INSERT INTO players (user_id, username, email, balance, xp, level, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(username)
    .bind(email)
    .bind(balance_i64)
    .bind(xp_i64)
    .bind(level_i64)
    .bind(created_at_i64)
    .execute(db.pool())
    .await?;

    get_player(db, user_id)
        .await?
        .with_context(|| format!("player `{user_id}` missing after insert"))
}

/// Credit coins and xp inside a row lock. Returns `None` for unknown players.
pub async fn credit_player(
    db: &Database,
    user_id: &str,
    coins: u64,
    xp: u64,
    xp_per_level: u64,
) -> anyhow::Result<Option<(PlayerRecord, LevelUp)>> {
    let mut tx = db.pool().begin().await?;

    let row: Option<PlayerRow> = sqlx::query_as(
        "SELECT user_id, username, email, balance, xp, level, created_at
         FROM players
         WHERE user_id = $1
         FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let current = row.into_record()?;

    let resolved = resolve_level_up(current.xp, current.level, xp, xp_per_level);
    let balance = current.balance.saturating_add(coins);

    let balance_i64 = i64::try_from(balance).context("balance out of i64 range")?;
    let xp_i64 = i64::try_from(resolved.new_xp).context("xp out of i64 range")?;
    let level_i64 = i64::try_from(resolved.new_level).context("level out of i64 range")?;

    sqlx::query("UPDATE players SET balance = $2, xp = $3, level = $4 WHERE user_id = $1")
        .bind(user_id)
        .bind(balance_i64)
        .bind(xp_i64)
        .bind(level_i64)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some((
        PlayerRecord {
            balance,
            xp: resolved.new_xp,
            level: resolved.new_level,
            ..current
        },
        resolved,
    )))
}
