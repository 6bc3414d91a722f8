use std::future::Future;

use tycoon_core::Reward;

use crate::error::ServiceResult;
use crate::wire::{CreateUserRequest, FinishedGame, PlayerRecord};

/// The backend that owns the source of truth for player progress.
pub trait AuthoritativeService: Send + Sync {
    fn health(&self) -> impl Future<Output = ServiceResult<()>> + Send;

    /// Return the player's record, creating it with starting totals if new.
    fn create_or_get_user(
        &self,
        request: &CreateUserRequest,
    ) -> impl Future<Output = ServiceResult<PlayerRecord>> + Send;

    /// Credit a reward; the service applies its own leveling rule.
    fn finish_game(
        &self,
        user_id: &str,
        reward: Reward,
    ) -> impl Future<Output = ServiceResult<FinishedGame>> + Send;

    fn get_user(&self, user_id: &str) -> impl Future<Output = ServiceResult<PlayerRecord>> + Send;
}
