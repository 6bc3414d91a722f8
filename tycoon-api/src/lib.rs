pub mod client;
pub mod error;
pub mod service;
pub mod wire;

pub use client::HttpAuthoritativeService;
pub use error::{ServiceError, ServiceResult};
pub use service::AuthoritativeService;
pub use wire::{ApiResponse, CreateUserRequest, FinishGameRequest, FinishedGame, PlayerRecord};
