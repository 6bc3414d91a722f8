pub mod database;
pub mod error;
pub mod players;
pub mod queries;
pub mod routes;

pub use database::{Database, MIGRATOR};
pub use players::PlayerRepository;
pub use routes::router;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub players: PlayerRepository,
}

impl AppState {
    pub fn new(players: PlayerRepository) -> Self {
        Self { players }
    }
}
