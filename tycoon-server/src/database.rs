use sqlx::{PgPool, migrate::Migrator};

/// Compile-time discovered SQLx migrations for the `tycoon-server` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Shared database handle.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Expose the underlying pool for query modules.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
