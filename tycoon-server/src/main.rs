use std::env;

use rustls::crypto::ring::default_provider;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tycoon_core::GameConfig;
use tycoon_core::config::{env_bool, env_string};
use tycoon_server::{AppState, Database, MIGRATOR, PlayerRepository, router};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("sqlx::query") || target.starts_with("hyper"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let config = GameConfig::from_env()?;
    let bind_addr = env_string("TYCOON_BIND_ADDR", DEFAULT_BIND_ADDR);

    let players = match env::var("DATABASE_URL") {
        Ok(database_url) if !database_url.trim().is_empty() => {
            match PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await
            {
                Ok(pool) => {
                    info!("PostgreSQL connection established.");
                    let db = Database::new(pool);

                    if env_bool("AUTO_RUN_MIGRATIONS", true) {
                        MIGRATOR.run(db.pool()).await?;
                        info!("Database migrations applied.");
                    } else {
                        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
                    }

                    PlayerRepository::with_database(db, config)
                }
                Err(err) => {
                    warn!(?err, "Failed to connect to PostgreSQL; continuing with in-memory players.");
                    PlayerRepository::in_memory(config)
                }
            }
        }
        _ => {
            info!("DATABASE_URL not set; players are kept in memory.");
            PlayerRepository::in_memory(config)
        }
    };

    info!(
        xp_per_level = config.xp_per_level,
        database = players.is_database_enabled(),
        "Player repository ready."
    );

    let app = router(AppState::new(players));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "Pizza Tycoon backend listening.");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await?;

    Ok(())
}
