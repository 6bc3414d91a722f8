mod input;
mod render;

use std::env;
use std::sync::Arc;

use rustls::crypto::ring::default_provider;
use tokio::io::{AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use tycoon_api::HttpAuthoritativeService;
use tycoon_core::GameConfig;
use tycoon_core::config::{env_bool, env_string};
use tycoon_game::{GameSession, parse_command};
use tycoon_store::{DEFAULT_KEY_PREFIX, DEFAULT_STORE_PATH, LocalProgressStore};

use input::{Input, read_input};
use render::{format_progress, render_reply};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|metadata| {
            let target = metadata.target();

            let within_info_level = *metadata.level() <= tracing::Level::INFO;
            if !within_info_level {
                return false;
            }

            !(target.starts_with("reqwest") || target.starts_with("hyper"))
        }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    // Load the .env file
    dotenvy::dotenv().ok();

    let config = GameConfig::from_env()?;
    let store = local_store_from_env().await;
    let service = HttpAuthoritativeService::from_env()?;
    info!(api_url = %service.base_url(), "Backend client configured.");

    let mut session = GameSession::new(Arc::new(service), store, config);

    if !session.check_backend().await {
        println!("Backend unavailable: playing offline, progress is saved locally.");
    }

    match session.restore().await {
        Ok(Some(profile)) => println!(
            "Welcome back, {}!\n{}",
            profile.username,
            format_progress(&profile.progress, &config)
        ),
        Ok(None) => println!("Sign in with `signin <id> <email> [display name]`, or type `help`."),
        Err(err) => warn!(?err, "Failed to restore cached session."),
    }

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(prompt(&session).as_bytes()).await?;
        stdout.flush().await?;

        let line = match read_input(&mut stdin).await? {
            Input::Line(line) => line,
            Input::Invalid => {
                println!("Input was not valid UTF-8; try again.");
                continue;
            }
            Input::Eof => break,
        };
        if matches!(line.trim(), "quit" | "exit") {
            break;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        match session.dispatch(command).await {
            Ok(reply) => {
                let text = render_reply(&reply, session.config());
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            Err(err) => {
                error!(?err, "command failed");
                println!("{err}");
            }
        }
    }

    info!("Goodbye.");
    Ok(())
}

fn prompt<S>(session: &GameSession<S>) -> String
where
    S: tycoon_api::AuthoritativeService,
{
    let mode = if session.is_offline() { " offline" } else { "" };
    match session.profile() {
        Some(profile) => format!("[{}@{}{}]> ", profile.username, session.tab().name(), mode),
        None => format!("[guest{}]> ", mode),
    }
}

async fn local_store_from_env() -> LocalProgressStore {
    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let key_prefix = env_string("REDIS_KEY_PREFIX", DEFAULT_KEY_PREFIX);

    if redis_enabled {
        match env::var("REDIS_URL") {
            Ok(redis_url) => match LocalProgressStore::redis(&redis_url, key_prefix.clone()) {
                Ok(store) => {
                    info!(key_prefix = %key_prefix, "Redis progress store enabled.");
                    if let Err(err) = store.ping().await {
                        warn!(?err, "Redis ping failed; progress writes will fail until it recovers.");
                    } else {
                        info!("Redis store health check passed.");
                    }
                    return store;
                }
                Err(err) => {
                    warn!(?err, key_prefix = %key_prefix, "Failed to initialize Redis store; using the local file store.");
                }
            },
            Err(_) => {
                warn!(key_prefix = %key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; using the local file store.");
            }
        }
    }

    let store_path = env_string("LOCAL_STORE_PATH", DEFAULT_STORE_PATH);
    match LocalProgressStore::file(&store_path, key_prefix.clone()).await {
        Ok(store) => {
            info!(path = %store_path, "Local file progress store ready.");
            store
        }
        Err(err) => {
            warn!(?err, path = %store_path, "Failed to open local file store; progress will not survive a restart.");
            LocalProgressStore::memory(key_prefix)
        }
    }
}
