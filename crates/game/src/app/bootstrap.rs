use engine::LoopConfig;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};
use super::gameplay::{Session, SpawnError};
use super::pilot::DemoPilot;

#[derive(Debug, Error)]
pub(crate) enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build the world: {0}")]
    Spawn(#[from] SpawnError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: Session,
    pub(crate) pilot: DemoPilot,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Dropzone Startup ===");

    let game_config = GameConfig::load_from_env()?;
    info!(
        bots = game_config.bot_count,
        houses = game_config.house_count,
        trees = game_config.tree_count,
        seed = ?game_config.seed,
        ticks_per_second = game_config.ticks_per_second,
        realtime = game_config.realtime,
        "game_config"
    );
    let session = Session::new(&game_config.session_settings())?;

    Ok(AppWiring {
        config: game_config.loop_config(),
        session,
        pilot: DemoPilot::default(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
