use engine::{LoopConfig, Scene, SpriteKeyError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{ConfigError, GameConfig};
use super::gameplay::{self, LevelError, QuestScene, SessionSettings};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid level catalog: {0}")]
    Level(#[from] LevelError),
    #[error("invalid sprite atlas: {0}")]
    Sprites(#[from] SpriteKeyError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Reads configuration, builds and validates the catalog, then wires the
/// quest scene. Nothing opens a window until this succeeds.
pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Tile Quest Startup ===");
    let game_config = GameConfig::from_env()?;

    let mut rng = match game_config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let catalog = gameplay::build_catalog(&mut rng);
    gameplay::validate_catalog(&catalog)?;
    game_config.check_start_level(catalog.len())?;

    let mut sprites = gameplay::build_sprite_atlas()?;
    if let Some(dir) = game_config.sprites_dir.as_deref() {
        let replaced = sprites.apply_overrides(dir);
        info!(dir = %dir.display(), replaced, "sprite_overrides_applied");
    }

    info!(
        levels = catalog.len(),
        seed = ?game_config.seed,
        start_level = game_config.start_level + 1,
        god_mode = game_config.god_mode,
        "catalog_ready"
    );

    let settings = SessionSettings {
        start_level: game_config.start_level,
        god_mode: game_config.god_mode,
    };
    let scene = QuestScene::new(catalog, sprites, settings, rng);
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(scene),
    })
}
