use engine::{LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, GameplayConfig, RosterError};

const TARGET_TPS_ENV_VAR: &str = "SALT_TARGET_TPS";
const RENDER_FPS_CAP_ENV_VAR: &str = "SALT_RENDER_FPS_CAP";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, RosterError> {
    init_tracing();
    info!("=== Silent Salt Startup ===");

    let scene = gameplay::build_scene(GameplayConfig::default())?;
    let config = apply_env_overrides(LoopConfig::default(), |name| std::env::var(name).ok());

    Ok(AppWiring { config, scene })
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

/// `SALT_TARGET_TPS` must be a positive integer. `SALT_RENDER_FPS_CAP` is a
/// non-negative integer where 0 turns the cap off.
fn apply_env_overrides(
    mut config: LoopConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> LoopConfig {
    if let Some(tps) = parse_env_u32(TARGET_TPS_ENV_VAR, &lookup) {
        if tps == 0 {
            warn!(env_var = TARGET_TPS_ENV_VAR, "ignoring zero tick rate");
        } else {
            config.target_tps = tps;
        }
    }
    if let Some(cap) = parse_env_u32(RENDER_FPS_CAP_ENV_VAR, &lookup) {
        config.max_render_fps = (cap > 0).then_some(cap);
    }
    config
}

fn parse_env_u32(name: &'static str, lookup: &impl Fn(&str) -> Option<String>) -> Option<u32> {
    let raw = lookup(name)?;
    match raw.trim().parse::<u32>() {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(
                env_var = name,
                value = raw.as_str(),
                error = %error,
                "invalid env var value; keeping default"
            );
            None
        }
    }
}
