use ark_engine::{load_content, resolve_app_paths, AppError, AppPaths, LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay;
use super::settings::{GameSettings, SETTINGS_FILE_NAME};

const ENABLED_MODS_ENV_VAR: &str = "ARK_ENABLED_MODS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) paths: AppPaths,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Ark World Startup ===");

    let paths = resolve_app_paths()?;
    let settings = load_settings(&paths);
    let enabled_mods =
        parse_enabled_mods_from_env().unwrap_or_else(|| settings.enabled_mods.clone());
    let content = load_content(&paths, &enabled_mods)?;
    info!(
        mods = enabled_mods.len(),
        tasks = content.tasks.len(),
        rooms = content.rooms.len(),
        decorations = content.decorations.len(),
        "content_loaded"
    );

    let config = loop_config_from_settings(&settings);
    let scene = gameplay::build_scene(&settings, content);

    Ok(AppWiring {
        config,
        paths,
        scene,
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

fn load_settings(paths: &AppPaths) -> GameSettings {
    let path = paths.root.join(SETTINGS_FILE_NAME);
    match GameSettings::load(&path) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(error = %err, "settings_invalid_using_defaults");
            GameSettings::default()
        }
    }
}

fn loop_config_from_settings(settings: &GameSettings) -> LoopConfig {
    LoopConfig {
        window_title: settings.window_title.clone(),
        window_width: settings.window_width,
        window_height: settings.window_height,
        target_tps: settings.target_tps,
        max_render_fps: settings.max_render_fps,
        overlay_visible: settings.show_debug_overlay,
        ..LoopConfig::default()
    }
}

/// `None` when the variable is unset, so the settings file list applies.
fn parse_enabled_mods_from_env() -> Option<Vec<String>> {
    std::env::var(ENABLED_MODS_ENV_VAR)
        .ok()
        .map(|raw| parse_mod_list(&raw))
}

fn parse_mod_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}
