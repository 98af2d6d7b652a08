use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const SETTINGS_FILE_NAME: &str = "settings.json";

/// Optional `settings.json` at the project root. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameSettings {
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) target_tps: u32,
    pub(crate) max_render_fps: Option<u32>,
    pub(crate) show_debug_overlay: bool,
    pub(crate) npc_ai_enabled: bool,
    /// Fixed NPC RNG seed; `None` seeds from entropy.
    pub(crate) rng_seed: Option<u64>,
    pub(crate) enabled_mods: Vec<String>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            window_title: "Ark World".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_render_fps: None,
            show_debug_overlay: false,
            npc_ai_enabled: true,
            rng_seed: None,
            enabled_mods: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings file {path} at {field_path}: {source}")]
    Parse {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid settings file {path}: {field} must be greater than zero")]
    ZeroValue { path: PathBuf, field: &'static str },
}

impl GameSettings {
    /// Reads `path`; a missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings = Self::parse(path, &raw)?;
        settings.validate(path)?;
        Ok(settings)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, SettingsError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let field_path = match error.path().to_string() {
                path if path.is_empty() || path == "." => "<root>".to_string(),
                path => path,
            };
            SettingsError::Parse {
                path: path.to_path_buf(),
                field_path,
                source: error.into_inner(),
            }
        })
    }

    fn validate(&self, path: &Path) -> Result<(), SettingsError> {
        let zero_field = [
            ("window_width", self.window_width),
            ("window_height", self.window_height),
            ("target_tps", self.target_tps),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        match zero_field {
            Some((field, _)) => Err(SettingsError::ZeroValue {
                path: path.to_path_buf(),
                field,
            }),
            None => Ok(()),
        }
    }
}
