use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::AppPaths;

pub const BASE_MOD_ID: &str = "base";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("enabled mod list contains an empty entry")]
    EmptyEnabledMod,
    #[error("mod '{mod_id}' is enabled more than once")]
    DuplicateEnabledMod { mod_id: String },
    #[error("enabled mod '{mod_id}' not found at {}", expected_dir.display())]
    EnabledModMissing { mod_id: String, expected_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModSource {
    pub mod_id: String,
    pub load_index: u32,
    pub source_dir: PathBuf,
}

/// Base content first, then enabled mods in the order given.
pub fn discover_mod_sources(
    app_paths: &AppPaths,
    enabled_mods: &[String],
) -> Result<Vec<ModSource>, DiscoveryError> {
    let mut seen = HashSet::<String>::new();
    let mut sources = vec![ModSource {
        mod_id: BASE_MOD_ID.to_string(),
        load_index: 0,
        source_dir: app_paths.base_content_dir.clone(),
    }];

    for (idx, mod_id) in enabled_mods.iter().enumerate() {
        let trimmed = mod_id.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryError::EmptyEnabledMod);
        }
        if trimmed == BASE_MOD_ID || !seen.insert(trimmed.to_string()) {
            return Err(DiscoveryError::DuplicateEnabledMod {
                mod_id: trimmed.to_string(),
            });
        }
        let mod_dir = app_paths.mods_dir.join(trimmed);
        ensure_dir_exists(trimmed, &mod_dir)?;
        sources.push(ModSource {
            mod_id: trimmed.to_string(),
            load_index: (idx + 1) as u32,
            source_dir: mod_dir,
        });
    }

    Ok(sources)
}

fn ensure_dir_exists(mod_id: &str, path: &Path) -> Result<(), DiscoveryError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(DiscoveryError::EnabledModMissing {
            mod_id: mod_id.to_string(),
            expected_dir: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn app_paths(root: &Path) -> AppPaths {
        AppPaths {
            root: root.to_path_buf(),
            base_content_dir: root.join("assets").join("base"),
            mods_dir: root.join("mods"),
            asset_dir: root.join("assets"),
        }
    }

    #[test]
    fn base_is_first_then_enabled_order() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("mods").join("b")).expect("create mod b");
        fs::create_dir_all(root.join("mods").join("a")).expect("create mod a");

        let sources = discover_mod_sources(&app_paths(root), &["b".to_string(), " a ".to_string()])
            .expect("discover");
        let ids: Vec<_> = sources.iter().map(|source| source.mod_id.as_str()).collect();
        assert_eq!(ids, vec!["base", "b", "a"]);
        assert_eq!(sources[2].load_index, 2);
    }

    #[test]
    fn missing_and_duplicate_mods_are_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("mods").join("a")).expect("create mod a");
        let paths = app_paths(root);

        assert!(matches!(
            discover_mod_sources(&paths, &["ghost".to_string()]),
            Err(DiscoveryError::EnabledModMissing { .. })
        ));
        assert!(matches!(
            discover_mod_sources(&paths, &["a".to_string(), "a".to_string()]),
            Err(DiscoveryError::DuplicateEnabledMod { .. })
        ));
        assert_eq!(
            discover_mod_sources(&paths, &[" ".to_string()]),
            Err(DiscoveryError::EmptyEnabledMod)
        );
    }
}
