//! XML content: extra task, room and decoration definitions from `assets/base` and enabled mods.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::ai::TaskDef;
use crate::world::{Decoration, RoomTemplate};
use crate::AppPaths;

mod discovery;
mod error;
mod parser;

pub use discovery::{discover_mod_sources, DiscoveryError, ModSource, BASE_MOD_ID};
pub use error::{ContentError, ContentErrorCode, SourceLocation};

use parser::{parse_defs_document, ParsedDef};

/// Everything content files contributed, in load order.
#[derive(Debug, Clone, Default)]
pub struct ContentDatabase {
    /// Unique by id; a later mod's definition replaces an earlier one in place.
    pub tasks: Vec<TaskDef>,
    pub rooms: Vec<RoomTemplate>,
    pub decorations: Vec<PlacedDecoration>,
}

impl ContentDatabase {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.rooms.is_empty() && self.decorations.is_empty()
    }
}

/// A decoration added to a room registered elsewhere, looked up by room name.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedDecoration {
    pub room: String,
    pub decoration: Decoration,
}

pub fn load_content(
    app_paths: &AppPaths,
    enabled_mods: &[String],
) -> Result<ContentDatabase, ContentError> {
    let sources = discover_mod_sources(app_paths, enabled_mods)
        .map_err(|error| map_discovery_error(error, &app_paths.root))?;

    let mut database = ContentDatabase::default();
    for source in sources {
        if source.mod_id == BASE_MOD_ID && !source.source_dir.is_dir() {
            debug!(path = %source.source_dir.display(), "base_content_dir_missing");
            continue;
        }
        let xml_files = collect_xml_files_sorted(&source.source_dir)
            .map_err(|error| read_error(&source.mod_id, error.path, error.source))?;
        let mut seen_in_mod = HashSet::<String>::new();

        for xml_file in xml_files {
            let raw = fs::read_to_string(&xml_file)
                .map_err(|source_err| read_error(&source.mod_id, xml_file.clone(), source_err))?;
            for def in parse_defs_document(&source.mod_id, &xml_file, &raw)? {
                if !seen_in_mod.insert(def.def_key()) {
                    return Err(ContentError {
                        code: ContentErrorCode::DuplicateDefInMod,
                        message: format!(
                            "duplicate {} in mod '{}'; each mod may define it only once",
                            def.def_key(),
                            source.mod_id
                        ),
                        mod_id: source.mod_id.clone(),
                        file_path: xml_file.clone(),
                        location: None,
                    });
                }
                match def {
                    ParsedDef::Task(task) => {
                        match database.tasks.iter_mut().find(|existing| existing.id == task.id) {
                            Some(existing) => *existing = task,
                            None => database.tasks.push(task),
                        }
                    }
                    ParsedDef::Room(room) => database.rooms.push(room),
                    ParsedDef::Decoration(placed) => database.decorations.push(placed),
                }
            }
        }
        debug!(mod_id = %source.mod_id, load_index = source.load_index, "content_mod_loaded");
    }

    info!(
        tasks = database.tasks.len(),
        rooms = database.rooms.len(),
        decorations = database.decorations.len(),
        "content_loaded"
    );
    Ok(database)
}

struct ReadError {
    path: PathBuf,
    source: std::io::Error,
}

fn collect_xml_files_sorted(root: &Path) -> Result<Vec<PathBuf>, ReadError> {
    let mut files = Vec::<PathBuf>::new();
    collect_recursive(root, &mut files)?;
    files.sort_by_key(|path| normalize_rel_path(path.strip_prefix(root).unwrap_or(path)));
    Ok(files)
}

fn collect_recursive(current: &Path, files: &mut Vec<PathBuf>) -> Result<(), ReadError> {
    let entries = fs::read_dir(current).map_err(|source| ReadError {
        path: current.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ReadError {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            collect_recursive(&path, files)?;
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        {
            files.push(path);
        }
    }
    Ok(())
}

fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn read_error(mod_id: &str, path: PathBuf, source: std::io::Error) -> ContentError {
    ContentError {
        code: ContentErrorCode::ReadFile,
        message: format!("failed to read XML content: {source}"),
        mod_id: mod_id.to_string(),
        file_path: path,
        location: None,
    }
}

fn map_discovery_error(error: DiscoveryError, root: &Path) -> ContentError {
    match error {
        DiscoveryError::EnabledModMissing {
            mod_id,
            expected_dir,
        } => ContentError {
            code: ContentErrorCode::Discovery,
            message: format!(
                "enabled mod '{}' not found at {}; check ARK_ENABLED_MODS",
                mod_id,
                expected_dir.display()
            ),
            mod_id,
            file_path: expected_dir,
            location: None,
        },
        other => ContentError {
            code: ContentErrorCode::Discovery,
            message: other.to_string(),
            mod_id: "<discovery>".to_string(),
            file_path: root.to_path_buf(),
            location: None,
        },
    }
}
