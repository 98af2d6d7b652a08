use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start with '/'")]
    LeadingSlash,
    #[error("asset key must not contain '\\\\'")]
    Backslash,
    #[error("asset key must not contain '..'")]
    ParentTraversal,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Logical image name such as `tiles/grass_middle`; the host maps it to `assets/<key>.png`.
///
/// Construction does not validate. Keys coming from content files are checked with
/// [`AssetKey::validate`] at parse time, and the host re-checks before touching the disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetKey(String);

impl AssetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> Result<(), AssetKeyError> {
        let key = self.0.as_str();
        if key.is_empty() {
            return Err(AssetKeyError::Empty);
        }
        if key.starts_with('/') {
            return Err(AssetKeyError::LeadingSlash);
        }
        if key.contains('\\') {
            return Err(AssetKeyError::Backslash);
        }
        if key.contains("..") {
            return Err(AssetKeyError::ParentTraversal);
        }
        match key
            .chars()
            .find(|&ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
        {
            Some(character) => Err(AssetKeyError::InvalidCharacter { character }),
            None => Ok(()),
        }
    }

    pub fn resolve_png_path(&self, asset_root: &Path) -> Result<PathBuf, AssetKeyError> {
        self.validate()?;
        Ok(asset_root.join(format!("{}.png", self.0)))
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Read-only view of which images are available. `None` means not loaded (yet, or ever).
pub trait AssetCatalog {
    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)>;

    fn is_loaded(&self, key: &AssetKey) -> bool {
        self.image_size(key).is_some()
    }
}

/// In-memory catalog of image dimensions without pixel data.
#[derive(Debug, Clone, Default)]
pub struct ImageSizes {
    sizes: HashMap<AssetKey, (u32, u32)>,
}

impl ImageSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<AssetKey>, width: u32, height: u32) {
        self.sizes.insert(key.into(), (width, height));
    }

    pub fn with(mut self, key: impl Into<AssetKey>, width: u32, height: u32) -> Self {
        self.insert(key, width, height);
        self
    }

    pub fn remove(&mut self, key: &AssetKey) -> Option<(u32, u32)> {
        self.sizes.remove(key)
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl AssetCatalog for ImageSizes {
    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)> {
        self.sizes.get(key).copied()
    }
}
