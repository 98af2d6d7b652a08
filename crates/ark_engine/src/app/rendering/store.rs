use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::{debug, warn};

use crate::assets::{AssetCatalog, AssetKey};

pub(crate) struct LoadedImage {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

impl LoadedImage {
    /// RGBA of the pixel at `(x, y)`, clamped to the image edge.
    pub(crate) fn sample(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1)) as usize;
        let y = y.min(self.height.saturating_sub(1)) as usize;
        let offset = (y * self.width as usize + x) * 4;
        match self.rgba.get(offset..offset + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }
}

/// Decoded PNGs keyed by [`AssetKey`]. Each key is attempted once; failures are remembered
/// and warned about once, so a missing file never retries or spams the log.
pub(crate) struct AssetStore {
    asset_root: PathBuf,
    images: HashMap<AssetKey, Option<LoadedImage>>,
    warned_keys: HashSet<AssetKey>,
}

impl AssetStore {
    pub(crate) fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            images: HashMap::new(),
            warned_keys: HashSet::new(),
        }
    }

    pub(crate) fn load_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a AssetKey>) {
        for key in keys {
            self.load(key);
        }
    }

    pub(crate) fn load(&mut self, key: &AssetKey) {
        let Entry::Vacant(slot) = self.images.entry(key.clone()) else {
            return;
        };
        let loaded = match key.resolve_png_path(&self.asset_root) {
            Ok(path) => match load_png_rgba(&path) {
                Ok(image) => {
                    debug!(asset_key = %key, width = image.width, height = image.height, "image_loaded");
                    Some(image)
                }
                Err(reason) => {
                    warn_image_load_once(&mut self.warned_keys, key, Some(&path), &reason);
                    None
                }
            },
            Err(error) => {
                warn_image_load_once(
                    &mut self.warned_keys,
                    key,
                    None,
                    &format!("invalid_key:{error}"),
                );
                None
            }
        };
        slot.insert(loaded);
    }

    pub(crate) fn get(&self, key: &AssetKey) -> Option<&LoadedImage> {
        self.images.get(key).and_then(Option::as_ref)
    }

    pub(crate) fn loaded_count(&self) -> usize {
        self.images.values().filter(|image| image.is_some()).count()
    }

    pub(crate) fn attempted_count(&self) -> usize {
        self.images.len()
    }
}

impl AssetCatalog for AssetStore {
    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)> {
        self.get(key).map(|image| (image.width, image.height))
    }
}

fn load_png_rgba(path: &Path) -> Result<LoadedImage, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_image_load_once(
    warned_keys: &mut HashSet<AssetKey>,
    key: &AssetKey,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.clone()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        asset_key = %key,
        path = %path_display,
        reason = reason,
        "image_load_failed_skipping_draws"
    );
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgba};
    use tempfile::TempDir;

    use super::*;

    fn write_png(root: &Path, key: &str, width: u32, height: u32) {
        let path = root.join(format!("{key}.png"));
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        buffer.save(&path).expect("save png");
    }

    #[test]
    fn loads_png_and_reports_size() {
        let temp = TempDir::new().expect("temp");
        write_png(temp.path(), "decor/chest", 4, 3);
        let mut store = AssetStore::new(temp.path().to_path_buf());
        let key = AssetKey::new("decor/chest");
        store.load(&key);

        assert_eq!(store.image_size(&key), Some((4, 3)));
        let image = store.get(&key).expect("loaded");
        assert_eq!(image.sample(3, 2), [10, 20, 30, 255]);
        assert_eq!(image.sample(99, 99), [10, 20, 30, 255]);
    }

    #[test]
    fn missing_and_invalid_keys_are_remembered_as_unloaded() {
        let temp = TempDir::new().expect("temp");
        let mut store = AssetStore::new(temp.path().to_path_buf());
        let missing = AssetKey::new("decor/nope");
        let invalid = AssetKey::new("../escape");
        store.load_all([&missing, &invalid]);
        store.load(&missing);

        assert!(!store.is_loaded(&missing));
        assert!(!store.is_loaded(&invalid));
        assert_eq!(store.attempted_count(), 2);
        assert_eq!(store.loaded_count(), 0);
        assert_eq!(store.warned_keys.len(), 2);
    }

    #[test]
    fn failed_load_is_not_retried_after_file_appears() {
        let temp = TempDir::new().expect("temp");
        let mut store = AssetStore::new(temp.path().to_path_buf());
        let key = AssetKey::new("tiles/beach");
        store.load(&key);
        write_png(temp.path(), "tiles/beach", 2, 2);
        store.load(&key);
        assert!(!store.is_loaded(&key));
    }
}
