use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::overlay::{draw_overlay, OverlayData};
use crate::app::Scene;
use crate::assets::{AssetCatalog, AssetKey};
use crate::draw::BLACK;

use super::canvas::PixelCanvas;
use super::store::AssetStore;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    store: AssetStore,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            store: AssetStore::new(asset_root),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn load_assets<'a>(&mut self, keys: impl IntoIterator<Item = &'a AssetKey>) {
        self.store.load_all(keys);
    }

    pub fn assets(&self) -> &dyn AssetCatalog {
        &self.store
    }

    pub(crate) fn asset_counts(&self) -> (usize, usize) {
        (self.store.loaded_count(), self.store.attempted_count())
    }

    pub(crate) fn render_scene(
        &mut self,
        scene: &mut dyn Scene,
        overlay: Option<&OverlayData>,
    ) -> Result<(), Error> {
        {
            let frame = self.pixels.frame_mut();
            let mut canvas = PixelCanvas::new(frame, self.width, self.height, &self.store);
            canvas.clear(BLACK);
            scene.render(&mut canvas);
            if let Some(overlay) = overlay {
                draw_overlay(&mut canvas, overlay);
            }
        }
        self.pixels.render()
    }
}
