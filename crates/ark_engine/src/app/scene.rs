use crate::assets::{AssetCatalog, AssetKey};
use crate::draw::DrawContext;

use super::input::InputSnapshot;

/// The game side of the host loop.
///
/// `update` runs once per fixed tick with the host clock in milliseconds; `render` runs
/// once per presented frame.
pub trait Scene {
    /// Images the host should load before the first frame.
    fn required_assets(&self) -> Vec<AssetKey>;
    fn update(&mut self, sim_time_ms: f64, input: &InputSnapshot, assets: &dyn AssetCatalog);
    fn render(&mut self, ctx: &mut dyn DrawContext);
    fn debug_lines(&self) -> Vec<String> {
        Vec::new()
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}
