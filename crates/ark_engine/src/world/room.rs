use std::collections::BTreeMap;

use crate::geometry::Vec2;

use super::decoration::Decoration;
use super::tile::{TileGrid, TileKind};

/// Immutable room definition. [`super::World`] clones it into its active set on load.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomTemplate {
    pub name: String,
    pub tiles: TileGrid,
    pub decorations: Vec<Decoration>,
    pub entry_points: BTreeMap<String, Vec2>,
}

impl RoomTemplate {
    pub fn new(name: impl Into<String>, tiles: TileGrid) -> Self {
        Self {
            name: name.into(),
            tiles,
            decorations: Vec::new(),
            entry_points: BTreeMap::new(),
        }
    }

    pub fn with_area(
        mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        kind: TileKind,
        walkable: bool,
    ) -> Self {
        self.tiles.fill_area(x, y, width, height, kind, walkable);
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    pub fn with_entry_point(mut self, key: impl Into<String>, position: Vec2) -> Self {
        self.entry_points.insert(key.into(), position);
        self
    }

    pub fn pixel_width(&self) -> f32 {
        self.tiles.width() as f32 * self.tiles.tile_size()
    }

    pub fn pixel_height(&self) -> f32 {
        self.tiles.height() as f32 * self.tiles.tile_size()
    }
}
