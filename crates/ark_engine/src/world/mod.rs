use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::assets::AssetKey;
use crate::draw::{DrawContext, Rgba};
use crate::geometry::{Rect, Size, Vec2};

mod decoration;
mod room;
mod tile;

pub use decoration::{Decoration, DoorLink};
pub use room::RoomTemplate;
pub use tile::{Tile, TileGrid, TileKind};

pub const DEFAULT_TILE_SIZE: f32 = 64.0;
/// Spawn used when a room has no entry point under the requested key.
pub const DEFAULT_SPAWN: Vec2 = Vec2::new(128.0, 128.0);
pub const BASE_FILL_COLOR: Rgba = [0x0A, 0x16, 0x28, 0xFF];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("room index {index} is out of range (room count {room_count})")]
    RoomIndexOutOfRange { index: usize, room_count: usize },
}

/// Room catalog plus the active copy of the current room.
#[derive(Debug, Clone)]
pub struct World {
    rooms: Vec<RoomTemplate>,
    current_room: usize,
    tiles: TileGrid,
    decorations: Vec<Decoration>,
    map_width: u32,
    map_height: u32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            current_room: 0,
            tiles: TileGrid::empty(DEFAULT_TILE_SIZE),
            decorations: Vec::new(),
            map_width: 0,
            map_height: 0,
        }
    }
}

impl World {
    /// Builds the catalog and activates room 0 when there is one.
    pub fn new(rooms: Vec<RoomTemplate>) -> Self {
        let mut world = Self {
            rooms,
            ..Self::default()
        };
        if !world.rooms.is_empty() {
            world.activate(0);
        }
        world
    }

    pub fn add_room(&mut self, room: RoomTemplate) -> usize {
        self.rooms.push(room);
        let index = self.rooms.len() - 1;
        if index == 0 {
            self.activate(0);
        }
        index
    }

    pub fn room_index(&self, name: &str) -> Option<usize> {
        self.rooms.iter().position(|room| room.name == name)
    }

    /// Adds a decoration to a registered room, and to the active copy when that room is loaded.
    pub fn add_decoration(
        &mut self,
        index: usize,
        decoration: Decoration,
    ) -> Result<(), WorldError> {
        let room_count = self.rooms.len();
        let Some(room) = self.rooms.get_mut(index) else {
            return Err(WorldError::RoomIndexOutOfRange { index, room_count });
        };
        room.decorations.push(decoration.clone());
        if index == self.current_room {
            self.decorations.push(decoration);
        }
        Ok(())
    }

    /// Clears door links whose target room does not exist. Returns how many were cleared.
    pub fn drop_dangling_doors(&mut self) -> usize {
        let room_count = self.rooms.len();
        let mut dropped = 0;
        for (index, room) in self.rooms.iter_mut().enumerate() {
            for decoration in &mut room.decorations {
                let Some(door) = &decoration.door else {
                    continue;
                };
                if door.target_room < room_count {
                    continue;
                }
                warn!(
                    room = %room.name,
                    room_index = index,
                    decoration = %decoration.kind,
                    target_room = door.target_room,
                    room_count,
                    "door_target_missing"
                );
                decoration.door = None;
                dropped += 1;
            }
        }
        if dropped > 0 {
            if let Some(room) = self.rooms.get(self.current_room) {
                self.decorations = room.decorations.clone();
            }
        }
        dropped
    }

    pub fn load_room(&mut self, index: usize) -> Result<(), WorldError> {
        if index >= self.rooms.len() {
            let room_count = self.rooms.len();
            error!(index, room_count, "room_index_out_of_range");
            return Err(WorldError::RoomIndexOutOfRange { index, room_count });
        }
        self.activate(index);
        info!(
            room = %self.rooms[index].name,
            index,
            width = self.map_width,
            height = self.map_height,
            decorations = self.decorations.len(),
            "room_loaded"
        );
        Ok(())
    }

    fn activate(&mut self, index: usize) {
        let room = &self.rooms[index];
        self.tiles = room.tiles.clone();
        self.decorations = room.decorations.clone();
        self.map_width = self.tiles.width();
        self.map_height = self.tiles.height();
        self.current_room = index;
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn rooms(&self) -> &[RoomTemplate] {
        &self.rooms
    }

    pub fn current_room_index(&self) -> usize {
        self.current_room
    }

    pub fn current_room_name(&self) -> &str {
        self.rooms
            .get(self.current_room)
            .map(|room| room.name.as_str())
            .unwrap_or("")
    }

    pub fn map_width(&self) -> u32 {
        self.map_width
    }

    pub fn map_height(&self) -> u32 {
        self.map_height
    }

    pub fn tile_size(&self) -> f32 {
        self.tiles.tile_size()
    }

    pub fn pixel_size(&self) -> Size {
        Size::new(
            self.map_width as f32 * self.tile_size(),
            self.map_height as f32 * self.tile_size(),
        )
    }

    pub fn tiles(&self) -> &TileGrid {
        &self.tiles
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Pixel-space query; anything off the grid or non-finite is not walkable.
    pub fn is_walkable(&self, x: f32, y: f32) -> bool {
        let tile_size = self.tile_size();
        if !x.is_finite() || !y.is_finite() || tile_size <= 0.0 {
            return false;
        }
        let tile_x = (x / tile_size).floor() as i64;
        let tile_y = (y / tile_size).floor() as i64;
        self.tiles
            .tile(tile_x, tile_y)
            .map(|tile| tile.walkable)
            .unwrap_or(false)
    }

    pub fn check_decoration_collision(&self, bounds: &Rect) -> bool {
        self.decorations
            .iter()
            .any(|decoration| decoration.solid && decoration.bounds().intersects(bounds))
    }

    pub fn door_in_reach(&self, probe: &Rect) -> Option<&Decoration> {
        self.decorations
            .iter()
            .find(|decoration| decoration.is_door() && decoration.bounds().intersects(probe))
    }

    pub fn resolve_entry_point(&self, room_index: usize, key: &str) -> Vec2 {
        let found = self
            .rooms
            .get(room_index)
            .and_then(|room| room.entry_points.get(key));
        match found {
            Some(position) => *position,
            None => {
                warn!(
                    room_index,
                    entry_point = key,
                    fallback_x = DEFAULT_SPAWN.x,
                    fallback_y = DEFAULT_SPAWN.y,
                    "entry_point_missing"
                );
                DEFAULT_SPAWN
            }
        }
    }

    pub fn set_tile(&mut self, x: i64, y: i64, kind: TileKind, walkable: bool) {
        self.tiles.set(x, y, kind, walkable);
    }

    pub fn create_tile_area(
        &mut self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        kind: TileKind,
        walkable: bool,
    ) {
        self.tiles.fill_area(x, y, width, height, kind, walkable);
    }

    /// Every image any room can draw, for host preloading.
    pub fn asset_keys(&self) -> BTreeSet<AssetKey> {
        let mut keys: BTreeSet<AssetKey> = TileKind::ALL.iter().map(|kind| kind.asset_key()).collect();
        for room in &self.rooms {
            keys.extend(room.decorations.iter().map(|decoration| decoration.image.clone()));
        }
        keys
    }

    /// Draws the active room. `viewport` is the camera rectangle in world pixels.
    pub fn render(&self, ctx: &mut dyn DrawContext, viewport: Rect) {
        ctx.fill_rect(
            Rect::new(0.0, 0.0, viewport.width, viewport.height),
            BASE_FILL_COLOR,
        );
        let tile_size = self.tile_size();
        if tile_size <= 0.0 || !viewport.origin().is_finite() {
            return;
        }

        self.render_background(ctx, viewport, tile_size);

        let first_x = (viewport.x / tile_size).floor().max(0.0) as i64;
        let first_y = (viewport.y / tile_size).floor().max(0.0) as i64;
        let end_x = ((viewport.right() / tile_size).ceil() as i64).min(i64::from(self.map_width));
        let end_y = ((viewport.bottom() / tile_size).ceil() as i64).min(i64::from(self.map_height));

        for grid_y in first_y..end_y {
            for grid_x in first_x..end_x {
                let Some(tile) = self.tiles.tile(grid_x, grid_y) else {
                    continue;
                };
                if tile.kind.is_background() {
                    continue;
                }
                let key = tile.kind.asset_key();
                let Some((width, height)) = ctx.image_size(&key) else {
                    continue;
                };
                ctx.draw_image_region(
                    &key,
                    Rect::new(0.0, 0.0, width as f32, height as f32),
                    tile.bounds.translated(-viewport.origin()),
                );
            }
        }

        for decoration in &self.decorations {
            if decoration.bounds().intersects(&viewport) {
                decoration.render(ctx, viewport.origin());
            }
        }
    }

    fn render_background(&self, ctx: &mut dyn DrawContext, viewport: Rect, tile_size: f32) {
        let key = TileKind::Grass.asset_key();
        let Some((width, height)) = ctx.image_size(&key) else {
            return;
        };
        let src = Rect::new(0.0, 0.0, width as f32, height as f32);
        let start_x = -viewport.x.rem_euclid(tile_size);
        let start_y = -viewport.y.rem_euclid(tile_size);

        let mut y = start_y;
        while y < viewport.height {
            let mut x = start_x;
            while x < viewport.width {
                ctx.draw_image_region(&key, src, Rect::new(x, y, tile_size, tile_size));
                x += tile_size;
            }
            y += tile_size;
        }
    }
}
