use crate::assets::AssetKey;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    Grass,
    Water,
    Path,
    Beach,
    Farmland,
    Cliff,
}

impl TileKind {
    pub const ALL: [TileKind; 6] = [
        TileKind::Grass,
        TileKind::Water,
        TileKind::Path,
        TileKind::Beach,
        TileKind::Farmland,
        TileKind::Cliff,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grass" => Some(Self::Grass),
            "water" => Some(Self::Water),
            "path" => Some(Self::Path),
            "beach" => Some(Self::Beach),
            "farmland" => Some(Self::Farmland),
            "cliff" => Some(Self::Cliff),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Water => "water",
            Self::Path => "path",
            Self::Beach => "beach",
            Self::Farmland => "farmland",
            Self::Cliff => "cliff",
        }
    }

    pub fn asset_key(self) -> AssetKey {
        AssetKey::new(match self {
            Self::Grass => "tiles/grass_middle",
            Self::Water => "tiles/water_middle",
            Self::Path => "tiles/path_middle",
            Self::Beach => "tiles/beach",
            Self::Farmland => "tiles/farmland",
            Self::Cliff => "tiles/cliff",
        })
    }

    /// Grass is painted by the tiled background pass rather than per tile.
    pub const fn is_background(self) -> bool {
        matches!(self, Self::Grass)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub grid_x: u32,
    pub grid_y: u32,
    pub bounds: Rect,
    pub walkable: bool,
}

/// Row-major grid of tiles for one room.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn filled(width: u32, height: u32, tile_size: f32, kind: TileKind, walkable: bool) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for grid_y in 0..height {
            for grid_x in 0..width {
                tiles.push(Tile {
                    kind,
                    grid_x,
                    grid_y,
                    bounds: Rect::new(
                        grid_x as f32 * tile_size,
                        grid_y as f32 * tile_size,
                        tile_size,
                        tile_size,
                    ),
                    walkable,
                });
            }
        }
        Self {
            width,
            height,
            tile_size,
            tiles,
        }
    }

    pub fn empty(tile_size: f32) -> Self {
        Self::filled(0, 0, tile_size, TileKind::Grass, false)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn index_of(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile(&self, x: i64, y: i64) -> Option<&Tile> {
        self.index_of(x, y).map(|index| &self.tiles[index])
    }

    /// Returns false (and changes nothing) for coordinates outside the grid.
    pub fn set(&mut self, x: i64, y: i64, kind: TileKind, walkable: bool) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        let tile = &mut self.tiles[index];
        tile.kind = kind;
        tile.walkable = walkable;
        true
    }

    /// Fills a rectangle of tiles; cells that fall outside the grid are skipped.
    pub fn fill_area(&mut self, x: i64, y: i64, width: u32, height: u32, kind: TileKind, walkable: bool) {
        let (x_start, x_end) = clip_span(x, width, self.width);
        let (y_start, y_end) = clip_span(y, height, self.height);
        for ty in y_start..y_end {
            for tx in x_start..x_end {
                self.set(tx, ty, kind, walkable);
            }
        }
    }
}

/// `[start, start + len)` intersected with `[0, limit)`; empty spans come back as `(0, 0)`.
fn clip_span(start: i64, len: u32, limit: u32) -> (i64, i64) {
    let end = start.saturating_add(i64::from(len)).min(i64::from(limit));
    let start = start.max(0);
    if start >= end {
        (0, 0)
    } else {
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_grid_lays_out_bounds_row_major() {
        let grid = TileGrid::filled(3, 2, 64.0, TileKind::Path, true);
        assert_eq!(grid.tiles().len(), 6);
        let tile = grid.tile(2, 1).expect("tile");
        assert_eq!(tile.bounds, Rect::new(128.0, 64.0, 64.0, 64.0));
        assert_eq!(grid.index_of(2, 1), Some(5));
    }

    #[test]
    fn fill_area_clips_to_grid() {
        let mut grid = TileGrid::filled(4, 4, 64.0, TileKind::Grass, true);
        grid.fill_area(2, 2, 5, 5, TileKind::Water, false);
        assert_eq!(grid.tile(3, 3).expect("tile").kind, TileKind::Water);
        assert_eq!(grid.tile(1, 1).expect("tile").kind, TileKind::Grass);
        assert!(!grid.set(-1, 0, TileKind::Cliff, false));
        assert!(!grid.set(4, 0, TileKind::Cliff, false));
    }

    #[test]
    fn fill_area_with_extreme_extents_stays_in_the_grid() {
        let mut grid = TileGrid::filled(4, 4, 64.0, TileKind::Grass, true);
        grid.fill_area(i64::MAX, 0, 1, 1, TileKind::Water, false);
        grid.fill_area(-3, -3, u32::MAX, u32::MAX, TileKind::Path, true);
        assert!(grid.tiles().iter().all(|tile| tile.kind == TileKind::Path));

        grid.fill_area(-10, 1, 11, u32::MAX, TileKind::Beach, true);
        assert_eq!(grid.tile(0, 3).expect("tile").kind, TileKind::Beach);
        assert_eq!(grid.tile(1, 3).expect("tile").kind, TileKind::Path);
        assert_eq!(grid.tile(0, 0).expect("tile").kind, TileKind::Path);
    }

    #[test]
    fn tile_names_round_trip_for_every_kind() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(TileKind::from_name("lava"), None);
    }
}
