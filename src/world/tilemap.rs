//! Tile grid storage and queries.

use std::collections::HashMap;

use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::asset::AssetLibrary;

/// Side length of a grid cell in world pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Offsets of the 3x3 cell neighborhood around a point, center included.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Every kind of tile a level can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
}

impl TileKind {
    /// Solid tiles take part in collision, the rest are decoration.
    pub fn is_solid(&self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    /// Image set this kind draws from.
    pub fn asset_key(&self) -> &'static str {
        match self {
            TileKind::Grass => "tiles/grass",
            TileKind::Stone => "tiles/stone",
            TileKind::Decor => "tiles/decor",
            TileKind::LargeDecor => "tiles/large_decor",
            TileKind::Spawners => "tiles/spawners",
        }
    }
}

/// One placed tile.
///
/// Grid tiles store their position in cell coordinates, offgrid tiles in
/// world pixels. `Tilemap` keeps the two populations apart so the meaning
/// of `pos` is unambiguous at every use site.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u8,
    pub pos: Vec2,
}

/// Tile grid plus freely placed decoration.
#[derive(Debug, Clone, Default)]
pub struct Tilemap {
    tile_size: f32,
    grid: HashMap<(i32, i32), Tile>,
    offgrid: Vec<Tile>,
}

impl Tilemap {
    pub fn new() -> Self {
        Self {
            tile_size: TILE_SIZE,
            grid: HashMap::new(),
            offgrid: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Place a grid tile, replacing whatever occupied the cell.
    pub fn insert_grid(&mut self, cell: (i32, i32), kind: TileKind, variant: u8) {
        self.grid.insert(
            cell,
            Tile {
                kind,
                variant,
                pos: vec2(cell.0 as f32, cell.1 as f32),
            },
        );
    }

    pub fn insert_offgrid(&mut self, pos: Vec2, kind: TileKind, variant: u8) {
        self.offgrid.push(Tile { kind, variant, pos });
    }

    pub fn grid_tile(&self, cell: (i32, i32)) -> Option<&Tile> {
        self.grid.get(&cell)
    }

    /// Cell containing a world position. Floors, so negative positions map
    /// to negative cells rather than truncating toward zero.
    pub fn grid_coords(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.tile_size).floor() as i32,
            (pos.y / self.tile_size).floor() as i32,
        )
    }

    /// Grid tiles in the 3x3 neighborhood around a world position.
    pub fn tiles_around(&self, pos: Vec2) -> impl Iterator<Item = &Tile> {
        let center = self.grid_coords(pos);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| self.grid.get(&(center.0 + dx, center.1 + dy)))
    }

    /// Collision rects of the solid tiles near a world position.
    pub fn physics_rects_around(&self, pos: Vec2) -> Vec<Rect> {
        self.tiles_around(pos)
            .filter(|tile| tile.kind.is_solid())
            .map(|tile| {
                Rect::new(
                    tile.pos.x * self.tile_size,
                    tile.pos.y * self.tile_size,
                    self.tile_size,
                    self.tile_size,
                )
            })
            .collect()
    }

    /// Whether the cell under a world position holds a solid tile.
    pub fn is_solid(&self, pos: Vec2) -> bool {
        self.grid
            .get(&self.grid_coords(pos))
            .is_some_and(|tile| tile.kind.is_solid())
    }

    /// Pull out every tile matching one of the (kind, variant) pairs.
    ///
    /// Matches are returned with positions in world pixels. With `keep` the
    /// tiles stay in the map, otherwise they are removed. Grid iteration
    /// order is sorted by cell so results are deterministic.
    pub fn extract(&mut self, pairs: &[(TileKind, u8)], keep: bool) -> Vec<Tile> {
        let wanted = |tile: &Tile| pairs.contains(&(tile.kind, tile.variant));
        let mut matches = Vec::new();

        for tile in &self.offgrid {
            if wanted(tile) {
                matches.push(tile.clone());
            }
        }
        if !keep {
            self.offgrid.retain(|tile| !wanted(tile));
        }

        let mut cells: Vec<(i32, i32)> = self
            .grid
            .iter()
            .filter(|(_, tile)| wanted(tile))
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort_unstable();
        for cell in cells {
            if let Some(tile) = self.grid.get(&cell) {
                let mut tile = tile.clone();
                tile.pos *= self.tile_size;
                matches.push(tile);
                if !keep {
                    self.grid.remove(&cell);
                }
            }
        }

        matches
    }

    /// Draw offgrid decoration, then the grid tiles visible in the viewport.
    pub fn render(&self, assets: &AssetLibrary, scroll: Vec2, view: Vec2) {
        for tile in &self.offgrid {
            let texture = assets.image(tile.kind.asset_key(), tile.variant as usize);
            draw_texture(texture, tile.pos.x - scroll.x, tile.pos.y - scroll.y, WHITE);
        }

        let x0 = (scroll.x / self.tile_size).floor() as i32;
        let x1 = ((scroll.x + view.x) / self.tile_size).floor() as i32 + 1;
        let y0 = (scroll.y / self.tile_size).floor() as i32;
        let y1 = ((scroll.y + view.y) / self.tile_size).floor() as i32 + 1;
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(tile) = self.grid.get(&(x, y)) {
                    let texture = assets.image(tile.kind.asset_key(), tile.variant as usize);
                    draw_texture(
                        texture,
                        tile.pos.x * self.tile_size - scroll.x,
                        tile.pos.y * self.tile_size - scroll.y,
                        WHITE,
                    );
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_floor() -> Tilemap {
        let mut map = Tilemap::new();
        for x in 0..10 {
            map.insert_grid((x, 5), TileKind::Grass, 1);
        }
        map
    }

    #[test]
    fn test_insert_replaces_cell() {
        let mut map = Tilemap::new();
        map.insert_grid((3, 3), TileKind::Grass, 0);
        map.insert_grid((3, 3), TileKind::Stone, 4);
        let tile = map.grid_tile((3, 3)).unwrap();
        assert_eq!(tile.kind, TileKind::Stone);
        assert_eq!(tile.variant, 4);
    }

    #[test]
    fn test_grid_coords_floor_negative() {
        let map = Tilemap::new();
        assert_eq!(map.grid_coords(vec2(-0.5, -0.5)), (-1, -1));
        assert_eq!(map.grid_coords(vec2(0.0, 0.0)), (0, 0));
        assert_eq!(map.grid_coords(vec2(15.9, 16.0)), (0, 1));
    }

    #[test]
    fn test_solidity() {
        let map = map_with_floor();
        assert!(map.is_solid(vec2(40.0, 85.0)));
        assert!(!map.is_solid(vec2(40.0, 60.0)));
    }

    #[test]
    fn test_decor_is_not_solid() {
        let mut map = Tilemap::new();
        map.insert_grid((0, 0), TileKind::Decor, 0);
        assert!(!map.is_solid(vec2(8.0, 8.0)));
        assert!(map.physics_rects_around(vec2(8.0, 8.0)).is_empty());
    }

    #[test]
    fn test_physics_rects_are_tile_sized() {
        let map = map_with_floor();
        let rects = map.physics_rects_around(vec2(40.0, 70.0));
        assert!(!rects.is_empty());
        for rect in rects {
            assert_eq!(rect.w, TILE_SIZE);
            assert_eq!(rect.h, TILE_SIZE);
            assert_eq!(rect.y, 80.0);
        }
    }

    #[test]
    fn test_tiles_around_is_bounded_by_neighborhood() {
        let map = map_with_floor();
        let count = map.tiles_around(vec2(40.0, 85.0)).count();
        assert!(count <= 9);
        assert!(count >= 3);
    }

    #[test]
    fn test_extract_scales_grid_positions() {
        let mut map = Tilemap::new();
        map.insert_grid((2, 12), TileKind::Spawners, 0);
        map.insert_offgrid(vec2(96.0, 187.0), TileKind::LargeDecor, 2);

        let spawners = map.extract(&[(TileKind::Spawners, 0)], false);
        assert_eq!(spawners.len(), 1);
        assert_eq!(spawners[0].pos, vec2(32.0, 192.0));
        assert!(map.grid_tile((2, 12)).is_none());

        let trees = map.extract(&[(TileKind::LargeDecor, 2)], true);
        assert_eq!(trees.len(), 1);
        assert_eq!(trees[0].pos, vec2(96.0, 187.0));
        let again = map.extract(&[(TileKind::LargeDecor, 2)], true);
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_extract_order_is_deterministic() {
        let mut map = Tilemap::new();
        map.insert_grid((5, 1), TileKind::Spawners, 1);
        map.insert_grid((1, 1), TileKind::Spawners, 1);
        map.insert_grid((3, 1), TileKind::Spawners, 1);
        let found = map.extract(&[(TileKind::Spawners, 1)], true);
        let xs: Vec<f32> = found.iter().map(|t| t.pos.x).collect();
        assert_eq!(xs, vec![16.0, 48.0, 80.0]);
    }
}
