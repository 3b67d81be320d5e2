//! World module - tile grid and level files
//!
//! The tilemap stores grid tiles in a hash map keyed by cell coordinates and
//! decorative offgrid tiles in a flat list. Physics queries only ever look at
//! the 3x3 cell neighborhood around a point, so collision cost is independent
//! of level size.

mod level;
mod tilemap;

pub use level::{limits, Level, LevelError, GridTile, OffgridTile};
pub use tilemap::{Tile, TileKind, Tilemap, TILE_SIZE};
