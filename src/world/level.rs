//! Level loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable level files. Files are
//! validated against resource limits before a tilemap is built from them, so
//! a corrupt or hostile file cannot balloon memory.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{TileKind, Tilemap, TILE_SIZE};

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum number of grid tiles in a level
    pub const MAX_GRID_TILES: usize = 65_536;
    /// Maximum number of offgrid tiles in a level
    pub const MAX_OFFGRID_TILES: usize = 4_096;
    /// Maximum absolute cell coordinate
    pub const MAX_CELL: i32 = 10_000;
    /// Maximum absolute world coordinate (prevents overflow issues)
    pub const MAX_COORD: f32 = 1_000_000.0;
    /// Maximum tile variant index
    pub const MAX_VARIANT: u8 = 63;
}

/// Error type for level loading
#[derive(Debug)]
pub enum LevelError {
    IoError(std::io::Error),
    ParseError(ron::error::SpannedError),
    SerializeError(ron::Error),
    ValidationError(String),
}

impl From<std::io::Error> for LevelError {
    fn from(e: std::io::Error) -> Self {
        LevelError::IoError(e)
    }
}

impl From<ron::error::SpannedError> for LevelError {
    fn from(e: ron::error::SpannedError) -> Self {
        LevelError::ParseError(e)
    }
}

impl From<ron::Error> for LevelError {
    fn from(e: ron::Error) -> Self {
        LevelError::SerializeError(e)
    }
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelError::IoError(e) => write!(f, "IO error: {}", e),
            LevelError::ParseError(e) => write!(f, "Parse error: {}", e),
            LevelError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            LevelError::ValidationError(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for LevelError {}

/// A tile snapped to the cell grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTile {
    pub kind: TileKind,
    pub variant: u8,
    pub cell: (i32, i32),
}

/// A freely placed decorative tile, position in world pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffgridTile {
    pub kind: TileKind,
    pub variant: u8,
    pub pos: (f32, f32),
}

/// On-disk level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub tile_size: f32,
    pub grid: Vec<GridTile>,
    pub offgrid: Vec<OffgridTile>,
}

impl Level {
    /// Parse a level from RON text and validate it.
    pub fn from_ron(text: &str) -> Result<Self, LevelError> {
        let level: Level = ron::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Serialize to pretty RON after validating.
    pub fn to_ron(&self) -> Result<String, LevelError> {
        self.validate()?;
        let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load and validate a level file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Save a level file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let text = self.to_ron()?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), LevelError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(LevelError::ValidationError(format!(
                "invalid tile_size {}",
                self.tile_size
            )));
        }
        if self.grid.len() > limits::MAX_GRID_TILES {
            return Err(LevelError::ValidationError(format!(
                "too many grid tiles ({} > {})",
                self.grid.len(),
                limits::MAX_GRID_TILES
            )));
        }
        if self.offgrid.len() > limits::MAX_OFFGRID_TILES {
            return Err(LevelError::ValidationError(format!(
                "too many offgrid tiles ({} > {})",
                self.offgrid.len(),
                limits::MAX_OFFGRID_TILES
            )));
        }
        for tile in &self.grid {
            if tile.cell.0.abs() > limits::MAX_CELL || tile.cell.1.abs() > limits::MAX_CELL {
                return Err(LevelError::ValidationError(format!(
                    "grid cell {:?} out of range",
                    tile.cell
                )));
            }
            if tile.variant > limits::MAX_VARIANT {
                return Err(LevelError::ValidationError(format!(
                    "grid variant {} out of range",
                    tile.variant
                )));
            }
        }
        for tile in &self.offgrid {
            let (x, y) = tile.pos;
            if !(x.is_finite() && y.is_finite())
                || x.abs() > limits::MAX_COORD
                || y.abs() > limits::MAX_COORD
            {
                return Err(LevelError::ValidationError(format!(
                    "offgrid position {:?} out of range",
                    tile.pos
                )));
            }
            if tile.variant > limits::MAX_VARIANT {
                return Err(LevelError::ValidationError(format!(
                    "offgrid variant {} out of range",
                    tile.variant
                )));
            }
        }
        Ok(())
    }

    /// Build the runtime tilemap. Later grid entries win on cell collisions.
    pub fn build_tilemap(&self) -> Tilemap {
        let mut map = Tilemap::new();
        for tile in &self.grid {
            map.insert_grid(tile.cell, tile.kind, tile.variant);
        }
        for tile in &self.offgrid {
            map.insert_offgrid(macroquad::math::vec2(tile.pos.0, tile.pos.1), tile.kind, tile.variant);
        }
        map
    }

    /// Built-in arena used when no level file can be loaded.
    ///
    /// A ground row with a pit, a floating platform, stone side walls, one
    /// player spawner, two enemy spawners and a decorative tree.
    pub fn fallback() -> Self {
        let mut grid = Vec::new();
        for x in 0..24 {
            if x == 15 || x == 16 {
                continue;
            }
            grid.push(GridTile {
                kind: TileKind::Grass,
                variant: 1,
                cell: (x, 13),
            });
        }
        for y in 6..13 {
            grid.push(GridTile {
                kind: TileKind::Stone,
                variant: 0,
                cell: (0, y),
            });
            grid.push(GridTile {
                kind: TileKind::Stone,
                variant: 0,
                cell: (23, y),
            });
        }
        for x in 8..12 {
            grid.push(GridTile {
                kind: TileKind::Grass,
                variant: 1,
                cell: (x, 9),
            });
        }
        grid.push(GridTile {
            kind: TileKind::Spawners,
            variant: 0,
            cell: (2, 12),
        });
        grid.push(GridTile {
            kind: TileKind::Spawners,
            variant: 1,
            cell: (10, 8),
        });
        grid.push(GridTile {
            kind: TileKind::Spawners,
            variant: 1,
            cell: (20, 12),
        });

        Self {
            tile_size: TILE_SIZE,
            grid,
            offgrid: vec![OffgridTile {
                kind: TileKind::LargeDecor,
                variant: 2,
                pos: (96.0, 187.0),
            }],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
