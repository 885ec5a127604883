//! Tile records

use serde::{Serialize, Deserialize};

/// Integer tile coordinate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, z): (i32, i32)) -> Self {
        Self { x, z }
    }
}

/// One grid cell
///
/// Fields are only written through [`crate::TileGrid`] so the derived
/// obstruction flag and the shadow accumulation rule always hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub(crate) height: f32,
    pub(crate) max_height: Option<f32>,
    pub(crate) shadow_height: f32,
}

impl Tile {
    /// Obstacle height (>= 0)
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Ceiling for objects occupying the tile (`None` = unrestricted)
    pub fn max_height(&self) -> Option<f32> {
        self.max_height
    }

    /// Whether the tile blocks light
    pub fn is_obstructed(&self) -> bool {
        self.height > 0.0
    }

    /// Height of the shadow cast onto this tile by other tiles
    pub fn shadow_height(&self) -> f32 {
        self.shadow_height
    }

    /// Check if a point at `altitude` above this tile lies in cast shadow
    pub fn is_shadowed_at(&self, altitude: f32) -> bool {
        altitude < self.shadow_height
    }

    /// Check if an object may sit at `altitude` above this tile
    pub fn allows_altitude(&self, altitude: f32) -> bool {
        self.max_height.map_or(true, |max| altitude <= max)
    }
}
