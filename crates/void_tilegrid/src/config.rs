//! Grid configuration

use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::grid::TileGrid;

/// Grid dimensions as read from configuration files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Tiles along world X
    pub width: usize,
    /// Tiles along world Z
    pub height: usize,
    /// Edge length of one tile in world units
    pub tile_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            tile_size: 1.0,
        }
    }
}

impl GridConfig {
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self { width, height, tile_size }
    }

    /// Build an empty grid
    pub fn build(&self) -> Result<TileGrid> {
        TileGrid::new(self.width, self.height, self.tile_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let grid = GridConfig::default().build().unwrap();
        assert_eq!(grid.width(), 64);
        assert_eq!(grid.world_width(), 64.0);
    }

    #[test]
    fn test_partial_json() {
        let config: GridConfig = serde_json::from_str(r#"{ "tile_size": 2.0 }"#).unwrap();
        assert_eq!(config, GridConfig::new(64, 64, 2.0));
    }

    #[test]
    fn test_invalid_config_fails_to_build() {
        assert!(GridConfig::new(8, 8, 0.0).build().is_err());
    }
}
