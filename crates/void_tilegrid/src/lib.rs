//! # void_tilegrid - Tile Occlusion Grid
//!
//! A coarse height grid for gameplay-side shadow and altitude queries:
//! - Tiles carry an obstacle height and an optional altitude ceiling
//! - Obstacles cast linear shadows along world X away from the sun
//! - World/tile conversion for a grid centered on the origin
//!
//! ```ignore
//! use void_tilegrid::prelude::*;
//!
//! let mut grid = TileGrid::new(10, 10, 1.0)?;
//! grid.set_tile_height(5, 5, 4.0);
//! grid.calculate_shadow(5, 5, Vec3::new(1.0, -1.0, 0.0))?;
//! assert!(grid.is_shadowed(6, 5, 2.0));
//! ```

pub mod error;
pub mod tile;
pub mod grid;
pub mod config;

pub use error::{Result, TileGridError};
pub use tile::{Tile, TileCoord};
pub use grid::{GridState, TileGrid};
pub use config::GridConfig;

pub mod prelude {
    pub use crate::config::GridConfig;
    pub use crate::grid::TileGrid;
    pub use crate::tile::{Tile, TileCoord};
    pub use glam::{Vec2, Vec3};
}
