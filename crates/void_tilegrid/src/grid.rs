//! Tile grid occlusion model
//!
//! A `width x height` grid of tiles centered on the world origin. Tiles with
//! a positive height are obstacles and cast a one-dimensional shadow along
//! world X, away from the sun. Shadow heights only ever grow until
//! [`TileGrid::clear_shadows`] resets them.

use glam::{Vec2, Vec3};
use serde::{Serialize, Deserialize};

use crate::error::{Result, TileGridError};
use crate::tile::{Tile, TileCoord};

/// Grid of tiles with per-tile height and cast shadow
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    tiles: Vec<Tile>,
}

/// Serializable snapshot of a grid
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridState {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    /// Create a grid of zeroed tiles
    pub fn new(width: usize, height: usize, tile_size: f32) -> Result<Self> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Err(TileGridError::InvalidArgument(format!(
                "tile size must be positive, got {}",
                tile_size
            )));
        }

        let count = width.checked_mul(height).ok_or_else(|| {
            TileGridError::InvalidArgument(format!("grid {}x{} is too large", width, height))
        })?;

        log::debug!("Created {}x{} tile grid (tile size {})", width, height, tile_size);

        Ok(Self {
            width,
            height,
            tile_size,
            tiles: vec![Tile::default(); count],
        })
    }

    /// Rebuild a grid from a snapshot
    pub fn from_state(state: GridState) -> Result<Self> {
        let mut grid = Self::new(state.width, state.height, state.tile_size)?;
        if state.tiles.len() != grid.tiles.len() {
            return Err(TileGridError::InvalidArgument(format!(
                "snapshot has {} tiles, expected {}",
                state.tiles.len(),
                grid.tiles.len()
            )));
        }

        for (slot, tile) in grid.tiles.iter_mut().zip(state.tiles) {
            // Re-apply the height clamp, snapshots may be hand-edited
            slot.height = sanitize_height(tile.height);
            slot.max_height = tile.max_height;
            slot.shadow_height = tile.shadow_height.max(0.0);
        }

        Ok(grid)
    }

    /// Take a snapshot of the grid
    pub fn state(&self) -> GridState {
        GridState {
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            tiles: self.tiles.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space extent along X
    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    /// World-space extent along Z
    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn is_valid_tile(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as usize) < self.width && (z as usize) < self.height
    }

    /// Row-major index (`z * width + x`) of a valid tile
    pub fn tile_index(&self, x: i32, z: i32) -> Option<usize> {
        if self.is_valid_tile(x, z) {
            Some(z as usize * self.width + x as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, x: i32, z: i32) -> Option<&Tile> {
        self.tile_index(x, z).map(|index| &self.tiles[index])
    }

    /// Tile under a world position
    pub fn tile_at_world(&self, world_x: f32, world_z: f32) -> Option<&Tile> {
        let coord = self.world_to_tile(world_x, world_z);
        self.tile(coord.x, coord.z)
    }

    /// Iterate over all tiles with their coordinates, row by row
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &Tile)> + '_ {
        let width = self.width.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let coord = TileCoord::new((index % width) as i32, (index / width) as i32);
            (coord, tile)
        })
    }

    /// Convert a world position to tile coordinates
    ///
    /// The result may be out of bounds; check it with [`Self::is_valid_tile`].
    pub fn world_to_tile(&self, world_x: f32, world_z: f32) -> TileCoord {
        let x = ((world_x + self.world_width() / 2.0) / self.tile_size).floor();
        let z = ((world_z + self.world_height() / 2.0) / self.tile_size).floor();
        TileCoord::new(to_tile_axis(x), to_tile_axis(z))
    }

    /// World position (X, Z) of a tile's center
    pub fn tile_to_world(&self, x: i32, z: i32) -> Vec2 {
        let half = self.tile_size / 2.0;
        Vec2::new(
            x as f32 * self.tile_size - self.world_width() / 2.0 + half,
            z as f32 * self.tile_size - self.world_height() / 2.0 + half,
        )
    }

    /// Set a tile's obstacle height
    ///
    /// Negative and NaN heights become 0. Returns `false` when the tile is
    /// out of bounds.
    pub fn set_tile_height(&mut self, x: i32, z: i32, height: f32) -> bool {
        match self.tile_index(x, z) {
            Some(index) => {
                self.tiles[index].height = sanitize_height(height);
                true
            }
            None => false,
        }
    }

    /// Set or clear the altitude ceiling of a tile
    pub fn set_tile_max_height(&mut self, x: i32, z: i32, max_height: Option<f32>) -> bool {
        match self.tile_index(x, z) {
            Some(index) => {
                self.tiles[index].max_height = max_height;
                true
            }
            None => false,
        }
    }

    /// Check if an object may sit at `altitude` above a tile
    pub fn can_occupy(&self, x: i32, z: i32, altitude: f32) -> bool {
        self.tile(x, z).map_or(false, |tile| tile.allows_altitude(altitude))
    }

    /// Check if a point at `altitude` above a tile lies in cast shadow
    pub fn is_shadowed(&self, x: i32, z: i32, altitude: f32) -> bool {
        self.tile(x, z).map_or(false, |tile| tile.is_shadowed_at(altitude))
    }

    /// Cast the shadow of one obstacle tile
    ///
    /// The shadow runs along X away from the sun for
    /// `height * |sun.x / sun.y|` tiles, tapering linearly to zero. Returns
    /// the number of in-bounds tiles the shadow reached. Out-of-bounds and
    /// unobstructed tiles cast nothing.
    pub fn calculate_shadow(&mut self, x: i32, z: i32, sun_direction: Vec3) -> Result<usize> {
        validate_sun(sun_direction)?;

        let height = match self.tile(x, z) {
            Some(tile) if tile.is_obstructed() => tile.height,
            _ => return Ok(0),
        };

        let shadow_length = height * (sun_direction.x / sun_direction.y).abs();
        if !shadow_length.is_finite() {
            return Err(TileGridError::InvalidArgument(format!(
                "sun direction {:?} is too close to the horizon",
                sun_direction
            )));
        }

        let step: i64 = if sun_direction.x < 0.0 { -1 } else { 1 };
        let steps = shadow_length.floor() as i64;
        let mut reached = 0;

        for dist in 1..=steps {
            let shadow_x = x as i64 + dist * step;
            // Each step moves one tile further out
            let Some(index) = i32::try_from(shadow_x).ok().and_then(|sx| self.tile_index(sx, z)) else {
                break;
            };

            let cast = height * (1.0 - dist as f32 / shadow_length);
            let tile = &mut self.tiles[index];
            tile.shadow_height = tile.shadow_height.max(cast);
            reached += 1;
        }

        log::trace!("Tile ({}, {}) height {} cast shadow over {} tiles", x, z, height, reached);
        Ok(reached)
    }

    /// Cast shadows from every obstacle tile
    ///
    /// Existing shadow heights are kept; call [`Self::clear_shadows`] first
    /// when the sun has moved.
    pub fn calculate_all_shadows(&mut self, sun_direction: Vec3) -> Result<usize> {
        validate_sun(sun_direction)?;

        let obstacles: Vec<TileCoord> = self
            .tiles()
            .filter(|(_, tile)| tile.is_obstructed())
            .map(|(coord, _)| coord)
            .collect();

        let mut reached = 0;
        for coord in &obstacles {
            reached += self.calculate_shadow(coord.x, coord.z, sun_direction)?;
        }

        log::debug!(
            "Cast shadows from {} obstacles onto {} tiles",
            obstacles.len(),
            reached
        );
        Ok(reached)
    }

    /// Reset every tile's shadow height to 0
    pub fn clear_shadows(&mut self) {
        for tile in &mut self.tiles {
            tile.shadow_height = 0.0;
        }
    }
}

/// Floored axis value to a tile coordinate; NaN maps outside the grid
fn to_tile_axis(value: f32) -> i32 {
    if value.is_nan() {
        -1
    } else {
        value as i32
    }
}

fn sanitize_height(height: f32) -> f32 {
    if height.is_nan() {
        0.0
    } else {
        height.max(0.0)
    }
}

fn validate_sun(sun_direction: Vec3) -> Result<()> {
    if !sun_direction.is_finite() {
        return Err(TileGridError::InvalidArgument(format!(
            "sun direction must be finite, got {:?}",
            sun_direction
        )));
    }
    if sun_direction.y == 0.0 {
        return Err(TileGridError::InvalidArgument(
            "sun direction must have a non-zero y component".to_string(),
        ));
    }
    Ok(())
}
