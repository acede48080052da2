//! Block and grid units, and the world extent covered by the control maps.

/// Width of one generation grid cell, in blocks.
pub const GRID_WIDTH_IN_BLOCKS: i32 = 128;

/// Convert a length in blocks to grid units.
#[inline]
pub fn blocks_to_grid(blocks: i32) -> f64 {
    blocks as f64 / GRID_WIDTH_IN_BLOCKS as f64
}

/// Half-extent of the world covered by every control map, in blocks.
///
/// The raster center sits on the world origin and its edges sit at
/// `±radius`. All fields sampled together must share one `WorldScale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldScale {
    radius_blocks_x: i32,
    radius_blocks_z: i32,
}

impl WorldScale {
    /// Build from world radii in blocks. Radii below one block are raised to one.
    pub fn from_radii(radius_blocks_x: i32, radius_blocks_z: i32) -> Self {
        Self {
            radius_blocks_x: radius_blocks_x.max(1),
            radius_blocks_z: radius_blocks_z.max(1),
        }
    }

    /// Build from world diameters in blocks (the configured world scales).
    pub fn from_diameters(horizontal_blocks: i32, vertical_blocks: i32) -> Self {
        Self::from_radii(horizontal_blocks / 2, vertical_blocks / 2)
    }

    /// Horizontal radius in blocks.
    pub fn radius_blocks_x(&self) -> i32 {
        self.radius_blocks_x
    }

    /// Vertical radius in blocks.
    pub fn radius_blocks_z(&self) -> i32 {
        self.radius_blocks_z
    }

    /// Horizontal radius in grid units.
    pub fn radius_grid_x(&self) -> f64 {
        blocks_to_grid(self.radius_blocks_x)
    }

    /// Vertical radius in grid units.
    pub fn radius_grid_z(&self) -> f64 {
        blocks_to_grid(self.radius_blocks_z)
    }
}

impl From<&atlas_config::GenerationConfig> for WorldScale {
    fn from(config: &atlas_config::GenerationConfig) -> Self {
        Self::from_diameters(config.horizontal_world_scale, config.vertical_world_scale)
    }
}
