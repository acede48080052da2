//! World-to-raster coordinate mapping and bilinear sampling.
//!
//! The raster center sits on the world origin. World coordinates (in grid
//! units) are clamped to the world radius, mapped linearly into pixel space,
//! then clamped again to the raster bounds, so the outermost pixel row and
//! column extend outward indefinitely.

use std::sync::Arc;

use glam::DVec2;

use crate::error::MapError;
use crate::raster::{MapLocator, Raster, RasterCache, luma};
use crate::units::WorldScale;

/// The 4 pixels enclosing a fractional raster position.
///
/// Corner order everywhere is `00, 10, 01, 11` (x then z).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterCell {
    pub x0: u32,
    pub z0: u32,
    pub x1: u32,
    pub z1: u32,
    /// Fractional offset from `x0`, in `[0, 1)`.
    pub fx: f64,
    /// Fractional offset from `z0`, in `[0, 1)`.
    pub fz: f64,
}

impl RasterCell {
    /// Cell enclosing `image` for a raster of the given size.
    pub fn enclosing(image: DVec2, width: u32, height: u32) -> Self {
        let x0 = image.x.floor().max(0.0) as u32;
        let z0 = image.y.floor().max(0.0) as u32;
        Self {
            x0,
            z0,
            x1: (x0 + 1).min(width - 1),
            z1: (z0 + 1).min(height - 1),
            fx: image.x - x0 as f64,
            fz: image.y - z0 as f64,
        }
    }

    /// Bilinear weights in corner order. They sum to one.
    pub fn weights(&self) -> [f64; 4] {
        let (fx, fz) = (self.fx, self.fz);
        [
            (1.0 - fx) * (1.0 - fz),
            fx * (1.0 - fz),
            (1.0 - fx) * fz,
            fx * fz,
        ]
    }

    /// Pixel coordinates in corner order.
    pub fn corners(&self) -> [(u32, u32); 4] {
        [
            (self.x0, self.z0),
            (self.x1, self.z0),
            (self.x0, self.z1),
            (self.x1, self.z1),
        ]
    }

    /// Row-major buffer indices in corner order.
    pub fn indices(&self, width: u32) -> [usize; 4] {
        self.corners()
            .map(|(x, z)| z as usize * width as usize + x as usize)
    }

    /// Bilinear blend of corner values, lerping along x first.
    pub fn blend(&self, [v00, v10, v01, v11]: [f64; 4]) -> f64 {
        if v00 == v10 && v00 == v01 && v00 == v11 {
            return v00;
        }
        let top = v00 * (1.0 - self.fx) + v10 * self.fx;
        let bottom = v01 * (1.0 - self.fx) + v11 * self.fx;
        top * (1.0 - self.fz) + bottom * self.fz
    }

    /// Index (0..4) of the corner whose quadrant contains the sample point.
    pub fn nearest_corner(&self) -> usize {
        match (self.fx < 0.5, self.fz < 0.5) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        }
    }
}

/// Bilinear brightness sampler over one raster at one world scale.
#[derive(Clone, Debug)]
pub struct RasterSampler {
    raster: Arc<Raster>,
    scale: WorldScale,
    center: DVec2,
    pixels_per_grid: DVec2,
    radius_grid: DVec2,
}

impl RasterSampler {
    pub fn new(raster: Arc<Raster>, scale: WorldScale) -> Self {
        let width = raster.width() as f64;
        let height = raster.height() as f64;
        let radius_grid = DVec2::new(scale.radius_grid_x(), scale.radius_grid_z());
        Self {
            center: DVec2::new(width / 2.0, height / 2.0),
            pixels_per_grid: DVec2::new(width, height) / (2.0 * radius_grid),
            radius_grid,
            scale,
            raster,
        }
    }

    /// Load `name` through `cache` and wrap it.
    pub fn load(
        cache: &RasterCache,
        locator: &dyn MapLocator,
        name: &str,
        scale: WorldScale,
    ) -> Result<Self, MapError> {
        let raster = cache.load(name, locator)?;
        tracing::info!(
            map = name,
            width = raster.width(),
            height = raster.height(),
            "Sampling map over {}x{} blocks",
            scale.radius_blocks_x() * 2,
            scale.radius_blocks_z() * 2
        );
        Ok(Self::new(raster, scale))
    }

    pub fn raster(&self) -> &Arc<Raster> {
        &self.raster
    }

    pub fn scale(&self) -> WorldScale {
        self.scale
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Map grid coordinates to a fractional raster position, clamped on both ends.
    pub fn world_to_image(&self, x: f64, z: f64) -> DVec2 {
        let world = DVec2::new(x, z).clamp(-self.radius_grid, self.radius_grid);
        let image = self.center + world * self.pixels_per_grid;
        let max = DVec2::new(
            (self.raster.width() - 1) as f64,
            (self.raster.height() - 1) as f64,
        );
        image.clamp(DVec2::ZERO, max)
    }

    /// Cell enclosing the grid point `(x, z)`.
    pub fn cell(&self, x: f64, z: f64) -> RasterCell {
        RasterCell::enclosing(
            self.world_to_image(x, z),
            self.raster.width(),
            self.raster.height(),
        )
    }

    /// Bilinearly interpolated brightness at grid point `(x, z)`, in `[0, 255]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let cell = self.cell(x, z);
        cell.blend(cell.corners().map(|(px, pz)| luma(self.raster.pixel(px, pz))))
    }

    /// The 4 raw corner pixels around `(x, z)` and the cell they came from.
    pub fn sample_pixels(&self, x: f64, z: f64) -> ([u32; 4], RasterCell) {
        let cell = self.cell(x, z);
        let pixels = cell.corners().map(|(px, pz)| self.raster.pixel(px, pz));
        (pixels, cell)
    }

    /// Brightness of a single pixel, `0.0` outside the raster.
    pub fn brightness_at(&self, px: i64, pz: i64) -> f64 {
        self.raster.brightness_at(px, pz)
    }
}
