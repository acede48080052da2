use std::sync::Arc;

use crate::climate::KoppenClimate;
use crate::error::MapError;
use crate::raster::{MapLocator, MapName, RasterCache};
use crate::sampler::{RasterCell, RasterSampler};
use crate::units::WorldScale;

/// The 4 corner classes around a query point and their bilinear weights.
///
/// Corner order is `00, 10, 01, 11`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimateInterpolation {
    pub climates: [KoppenClimate; 4],
    pub weights: [f64; 4],
}

impl ClimateInterpolation {
    /// Weighted sum of one value per corner.
    pub fn blend(&self, values: [f64; 4]) -> f64 {
        self.weights.iter().zip(values).map(|(w, v)| w * v).sum()
    }
}

/// Köppen classes painted into `koppen.png`.
///
/// Every pixel is resolved to a class once, at construction.
#[derive(Clone, Debug)]
pub struct KoppenField {
    sampler: RasterSampler,
    labels: Arc<[KoppenClimate]>,
}

impl KoppenField {
    pub fn new(sampler: RasterSampler) -> Self {
        let labels = sampler
            .raster()
            .pixels()
            .iter()
            .map(|&rgb| KoppenClimate::from_rgb(rgb))
            .collect();
        Self { sampler, labels }
    }

    pub fn load(
        cache: &RasterCache,
        locator: &dyn MapLocator,
        scale: WorldScale,
    ) -> Result<Self, MapError> {
        RasterSampler::load(cache, locator, MapName::Koppen.as_str(), scale).map(Self::new)
    }

    pub fn sampler(&self) -> &RasterSampler {
        &self.sampler
    }

    /// Class of raster pixel `(px, pz)`. Caller guarantees it is in bounds.
    pub fn climate_at_pixel(&self, px: u32, pz: u32) -> KoppenClimate {
        self.labels[pz as usize * self.sampler.width() as usize + px as usize]
    }

    fn corner_climates(&self, cell: &RasterCell) -> [KoppenClimate; 4] {
        cell.indices(self.sampler.width()).map(|i| self.labels[i])
    }

    /// Single class at `(x, z)`: the shared class if all 4 corners agree,
    /// otherwise the class of the corner whose quadrant holds the point.
    pub fn climate(&self, x: f64, z: f64) -> KoppenClimate {
        let cell = self.sampler.cell(x, z);
        let corners = self.corner_climates(&cell);
        if corners.iter().all(|&c| c == corners[0]) {
            return corners[0];
        }
        corners[cell.nearest_corner()]
    }

    /// Corner classes and weights at `(x, z)`, for blending continuous values.
    pub fn interpolation(&self, x: f64, z: f64) -> ClimateInterpolation {
        let cell = self.sampler.cell(x, z);
        ClimateInterpolation {
            climates: self.corner_climates(&cell),
            weights: cell.weights(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Raster;

    fn field(raster: Raster, radius_blocks: i32) -> KoppenField {
        KoppenField::new(RasterSampler::new(
            Arc::new(raster),
            WorldScale::from_radii(radius_blocks, radius_blocks),
        ))
    }

    /// Left half AF, right half BWH, over a 4x4 raster with one pixel per grid unit.
    fn split() -> KoppenField {
        let af = KoppenClimate::Af.color();
        let bwh = KoppenClimate::BWh.color();
        field(Raster::from_rgb_fn(4, 4, |x, _| if x < 2 { af } else { bwh }), 256)
    }

    #[test]
    fn test_uniform_patch_is_unambiguous() {
        let af = KoppenClimate::Af.color();
        let koppen = field(Raster::from_rgb_fn(2, 2, |_, _| af), 128);
        for (x, z) in [(0.0, 0.0), (-0.4, 0.3), (0.25, -0.9), (0.99, 0.99)] {
            assert_eq!(koppen.climate(x, z), KoppenClimate::Af);
            let interp = koppen.interpolation(x, z);
            assert_eq!(interp.climates, [KoppenClimate::Af; 4]);
            let sum: f64 = interp.weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "weights sum to {sum} at ({x}, {z})");
        }
    }

    #[test]
    fn test_mixed_cell_picks_nearest_corner() {
        let koppen = split();
        // Image x = 1.3: corners at columns 1 (AF) and 2 (BWH).
        assert_eq!(koppen.climate(-0.7, 0.0), KoppenClimate::Af);
        // Image x = 1.6: closer to column 2.
        assert_eq!(koppen.climate(-0.4, 0.0), KoppenClimate::BWh);
    }

    #[test]
    fn test_interpolation_weights_follow_offsets() {
        let koppen = split();
        let interp = koppen.interpolation(-0.75, 0.0);
        assert_eq!(
            interp.climates,
            [
                KoppenClimate::Af,
                KoppenClimate::BWh,
                KoppenClimate::Af,
                KoppenClimate::BWh
            ]
        );
        // fx = 0.25, fz = 0
        assert!((interp.weights[0] - 0.75).abs() < 1e-9);
        assert!((interp.weights[1] - 0.25).abs() < 1e-9);
        assert!(interp.weights[2].abs() < 1e-9);
        assert!((interp.blend([1.0, 5.0, 1.0, 5.0]) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_off_palette_pixels_snap_to_nearest() {
        let koppen = field(Raster::from_rgb_fn(1, 1, |_, _| [185, 185, 195]), 128);
        assert_eq!(koppen.climate_at_pixel(0, 0), KoppenClimate::Et);
        assert_eq!(koppen.climate(5.0, 5.0), KoppenClimate::Et);
    }
}
