use crate::error::MapError;
use crate::raster::{MapLocator, MapName, RasterCache};
use crate::sampler::RasterSampler;
use crate::units::WorldScale;

/// Brightness of sea level in `altitude.png`.
pub const SEA_LEVEL_BRIGHTNESS: f64 = 128.0;
pub const MAX_LAND_HEIGHT: i32 = 24;
pub const MAX_OCEAN_DEPTH: i32 = 15;
const MIN_OCEAN_DEPTH: f64 = 1.0;

/// Land height for a brightness: `[128, 255]` maps linearly onto `[0, 24]`.
pub fn land_height_from_brightness(brightness: f64) -> i32 {
    if brightness < SEA_LEVEL_BRIGHTNESS {
        return 0;
    }
    let normalized = (brightness - SEA_LEVEL_BRIGHTNESS) / (255.0 - SEA_LEVEL_BRIGHTNESS);
    let height = normalized * MAX_LAND_HEIGHT as f64;
    (height.round() as i32).clamp(0, MAX_LAND_HEIGHT)
}

/// Ocean depth for a brightness: below sea level, darker is deeper.
pub fn ocean_depth_from_brightness(brightness: f64) -> i32 {
    if brightness >= SEA_LEVEL_BRIGHTNESS {
        return 0;
    }
    let normalized = 1.0 - (brightness + 1.0) / SEA_LEVEL_BRIGHTNESS;
    let depth = MIN_OCEAN_DEPTH + normalized * (MAX_OCEAN_DEPTH as f64 - MIN_OCEAN_DEPTH);
    (depth.round() as i32).clamp(0, MAX_OCEAN_DEPTH)
}

/// Land height and ocean depth from one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Altitude {
    /// `0..=24`
    pub land_height: i32,
    /// `0..=15`
    pub ocean_depth: i32,
}

impl Altitude {
    pub fn from_brightness(brightness: f64) -> Self {
        Self {
            land_height: land_height_from_brightness(brightness),
            ocean_depth: ocean_depth_from_brightness(brightness),
        }
    }
}

/// Base land height and ocean depth from `altitude.png`.
#[derive(Clone, Debug)]
pub struct AltitudeField {
    sampler: RasterSampler,
}

impl AltitudeField {
    pub fn new(sampler: RasterSampler) -> Self {
        Self { sampler }
    }

    pub fn load(
        cache: &RasterCache,
        locator: &dyn MapLocator,
        scale: WorldScale,
    ) -> Result<Self, MapError> {
        RasterSampler::load(cache, locator, MapName::Altitude.as_str(), scale).map(Self::new)
    }

    pub fn sampler(&self) -> &RasterSampler {
        &self.sampler
    }

    pub fn land_height(&self, x: f64, z: f64) -> i32 {
        land_height_from_brightness(self.sampler.sample(x, z))
    }

    pub fn ocean_depth(&self, x: f64, z: f64) -> i32 {
        ocean_depth_from_brightness(self.sampler.sample(x, z))
    }

    /// Both values from a single sample.
    pub fn altitude(&self, x: f64, z: f64) -> Altitude {
        Altitude::from_brightness(self.sampler.sample(x, z))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::raster::Raster;

    fn uniform(value: u8) -> AltitudeField {
        let raster = Raster::from_gray_fn(4, 4, |_, _| value);
        AltitudeField::new(RasterSampler::new(
            Arc::new(raster),
            WorldScale::from_radii(256, 256),
        ))
    }

    #[test]
    fn test_sea_level_is_flat() {
        let altitude = uniform(128).altitude(0.0, 0.0);
        assert_eq!(altitude, Altitude { land_height: 0, ocean_depth: 0 });
    }

    #[test]
    fn test_brightest_is_highest_land() {
        let field = uniform(255);
        assert_eq!(field.land_height(0.3, -0.7), 24);
        assert_eq!(field.ocean_depth(0.3, -0.7), 0);
    }

    #[test]
    fn test_darkest_is_deepest_ocean() {
        let field = uniform(0);
        assert_eq!(field.ocean_depth(-1.2, 1.9), 15);
        assert_eq!(field.land_height(-1.2, 1.9), 0);
    }

    #[test]
    fn test_just_below_sea_level_is_shallow() {
        assert_eq!(ocean_depth_from_brightness(127.0), 1);
        assert_eq!(land_height_from_brightness(127.0), 0);
    }

    #[test]
    fn test_outputs_stay_in_range() {
        for b in 0..=255 {
            let a = Altitude::from_brightness(b as f64);
            assert!((0..=MAX_LAND_HEIGHT).contains(&a.land_height), "b={b}: {a:?}");
            assert!((0..=MAX_OCEAN_DEPTH).contains(&a.ocean_depth), "b={b}: {a:?}");
            assert!(a.land_height == 0 || a.ocean_depth == 0, "b={b}: both set");
        }
    }

    #[test]
    fn test_combined_matches_separate() {
        let raster = Raster::from_gray_fn(8, 8, |x, z| (x * 30 + z * 2) as u8);
        let field = AltitudeField::new(RasterSampler::new(
            Arc::new(raster),
            WorldScale::from_radii(512, 512),
        ));
        for (x, z) in [(0.0, 0.0), (-3.3, 1.1), (2.7, -2.2), (40.0, 40.0)] {
            let combined = field.altitude(x, z);
            assert_eq!(combined.land_height, field.land_height(x, z));
            assert_eq!(combined.ocean_depth, field.ocean_depth(x, z));
        }
    }
}
