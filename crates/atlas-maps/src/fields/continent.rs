use crate::error::MapError;
use crate::field::Field2D;
use crate::raster::{MapLocator, MapName, RasterCache};
use crate::sampler::RasterSampler;
use crate::units::WorldScale;

/// Continent values at or below this are ocean.
pub const OCEAN_THRESHOLD: f64 = 4.4;

/// Continent value in `[0, 10]` for a brightness in `[0, 255]`.
#[inline]
pub fn continent_value(brightness: f64) -> f64 {
    brightness / 255.0 * 10.0
}

#[inline]
pub fn is_ocean_value(value: f64) -> bool {
    value <= OCEAN_THRESHOLD
}

/// Land/ocean outline from `continent.png`.
#[derive(Clone, Debug)]
pub struct ContinentField {
    sampler: RasterSampler,
}

impl ContinentField {
    pub fn new(sampler: RasterSampler) -> Self {
        Self { sampler }
    }

    pub fn load(
        cache: &RasterCache,
        locator: &dyn MapLocator,
        scale: WorldScale,
    ) -> Result<Self, MapError> {
        RasterSampler::load(cache, locator, MapName::Continent.as_str(), scale).map(Self::new)
    }

    pub fn sampler(&self) -> &RasterSampler {
        &self.sampler
    }

    /// Interpolated continent value at grid point `(x, z)`.
    pub fn continent(&self, x: f64, z: f64) -> f64 {
        continent_value(self.sampler.sample(x, z))
    }

    pub fn is_ocean(&self, x: f64, z: f64) -> bool {
        is_ocean_value(self.continent(x, z))
    }

    /// Whether raster pixel `(px, pz)` is ocean. Pixels outside the raster are not.
    pub fn is_ocean_pixel(&self, px: i64, pz: i64) -> bool {
        let raster = self.sampler.raster();
        if px < 0 || pz < 0 || px >= raster.width() as i64 || pz >= raster.height() as i64 {
            return false;
        }
        is_ocean_value(continent_value(self.sampler.brightness_at(px, pz)))
    }
}

impl Field2D for ContinentField {
    fn value(&self, x: f64, z: f64) -> f64 {
        self.continent(x, z)
    }
}
