use std::fmt;

use crate::error::MapError;
use crate::field::Field2D;
use crate::raster::{MapLocator, MapName, RasterCache};
use crate::sampler::RasterSampler;
use crate::units::WorldScale;

/// Stepped hotspot age. Higher codes are older, except `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum HotspotAge {
    #[default]
    None,
    Active,
    Dormant,
    Extinct,
    Ancient,
}

impl HotspotAge {
    /// Band a brightness into an age. The bands are not interpolated.
    pub fn from_brightness(brightness: f64) -> Self {
        if brightness <= 32.0 {
            Self::None
        } else if brightness <= 95.5 {
            Self::Ancient
        } else if brightness <= 159.5 {
            Self::Extinct
        } else if brightness <= 223.5 {
            Self::Dormant
        } else {
            Self::Active
        }
    }

    /// Host age code: 0 none, 1 active, 2 dormant, 3 extinct, 4 ancient.
    pub fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Active => 1,
            Self::Dormant => 2,
            Self::Extinct => 3,
            Self::Ancient => 4,
        }
    }
}

impl fmt::Display for HotspotAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Active => "active",
            Self::Dormant => "dormant",
            Self::Extinct => "extinct",
            Self::Ancient => "ancient",
        };
        f.write_str(name)
    }
}

/// Volcanic hotspots from `hotspots.png`.
///
/// As a [`Field2D`] this is the hotspot intensity in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct HotspotField {
    sampler: RasterSampler,
}

impl HotspotField {
    pub fn new(sampler: RasterSampler) -> Self {
        Self { sampler }
    }

    pub fn load(
        cache: &RasterCache,
        locator: &dyn MapLocator,
        scale: WorldScale,
    ) -> Result<Self, MapError> {
        RasterSampler::load(cache, locator, MapName::Hotspots.as_str(), scale).map(Self::new)
    }

    pub fn sampler(&self) -> &RasterSampler {
        &self.sampler
    }

    pub fn intensity(&self, x: f64, z: f64) -> f64 {
        self.sampler.sample(x, z) / 255.0
    }

    pub fn age(&self, x: f64, z: f64) -> HotspotAge {
        HotspotAge::from_brightness(self.sampler.sample(x, z))
    }

    pub fn has_hotspot(&self, x: f64, z: f64) -> bool {
        self.age(x, z) != HotspotAge::None
    }

    /// The stepped age code as its own field.
    pub fn age_field(&self) -> HotspotAgeField {
        HotspotAgeField(self.clone())
    }
}

impl Field2D for HotspotField {
    fn value(&self, x: f64, z: f64) -> f64 {
        self.intensity(x, z)
    }
}

/// [`HotspotField`] viewed through its age code.
#[derive(Clone, Debug)]
pub struct HotspotAgeField(HotspotField);

impl Field2D for HotspotAgeField {
    fn value(&self, x: f64, z: f64) -> f64 {
        self.0.age(x, z).code() as f64
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::raster::Raster;

    fn uniform(value: u8) -> HotspotField {
        let raster = Raster::from_gray_fn(2, 2, |_, _| value);
        HotspotField::new(RasterSampler::new(
            Arc::new(raster),
            WorldScale::from_radii(128, 128),
        ))
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(uniform(32).age(0.0, 0.0).code(), 0);
        assert_eq!(uniform(33).age(0.0, 0.0).code(), 4);
        assert_eq!(uniform(95).age(0.0, 0.0).code(), 4);
        assert_eq!(uniform(96).age(0.0, 0.0).code(), 3);
        assert_eq!(uniform(159).age(0.0, 0.0).code(), 3);
        assert_eq!(uniform(160).age(0.0, 0.0).code(), 2);
        assert_eq!(uniform(224).age(0.0, 0.0).code(), 1);
    }

    #[test]
    fn test_age_codes_stay_in_range() {
        for b in 0..=255 {
            let code = HotspotAge::from_brightness(b as f64).code();
            assert!(code <= 4, "brightness {b} gave {code}");
        }
    }

    #[test]
    fn test_has_hotspot() {
        assert!(!uniform(0).has_hotspot(0.5, 0.5));
        assert!(uniform(200).has_hotspot(0.5, 0.5));
    }

    #[test]
    fn test_intensity_and_age_fields() {
        let field = uniform(255);
        assert!((field.value(0.0, 0.0) - 1.0).abs() < 1e-12);
        assert_eq!(field.age_field().value(0.0, 0.0), 1.0);
    }
}
