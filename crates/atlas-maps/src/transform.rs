//! Field transforms: offset, quarter-turn rotation and looping, plus the
//! pole-offset latitude used to pick a hemisphere.

use std::f64::consts::FRAC_PI_2;

use crate::climate::Hemisphere;
use crate::field::Field2D;
use crate::units::blocks_to_grid;

/// A rotation snapped to a quarter turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Snap any angle in degrees to the nearest quarter turn.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            d if d <= 45 || d > 315 => Self::None,
            d if d <= 135 => Self::Quarter,
            d if d <= 225 => Self::Half,
            _ => Self::ThreeQuarter,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    #[inline]
    pub fn apply(self, x: f64, z: f64) -> (f64, f64) {
        match self {
            Self::None => (x, z),
            Self::Quarter => (z, -x),
            Self::Half => (-x, -z),
            Self::ThreeQuarter => (-z, x),
        }
    }
}

/// Wraps a field, transforming query coordinates before sampling it.
///
/// Coordinates are offset, then rotated, then wrapped into `[0, period)` on
/// each looping axis.
#[derive(Clone, Debug)]
pub struct TransformedField<F> {
    inner: F,
    offset: (f64, f64),
    rotation: Rotation,
    period: (Option<f64>, Option<f64>),
}

impl<F: Field2D> TransformedField<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            offset: (0.0, 0.0),
            rotation: Rotation::None,
            period: (None, None),
        }
    }

    /// Shift by a block offset.
    pub fn with_offset(mut self, x_blocks: i32, z_blocks: i32) -> Self {
        self.offset = (blocks_to_grid(x_blocks), blocks_to_grid(z_blocks));
        self
    }

    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = Rotation::from_degrees(degrees);
        self
    }

    /// Loop along X with a period in blocks. Non-positive periods disable it.
    pub fn with_loop_x(mut self, period_blocks: i32) -> Self {
        self.period.0 = (period_blocks > 0).then(|| blocks_to_grid(period_blocks));
        self
    }

    /// Loop along Z with a period in blocks. Non-positive periods disable it.
    pub fn with_loop_z(mut self, period_blocks: i32) -> Self {
        self.period.1 = (period_blocks > 0).then(|| blocks_to_grid(period_blocks));
        self
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Grid coordinates actually sampled for `(x, z)`.
    pub fn transform(&self, x: f64, z: f64) -> (f64, f64) {
        let (rx, rz) = self.rotation.apply(x + self.offset.0, z + self.offset.1);
        let wrap = |v: f64, period: Option<f64>| period.map_or(v, |p| v.rem_euclid(p));
        (wrap(rx, self.period.0), wrap(rz, self.period.1))
    }
}

impl<F: Field2D> Field2D for TransformedField<F> {
    fn value(&self, x: f64, z: f64) -> f64 {
        let (x, z) = self.transform(x, z);
        self.inner.value(x, z)
    }
}

// ---------------------------------------------------------------------------
// Latitude
// ---------------------------------------------------------------------------

/// Triangle wave with the given amplitude, midpoint and frequency.
pub fn triangle_wave(amplitude: f64, midpoint: f64, frequency: f64, value: f64) -> f64 {
    midpoint
        + amplitude
            * ((4.0 * frequency * value + 1.0 - 4.0 * (frequency * value + 0.75).floor()).abs()
                - 1.0)
}

/// Latitude in radians at block `z`, after shifting by the pole offset.
///
/// `hemisphere_scale` is the equator-to-pole distance in blocks. Without
/// looping the result is clamped to `[-π/2, π/2]`.
pub fn latitude(z: i32, hemisphere_scale: f64, pole_offset: i32, looping: bool) -> f64 {
    let shifted = z as f64 + pole_offset as f64;
    let latitude = triangle_wave(
        -FRAC_PI_2,
        0.0,
        1.0 / (4.0 * hemisphere_scale),
        shifted - 0.5 * hemisphere_scale,
    );
    if !looping && hemisphere_scale > 0.0 {
        latitude.clamp(-FRAC_PI_2, FRAC_PI_2)
    } else {
        latitude
    }
}

/// Hemisphere at block `z`: northern where the latitude is non-negative.
pub fn hemisphere(z: i32, hemisphere_scale: f64, pole_offset: i32, looping: bool) -> Hemisphere {
    if latitude(z, hemisphere_scale, pole_offset, looping) >= 0.0 {
        Hemisphere::Northern
    } else {
        Hemisphere::Southern
    }
}

pub fn is_northern_hemisphere(z: i32, hemisphere_scale: f64, pole_offset: i32, looping: bool) -> bool {
    hemisphere(z, hemisphere_scale, pole_offset, looping) == Hemisphere::Northern
}
