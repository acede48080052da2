//! Continuous climate values from discrete Köppen classes.
//!
//! At each query point the 4 surrounding map classes each contribute a
//! parameter triple picked from their sorted bucket by a smooth, seeded index
//! field. The triples are blended with the map's bilinear weights.

use std::sync::Arc;

use noise::{NoiseFn, OpenSimplex};

use super::parameter_cache::{KoppenParameterCache, ParameterCombination};
use crate::field::Field2D;
use crate::fields::KoppenField;

/// Offset, in grid units, of the 4 per-corner index samples.
const CORNER_OFFSET: f64 = 0.1;

/// How far a corner index may drift from the base index.
const CORNER_SPREAD: f64 = 0.08;

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

/// Seeded low-octave noise in `[0, 1]` that picks positions within buckets.
#[derive(Clone, Debug)]
pub struct ClimateIndexNoise {
    noise: OpenSimplex,
    octaves: u32,
    frequency: f64,
}

impl ClimateIndexNoise {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: OpenSimplex::new((seed ^ (seed >> 32)) as u32),
            octaves: 2,
            frequency: 0.15,
        }
    }

    /// Raw fBm sample mapped from `[-1, 1]` to `[0, 1]`.
    pub fn raw(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = self.frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
            norm += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        ((total / norm + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Smoothed base index at `(x, z)`.
    pub fn base_index(&self, x: f64, z: f64) -> f64 {
        smoothstep(self.raw(x, z).clamp(0.0, 1.0))
    }

    /// One index per corner (order `00, 10, 01, 11`), each a small perturbation
    /// of the shared base index.
    pub fn corner_indices(&self, x: f64, z: f64) -> [f64; 4] {
        let base = self.base_index(x, z);
        let d = CORNER_OFFSET;
        [(-d, -d), (d, -d), (-d, d), (d, d)].map(|(dx, dz)| {
            let jitter = (self.raw(x + dx, z + dz) - 0.5) * CORNER_SPREAD;
            smoothstep((base + jitter).clamp(0.0, 1.0))
        })
    }
}

/// Which component of a parameter triple a field reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClimateParameter {
    Temperature,
    Rainfall,
    RainfallVariance,
}

impl ClimateParameter {
    pub fn extract(self, parameters: ParameterCombination) -> f64 {
        match self {
            Self::Temperature => parameters.temperature as f64,
            Self::Rainfall => parameters.rainfall as f64,
            Self::RainfallVariance => parameters.rainfall_variance as f64,
        }
    }
}

/// One climate parameter derived from the Köppen map.
#[derive(Clone, Debug)]
pub struct KoppenClimateField {
    koppen: KoppenField,
    cache: Arc<KoppenParameterCache>,
    index: Arc<ClimateIndexNoise>,
    parameter: ClimateParameter,
}

impl KoppenClimateField {
    pub fn new(
        koppen: KoppenField,
        cache: Arc<KoppenParameterCache>,
        index: Arc<ClimateIndexNoise>,
        parameter: ClimateParameter,
    ) -> Self {
        Self {
            koppen,
            cache,
            index,
            parameter,
        }
    }

    pub fn parameter(&self) -> ClimateParameter {
        self.parameter
    }

    /// Per-corner parameter triples and the weights to blend them with.
    fn corner_parameters(&self, x: f64, z: f64) -> ([ParameterCombination; 4], [f64; 4]) {
        let interpolation = self.koppen.interpolation(x, z);
        let indices = self.index.corner_indices(x, z);
        let corners = std::array::from_fn(|i| {
            self.cache
                .parameters_by_index(interpolation.climates[i], indices[i])
        });
        (corners, interpolation.weights)
    }

    /// All three blended parameters at `(x, z)`.
    pub fn parameters(&self, x: f64, z: f64) -> [f64; 3] {
        let (corners, weights) = self.corner_parameters(x, z);
        [
            ClimateParameter::Temperature,
            ClimateParameter::Rainfall,
            ClimateParameter::RainfallVariance,
        ]
        .map(|p| {
            corners
                .iter()
                .zip(weights)
                .map(|(c, w)| p.extract(*c) * w)
                .sum()
        })
    }
}

impl Field2D for KoppenClimateField {
    fn value(&self, x: f64, z: f64) -> f64 {
        let (corners, weights) = self.corner_parameters(x, z);
        corners
            .iter()
            .zip(weights)
            .map(|(c, w)| self.parameter.extract(*c) * w)
            .sum()
    }
}

/// Temperature, rainfall and rainfall variance sharing one index noise.
#[derive(Clone, Debug)]
pub struct KoppenClimateFields {
    pub temperature: KoppenClimateField,
    pub rainfall: KoppenClimateField,
    pub rainfall_variance: KoppenClimateField,
}

impl KoppenClimateFields {
    pub fn new(koppen: &KoppenField, cache: Arc<KoppenParameterCache>, seed: u64) -> Self {
        let index = Arc::new(ClimateIndexNoise::new(seed));
        let field = |parameter| {
            KoppenClimateField::new(koppen.clone(), Arc::clone(&cache), Arc::clone(&index), parameter)
        };
        Self {
            temperature: field(ClimateParameter::Temperature),
            rainfall: field(ClimateParameter::Rainfall),
            rainfall_variance: field(ClimateParameter::RainfallVariance),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use super::*;
    use crate::climate::{Hemisphere, KoppenClimate, classify};
    use crate::raster::Raster;
    use crate::sampler::RasterSampler;
    use crate::units::WorldScale;

    const EPSILON: f64 = 1e-6;

    fn cache() -> Arc<KoppenParameterCache> {
        static CACHE: OnceLock<Arc<KoppenParameterCache>> = OnceLock::new();
        Arc::clone(CACHE.get_or_init(|| Arc::new(KoppenParameterCache::build())))
    }

    fn koppen(f: impl FnMut(u32, u32) -> [u8; 3]) -> KoppenField {
        KoppenField::new(RasterSampler::new(
            Arc::new(Raster::from_rgb_fn(8, 8, f)),
            WorldScale::from_radii(512, 512),
        ))
    }

    #[test]
    fn test_index_noise_is_bounded_and_deterministic() {
        let a = ClimateIndexNoise::new(7);
        let b = ClimateIndexNoise::new(7);
        for i in 0..50 {
            let (x, z) = (i as f64 * 0.37 - 9.0, i as f64 * -0.53 + 4.0);
            let raw = a.raw(x, z);
            assert!((0.0..=1.0).contains(&raw), "raw {raw}");
            assert_eq!(raw, b.raw(x, z));
            for index in a.corner_indices(x, z) {
                assert!((0.0..=1.0).contains(&index), "index {index}");
            }
        }
    }

    #[test]
    fn test_corner_indices_stay_near_base() {
        let noise = ClimateIndexNoise::new(99);
        for i in 0..50 {
            let (x, z) = (i as f64 * 1.7, i as f64 * 0.3);
            let base = noise.base_index(x, z);
            for index in noise.corner_indices(x, z) {
                assert!((index - base).abs() <= 0.25, "{index} vs {base}");
            }
        }
    }

    #[test]
    fn test_uniform_class_values_classify_back() {
        let color = KoppenClimate::Cfb.color();
        let fields = KoppenClimateFields::new(&koppen(|_, _| color), cache(), 1234);
        for i in 0..40 {
            let (x, z) = (i as f64 * 0.19 - 3.5, i as f64 * 0.11 - 2.0);
            let t = fields.temperature.value(x, z);
            let r = fields.rainfall.value(x, z);
            let v = fields.rainfall_variance.value(x, z);
            let got = classify(t as f32, r as f32, v as f32, Hemisphere::Northern);
            assert_eq!(got, KoppenClimate::Cfb, "({x}, {z}) -> ({t}, {r}, {v})");
        }
    }

    #[test]
    fn test_fields_share_one_index() {
        let color = KoppenClimate::Dfa.color();
        let fields = KoppenClimateFields::new(&koppen(|_, _| color), cache(), 55);
        for (x, z) in [(0.0, 0.0), (1.3, -2.7), (-3.9, 3.1)] {
            let [t, r, v] = fields.temperature.parameters(x, z);
            assert!((fields.temperature.value(x, z) - t).abs() < EPSILON);
            assert!((fields.rainfall.value(x, z) - r).abs() < EPSILON);
            assert!((fields.rainfall_variance.value(x, z) - v).abs() < EPSILON);
        }
    }

    #[test]
    fn test_values_blend_across_class_boundary() {
        let hot = KoppenClimate::Af.color();
        let cold = KoppenClimate::Ef.color();
        let fields =
            KoppenClimateFields::new(&koppen(|x, _| if x < 4 { hot } else { cold }), cache(), 3);
        let west = fields.temperature.value(-3.0, 0.0);
        let east = fields.temperature.value(3.0, 0.0);
        let middle = fields.temperature.value(-0.25, 0.0);
        assert!(west >= 18.0, "west {west}");
        assert!(east < -14.0, "east {east}");
        assert!(east < middle && middle < west, "{east} < {middle} < {west}");
    }

    #[test]
    fn test_same_seed_reproduces_values() {
        let color = KoppenClimate::BSk.color();
        let field = koppen(|_, _| color);
        let a = KoppenClimateFields::new(&field, cache(), 11);
        let b = KoppenClimateFields::new(&field, cache(), 11);
        for (x, z) in [(0.5, 0.5), (-2.0, 1.0)] {
            assert_eq!(a.rainfall.value(x, z), b.rainfall.value(x, z));
        }
    }
}
