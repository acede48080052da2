//! Köppen classification, the inverse parameter cache, and the continuous
//! temperature/rainfall/rainfall-variance fields derived from the Köppen map.

mod adapter;
mod classification;
mod parameter_cache;

pub use adapter::{ClimateIndexNoise, ClimateParameter, KoppenClimateField, KoppenClimateFields};
pub use classification::{ClimateClassifier, Hemisphere, KoppenClimate, KoppenRule, classify};
pub use parameter_cache::{
    BucketSummary, ClimateBucket, DEFAULT_PARAMETERS, KoppenParameterCache, ParameterAxis,
    ParameterCombination,
};
