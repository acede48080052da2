//! Map-derived fields: each wraps a [`RasterSampler`](crate::RasterSampler)
//! and turns sampled brightness (or palette color) into a physical value.

mod altitude;
mod continent;
mod hotspot;
mod koppen;

pub use altitude::{
    Altitude, AltitudeField, MAX_LAND_HEIGHT, MAX_OCEAN_DEPTH, SEA_LEVEL_BRIGHTNESS,
    land_height_from_brightness, ocean_depth_from_brightness,
};
pub use continent::{ContinentField, OCEAN_THRESHOLD, continent_value, is_ocean_value};
pub use hotspot::{HotspotAge, HotspotAgeField, HotspotField};
pub use koppen::{ClimateInterpolation, KoppenField};
