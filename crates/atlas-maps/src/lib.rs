//! Map-driven terrain and climate fields.
//!
//! Control maps (`continent`, `altitude`, `hotspots` and `koppen` PNGs) are
//! decoded once, stretched over the world extent by a [`RasterSampler`], and
//! read back as scalar fields in grid coordinates. The continent map also
//! feeds two distance transforms, and the Köppen map is turned into
//! continuous temperature, rainfall and rainfall variance through an inverse
//! classification cache.
//!
//! [`WorldSession`] owns every cache and builds the enabled fields from a
//! [`GenerationConfig`](atlas_config::GenerationConfig).

mod annotate;
mod error;
mod field;
mod raster;
mod sampler;
mod session;
mod transform;
mod units;

pub mod climate;
pub mod distance;
pub mod fields;

pub use annotate::{
    BIOME_ALTITUDE_WIDTH, Region, RegionPoint, annotate_all, annotate_altitude,
    annotate_biome_altitude, annotate_climate, annotate_distance_to_ocean,
    annotate_distance_to_west_coast, annotate_hotspots,
};
pub use error::MapError;
pub use field::Field2D;
pub use raster::{
    MapDirectory, MapLocator, MapName, Raster, RasterCache, luma, pack_rgb, unpack_rgb,
};
pub use sampler::{RasterCell, RasterSampler};
pub use session::{CacheSlot, WorldFields, WorldSession};
pub use transform::{
    Rotation, TransformedField, hemisphere, is_northern_hemisphere, latitude, triangle_wave,
};
pub use units::{GRID_WIDTH_IN_BLOCKS, WorldScale, blocks_to_grid};
