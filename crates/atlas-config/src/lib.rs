//! Configuration for map-driven world generation.
//!
//! Settings persist to disk as RON files, accept CLI overrides via clap, and
//! deserialize with per-section defaults so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, GenerationConfig, MAX_WORLD_SCALE, MIN_WORLD_SCALE, MapsConfig,
};
pub use error::ConfigError;
