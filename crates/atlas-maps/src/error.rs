//! Errors raised while loading control maps.

use std::path::PathBuf;

/// Failure to obtain a control map raster.
///
/// Every variant is fatal for the feature that needs the map: there is no
/// fallback and no retry.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The resolved map file does not exist.
    #[error("{name} map not found at {}", path.display())]
    NotFound {
        /// Logical map name.
        name: String,
        /// Resolved file path.
        path: PathBuf,
    },

    /// The map file exists but could not be decoded.
    #[error("failed to decode {name} map: {source}")]
    Decode {
        /// Logical map name.
        name: String,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The decoded map has zero width or height.
    #[error("{name} map has no pixels")]
    Empty {
        /// Logical map name.
        name: String,
    },
}

impl MapError {
    /// Logical name of the map that failed.
    pub fn map_name(&self) -> &str {
        match self {
            Self::NotFound { name, .. } | Self::Decode { name, .. } | Self::Empty { name } => name,
        }
    }
}
