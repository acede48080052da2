//! Control map rasters: decoding, path resolution and the per-session image cache.
//!
//! A [`Raster`] is an immutable grid of packed `0xRRGGBB` pixels. Rasters are
//! decoded once per map name and shared through [`RasterCache`]; every sampler
//! built from the same map holds the same `Arc<Raster>`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;

use crate::error::MapError;

// ---------------------------------------------------------------------------
// Map names and path resolution
// ---------------------------------------------------------------------------

/// The four control maps, by logical name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapName {
    /// Land/ocean outline.
    Continent,
    /// Land height and ocean depth.
    Altitude,
    /// Volcanic hotspot age.
    Hotspots,
    /// Köppen climate classes painted with a fixed palette.
    Koppen,
}

impl MapName {
    /// All maps in load order.
    pub const ALL: [MapName; 4] = [
        MapName::Continent,
        MapName::Altitude,
        MapName::Hotspots,
        MapName::Koppen,
    ];

    /// Logical name, also the file stem of the map image.
    pub fn as_str(self) -> &'static str {
        match self {
            MapName::Continent => "continent",
            MapName::Altitude => "altitude",
            MapName::Hotspots => "hotspots",
            MapName::Koppen => "koppen",
        }
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a logical map name to a file path.
pub trait MapLocator: Send + Sync {
    /// Path of the image backing `name`. The file need not exist.
    fn locate(&self, name: &str) -> PathBuf;
}

/// Resolves maps as `<directory>/<name>.png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapDirectory {
    directory: PathBuf,
}

impl MapDirectory {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl MapLocator for MapDirectory {
    fn locate(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.png"))
    }
}

impl From<&atlas_config::MapsConfig> for MapDirectory {
    fn from(config: &atlas_config::MapsConfig) -> Self {
        Self::new(config.directory.clone())
    }
}

// ---------------------------------------------------------------------------
// Raster
// ---------------------------------------------------------------------------

/// Pack 8-bit channels into `0xRRGGBB`.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Split `0xRRGGBB` into channels.
#[inline]
pub fn unpack_rgb(rgb: u32) -> [u8; 3] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]
}

/// Perceptual brightness of a packed pixel, in `[0, 255]`.
///
/// `0.299 R + 0.587 G + 0.114 B`, summed in integers so gray pixels map to
/// their exact channel value.
#[inline]
pub fn luma(rgb: u32) -> f64 {
    let [r, g, b] = unpack_rgb(rgb);
    (299 * r as u32 + 587 * g as u32 + 114 * b as u32) as f64 / 1000.0
}

/// An immutable, non-empty RGB raster.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Decode the image at `path`. `name` is only used in errors.
    pub fn open(name: &str, path: &Path) -> Result<Self, MapError> {
        if !path.exists() {
            return Err(MapError::NotFound {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }
        let image = image::open(path).map_err(|source| MapError::Decode {
            name: name.to_string(),
            source,
        })?;
        Self::from_image(name, &image)
    }

    /// Convert an already decoded image. Alpha is discarded.
    pub fn from_image(name: &str, image: &image::DynamicImage) -> Result<Self, MapError> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(MapError::Empty {
                name: name.to_string(),
            });
        }
        let pixels = rgb
            .pixels()
            .map(|p| pack_rgb(p.0[0], p.0[1], p.0[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a raster from a per-pixel color function.
    ///
    /// Dimensions below one are raised to one.
    pub fn from_rgb_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for z in 0..height {
            for x in 0..width {
                let [r, g, b] = f(x, z);
                pixels.push(pack_rgb(r, g, b));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a grayscale raster from a per-pixel value function.
    pub fn from_gray_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        Self::from_rgb_fn(width, height, |x, z| {
            let v = f(x, z);
            [v, v, v]
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixel at `(x, z)`. Caller guarantees the coordinates are in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, z: u32) -> u32 {
        self.pixels[z as usize * self.width as usize + x as usize]
    }

    /// Brightness at `(x, z)`, or `0.0` outside the raster.
    #[inline]
    pub fn brightness_at(&self, x: i64, z: i64) -> f64 {
        if x < 0 || z < 0 || x >= self.width as i64 || z >= self.height as i64 {
            return 0.0;
        }
        luma(self.pixel(x as u32, z as u32))
    }

    /// Row-major packed pixels.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

// ---------------------------------------------------------------------------
// RasterCache
// ---------------------------------------------------------------------------

/// Decoded rasters keyed by map name.
///
/// Loading holds the lock across check and populate so a map is decoded at
/// most once until [`clear`](Self::clear).
#[derive(Default)]
pub struct RasterCache {
    entries: Mutex<HashMap<String, Arc<Raster>>>,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<Raster>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached raster for `name`, decoding it through `locator` on first use.
    pub fn load(&self, name: &str, locator: &dyn MapLocator) -> Result<Arc<Raster>, MapError> {
        let mut entries = self.entries();
        if let Some(raster) = entries.get(name) {
            tracing::debug!(map = name, "Using cached map");
            return Ok(Arc::clone(raster));
        }

        let path = locator.locate(name);
        let raster = match Raster::open(name, &path) {
            Ok(raster) => Arc::new(raster),
            Err(err) => {
                tracing::warn!(map = name, path = %path.display(), "Failed to load map: {err}");
                return Err(err);
            }
        };
        tracing::info!(
            map = name,
            width = raster.width(),
            height = raster.height(),
            "Decoded map from {}",
            path.display()
        );
        entries.insert(name.to_string(), Arc::clone(&raster));
        Ok(raster)
    }

    /// Install a raster directly, replacing any cached entry.
    pub fn insert(&self, name: &str, raster: Raster) -> Arc<Raster> {
        let raster = Arc::new(raster);
        self.entries().insert(name.to_string(), Arc::clone(&raster));
        raster
    }

    /// Cached raster for `name`, without loading.
    pub fn get(&self, name: &str) -> Option<Arc<Raster>> {
        self.entries().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every cached raster. Samplers already built keep their own `Arc`.
    pub fn clear(&self) {
        let mut entries = self.entries();
        let count = entries.len();
        entries.clear();
        tracing::info!(count, "Cleared map image cache");
    }
}
