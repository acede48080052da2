//! World session: owns every cache built from the control maps and builds
//! the enabled fields for one generation config.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use atlas_config::{Config, GenerationConfig};

use crate::climate::{Hemisphere, KoppenClimateFields, KoppenParameterCache};
use crate::distance::{OceanDistanceCache, WestCoastDistanceCache};
use crate::error::MapError;
use crate::field::Field2D;
use crate::fields::{AltitudeField, ContinentField, HotspotField, KoppenField};
use crate::raster::{MapDirectory, MapLocator, RasterCache};
use crate::transform;
use crate::units::WorldScale;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A lazily built, shareable value that can be dropped and rebuilt.
pub struct CacheSlot<T> {
    value: Mutex<Option<Arc<T>>>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }
}

impl<T> CacheSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the stored value, building it with `init` if the slot is empty.
    ///
    /// The lock is held while `init` runs, so concurrent callers build once.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut value = lock(&self.value);
        Arc::clone(value.get_or_insert_with(|| Arc::new(init())))
    }

    pub fn get(&self) -> Option<Arc<T>> {
        lock(&self.value).clone()
    }

    /// Drop the stored value. Returns `true` if there was one.
    pub fn clear(&self) -> bool {
        lock(&self.value).take().is_some()
    }
}

/// Fields built for one generation config. Disabled features are `None`.
#[derive(Clone, Debug)]
pub struct WorldFields {
    pub scale: WorldScale,
    pub continent: Option<ContinentField>,
    pub altitude: Option<AltitudeField>,
    pub hotspots: Option<HotspotField>,
    pub koppen: Option<KoppenField>,
    pub climate: Option<KoppenClimateFields>,
    pub ocean_distance: Option<Arc<OceanDistanceCache>>,
    pub west_coast_distance: Option<Arc<WestCoastDistanceCache>>,
    pub pole_offset: i32,
    pub pole_looping: bool,
}

impl WorldFields {
    /// Equator-to-pole distance in blocks.
    pub fn hemisphere_scale(&self) -> f64 {
        self.scale.radius_blocks_z() as f64
    }

    /// Latitude in radians at block `z`.
    pub fn latitude(&self, z_blocks: i32) -> f64 {
        transform::latitude(
            z_blocks,
            self.hemisphere_scale(),
            self.pole_offset,
            self.pole_looping,
        )
    }

    pub fn hemisphere(&self, z_blocks: i32) -> Hemisphere {
        transform::hemisphere(
            z_blocks,
            self.hemisphere_scale(),
            self.pole_offset,
            self.pole_looping,
        )
    }

    /// Every built field that fills a scalar noise slot, by slot name.
    pub fn noise_slots(&self) -> Vec<(&'static str, Box<dyn Field2D + '_>)> {
        let mut slots: Vec<(&'static str, Box<dyn Field2D + '_>)> = Vec::new();
        if let Some(continent) = &self.continent {
            slots.push(("continent", Box::new(continent)));
        }
        if let Some(hotspots) = &self.hotspots {
            slots.push(("hotspot_intensity", Box::new(hotspots)));
            slots.push(("hotspot_age", Box::new(hotspots.age_field())));
        }
        if let Some(climate) = &self.climate {
            slots.push(("temperature", Box::new(&climate.temperature)));
            slots.push(("rainfall", Box::new(&climate.rainfall)));
            slots.push(("rainfall_variance", Box::new(&climate.rainfall_variance)));
        }
        slots
    }
}

/// Owns the raster cache, both distance caches and the Köppen parameter cache.
///
/// Rasters and the parameter cache do not depend on the world scale and
/// survive scale changes. Distance caches are dropped when the scale changes.
pub struct WorldSession {
    locator: Box<dyn MapLocator>,
    rasters: RasterCache,
    ocean: CacheSlot<OceanDistanceCache>,
    west_coast: CacheSlot<WestCoastDistanceCache>,
    parameters: CacheSlot<KoppenParameterCache>,
    scale: Mutex<Option<WorldScale>>,
}

impl WorldSession {
    pub fn new(locator: impl MapLocator + 'static) -> Self {
        Self {
            locator: Box::new(locator),
            rasters: RasterCache::new(),
            ocean: CacheSlot::new(),
            west_coast: CacheSlot::new(),
            parameters: CacheSlot::new(),
            scale: Mutex::new(None),
        }
    }

    /// Session reading maps from the configured directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(MapDirectory::from(&config.maps))
    }

    pub fn locator(&self) -> &dyn MapLocator {
        self.locator.as_ref()
    }

    pub fn rasters(&self) -> &RasterCache {
        &self.rasters
    }

    /// The Köppen parameter cache, building it on first use.
    pub fn parameter_cache(&self) -> Arc<KoppenParameterCache> {
        self.parameters.get_or_init(KoppenParameterCache::build)
    }

    /// The parameter cache if it has been built.
    pub fn cached_parameters(&self) -> Option<Arc<KoppenParameterCache>> {
        self.parameters.get()
    }

    /// Build every enabled field for `config`.
    ///
    /// Fails with the first map that cannot be loaded; the error names it.
    pub fn build_fields(&self, config: &GenerationConfig) -> Result<WorldFields, MapError> {
        let scale = WorldScale::from(config);
        self.retain_scale(scale);
        let locator = self.locator();

        let continent = config
            .continent_from_map
            .then(|| ContinentField::load(&self.rasters, locator, scale))
            .transpose()?;
        let altitude = config
            .altitude_from_map
            .then(|| AltitudeField::load(&self.rasters, locator, scale))
            .transpose()?;
        let hotspots = config
            .hotspots_from_map
            .then(|| HotspotField::load(&self.rasters, locator, scale))
            .transpose()?;
        let koppen = config
            .koppen_from_map
            .then(|| KoppenField::load(&self.rasters, locator, scale))
            .transpose()?;

        let (ocean_distance, west_coast_distance) = match &continent {
            Some(continent) => (
                Some(self.ocean.get_or_init(|| OceanDistanceCache::build(continent))),
                Some(
                    self.west_coast
                        .get_or_init(|| WestCoastDistanceCache::build(continent)),
                ),
            ),
            None => (None, None),
        };

        let climate = koppen
            .as_ref()
            .map(|koppen| KoppenClimateFields::new(koppen, self.parameter_cache(), config.seed));

        Ok(WorldFields {
            scale,
            continent,
            altitude,
            hotspots,
            koppen,
            climate,
            ocean_distance,
            west_coast_distance,
            pole_offset: config.pole_offset,
            pole_looping: config.pole_looping,
        })
    }

    /// Drop the distance caches if they were built for another scale.
    fn retain_scale(&self, scale: WorldScale) {
        let mut current = lock(&self.scale);
        if current.is_some_and(|previous| previous != scale) {
            tracing::info!(
                radius_x = scale.radius_blocks_x(),
                radius_z = scale.radius_blocks_z(),
                "World scale changed"
            );
            self.clear_distances();
        }
        *current = Some(scale);
    }

    fn clear_distances(&self) {
        if self.ocean.clear() {
            tracing::info!("Cleared ocean distance cache");
        }
        if self.west_coast.clear() {
            tracing::info!("Cleared west coast distance cache");
        }
    }

    /// Drop everything tied to the current world: rasters and distance caches.
    pub fn clear_world(&self) {
        self.rasters.clear();
        self.clear_distances();
        *lock(&self.scale) = None;
    }

    /// Drop every cache, including the Köppen parameter cache.
    pub fn clear(&self) {
        self.clear_world();
        if self.parameters.clear() {
            tracing::info!("Cleared Köppen parameter cache");
        }
    }
}
