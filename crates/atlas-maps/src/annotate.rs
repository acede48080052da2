//! Per-point annotation passes that write map-derived values into a region.
//!
//! Each pass reads the fields of a [`WorldFields`] and is a no-op when the
//! field it needs was not built.

use crate::distance::NEIGHBORS_8;
use crate::session::WorldFields;

/// Height of one biome altitude band.
pub const BIOME_ALTITUDE_WIDTH: u8 = 4;

/// One grid point of a region.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RegionPoint {
    pub x: i32,
    pub z: i32,
    pub land: bool,
    pub island: bool,
    pub shore: bool,
    pub mountain: bool,
    pub base_land_height: u8,
    pub base_ocean_depth: u8,
    pub biome_altitude: u8,
    pub hot_spot_age: u8,
    pub distance_to_ocean: i8,
    pub distance_to_west_coast: i8,
    pub temperature: f32,
    pub rainfall: f32,
    pub rainfall_variance: f32,
}

/// A rectangle of grid points, row-major from `(min_x, min_z)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    min_x: i32,
    min_z: i32,
    size_x: u32,
    size_z: u32,
    points: Vec<RegionPoint>,
}

impl Region {
    /// All-ocean region covering `size_x` by `size_z` points.
    pub fn new(min_x: i32, min_z: i32, size_x: u32, size_z: u32) -> Self {
        let points = (0..size_z as i32)
            .flat_map(|dz| {
                (0..size_x as i32).map(move |dx| RegionPoint {
                    x: min_x + dx,
                    z: min_z + dz,
                    ..RegionPoint::default()
                })
            })
            .collect();
        Self {
            min_x,
            min_z,
            size_x,
            size_z,
            points,
        }
    }

    pub fn size_x(&self) -> u32 {
        self.size_x
    }

    pub fn size_z(&self) -> u32 {
        self.size_z
    }

    pub fn points(&self) -> &[RegionPoint] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [RegionPoint] {
        &mut self.points
    }

    fn index_of(&self, x: i32, z: i32) -> Option<usize> {
        let (dx, dz) = (x - self.min_x, z - self.min_z);
        if dx < 0 || dz < 0 || dx >= self.size_x as i32 || dz >= self.size_z as i32 {
            return None;
        }
        Some(dz as usize * self.size_x as usize + dx as usize)
    }

    /// Point at grid `(x, z)`, if inside the region.
    pub fn at(&self, x: i32, z: i32) -> Option<&RegionPoint> {
        self.index_of(x, z).map(|i| &self.points[i])
    }

    pub fn at_mut(&mut self, x: i32, z: i32) -> Option<&mut RegionPoint> {
        self.index_of(x, z).map(|i| &mut self.points[i])
    }

    /// Point offset by `(dx, dz)` from the point at `index`.
    pub fn at_offset(&self, index: usize, dx: i32, dz: i32) -> Option<&RegionPoint> {
        let point = self.points.get(index)?;
        self.at(point.x + dx, point.z + dz)
    }
}

/// Base land height on land and base ocean depth in the ocean.
pub fn annotate_altitude(region: &mut Region, fields: &WorldFields) {
    let Some(altitude) = &fields.altitude else {
        return;
    };
    for point in region.points_mut() {
        let (x, z) = (point.x as f64, point.z as f64);
        if point.land {
            point.base_land_height = altitude.land_height(x, z) as u8;
        } else {
            point.base_ocean_depth = altitude.ocean_depth(x, z) as u8;
        }
    }
}

/// Biome altitude band from the base land height. High land becomes mountain.
pub fn annotate_biome_altitude(region: &mut Region, fields: &WorldFields) {
    if fields.altitude.is_none() {
        return;
    }
    for point in region.points_mut().iter_mut().filter(|p| p.land) {
        point.biome_altitude = match point.base_land_height {
            16.. => {
                point.mountain = true;
                3 * BIOME_ALTITUDE_WIDTH
            }
            8.. => 2 * BIOME_ALTITUDE_WIDTH,
            3.. => BIOME_ALTITUDE_WIDTH,
            _ => 0,
        };
    }
}

/// Hotspot age from the map, keeping the existing age where the map has none.
pub fn annotate_hotspots(region: &mut Region, fields: &WorldFields) {
    let Some(hotspots) = &fields.hotspots else {
        return;
    };
    for point in region.points_mut() {
        let age = hotspots.age(point.x as f64, point.z as f64).code();
        if age > 0 {
            point.hot_spot_age = age;
        }
    }
}

/// Distance to ocean, then shore flags on ocean points next to mainland.
pub fn annotate_distance_to_ocean(region: &mut Region, fields: &WorldFields) {
    let Some(cache) = &fields.ocean_distance else {
        return;
    };
    for point in region.points_mut() {
        point.distance_to_ocean = cache.distance(point.x, point.z, point.land);
    }

    let shore: Vec<usize> = (0..region.points.len())
        .filter(|&i| !region.points[i].land)
        .filter(|&i| {
            NEIGHBORS_8.iter().any(|&(dx, dz)| {
                region
                    .at_offset(i, dx, dz)
                    .is_some_and(|n| n.land && !n.island)
            })
        })
        .collect();
    for i in shore {
        region.points[i].shore = true;
    }
}

pub fn annotate_distance_to_west_coast(region: &mut Region, fields: &WorldFields) {
    let Some(cache) = &fields.west_coast_distance else {
        return;
    };
    for point in region.points_mut() {
        point.distance_to_west_coast = cache.distance(point.x, point.z);
    }
}

/// Temperature, rainfall and rainfall variance from the Köppen map.
pub fn annotate_climate(region: &mut Region, fields: &WorldFields) {
    let Some(climate) = &fields.climate else {
        return;
    };
    for point in region.points_mut() {
        let [temperature, rainfall, rainfall_variance] =
            climate.temperature.parameters(point.x as f64, point.z as f64);
        point.temperature = temperature as f32;
        point.rainfall = rainfall as f32;
        point.rainfall_variance = rainfall_variance as f32;
    }
}

/// Run every pass in generation order.
pub fn annotate_all(region: &mut Region, fields: &WorldFields) {
    annotate_altitude(region, fields);
    annotate_biome_altitude(region, fields);
    annotate_hotspots(region, fields);
    annotate_distance_to_ocean(region, fields);
    annotate_distance_to_west_coast(region, fields);
    annotate_climate(region, fields);
}
