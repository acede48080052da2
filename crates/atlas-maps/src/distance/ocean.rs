use std::collections::VecDeque;

use super::{DistanceMap, MAX_DISTANCE};
use crate::fields::ContinentField;
use crate::sampler::RasterSampler;

/// Open ocean.
pub const OCEAN: i8 = -1;
/// Ocean touching land in any of its 8 neighbours.
pub const COASTAL_OCEAN: i8 = -2;

/// Distance from every land pixel to the nearest ocean pixel.
///
/// Land pixels hold `1..=127`, or `0` when the map has no ocean at all.
/// Ocean pixels hold [`OCEAN`], or [`COASTAL_OCEAN`] when they border land.
#[derive(Clone, Debug)]
pub struct OceanDistanceCache {
    sampler: RasterSampler,
    map: DistanceMap,
}

impl OceanDistanceCache {
    pub fn build(continent: &ContinentField) -> Self {
        let sampler = continent.sampler().clone();
        let (width, height) = (sampler.width(), sampler.height());
        let mut map = DistanceMap::new(width, height);
        let mut explored = vec![false; width as usize * height as usize];
        let mut queue = VecDeque::new();

        for z in 0..height {
            for x in 0..width {
                if continent.is_ocean_pixel(x as i64, z as i64) {
                    map.set(x, z, OCEAN);
                    explored[map.index(x, z)] = true;
                    queue.push_back((x, z));
                }
            }
        }

        // Ocean parents count as distance zero, so coastal land starts at 1.
        map.propagate(queue, &mut explored, |d| {
            d.max(0).saturating_add(1).min(MAX_DISTANCE)
        });

        let coastal: Vec<(u32, u32)> = (0..height)
            .flat_map(|z| (0..width).map(move |x| (x, z)))
            .filter(|&(x, z)| {
                map.get(x, z) == OCEAN && map.neighbors(x, z).any(|(nx, nz)| map.get(nx, nz) > 0)
            })
            .collect();
        for &(x, z) in &coastal {
            map.set(x, z, COASTAL_OCEAN);
        }

        tracing::info!(width, height, coastal = coastal.len(), "Ocean distance cache built");
        Self { sampler, map }
    }

    pub fn map(&self) -> &DistanceMap {
        &self.map
    }

    /// Distance at grid point `(grid_x, grid_z)` for a point of the given kind.
    ///
    /// Land queries blend the corner distances with ocean corners counted as
    /// zero. Ocean queries return [`COASTAL_OCEAN`] if any corner is coastal,
    /// otherwise the smallest corner value.
    pub fn distance(&self, grid_x: i32, grid_z: i32, is_land: bool) -> i8 {
        let cell = self.sampler.cell(grid_x as f64, grid_z as f64);
        let corners = cell.corners().map(|(x, z)| self.map.get(x, z));
        if is_land {
            let blended = cell.blend(corners.map(|d| d.max(0) as f64));
            blended.round().max(0.0) as i8
        } else if corners.contains(&COASTAL_OCEAN) {
            COASTAL_OCEAN
        } else {
            corners.into_iter().min().unwrap_or(OCEAN)
        }
    }
}
