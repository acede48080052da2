use std::collections::VecDeque;

use super::{DistanceMap, MAX_DISTANCE};
use crate::fields::ContinentField;
use crate::sampler::RasterSampler;

/// Distances above this shrink as they spread; at or below it they grow.
const SPREAD_PIVOT: i8 = 40;

/// Value handed to a neighbour during the fill.
fn spread(d: i8) -> i8 {
    let step = if d > SPREAD_PIVOT { -1 } else { 1 };
    (d + step).clamp(0, MAX_DISTANCE)
}

/// Distance from the western map edge, accumulated eastward over land.
///
/// A west-to-east sweep grows distances over land by local averaging and
/// decays them by 2 per column over ocean. A breadth-first pass then fills
/// every pixel left at zero from its land neighbours.
#[derive(Clone, Debug)]
pub struct WestCoastDistanceCache {
    sampler: RasterSampler,
    map: DistanceMap,
}

impl WestCoastDistanceCache {
    pub fn build(continent: &ContinentField) -> Self {
        let sampler = continent.sampler().clone();
        let (width, height) = (sampler.width(), sampler.height());
        let mut map = DistanceMap::new(width, height);
        let land: Vec<bool> = (0..height)
            .flat_map(|z| (0..width).map(move |x| (x, z)))
            .map(|(x, z)| !continent.is_ocean_pixel(x as i64, z as i64))
            .collect();

        for x in 1..width {
            for z in 0..height {
                let previous = map.get(x - 1, z) as i32;
                let value = if !land[map.index(x, z)] {
                    (previous - 2).max(0)
                } else {
                    let (sum, count) = [-2_i64, -1, 1, 2]
                        .into_iter()
                        .map(|dz| z as i64 + dz)
                        .filter(|&nz| nz >= 0 && nz < height as i64)
                        .fold((previous, 1), |(sum, count), nz| {
                            (sum + map.get(x - 1, nz as u32) as i32, count + 1)
                        });
                    (sum as f64 / count as f64).ceil() as i32 + 1
                };
                map.set(x, z, value.min(MAX_DISTANCE as i32) as i8);
            }
        }

        let mut explored = vec![false; land.len()];
        let mut queue = VecDeque::new();
        for z in 0..height {
            for x in 0..width {
                let i = map.index(x, z);
                if land[i] && map.get(x, z) > 0 {
                    explored[i] = true;
                    queue.push_back((x, z));
                }
            }
        }
        map.propagate(queue, &mut explored, spread);

        tracing::info!(width, height, "West coast distance cache built");
        Self { sampler, map }
    }

    pub fn map(&self) -> &DistanceMap {
        &self.map
    }

    /// Blended distance at grid point `(grid_x, grid_z)`, never negative.
    pub fn distance(&self, grid_x: i32, grid_z: i32) -> i8 {
        let cell = self.sampler.cell(grid_x as f64, grid_z as f64);
        let corners = cell.corners().map(|(x, z)| self.map.get(x, z) as f64);
        cell.blend(corners).round().max(0.0) as i8
    }
}
