//! Raster-resolution distance transforms built once per world from the continent map.
//!
//! Both caches store one signed byte per raster pixel and answer queries at
//! integer grid coordinates through the continent sampler's mapping.

use std::collections::VecDeque;

mod ocean;
mod west_coast;

pub use ocean::{COASTAL_OCEAN, OCEAN, OceanDistanceCache};
pub use west_coast::WestCoastDistanceCache;

/// Largest stored distance.
pub const MAX_DISTANCE: i8 = 127;

/// 8-connected neighbour offsets.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

fn neighbors_in(width: u32, height: u32, x: u32, z: u32) -> impl Iterator<Item = (u32, u32)> {
    NEIGHBORS_8.iter().filter_map(move |&(dx, dz)| {
        let nx = x as i64 + dx as i64;
        let nz = z as i64 + dz as i64;
        (nx >= 0 && nz >= 0 && nx < width as i64 && nz < height as i64)
            .then_some((nx as u32, nz as u32))
    })
}

/// A dense, row-major grid of signed distances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceMap {
    width: u32,
    height: u32,
    values: Vec<i8>,
}

impl DistanceMap {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn index(&self, x: u32, z: u32) -> usize {
        z as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, z: u32) -> i8 {
        self.values[self.index(x, z)]
    }

    #[inline]
    pub(crate) fn set(&mut self, x: u32, z: u32, value: i8) {
        let i = self.index(x, z);
        self.values[i] = value;
    }

    pub fn values(&self) -> &[i8] {
        &self.values
    }

    /// In-bounds 8-neighbours of `(x, z)`.
    pub fn neighbors(&self, x: u32, z: u32) -> impl Iterator<Item = (u32, u32)> + use<> {
        neighbors_in(self.width, self.height, x, z)
    }

    /// Multi-source breadth-first fill.
    ///
    /// Every dequeued pixel hands `next(current)` to each 8-neighbour that
    /// still holds `0` and has not been explored; those neighbours are
    /// enqueued in turn.
    pub(crate) fn propagate(
        &mut self,
        mut queue: VecDeque<(u32, u32)>,
        explored: &mut [bool],
        next: impl Fn(i8) -> i8,
    ) {
        while let Some((x, z)) = queue.pop_front() {
            let value = next(self.get(x, z));
            for (nx, nz) in self.neighbors(x, z) {
                let i = self.index(nx, nz);
                if self.values[i] == 0 && !explored[i] {
                    self.values[i] = value;
                    explored[i] = true;
                    queue.push_back((nx, nz));
                }
            }
        }
    }

    /// Histogram of stored values, indexed by `value + 128`.
    pub fn histogram(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &v in &self.values {
            counts[(v as i16 + 128) as usize] += 1;
        }
        counts
    }
}
