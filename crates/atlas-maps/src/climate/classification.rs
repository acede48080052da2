//! Köppen climate classes, their map palette, and the classification rule.

use std::fmt;

use crate::raster::{pack_rgb, unpack_rgb};

/// Hemisphere used when interpreting rainfall variance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Hemisphere {
    #[default]
    Northern,
    Southern,
}

/// A Köppen climate class.
///
/// Variants are declared in palette order; this order breaks ties when an
/// unknown map color is equally close to two palette entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KoppenClimate {
    Af,
    As,
    Aw,
    Am,
    BWh,
    BSh,
    BWk,
    BSk,
    Csa,
    Csb,
    Csc,
    Cwa,
    Cwb,
    Cwc,
    Cfa,
    Cfb,
    Cfc,
    Dsa,
    Dsb,
    Dsc,
    Dsd,
    Dfa,
    Dfb,
    Dfc,
    Dfd,
    Dwa,
    Dwb,
    Dwc,
    Dwd,
    Et,
    Ef,
}

impl KoppenClimate {
    /// Number of classes.
    pub const COUNT: usize = 31;

    /// Every class in palette order.
    pub const ALL: [KoppenClimate; Self::COUNT] = [
        Self::Af,
        Self::As,
        Self::Aw,
        Self::Am,
        Self::BWh,
        Self::BSh,
        Self::BWk,
        Self::BSk,
        Self::Csa,
        Self::Csb,
        Self::Csc,
        Self::Cwa,
        Self::Cwb,
        Self::Cwc,
        Self::Cfa,
        Self::Cfb,
        Self::Cfc,
        Self::Dsa,
        Self::Dsb,
        Self::Dsc,
        Self::Dsd,
        Self::Dfa,
        Self::Dfb,
        Self::Dfc,
        Self::Dfd,
        Self::Dwa,
        Self::Dwb,
        Self::Dwc,
        Self::Dwd,
        Self::Et,
        Self::Ef,
    ];

    /// Dense index in `0..COUNT`, matching [`ALL`](Self::ALL).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper-case class code, e.g. `"BWH"`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Af => "AF",
            Self::As => "AS",
            Self::Aw => "AW",
            Self::Am => "AM",
            Self::BWh => "BWH",
            Self::BSh => "BSH",
            Self::BWk => "BWK",
            Self::BSk => "BSK",
            Self::Csa => "CSA",
            Self::Csb => "CSB",
            Self::Csc => "CSC",
            Self::Cwa => "CWA",
            Self::Cwb => "CWB",
            Self::Cwc => "CWC",
            Self::Cfa => "CFA",
            Self::Cfb => "CFB",
            Self::Cfc => "CFC",
            Self::Dsa => "DSA",
            Self::Dsb => "DSB",
            Self::Dsc => "DSC",
            Self::Dsd => "DSD",
            Self::Dfa => "DFA",
            Self::Dfb => "DFB",
            Self::Dfc => "DFC",
            Self::Dfd => "DFD",
            Self::Dwa => "DWA",
            Self::Dwb => "DWB",
            Self::Dwc => "DWC",
            Self::Dwd => "DWD",
            Self::Et => "ET",
            Self::Ef => "EF",
        }
    }

    /// Parse a class code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }

    /// Flat map color painted for this class.
    pub fn color(self) -> [u8; 3] {
        match self {
            Self::Af => [0, 0, 220],
            Self::As => [0, 100, 240],
            Self::Aw => [0, 150, 220],
            Self::Am => [40, 80, 200],
            Self::BWh => [210, 0, 0],
            Self::BSh => [210, 120, 0],
            Self::BWk => [200, 80, 80],
            Self::BSk => [200, 120, 60],
            Self::Csa => [250, 250, 0],
            Self::Csb => [180, 180, 0],
            Self::Csc => [120, 120, 0],
            Self::Cwa => [100, 240, 130],
            Self::Cwb => [80, 210, 120],
            Self::Cwc => [70, 160, 110],
            Self::Cfa => [170, 240, 90],
            Self::Cfb => [140, 200, 80],
            Self::Cfc => [110, 170, 70],
            Self::Dsa => [190, 20, 190],
            Self::Dsb => [160, 20, 180],
            Self::Dsc => [130, 20, 170],
            Self::Dsd => [100, 20, 160],
            Self::Dfa => [40, 190, 190],
            Self::Dfb => [30, 170, 170],
            Self::Dfc => [20, 150, 140],
            Self::Dfd => [10, 130, 110],
            Self::Dwa => [80, 80, 220],
            Self::Dwb => [70, 70, 190],
            Self::Dwc => [60, 60, 160],
            Self::Dwd => [60, 60, 130],
            Self::Et => [190, 190, 190],
            Self::Ef => [80, 80, 80],
        }
    }

    /// Class for a packed map pixel: exact palette match, else the nearest
    /// palette color by squared RGB distance (first declared wins ties).
    pub fn from_rgb(rgb: u32) -> Self {
        let [r, g, b] = unpack_rgb(rgb);
        let mut best = Self::Ef;
        let mut best_distance = i32::MAX;
        for climate in Self::ALL {
            let [cr, cg, cb] = climate.color();
            if pack_rgb(cr, cg, cb) == rgb & 0x00ff_ffff {
                return climate;
            }
            let (dr, dg, db) = (
                r as i32 - cr as i32,
                g as i32 - cg as i32,
                b as i32 - cb as i32,
            );
            let distance = dr * dr + dg * dg + db * db;
            if distance < best_distance {
                best_distance = distance;
                best = climate;
            }
        }
        best
    }
}

impl fmt::Display for KoppenClimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// Classification rule
// ---------------------------------------------------------------------------

/// Maps a (temperature, rainfall, rainfall variance) triple to a class.
pub trait ClimateClassifier: Send + Sync {
    fn classify(
        &self,
        temperature: f32,
        rainfall: f32,
        rainfall_variance: f32,
        hemisphere: Hemisphere,
    ) -> KoppenClimate;
}

/// The default threshold rule.
///
/// Every class is an intersection of half-spaces over (temperature °C,
/// rainfall mm, rainfall variance), so any blend of two triples of one class
/// classifies back to that class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KoppenRule;

impl ClimateClassifier for KoppenRule {
    fn classify(
        &self,
        temperature: f32,
        rainfall: f32,
        rainfall_variance: f32,
        hemisphere: Hemisphere,
    ) -> KoppenClimate {
        classify(temperature, rainfall, rainfall_variance, hemisphere)
    }
}

/// Classify with [`KoppenRule`].
///
/// Positive variance means a wet summer in the northern hemisphere; the sign
/// is flipped in the southern hemisphere.
pub fn classify(
    temperature: f32,
    rainfall: f32,
    rainfall_variance: f32,
    hemisphere: Hemisphere,
) -> KoppenClimate {
    use KoppenClimate::*;

    let t = temperature as f64;
    let r = rainfall as f64;
    let v = match hemisphere {
        Hemisphere::Northern => rainfall_variance as f64,
        Hemisphere::Southern => -(rainfall_variance as f64),
    };

    if t < -8.0 {
        return if t >= -14.0 { Et } else { Ef };
    }

    let aridity = 20.0 * t + 140.0 * v - 85.0;
    if r < aridity {
        let desert = r < aridity / 2.0;
        let hot = t >= 18.0;
        return match (desert, hot) {
            (true, true) => BWh,
            (false, true) => BSh,
            (true, false) => BWk,
            (false, false) => BSk,
        };
    }

    if t >= 18.0 {
        return if v <= -0.2 {
            As
        } else if v >= 0.2 {
            if r >= 400.0 { Am } else { Aw }
        } else {
            Af
        };
    }

    // 0 = dry summer, 1 = no dry season, 2 = dry winter
    let season = if v <= -0.3 {
        0
    } else if v >= 0.3 {
        2
    } else {
        1
    };

    if t >= 6.0 {
        let band = if t >= 14.0 {
            0
        } else if t >= 10.0 {
            1
        } else {
            2
        };
        const C: [[KoppenClimate; 3]; 3] = [[Csa, Csb, Csc], [Cfa, Cfb, Cfc], [Cwa, Cwb, Cwc]];
        C[season][band]
    } else {
        let band = if t >= 2.0 {
            0
        } else if t >= -2.0 {
            1
        } else if t >= -5.0 {
            2
        } else {
            3
        };
        const D: [[KoppenClimate; 4]; 3] = [
            [Dsa, Dsb, Dsc, Dsd],
            [Dfa, Dfb, Dfc, Dfd],
            [Dwa, Dwb, Dwc, Dwd],
        ];
        D[season][band]
    }
}
