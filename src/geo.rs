//! Coordinate conversion and compass labelling for quays.

use serde::Serialize;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

// RD New reference point (Amersfoort) in RD metres and WGS84 degrees.
const RD_X0: f64 = 155_000.0;
const RD_Y0: f64 = 463_000.0;
const WGS_LAT0: f64 = 52.155_174_40;
const WGS_LON0: f64 = 5.387_206_21;

/// Latitude terms `(p, q, K)`: `K * dX^p * dY^q`, result in arc seconds.
static LAT_TERMS: &[(i32, i32, f64)] = &[
    (0, 1, 3235.65389),
    (2, 0, -32.58297),
    (0, 2, -0.24750),
    (2, 1, -0.84978),
    (0, 3, -0.06550),
    (2, 2, -0.01709),
    (1, 0, -0.00738),
    (4, 0, 0.00530),
    (2, 3, -0.00039),
    (4, 1, 0.00033),
    (1, 1, -0.00012),
];

/// Longitude terms `(p, q, L)`: `L * dX^p * dY^q`, result in arc seconds.
static LON_TERMS: &[(i32, i32, f64)] = &[
    (1, 0, 5260.52916),
    (1, 1, 105.94684),
    (1, 2, 2.45656),
    (3, 0, -0.81885),
    (1, 3, 0.05594),
    (3, 1, -0.05607),
    (0, 1, 0.01199),
    (3, 2, -0.00256),
    (1, 4, 0.00128),
    (0, 2, 0.00022),
    (2, 0, -0.00022),
    (5, 0, 0.00026),
];

/// Converts Dutch national grid (RD New) easting/northing in metres to WGS84.
///
/// Uses the Schreutelaar polynomial approximation, accurate to about a metre
/// inside the Netherlands.
pub fn rd_to_wgs84(x: f64, y: f64) -> GeoCoordinate {
    let dx = (x - RD_X0) * 1e-5;
    let dy = (y - RD_Y0) * 1e-5;

    let series = |terms: &[(i32, i32, f64)]| -> f64 {
        terms
            .iter()
            .map(|&(p, q, k)| k * dx.powi(p) * dy.powi(q))
            .sum()
    };

    GeoCoordinate {
        lat: WGS_LAT0 + series(LAT_TERMS) / 3600.0,
        lon: WGS_LON0 + series(LON_TERMS) / 3600.0,
    }
}

/// One of the eight compass points, as an arrow glyph and its Dutch name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompassDirection {
    pub short: &'static str,
    pub full: &'static str,
}

/// Ordered N, NE, E, SE, S, SW, W, NW.
static COMPASS: [CompassDirection; 8] = [
    CompassDirection { short: "↑", full: "Noord" },
    CompassDirection { short: "↗", full: "Noordoost" },
    CompassDirection { short: "→", full: "Oost" },
    CompassDirection { short: "↘", full: "Zuidoost" },
    CompassDirection { short: "↓", full: "Zuid" },
    CompassDirection { short: "↙", full: "Zuidwest" },
    CompassDirection { short: "←", full: "West" },
    CompassDirection { short: "↖", full: "Noordwest" },
];

impl CompassDirection {
    /// Maps a bearing in degrees to the nearest of the eight compass points.
    ///
    /// The bearing is taken modulo 360 first; half-sector angles round away
    /// from zero, so 22.5° is north-east. Returns `None` for non-finite input.
    pub fn from_bearing(bearing: f64) -> Option<Self> {
        if !bearing.is_finite() {
            return None;
        }
        let sector = (bearing.rem_euclid(360.0) / 45.0).round() as usize % 8;
        Some(COMPASS[sector])
    }
}
