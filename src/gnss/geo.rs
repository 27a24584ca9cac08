//! Great-circle helpers for positions in decimal degrees.

use libm::{atan2, cos, fmod, sin, sqrt};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;

/// Haversine distance between two points, in metres.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * DEG_TO_RAD;
    let phi2 = lat2 * DEG_TO_RAD;
    let dlat = (lat2 - lat1) * DEG_TO_RAD;
    let dlon = (lon2 - lon1) * DEG_TO_RAD;

    let sin_dlat_2 = sin(dlat / 2.0);
    let sin_dlon_2 = sin(dlon / 2.0);
    let a = sin_dlat_2 * sin_dlat_2 + cos(phi1) * cos(phi2) * sin_dlon_2 * sin_dlon_2;

    EARTH_RADIUS_M * 2.0 * atan2(sqrt(a), sqrt(1.0 - a))
}

/// Initial bearing from point 1 towards point 2, in degrees from north
/// (`0.0..360.0`).
pub fn course(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * DEG_TO_RAD;
    let phi2 = lat2 * DEG_TO_RAD;
    let dlon = (lon2 - lon1) * DEG_TO_RAD;

    let y = sin(dlon) * cos(phi2);
    let x = cos(phi1) * sin(phi2) - sin(phi1) * cos(phi2) * cos(dlon);

    normalize(atan2(y, x) / DEG_TO_RAD)
}

const CARDINALS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass abbreviation for a bearing in degrees, e.g. `NNE`.
pub fn cardinal(degrees: f64) -> &'static str {
    // Sectors are 22.5 degrees wide and centred on their direction
    let sector = (normalize(degrees + 11.25) / 22.5) as usize;
    CARDINALS[sector % CARDINALS.len()]
}

fn normalize(degrees: f64) -> f64 {
    let d = fmod(degrees, 360.0);
    if d < 0.0 {
        d + 360.0
    } else {
        d
    }
}
