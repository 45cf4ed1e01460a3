//! Geodesy utilities: ellipsoidal distance and initial bearing.

use crate::error::{Result, ScenarioError};
use crate::models::{Position, Waypoint};
use std::str::FromStr;

/// WGS84 semi-major axis in meters.
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis in meters.
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const METERS_PER_MILE: f64 = 1_609.344;
const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// Unit for reported distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Kilometers,
    Meters,
    Miles,
}

impl DistanceUnit {
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Meters => meters,
            DistanceUnit::Miles => meters / METERS_PER_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ScenarioError;

    fn from_str(unit: &str) -> Result<Self> {
        match unit {
            "km" => Ok(DistanceUnit::Kilometers),
            "m" => Ok(DistanceUnit::Meters),
            "miles" => Ok(DistanceUnit::Miles),
            other => Err(ScenarioError::InvalidUnit {
                unit: other.to_string(),
            }),
        }
    }
}

/// Geodesic distance between two positions on the WGS84 ellipsoid.
///
/// Altitude is ignored. Falls back to the spherical haversine distance in the
/// rare near-antipodal cases where Vincenty's iteration does not converge.
pub fn geodesic_distance(pos1: &Position, pos2: &Position, unit: DistanceUnit) -> f64 {
    let meters = vincenty_distance(pos1.lat, pos1.lon, pos2.lat, pos2.lon).unwrap_or_else(|| {
        tracing::debug!(
            lat1 = pos1.lat,
            lon1 = pos1.lon,
            lat2 = pos2.lat,
            lon2 = pos2.lon,
            "Vincenty did not converge; using haversine"
        );
        haversine_distance(pos1.lat, pos1.lon, pos2.lat, pos2.lon)
    });
    unit.from_meters(meters)
}

/// Geodesic distance with the unit given as "km", "m" or "miles".
pub fn distance(pos1: &Position, pos2: &Position, unit: &str) -> Result<f64> {
    let unit = unit.parse::<DistanceUnit>()?;
    Ok(geodesic_distance(pos1, pos2, unit))
}

/// Initial bearing from `pos1` to `pos2` in degrees, normalized to [0, 360).
pub fn bearing(pos1: &Position, pos2: &Position) -> f64 {
    let deg = initial_bearing_rad(pos1.lat, pos1.lon, pos2.lat, pos2.lon)
        .to_degrees()
        .rem_euclid(360.0);
    // rem_euclid rounds tiny negative angles up to exactly 360.0
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// Calculate bearing from point 1 to point 2 in radians.
/// Returns bearing in radians, 0 = north, π/2 = east.
pub fn initial_bearing_rad(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    x.atan2(y)
}

/// Total path distance in kilometers.
pub fn total_distance(waypoints: &[Waypoint]) -> f64 {
    waypoints.iter().map(|wp| wp.distance_from_previous).sum()
}

/// Calculate distance between two points in meters using Haversine formula.
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Vincenty inverse solution on the WGS84 ellipsoid, in meters.
///
/// Returns `None` when the iteration fails to converge.
pub fn vincenty_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    let f = WGS84_F;
    let l = (lon2 - lon1).to_radians();
    let u1 = ((1.0 - f) * lat1.to_radians().tan()).atan();
    let u2 = ((1.0 - f) * lat2.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..VINCENTY_MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return Some(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // Both points on the equator
        let cos_2sigma_m = if cos_sq_alpha.abs() > f64::EPSILON {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if (lambda - previous).abs() < VINCENTY_TOLERANCE {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));
            return Some(WGS84_B * a * (sigma - delta_sigma));
        }
    }

    None
}
