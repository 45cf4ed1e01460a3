//! Coordinate reference systems and WGS84 <-> UTM reprojection.
//!
//! UTM uses the Krüger n-series for the transverse Mercator projection,
//! accurate to well under a millimeter inside a zone.

use crate::error::{Result, ScenarioError};
use crate::spatial::{WGS84_A, WGS84_F};
use geo::{Coord, Geometry, MapCoords};
use std::fmt;
use std::str::FromStr;

const UTM_SCALE_FACTOR: f64 = 0.9996;
const UTM_FALSE_EASTING_M: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;

const EPSG_WGS84: u32 = 4326;
const EPSG_UTM_NORTH_BASE: u32 = 32600;
const EPSG_UTM_SOUTH_BASE: u32 = 32700;

/// Coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// Geographic WGS84, (lon, lat) degrees
    Wgs84,
    /// WGS84 / UTM, (easting, northing) meters
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => EPSG_WGS84,
            Crs::Utm { zone, north: true } => EPSG_UTM_NORTH_BASE + u32::from(*zone),
            Crs::Utm { zone, north: false } => EPSG_UTM_SOUTH_BASE + u32::from(*zone),
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Wgs84)
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        let unsupported = || ScenarioError::UnsupportedCrs { crs: s.to_string() };
        let trimmed = s.trim();
        let code = trimmed
            .get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("EPSG:"))
            .and_then(|_| trimmed.get(5..))
            .and_then(|digits| digits.parse::<u32>().ok())
            .ok_or_else(unsupported)?;

        match code {
            EPSG_WGS84 => Ok(Crs::Wgs84),
            c if (EPSG_UTM_NORTH_BASE + 1..=EPSG_UTM_NORTH_BASE + 60).contains(&c) => Ok(Crs::Utm {
                zone: (c - EPSG_UTM_NORTH_BASE) as u8,
                north: true,
            }),
            c if (EPSG_UTM_SOUTH_BASE + 1..=EPSG_UTM_SOUTH_BASE + 60).contains(&c) => Ok(Crs::Utm {
                zone: (c - EPSG_UTM_SOUTH_BASE) as u8,
                north: false,
            }),
            _ => Err(unsupported()),
        }
    }
}

/// UTM zone covering a (lon, lat) location.
pub fn utm_zone_for(lon: f64, lat: f64) -> Crs {
    let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u8;
    Crs::Utm {
        zone,
        north: lat >= 0.0,
    }
}

fn central_meridian_rad(zone: u8) -> f64 {
    (f64::from(zone) * 6.0 - 183.0).to_radians()
}

/// Series coefficients derived from the WGS84 third flattening.
struct KrugerSeries {
    n: f64,
    /// Rectifying radius scaled by k0
    k0_a: f64,
    alpha: [f64; 3],
    beta: [f64; 3],
    delta: [f64; 3],
}

impl KrugerSeries {
    fn wgs84() -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let (n2, n3) = (n * n, n * n * n);
        let rectifying_radius = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        Self {
            n,
            k0_a: UTM_SCALE_FACTOR * rectifying_radius,
            alpha: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
                61.0 * n3 / 240.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0,
                n2 / 48.0 + n3 / 15.0,
                17.0 * n3 / 480.0,
            ],
            delta: [
                2.0 * n - 2.0 * n2 / 3.0 - 2.0 * n3,
                7.0 * n2 / 3.0 - 8.0 * n3 / 5.0,
                56.0 * n3 / 15.0,
            ],
        }
    }

    fn eccentricity(&self) -> f64 {
        2.0 * self.n.sqrt() / (1.0 + self.n)
    }
}

/// Project (lon, lat) degrees into the given UTM zone, returning
/// (easting, northing) meters.
pub fn to_utm(lon: f64, lat: f64, zone: u8, north: bool) -> (f64, f64) {
    let series = KrugerSeries::wgs84();
    let e = series.eccentricity();
    let phi = lat.to_radians();
    let lambda = lon.to_radians() - central_meridian_rad(zone);

    let sin_phi = phi.sin();
    let t = (sin_phi.atanh() - e * (e * sin_phi).atanh()).sinh();
    let xi_prime = t.atan2(lambda.cos());
    let eta_prime = (lambda.sin() / (1.0 + t * t).sqrt()).atanh();

    let mut xi = xi_prime;
    let mut eta = eta_prime;
    for (j, alpha) in series.alpha.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi += alpha * (k * xi_prime).sin() * (k * eta_prime).cosh();
        eta += alpha * (k * xi_prime).cos() * (k * eta_prime).sinh();
    }

    let easting = UTM_FALSE_EASTING_M + series.k0_a * eta;
    let mut northing = series.k0_a * xi;
    if !north {
        northing += UTM_FALSE_NORTHING_SOUTH_M;
    }
    (easting, northing)
}

/// Inverse of `to_utm`, returning (lon, lat) degrees.
pub fn from_utm(easting: f64, northing: f64, zone: u8, north: bool) -> (f64, f64) {
    let series = KrugerSeries::wgs84();
    let northing = if north {
        northing
    } else {
        northing - UTM_FALSE_NORTHING_SOUTH_M
    };
    let xi = northing / series.k0_a;
    let eta = (easting - UTM_FALSE_EASTING_M) / series.k0_a;

    let mut xi_prime = xi;
    let mut eta_prime = eta;
    for (j, beta) in series.beta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        xi_prime -= beta * (k * xi).sin() * (k * eta).cosh();
        eta_prime -= beta * (k * xi).cos() * (k * eta).sinh();
    }

    let chi = (xi_prime.sin() / eta_prime.cosh()).asin();
    let mut phi = chi;
    for (j, delta) in series.delta.iter().enumerate() {
        let k = 2.0 * (j as f64 + 1.0);
        phi += delta * (k * chi).sin();
    }
    let lambda = eta_prime.sinh().atan2(xi_prime.cos());

    (
        (central_meridian_rad(zone) + lambda).to_degrees(),
        phi.to_degrees(),
    )
}

/// Reproject a single coordinate (x = lon/easting, y = lat/northing).
pub fn project_coord(coord: Coord<f64>, from: Crs, to: Crs) -> Coord<f64> {
    if from == to {
        return coord;
    }
    let (lon, lat) = match from {
        Crs::Wgs84 => (coord.x, coord.y),
        Crs::Utm { zone, north } => from_utm(coord.x, coord.y, zone, north),
    };
    let (x, y) = match to {
        Crs::Wgs84 => (lon, lat),
        Crs::Utm { zone, north } => to_utm(lon, lat, zone, north),
    };
    Coord { x, y }
}

/// Name of a geometry variant, for error reporting.
pub fn geometry_type_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Reproject point- and line-like geometries between reference systems.
///
/// Other geometry types have no coordinate transform strategy and are
/// rejected.
pub fn transform_geometry(geometry: &Geometry<f64>, from: Crs, to: Crs) -> Result<Geometry<f64>> {
    let transformed = match geometry {
        Geometry::Point(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiPoint(_) => {
            geometry.map_coords(move |coord| project_coord(coord, from, to))
        }
        other => {
            return Err(ScenarioError::UnsupportedGeometryType {
                geometry_type: geometry_type_name(other).to_string(),
            })
        }
    };
    Ok(transformed)
}
