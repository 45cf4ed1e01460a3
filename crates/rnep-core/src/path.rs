//! Path extraction: line geometry to ordered waypoints.

use crate::error::{Result, ScenarioError};
use crate::models::{Coordinate, FlightPath, Position, Waypoint};
use crate::projection::geometry_type_name;
use crate::spatial::{geodesic_distance, total_distance, DistanceUnit};
use chrono::{DateTime, Utc};
use geo::{Coord, Geometry, LineString};
use uuid::Uuid;

/// Minimum number of vertices in a flight path.
pub const MIN_PATH_WAYPOINTS: usize = 2;

/// Stable waypoint identifier derived from the sequence index.
pub fn waypoint_id(index: usize) -> String {
    format!("WP{:03}", index + 1)
}

/// Convert coordinates into an ordered waypoint sequence.
///
/// Altitude comes from the third coordinate when present, otherwise from
/// `default_altitude` (0 when unspecified). Distances are geodesic, in
/// kilometers, measured from the preceding waypoint.
///
/// This is a pure mapping and accepts any number of coordinates; the
/// two-waypoint minimum is enforced by `FlightPath::new`.
pub fn extract_waypoints(
    coords: &[Coordinate],
    default_altitude: Option<f64>,
) -> Result<Vec<Waypoint>> {
    let fallback_alt = default_altitude.unwrap_or(0.0);
    let mut waypoints: Vec<Waypoint> = Vec::with_capacity(coords.len());

    for (i, coord) in coords.iter().enumerate() {
        let alt = coord.alt.unwrap_or(fallback_alt);
        let position =
            Position::new(coord.lat, coord.lon, alt).map_err(|err| err.at_coordinate(i))?;

        let distance_from_previous = waypoints
            .last()
            .map(|prev| geodesic_distance(&prev.position, &position, DistanceUnit::Kilometers))
            .unwrap_or(0.0);

        waypoints.push(Waypoint {
            id: waypoint_id(i),
            sequence: i,
            position,
            distance_from_previous,
        });
    }

    Ok(waypoints)
}

impl FlightPath {
    /// Build a flight path from ordered coordinates.
    pub fn new(
        name: impl Into<String>,
        source_file: Option<String>,
        coords: Vec<Coordinate>,
        default_altitude: Option<f64>,
    ) -> Result<Self> {
        Self::new_at(name, source_file, coords, default_altitude, Utc::now())
    }

    /// Same as `new` with an explicit import timestamp.
    pub fn new_at(
        name: impl Into<String>,
        source_file: Option<String>,
        coords: Vec<Coordinate>,
        default_altitude: Option<f64>,
        imported_at: DateTime<Utc>,
    ) -> Result<Self> {
        if coords.len() < MIN_PATH_WAYPOINTS {
            return Err(ScenarioError::InsufficientWaypoints {
                field: "geometry",
                count: coords.len(),
                required: MIN_PATH_WAYPOINTS,
            });
        }

        let waypoints = extract_waypoints(&coords, default_altitude)?;
        let total = total_distance(&waypoints);
        let name = name.into();

        tracing::info!(
            name = %name,
            waypoints = waypoints.len(),
            total_distance_km = total,
            "Flight path imported"
        );

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            source_file,
            geometry: coords,
            waypoints,
            total_distance: total,
            imported_at,
        })
    }

    /// Build a flight path from a line geometry.
    ///
    /// Only `LineString` and `Line` are accepted; every other geometry type
    /// is rejected.
    pub fn from_geometry(
        name: impl Into<String>,
        source_file: Option<String>,
        geometry: &Geometry<f64>,
        default_altitude: Option<f64>,
    ) -> Result<Self> {
        let coords: Vec<Coordinate> = match geometry {
            Geometry::LineString(line) => line
                .coords()
                .map(|c| Coordinate::new(c.x, c.y))
                .collect(),
            Geometry::Line(line) => vec![
                Coordinate::new(line.start.x, line.start.y),
                Coordinate::new(line.end.x, line.end.y),
            ],
            other => {
                return Err(ScenarioError::UnsupportedGeometryType {
                    geometry_type: geometry_type_name(other).to_string(),
                })
            }
        };
        Self::new(name, source_file, coords, default_altitude)
    }

    /// Planar (lon, lat) line geometry of the path.
    pub fn line_string(&self) -> LineString<f64> {
        LineString::new(
            self.geometry
                .iter()
                .map(|c| Coord { x: c.lon, y: c.lat })
                .collect(),
        )
    }

    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }
}
