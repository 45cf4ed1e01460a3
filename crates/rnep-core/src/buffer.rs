//! Buffer zones around waypoints and flight paths.
//!
//! Geographic input is buffered in the UTM zone of its centroid so that the
//! distance is in true meters, then reprojected back.

use crate::error::{Result, ScenarioError};
use crate::models::Waypoint;
use crate::projection::{geometry_type_name, project_coord, transform_geometry, utm_zone_for, Crs};
use crate::rules::PipelineRules;
use geo::{BooleanOps, Centroid, Coord, Geometry, LineString, MapCoords, MultiPolygon, Point, Polygon};
use std::f64::consts::{FRAC_PI_2, PI};

/// Buffer a geometry by `distance_m` meters.
///
/// `crs` is the reference system of the input. For WGS84 input the buffer
/// is computed in the local UTM zone and returned in WGS84; projected input
/// is buffered in place. A zero distance yields an empty result.
pub fn create_buffer_zone(
    geometry: &Geometry<f64>,
    distance_m: f64,
    crs: Crs,
    rules: &PipelineRules,
) -> Result<MultiPolygon<f64>> {
    if !(distance_m.is_finite() && distance_m >= 0.0) {
        return Err(ScenarioError::InvalidBufferDistance { distance_m });
    }
    ensure_supported(geometry)?;
    let segments = rules.buffer_arc_segments.max(1);

    if !crs.is_geographic() {
        return planar_buffer(geometry, distance_m, segments);
    }

    let centroid = geometry
        .centroid()
        .ok_or(ScenarioError::InsufficientWaypoints {
            field: "geometry",
            count: 0,
            required: 1,
        })?;
    let utm = utm_zone_for(centroid.x(), centroid.y());
    tracing::debug!(crs = %utm, distance_m, "Buffering in projected CRS");

    let projected = transform_geometry(geometry, crs, utm)?;
    let buffer = planar_buffer(&projected, distance_m, segments)?;
    Ok(buffer.map_coords(move |coord| project_coord(coord, utm, crs)))
}

/// Buffer zone around a single waypoint, in WGS84.
pub fn waypoint_buffer(
    waypoint: &Waypoint,
    distance_m: f64,
    rules: &PipelineRules,
) -> Result<MultiPolygon<f64>> {
    let point = Point::new(waypoint.position.lon, waypoint.position.lat);
    create_buffer_zone(&Geometry::Point(point), distance_m, Crs::Wgs84, rules)
}

fn ensure_supported(geometry: &Geometry<f64>) -> Result<()> {
    match geometry {
        Geometry::Point(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiPoint(_) => Ok(()),
        other => Err(ScenarioError::UnsupportedGeometryType {
            geometry_type: geometry_type_name(other).to_string(),
        }),
    }
}

/// Planar buffer in the geometry's own (metric) units.
fn planar_buffer(
    geometry: &Geometry<f64>,
    distance: f64,
    segments: usize,
) -> Result<MultiPolygon<f64>> {
    if distance == 0.0 {
        return Ok(MultiPolygon::new(Vec::new()));
    }

    let parts = match geometry {
        Geometry::Point(point) => vec![circle(point.0, distance, segments)],
        Geometry::MultiPoint(points) => points
            .iter()
            .map(|point| circle(point.0, distance, segments))
            .collect(),
        Geometry::Line(line) => vec![capsule(line.start, line.end, distance, segments)],
        Geometry::LineString(line) => line_string_parts(line, distance, segments),
        other => {
            return Err(ScenarioError::UnsupportedGeometryType {
                geometry_type: geometry_type_name(other).to_string(),
            })
        }
    };

    Ok(union_all(parts))
}

fn line_string_parts(line: &LineString<f64>, distance: f64, segments: usize) -> Vec<Polygon<f64>> {
    match line.0.as_slice() {
        [] => Vec::new(),
        [only] => vec![circle(*only, distance, segments)],
        _ => line
            .lines()
            .map(|segment| capsule(segment.start, segment.end, distance, segments))
            .collect(),
    }
}

fn union_all(parts: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut parts = parts.into_iter();
    let Some(first) = parts.next() else {
        return MultiPolygon::new(Vec::new());
    };
    parts.fold(MultiPolygon::new(vec![first]), |merged, part| {
        merged.union(&MultiPolygon::new(vec![part]))
    })
}

/// Points along an arc of `sweep` radians starting at `start`, inclusive of
/// both ends.
fn arc(center: Coord<f64>, radius: f64, start: f64, sweep: f64, steps: usize) -> Vec<Coord<f64>> {
    (0..=steps)
        .map(|i| {
            let angle = start + sweep * i as f64 / steps as f64;
            Coord {
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
            }
        })
        .collect()
}

fn circle(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let steps = 4 * segments;
    let mut ring = arc(center, radius, 0.0, 2.0 * PI, steps);
    // The closing point duplicates the first; Polygon::new closes the ring itself.
    ring.pop();
    Polygon::new(LineString::new(ring), Vec::new())
}

/// Stadium shape around a segment: two half circles joined by straight
/// sides, counter-clockwise.
fn capsule(start: Coord<f64>, end: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.hypot(dy) <= f64::EPSILON {
        return circle(start, radius, segments);
    }

    let heading = dy.atan2(dx);
    let steps = 2 * segments;
    let mut ring = arc(end, radius, heading - FRAC_PI_2, PI, steps);
    ring.extend(arc(start, radius, heading + FRAC_PI_2, PI, steps));
    Polygon::new(LineString::new(ring), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;
    use crate::spatial::{geodesic_distance, DistanceUnit};
    use geo::{point, Area, Contains};

    fn rules() -> PipelineRules {
        PipelineRules::default()
    }

    #[test]
    fn point_buffer_vertices_sit_at_buffer_distance() {
        let center = Position {
            lat: 37.5,
            lon: 127.0,
            alt: 0.0,
        };
        let buffer = create_buffer_zone(
            &Geometry::Point(point!(x: center.lon, y: center.lat)),
            100.0,
            Crs::Wgs84,
            &rules(),
        )
        .unwrap();

        assert_eq!(buffer.0.len(), 1);
        let ring = buffer.0[0].exterior();
        assert!(ring.0.len() > 32);
        for coord in ring.coords() {
            let vertex = Position {
                lat: coord.y,
                lon: coord.x,
                alt: 0.0,
            };
            let meters = geodesic_distance(&center, &vertex, DistanceUnit::Meters);
            assert!((meters - 100.0).abs() < 0.5, "vertex at {meters} m");
        }
    }

    #[test]
    fn line_buffer_covers_corridor_only() {
        let line: LineString<f64> = vec![(127.0, 37.5), (127.02, 37.5)].into();
        let buffer =
            create_buffer_zone(&Geometry::LineString(line), 100.0, Crs::Wgs84, &rules()).unwrap();

        // Meters per degree of latitude near 37.5N
        let meters_to_deg = 1.0 / 110_950.0;
        let inside = point!(x: 127.01, y: 37.5 + 50.0 * meters_to_deg);
        let outside = point!(x: 127.01, y: 37.5 + 200.0 * meters_to_deg);
        let beyond_end = point!(x: 127.025, y: 37.5);

        assert!(buffer.contains(&inside));
        assert!(!buffer.contains(&outside));
        assert!(!buffer.contains(&beyond_end));
    }

    #[test]
    fn bent_line_buffer_merges_into_one_polygon() {
        let line: LineString<f64> = vec![(0.0, 0.0), (1000.0, 0.0), (1000.0, 1000.0)].into();
        let buffer = create_buffer_zone(
            &Geometry::LineString(line),
            50.0,
            Crs::Utm { zone: 31, north: true },
            &rules(),
        )
        .unwrap();

        assert_eq!(buffer.0.len(), 1);
        assert!(buffer.0[0].interiors().is_empty());
        assert!(buffer.contains(&point!(x: 1000.0, y: 0.0)));
        assert!(!buffer.contains(&point!(x: 1040.0, y: -40.0)));
    }

    #[test]
    fn projected_point_buffer_area_is_close_to_circle() {
        let radius = 25.0;
        let buffer = create_buffer_zone(
            &Geometry::Point(point!(x: 500_000.0, y: 4_000_000.0)),
            radius,
            Crs::Utm { zone: 52, north: true },
            &rules(),
        )
        .unwrap();

        let expected = PI * radius * radius;
        let area = buffer.unsigned_area();
        assert!((area - expected).abs() / expected < 0.01, "area {area}");
    }

    #[test]
    fn zero_distance_is_empty_and_negative_is_rejected() {
        let geometry = Geometry::Point(point!(x: 127.0, y: 37.5));
        assert!(create_buffer_zone(&geometry, 0.0, Crs::Wgs84, &rules())
            .unwrap()
            .0
            .is_empty());

        for distance_m in [-1.0, f64::NAN, f64::INFINITY] {
            let err = create_buffer_zone(&geometry, distance_m, Crs::Wgs84, &rules()).unwrap_err();
            assert!(matches!(err, ScenarioError::InvalidBufferDistance { .. }));
        }
    }

    #[test]
    fn polygon_input_is_unsupported() {
        let polygon = Polygon::new(
            vec![(127.0, 37.5), (127.1, 37.5), (127.1, 37.6), (127.0, 37.5)].into(),
            vec![],
        );
        let err = create_buffer_zone(&Geometry::Polygon(polygon), 10.0, Crs::Wgs84, &rules())
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::UnsupportedGeometryType {
                geometry_type: "Polygon".to_string()
            }
        );
    }

    #[test]
    fn waypoint_buffer_contains_waypoint() {
        let waypoint = Waypoint {
            id: "WP001".to_string(),
            sequence: 0,
            position: Position {
                lat: -33.8688,
                lon: 151.2093,
                alt: 120.0,
            },
            distance_from_previous: 0.0,
        };
        let buffer = waypoint_buffer(&waypoint, 250.0, &rules()).unwrap();
        assert!(buffer.contains(&point!(x: 151.2093, y: -33.8688)));
    }
}
