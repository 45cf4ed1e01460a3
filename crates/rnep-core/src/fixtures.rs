//! Shared test data.

use crate::models::{Aircraft, Position, Waypoint};
use crate::path::waypoint_id;
use std::collections::BTreeMap;

pub(crate) fn sample_aircraft() -> Aircraft {
    let mut noise_profile = BTreeMap::new();
    noise_profile.insert("takeoff".to_string(), 72.0);
    noise_profile.insert("cruise".to_string(), 65.0);
    noise_profile.insert("landing".to_string(), 70.0);

    Aircraft {
        id: "UAM-200".to_string(),
        name: "Urban Shuttle 200".to_string(),
        manufacturer: "Example Aero".to_string(),
        cruise_speed: 200.0,
        max_speed: 250.0,
        climb_rate: 150.0,
        descent_rate: 300.0,
        max_altitude: 1500.0,
        range: 100.0,
        noise_profile,
        risk_parameters: serde_json::Map::new(),
    }
}

/// Waypoints with explicit leg lengths (km) and altitudes (m).
///
/// Positions step north so that they stay distinct; the distances are taken
/// as given rather than measured.
pub(crate) fn waypoints_with_legs(legs_km: &[f64], altitudes_m: &[f64]) -> Vec<Waypoint> {
    assert_eq!(legs_km.len() + 1, altitudes_m.len());
    altitudes_m
        .iter()
        .enumerate()
        .map(|(i, &alt)| Waypoint {
            id: waypoint_id(i),
            sequence: i,
            position: Position {
                lat: 37.5 + i as f64 * 0.1,
                lon: 127.0,
                alt,
            },
            distance_from_previous: if i == 0 { 0.0 } else { legs_km[i - 1] },
        })
        .collect()
}
