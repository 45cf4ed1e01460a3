//! Scenario builder: attach ETAs and speeds to a flight path.
//!
//! Speed assignment is a pluggable strategy (`SpeedPolicy`) so the builder
//! can be exercised independently of aircraft-specific performance curves.

use crate::error::{Result, ScenarioError};
use crate::models::{
    Aircraft, FlightPath, FlightScenario, ScenarioRequest, ScenarioStatus, Waypoint,
    WaypointWithEta,
};
use crate::rules::PipelineRules;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Flight phase of a leg, inferred from its altitude change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightPhase {
    Climb,
    Cruise,
    Descent,
}

impl FlightPhase {
    /// Classify a leg; changes within `level_tolerance_m` count as level.
    pub fn classify(altitude_delta_m: f64, level_tolerance_m: f64) -> Self {
        if altitude_delta_m.abs() <= level_tolerance_m {
            FlightPhase::Cruise
        } else if altitude_delta_m > 0.0 {
            FlightPhase::Climb
        } else {
            FlightPhase::Descent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightPhase::Climb => "climb",
            FlightPhase::Cruise => "cruise",
            FlightPhase::Descent => "descent",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leg of the path, ending at waypoint `index`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub index: usize,
    pub phase: FlightPhase,
    /// Altitude change from the previous waypoint in meters
    pub altitude_delta_m: f64,
    /// Horizontal distance from the previous waypoint in kilometers
    pub distance_km: f64,
}

/// Strategy that assigns a horizontal speed (km/h) to a leg.
pub trait SpeedPolicy: Send + Sync {
    fn speed_kmh(&self, aircraft: &Aircraft, leg: &Leg) -> f64;
}

/// Plain functions `(aircraft, altitude delta m, distance km) -> km/h`.
impl<F> SpeedPolicy for F
where
    F: Fn(&Aircraft, f64, f64) -> f64 + Send + Sync,
{
    fn speed_kmh(&self, aircraft: &Aircraft, leg: &Leg) -> f64 {
        self(aircraft, leg.altitude_delta_m, leg.distance_km)
    }
}

/// Default performance-based policy.
///
/// Level legs fly at cruise speed. Climbing and descending legs fly at the
/// fastest horizontal speed, up to cruise, that still lets the altitude
/// change complete within the leg at the aircraft's climb or descent rate.
/// The result never exceeds the maximum speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseSpeedPolicy;

impl SpeedPolicy for PhaseSpeedPolicy {
    fn speed_kmh(&self, aircraft: &Aircraft, leg: &Leg) -> f64 {
        let speed = match leg.phase {
            FlightPhase::Cruise => aircraft.cruise_speed,
            FlightPhase::Climb => rate_limited_speed(aircraft.cruise_speed, leg, aircraft.climb_rate),
            FlightPhase::Descent => {
                rate_limited_speed(aircraft.cruise_speed, leg, aircraft.descent_rate)
            }
        };
        speed.min(aircraft.max_speed).max(0.0)
    }
}

fn rate_limited_speed(cruise_kmh: f64, leg: &Leg, rate_m_per_min: f64) -> f64 {
    if rate_m_per_min <= 0.0 {
        return 0.0;
    }
    let vertical_hours = leg.altitude_delta_m.abs() / rate_m_per_min / 60.0;
    if vertical_hours <= 0.0 {
        return cruise_kmh;
    }
    cruise_kmh.min(leg.distance_km / vertical_hours)
}

/// Fixed speed for every leg.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSpeedPolicy(pub f64);

impl SpeedPolicy for ConstantSpeedPolicy {
    fn speed_kmh(&self, _aircraft: &Aircraft, _leg: &Leg) -> f64 {
        self.0
    }
}

/// Attach ETAs and speeds to a waypoint sequence.
///
/// The first waypoint arrives at `departure` with speed 0. Each later
/// waypoint arrives `distance / speed` after its predecessor. A leg whose
/// speed is zero, negative or not finite fails the whole build.
pub fn build_waypoints_with_eta(
    waypoints: &[Waypoint],
    aircraft: &Aircraft,
    departure: DateTime<Utc>,
    policy: &dyn SpeedPolicy,
    rules: &PipelineRules,
) -> Result<Vec<WaypointWithEta>> {
    let Some(first) = waypoints.first() else {
        return Ok(Vec::new());
    };

    let mut annotated = Vec::with_capacity(waypoints.len());
    annotated.push(WaypointWithEta {
        waypoint: first.clone(),
        estimated_arrival_time: departure,
        speed: 0.0,
    });

    let mut eta = departure;
    for (index, pair) in waypoints.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        let altitude_delta_m = current.position.alt - prev.position.alt;
        let leg = Leg {
            index: index + 1,
            phase: FlightPhase::classify(altitude_delta_m, rules.level_tolerance_m),
            altitude_delta_m,
            distance_km: current.distance_from_previous,
        };

        let speed = policy.speed_kmh(aircraft, &leg);
        let zero_speed = || ScenarioError::ZeroSpeedSegment {
            index: leg.index,
            speed_kmh: speed,
        };
        if !(speed.is_finite() && speed > 0.0) {
            return Err(zero_speed());
        }

        let hours = leg.distance_km / speed;
        let elapsed = Duration::microseconds((hours * MICROS_PER_HOUR).round() as i64);
        // An absurdly slow leg overflows the calendar; treat it as stalled.
        eta = eta.checked_add_signed(elapsed).ok_or_else(zero_speed)?;

        tracing::debug!(
            waypoint = %current.id,
            phase = %leg.phase,
            distance_km = leg.distance_km,
            speed_kmh = speed,
            eta = %eta,
            "Leg timed"
        );

        annotated.push(WaypointWithEta {
            waypoint: current.clone(),
            estimated_arrival_time: eta,
            speed,
        });
    }

    Ok(annotated)
}

/// Builds draft scenarios from a request, a path and an aircraft.
pub struct ScenarioBuilder {
    policy: Box<dyn SpeedPolicy>,
    rules: PipelineRules,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new(PhaseSpeedPolicy)
    }
}

impl ScenarioBuilder {
    pub fn new(policy: impl SpeedPolicy + 'static) -> Self {
        Self {
            policy: Box::new(policy),
            rules: PipelineRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: PipelineRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &PipelineRules {
        &self.rules
    }

    /// Build a draft scenario stamped with the current time.
    pub fn build(
        &self,
        request: &ScenarioRequest,
        path: &FlightPath,
        aircraft: &Aircraft,
    ) -> Result<FlightScenario> {
        self.build_at(request, path, aircraft, Utc::now())
    }

    /// Build a draft scenario stamped with `now`.
    ///
    /// Either a complete scenario is returned or none is.
    pub fn build_at(
        &self,
        request: &ScenarioRequest,
        path: &FlightPath,
        aircraft: &Aircraft,
        now: DateTime<Utc>,
    ) -> Result<FlightScenario> {
        if request.flight_path_id != path.id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "flight_path_id",
                expected: request.flight_path_id.to_string(),
                actual: path.id.to_string(),
            });
        }
        if request.aircraft_id != aircraft.id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "aircraft_id",
                expected: request.aircraft_id.clone(),
                actual: aircraft.id.clone(),
            });
        }

        let departure =
            Utc.from_utc_datetime(&request.flight_date.and_time(request.departure_time));
        let waypoints_with_eta = build_waypoints_with_eta(
            &path.waypoints,
            aircraft,
            departure,
            self.policy.as_ref(),
            &self.rules,
        )?;

        let scenario = FlightScenario {
            id: Uuid::new_v4(),
            name: request.name.clone(),
            description: request.description.clone(),
            flight_date: request.flight_date,
            departure_time: request.departure_time,
            aircraft_id: aircraft.id.clone(),
            flight_path_id: path.id,
            waypoints_with_eta,
            status: ScenarioStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            scenario_id = %scenario.id,
            name = %scenario.name,
            waypoints = scenario.waypoints_with_eta.len(),
            arrival = ?scenario.arrival_time(),
            "Scenario built"
        );

        Ok(scenario)
    }
}
