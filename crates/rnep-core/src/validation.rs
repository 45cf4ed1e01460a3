//! Scenario validation and the draft -> ready gate.

use crate::error::{Result, ScenarioError};
use crate::models::{Aircraft, FlightScenario, ScenarioStatus};
use crate::path::MIN_PATH_WAYPOINTS;
use chrono::{DateTime, NaiveDate, Utc};

/// Check a built scenario, failing on the first violated invariant.
///
/// Checks run in order: flight date not in the past, at least two
/// waypoints, strictly increasing ETAs, aircraft max speed above cruise.
pub fn validate_scenario(
    scenario: &FlightScenario,
    aircraft: &Aircraft,
    today: NaiveDate,
) -> Result<()> {
    if scenario.flight_date < today {
        return Err(ScenarioError::PastFlightDate {
            flight_date: scenario.flight_date,
            today,
        });
    }

    let waypoints = scenario.waypoints_with_eta();
    if waypoints.len() < MIN_PATH_WAYPOINTS {
        return Err(ScenarioError::InsufficientWaypoints {
            field: "waypoints_with_eta",
            count: waypoints.len(),
            required: MIN_PATH_WAYPOINTS,
        });
    }

    for (i, pair) in waypoints.windows(2).enumerate() {
        let (prev, current) = (&pair[0], &pair[1]);
        if current.estimated_arrival_time <= prev.estimated_arrival_time {
            return Err(ScenarioError::NonMonotonicEta {
                previous: i,
                index: i + 1,
                previous_eta: prev.estimated_arrival_time,
                eta: current.estimated_arrival_time,
            });
        }
    }

    // Repeats the check `Aircraft::validate` makes at load time, for
    // records that never went through it.
    aircraft.check_speed_envelope()
}

impl FlightScenario {
    /// Validate and move the scenario from draft to ready.
    ///
    /// On failure the scenario stays in draft and the violated invariant is
    /// returned.
    pub fn mark_ready(&mut self, aircraft: &Aircraft, now: DateTime<Utc>) -> Result<()> {
        if self.status != ScenarioStatus::Draft {
            return Err(ScenarioError::InvalidTransition {
                from: self.status,
                to: ScenarioStatus::Ready,
            });
        }
        if aircraft.id != self.aircraft_id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "aircraft_id",
                expected: self.aircraft_id.clone(),
                actual: aircraft.id.clone(),
            });
        }

        if let Err(err) = validate_scenario(self, aircraft, now.date_naive()) {
            tracing::warn!(scenario_id = %self.id, error = %err, "Scenario rejected");
            return Err(err);
        }
        self.transition_to(ScenarioStatus::Ready, now)
    }
}
