//! Error types for the flight path and scenario pipeline.

use crate::models::ScenarioStatus;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// Validation failures surfaced by the pipeline.
///
/// Every variant carries the field, index or value needed to report a
/// precise message to the user. None of these are retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("unsupported distance unit '{unit}' (expected km, m or miles)")]
    InvalidUnit { unit: String },

    #[error("{field} requires at least {required} waypoints, got {count}")]
    InsufficientWaypoints {
        field: &'static str,
        count: usize,
        required: usize,
    },

    #[error("leg ending at waypoint {index} has speed {speed_kmh} km/h")]
    ZeroSpeedSegment { index: usize, speed_kmh: f64 },

    #[error("flight date {flight_date} is before {today}")]
    PastFlightDate {
        flight_date: NaiveDate,
        today: NaiveDate,
    },

    #[error("ETA at waypoint {index} ({eta}) is not after waypoint {previous} ({previous_eta})")]
    NonMonotonicEta {
        previous: usize,
        index: usize,
        previous_eta: DateTime<Utc>,
        eta: DateTime<Utc>,
    },

    #[error("aircraft '{aircraft_id}' has invalid {field}: {reason}")]
    InvalidAircraftProfile {
        aircraft_id: String,
        field: &'static str,
        reason: String,
    },

    #[error("geometry type {geometry_type} has no coordinate transform strategy")]
    UnsupportedGeometryType { geometry_type: String },

    #[error("{field} = {value} is outside [{min}, {max}]{}", at_index(.index))]
    InvalidPosition {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
        index: Option<usize>,
    },

    #[error("cannot move scenario from {from} to {to}")]
    InvalidTransition {
        from: ScenarioStatus,
        to: ScenarioStatus,
    },

    #[error("buffer distance {distance_m} m must be finite and non-negative")]
    InvalidBufferDistance { distance_m: f64 },

    #[error("unsupported coordinate reference system '{crs}'")]
    UnsupportedCrs { crs: String },

    #[error("{field} mismatch: expected {expected}, got {actual}")]
    ScenarioMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("no algorithm registered for evaluation type '{evaluation_type}'")]
    UnsupportedEvaluationType { evaluation_type: String },

    #[error("{field} must name at least one evaluation type")]
    EmptyEvaluationRequest { field: &'static str },

    #[error("algorithm '{algorithm}' rejected input: {reason}")]
    InvalidEvaluationInput { algorithm: String, reason: String },

    #[error("evaluation request {request_id} has no result for '{evaluation_type}'")]
    MissingEvaluationResult {
        request_id: uuid::Uuid,
        evaluation_type: String,
    },

    #[error("failed to serialize {what}: {reason}")]
    Serialization { what: &'static str, reason: String },
}

fn at_index(index: &Option<usize>) -> String {
    index
        .map(|i| format!(" at coordinate {i}"))
        .unwrap_or_default()
}

impl ScenarioError {
    /// Attach the coordinate index to a position range failure.
    pub fn at_coordinate(self, index: usize) -> Self {
        match self {
            Self::InvalidPosition {
                field,
                value,
                min,
                max,
                ..
            } => Self::InvalidPosition {
                field,
                value,
                min,
                max,
                index: Some(index),
            },
            other => other,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ScenarioError>;
