pub mod buffer;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod path;
pub mod projection;
pub mod rules;
pub mod scenario;
pub mod spatial;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use buffer::{create_buffer_zone, waypoint_buffer};
pub use error::{Result, ScenarioError};
pub use evaluation::{
    check_required_inputs, AlgorithmMetadata, AlgorithmRegistry, EvaluationAlgorithm,
    EvaluationInput, EvaluationKind, EvaluationOutput, OutputFile,
};
pub use models::{
    Aircraft, Coordinate, EvaluationRequest, EvaluationResult, EvaluationStatus, FlightPath,
    FlightScenario, Position, ScenarioRequest, ScenarioStatus, Waypoint, WaypointWithEta,
};
pub use path::{extract_waypoints, waypoint_id, MIN_PATH_WAYPOINTS};
pub use projection::{transform_geometry, utm_zone_for, Crs};
pub use rules::PipelineRules;
pub use scenario::{
    build_waypoints_with_eta, ConstantSpeedPolicy, FlightPhase, Leg, PhaseSpeedPolicy,
    ScenarioBuilder, SpeedPolicy,
};
pub use spatial::{bearing, distance, geodesic_distance, haversine_distance, total_distance, DistanceUnit};
pub use validation::validate_scenario;
