//! Evaluation contract between the pipeline and external algorithms.
//!
//! The pipeline does not evaluate risk or noise itself. It hands a
//! standardized [`EvaluationInput`] to whichever [`EvaluationAlgorithm`] is
//! registered for an evaluation type and records the outcome against an
//! [`EvaluationRequest`].

use crate::error::{Result, ScenarioError};
use crate::models::{
    Aircraft, EvaluationRequest, EvaluationResult, EvaluationStatus, FlightScenario,
    ScenarioStatus, WaypointWithEta,
};
use crate::path::MIN_PATH_WAYPOINTS;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Evaluation families an algorithm can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    GroundRisk,
    AirRisk,
    Noise,
}

impl EvaluationKind {
    pub const ALL: [EvaluationKind; 3] = [
        EvaluationKind::GroundRisk,
        EvaluationKind::AirRisk,
        EvaluationKind::Noise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::GroundRisk => "ground_risk",
            EvaluationKind::AirRisk => "air_risk",
            EvaluationKind::Noise => "noise",
        }
    }
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvaluationKind {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self> {
        EvaluationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ScenarioError::UnsupportedEvaluationType {
                evaluation_type: s.to_string(),
            })
    }
}

/// Standard input handed to every evaluation algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationInput {
    pub scenario_id: Uuid,
    pub flight_date: NaiveDate,
    pub waypoints_with_eta: Vec<WaypointWithEta>,
    pub aircraft_data: Aircraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_data: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_params: Option<Map<String, Value>>,
}

impl EvaluationInput {
    /// Package a scenario and its aircraft for evaluation.
    pub fn from_scenario(scenario: &FlightScenario, aircraft: &Aircraft) -> Result<Self> {
        if aircraft.id != scenario.aircraft_id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "aircraft_id",
                expected: scenario.aircraft_id.clone(),
                actual: aircraft.id.clone(),
            });
        }

        Ok(Self {
            scenario_id: scenario.id,
            flight_date: scenario.flight_date,
            waypoints_with_eta: scenario.waypoints_with_eta().to_vec(),
            aircraft_data: aircraft.clone(),
            environment_data: None,
            additional_params: None,
        })
    }

    pub fn with_environment(mut self, environment: Map<String, Value>) -> Self {
        self.environment_data = Some(environment);
        self
    }

    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.additional_params = Some(params);
        self
    }

    /// Whether a named input is available to an algorithm.
    ///
    /// `waypoints` and `aircraft_data` are always part of the record;
    /// `aircraft_noise_profile` needs a non-empty profile; any other name
    /// must be a key of the environment data or additional parameters.
    pub fn has_input(&self, name: &str) -> bool {
        match name {
            "waypoints" | "waypoints_with_eta" => !self.waypoints_with_eta.is_empty(),
            "aircraft_data" => true,
            "aircraft_noise_profile" => !self.aircraft_data.noise_profile.is_empty(),
            other => [&self.environment_data, &self.additional_params]
                .into_iter()
                .flatten()
                .any(|map| map.contains_key(other)),
        }
    }
}

/// Identification and input requirements of an algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmMetadata {
    pub name: String,
    pub version: String,
    pub organization: String,
    pub description: String,
    pub supported_evaluation_types: Vec<EvaluationKind>,
    pub required_inputs: Vec<String>,
    #[serde(default)]
    pub optional_inputs: Vec<String>,
}

impl AlgorithmMetadata {
    pub fn supports(&self, kind: EvaluationKind) -> bool {
        self.supported_evaluation_types.contains(&kind)
    }
}

/// File produced by an algorithm, e.g. a shapefile of noise contours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    #[serde(rename = "type")]
    pub file_type: String,
    pub path: String,
}

/// Standard output returned by every evaluation algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub evaluation_type: EvaluationKind,
    pub algorithm_metadata: AlgorithmMetadata,
    pub summary: Map<String, Value>,
    pub detailed_results: Map<String, Value>,
    #[serde(default)]
    pub output_files: Vec<OutputFile>,
    pub processing_time_s: f64,
    pub timestamp: DateTime<Utc>,
}

/// Contract implemented by every evaluation algorithm adapter.
///
/// Risk and noise families are variant implementations of this one trait;
/// the registry dispatches on the evaluation types declared in
/// [`AlgorithmMetadata`].
pub trait EvaluationAlgorithm: Send + Sync {
    fn metadata(&self) -> AlgorithmMetadata;

    /// Reject input the algorithm cannot work with.
    fn validate_input(&self, input: &EvaluationInput) -> Result<()> {
        check_required_inputs(&self.metadata(), input)
    }

    fn execute(&self, input: &EvaluationInput) -> Result<EvaluationOutput>;

    /// JSON schema of `EvaluationOutput::detailed_results`.
    fn output_schema(&self) -> Value;
}

/// Default input check: enough waypoints and every required input present.
pub fn check_required_inputs(metadata: &AlgorithmMetadata, input: &EvaluationInput) -> Result<()> {
    let reject = |reason: String| ScenarioError::InvalidEvaluationInput {
        algorithm: metadata.name.clone(),
        reason,
    };

    let count = input.waypoints_with_eta.len();
    if count < MIN_PATH_WAYPOINTS {
        return Err(reject(format!(
            "at least {MIN_PATH_WAYPOINTS} waypoints required, got {count}"
        )));
    }

    match metadata
        .required_inputs
        .iter()
        .find(|name| !input.has_input(name))
    {
        Some(missing) => Err(reject(format!("missing required input '{missing}'"))),
        None => Ok(()),
    }
}

/// Registered evaluation algorithms.
pub struct AlgorithmRegistry {
    algorithms: Vec<Box<dyn EvaluationAlgorithm>>,
}

impl AlgorithmRegistry {
    pub fn new() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// Register an algorithm. Earlier registrations win when two algorithms
    /// serve the same evaluation type.
    pub fn register(&mut self, algorithm: Box<dyn EvaluationAlgorithm>) {
        let metadata = algorithm.metadata();
        tracing::info!(
            algorithm = %metadata.name,
            version = %metadata.version,
            types = ?metadata.supported_evaluation_types,
            "Registered evaluation algorithm"
        );
        self.algorithms.push(algorithm);
    }

    /// Algorithm serving `kind`, if any.
    pub fn get(&self, kind: EvaluationKind) -> Option<&dyn EvaluationAlgorithm> {
        self.algorithms
            .iter()
            .find(|algorithm| algorithm.metadata().supports(kind))
            .map(|algorithm| algorithm.as_ref())
    }

    /// Evaluation types with at least one registered algorithm.
    pub fn supported_types(&self) -> Vec<EvaluationKind> {
        EvaluationKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect()
    }

    /// Run the algorithm registered for `evaluation_type`.
    pub fn evaluate(&self, evaluation_type: &str, input: &EvaluationInput) -> Result<EvaluationOutput> {
        let kind: EvaluationKind = evaluation_type.parse()?;
        let algorithm = self
            .get(kind)
            .ok_or_else(|| ScenarioError::UnsupportedEvaluationType {
                evaluation_type: evaluation_type.to_string(),
            })?;

        algorithm.validate_input(input)?;
        let output = algorithm.execute(input)?;
        tracing::debug!(
            scenario_id = %input.scenario_id,
            evaluation_type = %kind,
            processing_time_s = output.processing_time_s,
            "Evaluation finished"
        );
        Ok(output)
    }

    /// Run every type named by `request`, tracking status and progress on it.
    ///
    /// The first failure marks the request failed and is returned; no
    /// results are kept from a failed request.
    pub fn run_request(
        &self,
        request: &mut EvaluationRequest,
        input: &EvaluationInput,
        now: DateTime<Utc>,
    ) -> Result<Vec<EvaluationResult>> {
        if request.scenario_id != input.scenario_id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "scenario_id",
                expected: request.scenario_id.to_string(),
                actual: input.scenario_id.to_string(),
            });
        }

        request.status = EvaluationStatus::Running;
        request.progress = 0.0;
        request.error_message = None;

        let evaluation_types = request.evaluation_types.clone();
        let total = evaluation_types.len();
        let mut results = Vec::with_capacity(total);
        for (done, evaluation_type) in evaluation_types.iter().enumerate() {
            match self.evaluate(evaluation_type, input).and_then(|output| {
                to_result(request.id, evaluation_type, &output, now)
            }) {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::warn!(
                        request_id = %request.id,
                        evaluation_type = %evaluation_type,
                        error = %err,
                        "Evaluation failed"
                    );
                    request.status = EvaluationStatus::Failed;
                    request.error_message = Some(err.to_string());
                    request.completed_at = Some(now);
                    return Err(err);
                }
            }
            request.progress = (done + 1) as f64 / total as f64;
        }

        request.status = EvaluationStatus::Completed;
        request.progress = 1.0;
        request.completed_at = Some(now);
        Ok(results)
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn to_result(
    request_id: Uuid,
    evaluation_type: &str,
    output: &EvaluationOutput,
    now: DateTime<Utc>,
) -> Result<EvaluationResult> {
    let output_data = serde_json::to_value(output).map_err(|err| ScenarioError::Serialization {
        what: "evaluation output",
        reason: err.to_string(),
    })?;

    Ok(EvaluationResult {
        id: Uuid::new_v4(),
        evaluation_request_id: request_id,
        evaluation_type: evaluation_type.to_string(),
        algorithm_version: output.algorithm_metadata.version.clone(),
        output_data,
        created_at: now,
    })
}

impl FlightScenario {
    /// Issue an evaluation request, moving the scenario from ready to
    /// evaluating. The request must name at least one known type.
    pub fn begin_evaluation(
        &mut self,
        evaluation_types: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<EvaluationRequest> {
        if evaluation_types.is_empty() {
            return Err(ScenarioError::EmptyEvaluationRequest {
                field: "evaluation_types",
            });
        }
        for evaluation_type in &evaluation_types {
            evaluation_type.parse::<EvaluationKind>()?;
        }
        self.transition_to(ScenarioStatus::Evaluating, now)?;
        Ok(EvaluationRequest::new(self.id, evaluation_types, now))
    }

    /// Mark the scenario completed once every requested type has a result.
    pub fn complete_evaluation(
        &mut self,
        request: &EvaluationRequest,
        results: &[EvaluationResult],
        now: DateTime<Utc>,
    ) -> Result<()> {
        if request.scenario_id != self.id {
            return Err(ScenarioError::ScenarioMismatch {
                field: "scenario_id",
                expected: self.id.to_string(),
                actual: request.scenario_id.to_string(),
            });
        }
        if request.evaluation_types.is_empty() {
            return Err(ScenarioError::EmptyEvaluationRequest {
                field: "evaluation_types",
            });
        }

        let missing = request.evaluation_types.iter().find(|evaluation_type| {
            !results.iter().any(|result| {
                result.evaluation_request_id == request.id
                    && &result.evaluation_type == *evaluation_type
            })
        });
        if let Some(evaluation_type) = missing {
            return Err(ScenarioError::MissingEvaluationResult {
                request_id: request.id,
                evaluation_type: evaluation_type.clone(),
            });
        }

        self.transition_to(ScenarioStatus::Completed, now)
    }

    /// Drop an in-flight evaluation and return to ready.
    pub fn abandon_evaluation(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(ScenarioStatus::Ready, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_aircraft, waypoints_with_legs};
    use crate::rules::PipelineRules;
    use crate::scenario::{build_waypoints_with_eta, PhaseSpeedPolicy};
    use chrono::{NaiveTime, TimeZone};
    use serde_json::json;

    /// Noise stub: reports the loudest profile level.
    struct StubNoise;

    impl EvaluationAlgorithm for StubNoise {
        fn metadata(&self) -> AlgorithmMetadata {
            AlgorithmMetadata {
                name: "Stub Noise".to_string(),
                version: "1.0.0".to_string(),
                organization: "Test Lab".to_string(),
                description: "Peak noise from the aircraft profile".to_string(),
                supported_evaluation_types: vec![EvaluationKind::Noise],
                required_inputs: vec!["waypoints".to_string(), "aircraft_noise_profile".to_string()],
                optional_inputs: vec!["terrain_data".to_string()],
            }
        }

        fn execute(&self, input: &EvaluationInput) -> Result<EvaluationOutput> {
            let peak = input
                .aircraft_data
                .noise_profile
                .values()
                .copied()
                .fold(f64::MIN, f64::max);
            let mut summary = Map::new();
            summary.insert("peak_db".to_string(), json!(peak));

            Ok(EvaluationOutput {
                evaluation_type: EvaluationKind::Noise,
                algorithm_metadata: self.metadata(),
                summary,
                detailed_results: Map::new(),
                output_files: vec![OutputFile {
                    file_type: "shapefile".to_string(),
                    path: "/tmp/contours.shp".to_string(),
                }],
                processing_time_s: 0.01,
                timestamp: Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap(),
            })
        }

        fn output_schema(&self) -> Value {
            json!({ "type": "object" })
        }
    }

    /// Ground risk stub that needs population data.
    struct StubGroundRisk;

    impl EvaluationAlgorithm for StubGroundRisk {
        fn metadata(&self) -> AlgorithmMetadata {
            AlgorithmMetadata {
                name: "Stub Ground Risk".to_string(),
                version: "0.3.0".to_string(),
                organization: "Test Lab".to_string(),
                description: "Always low risk".to_string(),
                supported_evaluation_types: vec![EvaluationKind::GroundRisk],
                required_inputs: vec!["aircraft_data".to_string(), "population_density".to_string()],
                optional_inputs: Vec::new(),
            }
        }

        fn execute(&self, _input: &EvaluationInput) -> Result<EvaluationOutput> {
            Ok(EvaluationOutput {
                evaluation_type: EvaluationKind::GroundRisk,
                algorithm_metadata: self.metadata(),
                summary: Map::new(),
                detailed_results: Map::new(),
                output_files: Vec::new(),
                processing_time_s: 0.0,
                timestamp: Utc.with_ymd_and_hms(2030, 5, 1, 9, 0, 0).unwrap(),
            })
        }

        fn output_schema(&self) -> Value {
            json!({})
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 4, 20, 8, 0, 0).unwrap()
    }

    fn ready_scenario() -> FlightScenario {
        let aircraft = sample_aircraft();
        let flight_date = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
        let departure = Utc.from_utc_datetime(
            &flight_date.and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()),
        );
        let waypoints = build_waypoints_with_eta(
            &waypoints_with_legs(&[10.0, 15.0], &[300.0, 300.0, 300.0]),
            &aircraft,
            departure,
            &PhaseSpeedPolicy,
            &PipelineRules::default(),
        )
        .unwrap();

        let mut scenario = FlightScenario {
            id: Uuid::new_v4(),
            name: "evaluation".to_string(),
            description: None,
            flight_date,
            departure_time: departure.time(),
            aircraft_id: aircraft.id.clone(),
            flight_path_id: Uuid::new_v4(),
            waypoints_with_eta: waypoints,
            status: ScenarioStatus::Draft,
            created_at: now(),
            updated_at: now(),
        };
        scenario.mark_ready(&aircraft, now()).unwrap();
        scenario
    }

    fn registry() -> AlgorithmRegistry {
        let mut registry = AlgorithmRegistry::new();
        registry.register(Box::new(StubNoise));
        registry.register(Box::new(StubGroundRisk));
        registry
    }

    #[test]
    fn kind_parses_known_strings_only() {
        assert_eq!("ground_risk".parse::<EvaluationKind>().unwrap(), EvaluationKind::GroundRisk);
        assert_eq!("air_risk".parse::<EvaluationKind>().unwrap(), EvaluationKind::AirRisk);
        assert_eq!("noise".parse::<EvaluationKind>().unwrap(), EvaluationKind::Noise);
        assert_eq!(
            "Noise".parse::<EvaluationKind>().unwrap_err(),
            ScenarioError::UnsupportedEvaluationType {
                evaluation_type: "Noise".to_string()
            }
        );
        assert_eq!(serde_json::to_value(EvaluationKind::AirRisk).unwrap(), json!("air_risk"));
    }

    #[test]
    fn input_carries_scenario_and_aircraft() {
        let scenario = ready_scenario();
        let input = EvaluationInput::from_scenario(&scenario, &sample_aircraft()).unwrap();

        assert_eq!(input.scenario_id, scenario.id);
        assert_eq!(input.flight_date, scenario.flight_date);
        assert_eq!(input.waypoints_with_eta.len(), 3);
        assert_eq!(input.aircraft_data.id, "UAM-200");

        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("environment_data").is_none());
        let first = &value["waypoints_with_eta"][0];
        assert_eq!(first["id"], json!("WP001"));
        assert_eq!(first["speed"], json!(0.0));
        assert!(first.get("estimated_arrival_time").is_some());
    }

    #[test]
    fn input_rejects_other_aircraft() {
        let scenario = ready_scenario();
        let mut other = sample_aircraft();
        other.id = "UAM-300".to_string();

        let err = EvaluationInput::from_scenario(&scenario, &other).unwrap_err();
        assert!(matches!(err, ScenarioError::ScenarioMismatch { field: "aircraft_id", .. }));
    }

    #[test]
    fn registry_dispatches_by_type_string() {
        let registry = registry();
        let input = EvaluationInput::from_scenario(&ready_scenario(), &sample_aircraft()).unwrap();

        let output = registry.evaluate("noise", &input).unwrap();
        assert_eq!(output.evaluation_type, EvaluationKind::Noise);
        assert_eq!(output.summary["peak_db"], json!(72.0));
        assert_eq!(
            registry.supported_types(),
            vec![EvaluationKind::GroundRisk, EvaluationKind::Noise]
        );
    }

    #[test]
    fn unregistered_or_unknown_type_is_unsupported() {
        let registry = registry();
        let input = EvaluationInput::from_scenario(&ready_scenario(), &sample_aircraft()).unwrap();

        for evaluation_type in ["air_risk", "vibration"] {
            let err = registry.evaluate(evaluation_type, &input).unwrap_err();
            assert_eq!(
                err,
                ScenarioError::UnsupportedEvaluationType {
                    evaluation_type: evaluation_type.to_string()
                }
            );
        }
    }

    #[test]
    fn missing_required_input_is_rejected_before_execute() {
        let registry = registry();
        let input = EvaluationInput::from_scenario(&ready_scenario(), &sample_aircraft()).unwrap();

        let err = registry.evaluate("ground_risk", &input).unwrap_err();
        assert_eq!(
            err,
            ScenarioError::InvalidEvaluationInput {
                algorithm: "Stub Ground Risk".to_string(),
                reason: "missing required input 'population_density'".to_string(),
            }
        );

        let mut environment = Map::new();
        environment.insert("population_density".to_string(), json!([[0.0]]));
        let input = input.with_environment(environment);
        assert!(registry.evaluate("ground_risk", &input).is_ok());
    }

    #[test]
    fn short_waypoint_list_is_rejected() {
        let registry = registry();
        let mut input =
            EvaluationInput::from_scenario(&ready_scenario(), &sample_aircraft()).unwrap();
        input.waypoints_with_eta.truncate(1);

        let err = registry.evaluate("noise", &input).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidEvaluationInput { .. }));
    }

    #[test]
    fn request_runs_to_completion_and_completes_scenario() {
        let registry = registry();
        let mut scenario = ready_scenario();
        let mut params = Map::new();
        params.insert("population_density".to_string(), json!(1200));
        let input = EvaluationInput::from_scenario(&scenario, &sample_aircraft())
            .unwrap()
            .with_params(params);

        let mut request = scenario
            .begin_evaluation(vec!["noise".to_string(), "ground_risk".to_string()], now())
            .unwrap();
        assert_eq!(scenario.status(), ScenarioStatus::Evaluating);
        assert_eq!(request.status, EvaluationStatus::Pending);

        let results = registry.run_request(&mut request, &input, now()).unwrap();
        assert_eq!(request.status, EvaluationStatus::Completed);
        assert_eq!(request.progress, 1.0);
        assert_eq!(request.completed_at, Some(now()));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].algorithm_version, "1.0.0");
        assert_eq!(results[1].evaluation_type, "ground_risk");

        // One result is not enough.
        let err = scenario
            .complete_evaluation(&request, &results[..1], now())
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::MissingEvaluationResult {
                request_id: request.id,
                evaluation_type: "ground_risk".to_string(),
            }
        );
        assert_eq!(scenario.status(), ScenarioStatus::Evaluating);

        scenario.complete_evaluation(&request, &results, now()).unwrap();
        assert_eq!(scenario.status(), ScenarioStatus::Completed);
        assert!(scenario.abandon_evaluation(now()).is_err());
    }

    #[test]
    fn failed_request_records_error() {
        let registry = registry();
        let mut scenario = ready_scenario();
        let input = EvaluationInput::from_scenario(&scenario, &sample_aircraft()).unwrap();
        let mut request = scenario
            .begin_evaluation(vec!["noise".to_string(), "ground_risk".to_string()], now())
            .unwrap();

        let err = registry.run_request(&mut request, &input, now()).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidEvaluationInput { .. }));
        assert_eq!(request.status, EvaluationStatus::Failed);
        assert_eq!(request.progress, 0.5);
        assert_eq!(request.error_message, Some(err.to_string()));

        scenario.abandon_evaluation(now()).unwrap();
        assert_eq!(scenario.status(), ScenarioStatus::Ready);
    }

    #[test]
    fn begin_evaluation_requires_ready_and_known_types() {
        let mut scenario = ready_scenario();
        let err = scenario
            .begin_evaluation(vec!["sonic_boom".to_string()], now())
            .unwrap_err();
        assert!(matches!(err, ScenarioError::UnsupportedEvaluationType { .. }));
        assert_eq!(scenario.status(), ScenarioStatus::Ready);

        scenario.begin_evaluation(vec!["noise".to_string()], now()).unwrap();
        let err = scenario
            .begin_evaluation(vec!["noise".to_string()], now())
            .unwrap_err();
        assert_eq!(
            err,
            ScenarioError::InvalidTransition {
                from: ScenarioStatus::Evaluating,
                to: ScenarioStatus::Evaluating,
            }
        );
    }

    #[test]
    fn empty_evaluation_request_leaves_scenario_ready() {
        let mut scenario = ready_scenario();
        let err = scenario.begin_evaluation(Vec::new(), now()).unwrap_err();
        assert_eq!(
            err,
            ScenarioError::EmptyEvaluationRequest {
                field: "evaluation_types"
            }
        );
        assert_eq!(scenario.status(), ScenarioStatus::Ready);

        // A hand-built empty request cannot complete an evaluating scenario.
        scenario.begin_evaluation(vec!["noise".to_string()], now()).unwrap();
        let empty = EvaluationRequest::new(scenario.id, Vec::new(), now());
        let err = scenario.complete_evaluation(&empty, &[], now()).unwrap_err();
        assert!(matches!(err, ScenarioError::EmptyEvaluationRequest { .. }));
        assert_eq!(scenario.status(), ScenarioStatus::Evaluating);
    }

    #[test]
    fn request_for_other_scenario_is_rejected() {
        let registry = registry();
        let scenario = ready_scenario();
        let input = EvaluationInput::from_scenario(&scenario, &sample_aircraft()).unwrap();
        let mut request = EvaluationRequest::new(Uuid::new_v4(), vec!["noise".to_string()], now());

        let err = registry.run_request(&mut request, &input, now()).unwrap_err();
        assert!(matches!(err, ScenarioError::ScenarioMismatch { field: "scenario_id", .. }));
        assert_eq!(request.status, EvaluationStatus::Pending);
    }
}
