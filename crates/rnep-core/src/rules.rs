//! Tunable thresholds for the scenario pipeline.

use serde::{Deserialize, Serialize};

/// Numeric defaults injected into the builder and buffer helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineRules {
    /// Altitude change (meters) below which a leg counts as level flight
    pub level_tolerance_m: f64,
    /// Altitude for coordinates that carry none
    pub default_altitude_m: f64,
    /// Arc segments per quarter circle when approximating buffer curves
    pub buffer_arc_segments: usize,
}

impl Default for PipelineRules {
    fn default() -> Self {
        Self {
            level_tolerance_m: 1.0,
            default_altitude_m: 0.0,
            buffer_arc_segments: 16,
        }
    }
}
