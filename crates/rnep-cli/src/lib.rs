//! RNEP CLI - Command line tools over the scenario pipeline.
//!
//! Binaries:
//! - build_scenario: flight path + aircraft to a validated scenario and its
//!   evaluation input
//! - buffer_zone: buffer polygon around a flight path

pub mod config;
pub mod input;
pub mod logging;
pub mod output;

pub use config::{LogLevel, Settings};
pub use input::{parse_departure, read_json, PathFile};
pub use logging::init_tracing;
pub use output::{polygon_rings, write_json};
