//! Steadyhand library
//!
//! Configuration and scenario support shared by the `steadyhand` binary and
//! integration tests.

pub mod config;
pub mod scenario;

pub use config::{load_config, Config, LoadedConfig, LoggingConfig};
pub use scenario::{run_scenario, Scenario, ScenarioCycle, ScenarioReport};
