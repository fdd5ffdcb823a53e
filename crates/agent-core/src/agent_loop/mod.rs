//! Cycle execution.
//!
//! One cycle takes the batch a planner proposed against one snapshot and
//! turns it into verified document mutations:
//!
//! - [`CycleConfig`]: budgets for every stage
//! - [`CycleRunner`]: filter, resolve, execute, verify, escalate
//! - [`CycleMemory`]: autocomplete and action history across cycles
//! - [`CycleResult`]: per-action records plus advisories for the planner

pub mod config;
pub mod controller;
pub mod memory;
pub mod types;

pub use config::{CycleConfig, ExecutionConfig};
pub use controller::{CyclePorts, CycleRunner};
pub use memory::{ActionSummary, AutocompleteEvent, CycleMemory};
pub use types::{ActionRecord, ActionStatus, CycleResult};
