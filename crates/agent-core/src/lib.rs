//! L8 Agent Core primitives.
//!
//! Glue between the planning loop and the action layer: runs one planning
//! cycle at a time, classifies failures, remembers autocomplete events and
//! escalates stuck states to visual analysis.

pub mod agent_loop;
pub mod errors;
pub mod stuck;

pub use agent_loop::{
    ActionRecord, ActionStatus, CycleConfig, CycleMemory, CyclePorts, CycleResult, CycleRunner,
    ExecutionConfig,
};
pub use errors::{CycleError, FailureClass, StuckError};
pub use stuck::{PlannedIntent, StuckConfig, StuckReason, StuckStateDetector, StuckStateEvent};
