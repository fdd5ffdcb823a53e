pub mod api;
pub mod model;

pub use api::{BatchFilter, SingleActionScheduler};
pub use model::{BatchDecision, DroppedAction, SchedulerConfig};
