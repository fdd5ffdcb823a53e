//! L3 Post-conditions Gate - Verification with bounded re-execution
//!
//! An action that returned without error has not necessarily changed the
//! page: inputs get swallowed, fields reset on re-render, values land late.
//! This crate reads the element back after a settle delay and, on mismatch,
//! re-applies the action a bounded number of times:
//! - progressive delays (`attempt x base_delay`) between checks
//! - case-insensitive substring comparison of observed vs expected
//! - an explicit `Pending -> Checking -> {Passed, Retrying, Failed}` machine
//! - cancellation leaves partial input in place and says so

pub mod conditions;
pub mod errors;
pub mod evidence;
pub mod types;
pub mod validator;

pub use conditions::*;
pub use errors::*;
pub use evidence::*;
pub use types::*;
pub use validator::*;
