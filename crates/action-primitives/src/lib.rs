//! L3 Action Primitives - Side-effect-only browser operations
//!
//! This crate turns an already resolved element into a document mutation:
//! - click, type_text and select against a resolved element
//! - navigate, scroll, wait and send_keys without a target
//! - attachment and interactability prechecks before every targeted action
//! - autocomplete/overlay signals captured around click and type
//!
//! Nothing here verifies that the mutation stuck; that is the gate's job.

pub mod driver;
pub mod errors;
pub mod memory;
mod primitives;
mod signals;
pub mod types;

pub use driver::*;
pub use errors::*;
pub use memory::*;
pub use primitives::*;
pub use signals::*;
pub use types::*;
