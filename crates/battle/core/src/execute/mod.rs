//! Action execution with execution-time safety validation.
//!
//! The executor drives each action through a small state machine (see
//! [`ActionStatus`]):
//!
//! 1. **Pending**: honours a caller cancellation
//! 2. **Validating**: [`SafetyValidator`] re-checks the action against live state
//! 3. **Executing**: per-action effects mutate the [`crate::Battlefield`]
//! 4. **Terminal**: Success, Partial, Failed, Blocked or Cancelled
//!
//! No fault crosses the executor boundary; callers always receive a
//! well-formed [`ActionResult`].

mod context;
mod effects;
mod error;
mod executor;
mod result;
mod safety;

pub use context::{CancelToken, ExecutionContext, ValidationLevel};
pub use error::ExecutionFault;
pub use executor::{ActionExecutor, ExecutionStats};
pub use result::{ActionResult, ActionStatus, Effect};
pub use safety::SafetyValidator;
