//! Foundation layer - shared value objects and domain primitives.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{DriverId, PassengerId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
