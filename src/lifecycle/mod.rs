//! Runtime wiring: starting and stopping the cart actor, and observability setup.

pub mod cart_system;
pub mod tracing;

pub use cart_system::*;
pub use self::tracing::*;
