//! The cart entity: immutable values with pure operations.

pub mod cart;
pub mod ids;
pub mod item;

pub use cart::*;
pub use ids::*;
pub use item::*;
