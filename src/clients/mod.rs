//! Type-safe handles for talking to the cart actor.

pub mod cart_client;
pub mod mock;

pub use cart_client::*;
