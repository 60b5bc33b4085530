//! The authoritative cart store.
//!
//! A plain keyed map. It knows nothing about expiry: a stale cart is returned like
//! any other, and deciding what to do with it is the orchestrator's job.

use crate::model::{Cart, CartId};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CartStore {
    carts: HashMap<CartId, Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the cart under its own id.
    pub fn put(&mut self, cart: Cart) {
        self.carts.insert(cart.id().clone(), cart);
    }

    pub fn get(&self, id: &CartId) -> Option<&Cart> {
        self.carts.get(id)
    }

    /// Removes the cart. Removing an absent id is not an error.
    pub fn delete(&mut self, id: &CartId) -> Option<Cart> {
        self.carts.remove(id)
    }

    pub fn exists(&self, id: &CartId) -> bool {
        self.carts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.carts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }
}
