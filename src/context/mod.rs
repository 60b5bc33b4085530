//! # External Customer Context
//!
//! Every cart mutation is mirrored into a customer-context record held by an external
//! CRM. [`CustomerContext`] is the contract the orchestrator consumes; [`MockContextStore`]
//! is the in-memory stand-in used by the running system and the tests.
//!
//! ## Independent expiry
//! A context computes its own `expires_at` when it is created, using the same TTL as the
//! cart but a slightly later instant (and possibly a different clock). The orchestrator
//! must never assume the two expire in lockstep.
//!
//! ## Lazy eviction
//! Any access that finds a context past its own expiry evicts it before reporting
//! [`ContextError::Expired`](crate::error::ContextError::Expired). `exists` evicts too
//! and simply answers `false`.

pub mod mock;

pub use mock::*;

use crate::error::ContextError;
use crate::model::{CartId, CartItem, ContextId};
use async_trait::async_trait;

/// The operations the orchestrator needs from the external CRM.
///
/// Async because a real CRM sits behind the network; the mock answers immediately.
#[async_trait]
pub trait CustomerContext: Send + Sync + 'static {
    /// Registers a context under the caller-generated correlation key `context_id`,
    /// owned by `cart_id`, and returns that key.
    async fn create_context(
        &mut self,
        context_id: &ContextId,
        cart_id: &CartId,
    ) -> Result<ContextId, ContextError>;

    async fn add_item(&mut self, context_id: &ContextId, item: &CartItem)
        -> Result<(), ContextError>;

    /// Removes a mirrored item and hands it back.
    async fn remove_item(&mut self, context_id: &ContextId, item_id: &str)
        -> Result<CartItem, ContextError>;

    /// Sum of the mirrored items' line totals.
    async fn total(&mut self, context_id: &ContextId) -> Result<f64, ContextError>;

    /// `true` only when the context is present and not expired by its own clock.
    async fn exists(&mut self, context_id: &ContextId) -> bool;

    /// Removes the context. Removing an absent context is not an error.
    async fn delete_context(&mut self, context_id: &ContextId);
}

/// A mirror shared behind an async mutex, so the same store can be handed to the
/// orchestrator and still be inspected from outside it.
#[async_trait]
impl<C: CustomerContext> CustomerContext for std::sync::Arc<tokio::sync::Mutex<C>> {
    async fn create_context(
        &mut self,
        context_id: &ContextId,
        cart_id: &CartId,
    ) -> Result<ContextId, ContextError> {
        self.lock().await.create_context(context_id, cart_id).await
    }

    async fn add_item(&mut self, context_id: &ContextId, item: &CartItem)
        -> Result<(), ContextError> {
        self.lock().await.add_item(context_id, item).await
    }

    async fn remove_item(&mut self, context_id: &ContextId, item_id: &str)
        -> Result<CartItem, ContextError> {
        self.lock().await.remove_item(context_id, item_id).await
    }

    async fn total(&mut self, context_id: &ContextId) -> Result<f64, ContextError> {
        self.lock().await.total(context_id).await
    }

    async fn exists(&mut self, context_id: &ContextId) -> bool {
        self.lock().await.exists(context_id).await
    }

    async fn delete_context(&mut self, context_id: &ContextId) {
        self.lock().await.delete_context(context_id).await
    }
}
