//! In-memory customer-context store standing in for the remote CRM.

use super::CustomerContext;
use crate::clock::SharedClock;
use crate::config::ConfigError;
use crate::error::ContextError;
use crate::model::cart::ttl_delta;
use crate::model::{CartId, CartItem, ContextId};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// One mirrored context. Items are keyed by item id and carry no order.
#[derive(Debug, Clone)]
pub struct ContextRecord {
    pub cart_id: CartId,
    pub items: HashMap<String, CartItem>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A keyed map of [`ContextRecord`]s with its own TTL clock.
#[derive(Debug)]
pub struct MockContextStore {
    contexts: HashMap<ContextId, ContextRecord>,
    ttl: TimeDelta,
    clock: SharedClock,
}

impl MockContextStore {
    pub fn new(ttl: Duration, clock: SharedClock) -> Result<Self, ConfigError> {
        Ok(Self {
            contexts: HashMap::new(),
            ttl: ttl_delta(ttl)?,
            clock,
        })
    }

    /// Raw view of a record, without expiry checks.
    pub fn record(&self, context_id: &ContextId) -> Option<&ContextRecord> {
        self.contexts.get(context_id)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn clear(&mut self) {
        self.contexts.clear();
    }

    /// Looks up a context, evicting it if its own clock says it has expired.
    fn live_context(&mut self, context_id: &ContextId) -> Result<&mut ContextRecord, ContextError> {
        let now = self.clock.now();
        let expired = match self.contexts.get(context_id) {
            Some(record) => now > record.expires_at,
            None => return Err(ContextError::NotFound(context_id.clone())),
        };

        if expired {
            self.contexts.remove(context_id);
            debug!(%context_id, "Evicted expired context");
            return Err(ContextError::Expired(context_id.clone()));
        }

        self.contexts
            .get_mut(context_id)
            .ok_or_else(|| ContextError::NotFound(context_id.clone()))
    }
}

#[async_trait]
impl CustomerContext for MockContextStore {
    async fn create_context(
        &mut self,
        context_id: &ContextId,
        cart_id: &CartId,
    ) -> Result<ContextId, ContextError> {
        if self.exists(context_id).await {
            return Err(ContextError::AlreadyExists(context_id.clone()));
        }

        let created_at = self.clock.now();
        let expires_at = created_at
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.contexts.insert(
            context_id.clone(),
            ContextRecord {
                cart_id: cart_id.clone(),
                items: HashMap::new(),
                created_at,
                expires_at,
            },
        );
        debug!(%context_id, %cart_id, size = self.contexts.len(), "Context created");
        Ok(context_id.clone())
    }

    async fn add_item(
        &mut self,
        context_id: &ContextId,
        item: &CartItem,
    ) -> Result<(), ContextError> {
        let record = self.live_context(context_id)?;
        if record.items.contains_key(item.id()) {
            return Err(ContextError::DuplicateItem {
                context_id: context_id.clone(),
                item_id: item.id().to_string(),
            });
        }
        record.items.insert(item.id().to_string(), item.clone());
        Ok(())
    }

    async fn remove_item(
        &mut self,
        context_id: &ContextId,
        item_id: &str,
    ) -> Result<CartItem, ContextError> {
        let record = self.live_context(context_id)?;
        record
            .items
            .remove(item_id)
            .ok_or_else(|| ContextError::ItemNotFound {
                context_id: context_id.clone(),
                item_id: item_id.to_string(),
            })
    }

    async fn total(&mut self, context_id: &ContextId) -> Result<f64, ContextError> {
        let record = self.live_context(context_id)?;
        Ok(record.items.values().map(CartItem::line_total).sum())
    }

    async fn exists(&mut self, context_id: &ContextId) -> bool {
        self.live_context(context_id).is_ok()
    }

    async fn delete_context(&mut self, context_id: &ContextId) {
        if self.contexts.remove(context_id).is_some() {
            debug!(%context_id, size = self.contexts.len(), "Context deleted");
        }
    }
}
