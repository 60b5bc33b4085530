use super::{CartId, CartItem, ContextId};
use crate::clock::SharedClock;
use crate::config::ConfigError;
use crate::error::CartError;
use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// An immutable shopping cart.
///
/// `add_item` and `remove_item` leave `self` untouched and return a new `Cart`.
/// Item ids are unique within a cart and items keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    id: CartId,
    context_id: ContextId,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Cart {
    pub fn id(&self) -> &CartId {
        &self.id
    }

    pub fn context_id(&self) -> &ContextId {
        &self.context_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id() == item_id)
    }

    /// Returns a new cart with `item` appended.
    pub fn add_item(&self, item: CartItem) -> Result<Cart, CartError> {
        if self.contains(item.id()) {
            return Err(CartError::DuplicateItem(item.id().to_string()));
        }
        let mut items = self.items.clone();
        items.push(item);
        Ok(self.with_items(items))
    }

    /// Returns a new cart without the item `item_id`.
    pub fn remove_item(&self, item_id: &str) -> Result<Cart, CartError> {
        if !self.contains(item_id) {
            return Err(CartError::ItemNotFound(item_id.to_string()));
        }
        let items = self
            .items
            .iter()
            .filter(|i| i.id() != item_id)
            .cloned()
            .collect();
        Ok(self.with_items(items))
    }

    /// Sum of line totals, `0.0` for an empty cart.
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    fn with_items(&self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: self.id.clone(),
            context_id: self.context_id.clone(),
            items,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Converts a TTL into a calendar offset, rejecting zero and out-of-range values.
pub(crate) fn ttl_delta(ttl: Duration) -> Result<TimeDelta, ConfigError> {
    match TimeDelta::from_std(ttl) {
        Ok(delta) if delta > TimeDelta::zero() => Ok(delta),
        _ => Err(ConfigError::InvalidTtl(ttl)),
    }
}

/// Creates empty carts with fresh ids and `expires_at = now + ttl`.
#[derive(Debug, Clone)]
pub struct CartFactory {
    ttl: Duration,
    ttl_delta: TimeDelta,
    clock: SharedClock,
}

impl CartFactory {
    pub fn new(ttl: Duration, clock: SharedClock) -> Result<Self, ConfigError> {
        Ok(Self {
            ttl,
            ttl_delta: ttl_delta(ttl)?,
            clock,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn create_cart(&self) -> Cart {
        let created_at = self.clock.now();
        Cart {
            id: CartId::generate(),
            context_id: ContextId::generate(),
            items: Vec::new(),
            created_at,
            expires_at: created_at
                .checked_add_signed(self.ttl_delta)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }
}
