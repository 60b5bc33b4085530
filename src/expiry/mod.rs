//! # Expiry Scheduler
//!
//! One timer per cart. A timer is a spawned Tokio task that sleeps for the TTL and then
//! posts an [`ExpiryNotice`] on the scheduler's channel. It never touches the stores
//! itself: the cart actor receives the notice on its own loop and calls
//! [`ExpiryScheduler::fire`], so teardown is serialized with every other operation.
//!
//! ## States per cart id
//!
//! ```text
//! unarmed --schedule--> armed --notice + fire--> unarmed
//!                         |
//!                         +-------cancel-------> unarmed
//! ```
//!
//! Re-scheduling an armed cart cancels the old timer first. Every arming gets a fresh
//! generation number, and a notice whose generation no longer matches the armed entry
//! is stale and ignored by `fire`.

use crate::context::CustomerContext;
use crate::model::{CartId, ContextId};
use crate::store::CartStore;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Sent by a timer task when its delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiryNotice {
    pub cart_id: CartId,
    pub generation: u64,
}

#[derive(Debug)]
struct ArmedTimer {
    context_id: ContextId,
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct ExpiryScheduler {
    timers: HashMap<CartId, ArmedTimer>,
    notify: mpsc::UnboundedSender<ExpiryNotice>,
    next_generation: u64,
}

impl ExpiryScheduler {
    /// Creates a scheduler and the receiving end its timers post to.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ExpiryNotice>) {
        let (notify, notices) = mpsc::unbounded_channel();
        let scheduler = Self {
            timers: HashMap::new(),
            notify,
            next_generation: 1,
        };
        (scheduler, notices)
    }

    /// Arms a timer that fires after `ttl`. Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, cart_id: CartId, context_id: ContextId, ttl: Duration) {
        self.cancel(&cart_id);

        let generation = self.next_generation;
        self.next_generation += 1;

        let notice = ExpiryNotice {
            cart_id: cart_id.clone(),
            generation,
        };
        let notify = self.notify.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // The receiver is gone once the actor has shut down.
            let _ = notify.send(notice);
        });

        debug!(%cart_id, generation, ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX), "Expiry armed");
        self.timers.insert(
            cart_id,
            ArmedTimer {
                context_id,
                generation,
                handle,
            },
        );
    }

    /// Disarms the timer for `cart_id` without running teardown.
    /// Returns whether a timer was armed.
    pub fn cancel(&mut self, cart_id: &CartId) -> bool {
        match self.timers.remove(cart_id) {
            Some(timer) => {
                timer.handle.abort();
                debug!(%cart_id, generation = timer.generation, "Expiry cancelled");
                true
            }
            None => false,
        }
    }

    /// Disarms every timer without running teardown. Returns how many were armed.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        for (_, timer) in self.timers.drain() {
            timer.handle.abort();
        }
        if count > 0 {
            debug!(count, "All expiry timers cancelled");
        }
        count
    }

    pub fn is_armed(&self, cart_id: &CartId) -> bool {
        self.timers.contains_key(cart_id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }

    /// Tears down the cart named by `notice`: cart store first, then the mirror
    /// context, then the scheduler's own entry.
    ///
    /// Returns `false` (and does nothing) for a stale notice.
    pub async fn fire<C: CustomerContext>(
        &mut self,
        notice: &ExpiryNotice,
        store: &mut CartStore,
        context: &mut C,
    ) -> bool {
        let context_id = match self.timers.get(&notice.cart_id) {
            Some(timer) if timer.generation == notice.generation => timer.context_id.clone(),
            _ => {
                debug!(cart_id = %notice.cart_id, generation = notice.generation, "Stale expiry notice");
                return false;
            }
        };

        store.delete(&notice.cart_id);
        context.delete_context(&context_id).await;
        self.timers.remove(&notice.cart_id);

        info!(cart_id = %notice.cart_id, %context_id, "Cart expired");
        true
    }
}

impl Drop for ExpiryScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::context::MockContextStore;
    use crate::model::CartFactory;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_secs(300);

    async fn armed_cart(
        scheduler: &mut ExpiryScheduler,
        store: &mut CartStore,
        context: &mut MockContextStore,
    ) -> (CartId, ContextId) {
        let cart = CartFactory::new(TTL, Arc::new(SystemClock)).unwrap().create_cart();
        context
            .create_context(cart.context_id(), cart.id())
            .await
            .unwrap();
        let ids = (cart.id().clone(), cart.context_id().clone());
        store.put(cart);
        scheduler.schedule(ids.0.clone(), ids.1.clone(), TTL);
        ids
    }

    fn mirror() -> MockContextStore {
        MockContextStore::new(TTL, Arc::new(SystemClock)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_and_tears_down_both_stores() {
        let (mut scheduler, mut notices) = ExpiryScheduler::new();
        let mut store = CartStore::new();
        let mut context = mirror();
        let (cart_id, context_id) = armed_cart(&mut scheduler, &mut store, &mut context).await;

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.cart_id, cart_id);

        assert!(scheduler.fire(&notice, &mut store, &mut context).await);
        assert!(!store.exists(&cart_id));
        assert!(!context.exists(&context_id).await);
        assert!(!scheduler.is_armed(&cart_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_timer() {
        let (mut scheduler, mut notices) = ExpiryScheduler::new();
        let mut store = CartStore::new();
        let mut context = mirror();
        let (cart_id, context_id) = armed_cart(&mut scheduler, &mut store, &mut context).await;

        scheduler.schedule(cart_id.clone(), context_id, TTL);
        assert_eq!(scheduler.armed_count(), 1);

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.generation, 2, "first timer was aborted");
        assert!(scheduler.fire(&notice, &mut store, &mut context).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms_without_teardown() {
        let (mut scheduler, mut notices) = ExpiryScheduler::new();
        let mut store = CartStore::new();
        let mut context = mirror();
        let (cart_id, context_id) = armed_cart(&mut scheduler, &mut store, &mut context).await;

        assert!(scheduler.cancel(&cart_id));
        assert!(!scheduler.cancel(&cart_id));

        tokio::time::sleep(TTL * 2).await;
        assert!(notices.try_recv().is_err());
        assert!(store.exists(&cart_id));
        assert!(context.exists(&context_id).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_notice_ignored() {
        let (mut scheduler, _notices) = ExpiryScheduler::new();
        let mut store = CartStore::new();
        let mut context = mirror();
        let (cart_id, _) = armed_cart(&mut scheduler, &mut store, &mut context).await;

        let stale = ExpiryNotice {
            cart_id: cart_id.clone(),
            generation: 99,
        };
        assert!(!scheduler.fire(&stale, &mut store, &mut context).await);
        assert!(store.exists(&cart_id));
        assert!(scheduler.is_armed(&cart_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let (mut scheduler, mut notices) = ExpiryScheduler::new();
        let mut store = CartStore::new();
        let mut context = mirror();
        armed_cart(&mut scheduler, &mut store, &mut context).await;
        armed_cart(&mut scheduler, &mut store, &mut context).await;

        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.armed_count(), 0);

        tokio::time::sleep(TTL * 2).await;
        assert!(notices.try_recv().is_err());
        assert_eq!(store.len(), 2);
    }
}
