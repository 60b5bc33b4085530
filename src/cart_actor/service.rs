//! The cart orchestrator.
//!
//! [`CartService`] is the only code that reads from one store and writes to another.
//! Each operation runs its steps in a fixed order and stops at the first failure:
//!
//! | Operation     | Steps                                                                  |
//! |---------------|------------------------------------------------------------------------|
//! | `create`      | build cart → create mirror context → persist cart → arm expiry         |
//! | `add_item`    | resolve cart → mirror add → `Cart::add_item` → persist                 |
//! | `remove_item` | resolve cart → mirror remove → `Cart::remove_item` → persist           |
//! | `get_cart`    | resolve cart                                                           |
//! | `get_total`   | resolve cart → mirror total → compare with local total (warn only)     |
//!
//! "Resolve" fetches the cart and, if the clock says it has expired, tears it down
//! eagerly (cart store, mirror context, timer) before failing with
//! [`CartError::Expired`]. A cart can pass its `expires_at` a moment before its timer
//! fires, so no read path trusts the timer alone.

use crate::clock::SharedClock;
use crate::context::CustomerContext;
use crate::error::CartError;
use crate::expiry::{ExpiryNotice, ExpiryScheduler};
use crate::model::{Cart, CartFactory, CartId, CartItem, ContextId};
use crate::store::CartStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Local and mirrored totals closer than this are considered equal.
pub const TOTAL_EPSILON: f64 = 0.01;

pub struct CartService<C: CustomerContext> {
    store: CartStore,
    context: C,
    scheduler: ExpiryScheduler,
    factory: CartFactory,
    clock: SharedClock,
}

impl<C: CustomerContext> CartService<C> {
    /// Builds the service together with the channel its expiry timers post to.
    /// Whoever owns the service must feed those notices back into [`CartService::expire`].
    pub fn new(
        factory: CartFactory,
        clock: SharedClock,
        context: C,
    ) -> (Self, mpsc::UnboundedReceiver<ExpiryNotice>) {
        let (scheduler, notices) = ExpiryScheduler::new();
        let service = Self {
            store: CartStore::new(),
            context,
            scheduler,
            factory,
            clock,
        };
        (service, notices)
    }

    pub async fn create(&mut self) -> Result<Cart, CartError> {
        let cart = self.factory.create_cart();

        self.context
            .create_context(cart.context_id(), cart.id())
            .await?;

        self.store.put(cart.clone());
        self.scheduler
            .schedule(cart.id().clone(), cart.context_id().clone(), self.factory.ttl());

        info!(cart_id = %cart.id(), context_id = %cart.context_id(), size = self.store.len(), "Cart created");
        Ok(cart)
    }

    pub async fn add_item(&mut self, cart_id: &CartId, item: CartItem) -> Result<Cart, CartError> {
        let cart = self.resolve(cart_id).await?;

        self.context.add_item(cart.context_id(), &item).await?;

        let updated = match cart.add_item(item) {
            Ok(updated) => updated,
            Err(e) => {
                // The mirror accepted an item the local cart rejects; undo the mirror write.
                if let CartError::DuplicateItem(item_id) = &e {
                    self.compensate_remove(cart.context_id(), item_id).await;
                }
                return Err(e);
            }
        };

        self.store.put(updated.clone());
        info!(%cart_id, items = updated.items().len(), "Item added");
        Ok(updated)
    }

    pub async fn remove_item(&mut self, cart_id: &CartId, item_id: &str) -> Result<Cart, CartError> {
        let cart = self.resolve(cart_id).await?;

        let mirrored = self.context.remove_item(cart.context_id(), item_id).await?;

        let updated = match cart.remove_item(item_id) {
            Ok(updated) => updated,
            Err(e) => {
                // The mirror held an item the local cart does not; put it back.
                self.compensate_add(cart.context_id(), &mirrored).await;
                return Err(e);
            }
        };

        self.store.put(updated.clone());
        info!(%cart_id, items = updated.items().len(), "Item removed");
        Ok(updated)
    }

    pub async fn get_cart(&mut self, cart_id: &CartId) -> Result<Cart, CartError> {
        self.resolve(cart_id).await
    }

    /// Returns the locally computed total. A disagreement with the mirror is logged,
    /// never corrected.
    pub async fn get_total(&mut self, cart_id: &CartId) -> Result<f64, CartError> {
        let cart = self.resolve(cart_id).await?;
        let local = cart.total();
        let mirrored = self.context.total(cart.context_id()).await?;

        if (local - mirrored).abs() > TOTAL_EPSILON {
            warn!(%cart_id, local, mirrored, "Total mismatch between cart and context");
        }
        Ok(local)
    }

    /// Whether the mirror still holds a live context.
    pub async fn context_exists(&mut self, context_id: &ContextId) -> bool {
        self.context.exists(context_id).await
    }

    /// Runs the teardown for a fired timer. Stale notices are ignored.
    pub async fn expire(&mut self, notice: &ExpiryNotice) -> bool {
        self.scheduler
            .fire(notice, &mut self.store, &mut self.context)
            .await
    }

    pub fn armed_timers(&self) -> usize {
        self.scheduler.armed_count()
    }

    pub fn cart_count(&self) -> usize {
        self.store.len()
    }

    /// Disarms every timer. Carts and contexts are left as they are.
    pub fn shutdown(&mut self) -> usize {
        self.scheduler.cancel_all()
    }

    async fn resolve(&mut self, cart_id: &CartId) -> Result<Cart, CartError> {
        let cart = self
            .store
            .get(cart_id)
            .cloned()
            .ok_or_else(|| CartError::NotFound(cart_id.clone()))?;

        if cart.is_expired(self.clock.now()) {
            self.store.delete(cart_id);
            self.context.delete_context(cart.context_id()).await;
            self.scheduler.cancel(cart_id);
            info!(%cart_id, "Expired cart reaped on access");
            return Err(CartError::Expired(cart_id.clone()));
        }

        Ok(cart)
    }

    async fn compensate_remove(&mut self, context_id: &ContextId, item_id: &str) {
        match self.context.remove_item(context_id, item_id).await {
            Ok(_) => debug!(%context_id, item_id, "Rolled back mirrored add"),
            Err(e) => warn!(%context_id, item_id, error = %e, "Rollback of mirrored add failed"),
        }
    }

    async fn compensate_add(&mut self, context_id: &ContextId, item: &CartItem) {
        match self.context.add_item(context_id, item).await {
            Ok(()) => debug!(%context_id, item_id = item.id(), "Rolled back mirrored remove"),
            Err(e) => warn!(%context_id, item_id = item.id(), error = %e, "Rollback of mirrored remove failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::context::MockContextStore;
    use crate::error::ContextError;
    use crate::model::ItemType;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const TTL: Duration = Duration::from_secs(300);

    type SharedMirror = Arc<Mutex<MockContextStore>>;

    struct Harness {
        service: CartService<SharedMirror>,
        mirror: SharedMirror,
        clock: Arc<ManualClock>,
        notices: mpsc::UnboundedReceiver<ExpiryNotice>,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::starting_now());
        let factory = CartFactory::new(TTL, clock.clone()).unwrap();
        let mirror = Arc::new(Mutex::new(MockContextStore::new(TTL, clock.clone()).unwrap()));
        let (service, notices) = CartService::new(factory, clock.clone(), mirror.clone());
        Harness {
            service,
            mirror,
            clock,
            notices,
        }
    }

    fn item(id: &str, price: f64, quantity: u32) -> CartItem {
        CartItem::new(id, format!("prod-{id}"), "Item", ItemType::Accessory, price, quantity)
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_wires_all_three_stores() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();

        assert_eq!(h.service.cart_count(), 1);
        assert_eq!(h.service.armed_timers(), 1);
        assert!(h.service.context_exists(cart.context_id()).await);
        assert_eq!(
            h.mirror.lock().await.record(cart.context_id()).unwrap().cart_id,
            *cart.id()
        );
    }

    #[tokio::test]
    async fn test_mirror_total_tracks_cart_total() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();

        h.service.add_item(cart.id(), item("a", 10.0, 2)).await.unwrap();
        h.service.add_item(cart.id(), item("b", 15.0, 3)).await.unwrap();
        h.service.add_item(cart.id(), item("c", 4.5, 1)).await.unwrap();
        let cart = h.service.remove_item(cart.id(), "c").await.unwrap();

        let mirrored = h.mirror.lock().await.total(cart.context_id()).await.unwrap();
        assert!((mirrored - cart.total()).abs() < TOTAL_EPSILON);
        assert!((h.service.get_total(cart.id()).await.unwrap() - 65.0).abs() < TOTAL_EPSILON);
    }

    #[tokio::test]
    async fn test_duplicate_add_leaves_state_unchanged() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();
        h.service.add_item(cart.id(), item("a", 10.0, 1)).await.unwrap();

        let err = h.service.add_item(cart.id(), item("a", 10.0, 1)).await.unwrap_err();
        assert!(matches!(err, CartError::Context(ContextError::DuplicateItem { .. })));
        assert_eq!(err.status_code(), 400);

        let stored = h.service.get_cart(cart.id()).await.unwrap();
        assert_eq!(stored.items().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_item() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();
        let err = h.service.remove_item(cart.id(), "ghost").await.unwrap_err();
        assert!(matches!(err, CartError::Context(ContextError::ItemNotFound { .. })));
    }

    #[tokio::test]
    async fn test_unknown_cart_is_not_found_everywhere() {
        let mut h = harness();
        let id = CartId::new("never-created");
        let expected = CartError::NotFound(id.clone());

        assert_eq!(h.service.get_cart(&id).await.unwrap_err(), expected);
        assert_eq!(h.service.get_total(&id).await.unwrap_err(), expected);
        assert_eq!(h.service.add_item(&id, item("a", 1.0, 1)).await.unwrap_err(), expected);
        assert_eq!(h.service.remove_item(&id, "a").await.unwrap_err(), expected);
    }

    #[tokio::test]
    async fn test_lazy_expiry_reaps_everything() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();

        h.clock.advance(TTL + Duration::from_millis(1));

        let err = h.service.get_cart(cart.id()).await.unwrap_err();
        assert_eq!(err, CartError::Expired(cart.id().clone()));
        assert_eq!(h.service.cart_count(), 0);
        assert_eq!(h.service.armed_timers(), 0);
        assert!(h.mirror.lock().await.record(cart.context_id()).is_none());

        // Already reaped: from now on the cart simply does not exist.
        assert_eq!(
            h.service.get_total(cart.id()).await.unwrap_err(),
            CartError::NotFound(cart.id().clone())
        );
    }

    #[tokio::test]
    async fn test_every_read_path_rechecks_expiry() {
        for op in 0..4 {
            let mut h = harness();
            let cart = h.service.create().await.unwrap();
            h.clock.advance(TTL * 2);

            let err = match op {
                0 => h.service.get_cart(cart.id()).await.unwrap_err(),
                1 => h.service.get_total(cart.id()).await.unwrap_err(),
                2 => h.service.add_item(cart.id(), item("a", 1.0, 1)).await.unwrap_err(),
                _ => h.service.remove_item(cart.id(), "a").await.unwrap_err(),
            };
            assert_eq!(err, CartError::Expired(cart.id().clone()), "operation {op}");
        }
    }

    #[tokio::test]
    async fn test_local_failure_after_mirror_add_is_rolled_back() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();
        h.service.add_item(cart.id(), item("a", 10.0, 1)).await.unwrap();

        // Make the mirror forget the item behind the orchestrator's back.
        h.mirror.lock().await.remove_item(cart.context_id(), "a").await.unwrap();

        let err = h.service.add_item(cart.id(), item("a", 10.0, 1)).await.unwrap_err();
        assert_eq!(err, CartError::DuplicateItem("a".into()));

        let mirror = h.mirror.lock().await;
        let record = mirror.record(cart.context_id()).unwrap();
        assert!(!record.items.contains_key("a"), "mirror restored to its prior state");
    }

    #[tokio::test]
    async fn test_local_failure_after_mirror_remove_is_rolled_back() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();
        h.mirror
            .lock()
            .await
            .add_item(cart.context_id(), &item("z", 5.0, 1))
            .await
            .unwrap();

        let err = h.service.remove_item(cart.id(), "z").await.unwrap_err();
        assert_eq!(err, CartError::ItemNotFound("z".into()));

        let mirror = h.mirror.lock().await;
        assert!(mirror.record(cart.context_id()).unwrap().items.contains_key("z"));
    }

    #[tokio::test]
    async fn test_total_mismatch_returns_local_total() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();
        h.service.add_item(cart.id(), item("a", 10.0, 1)).await.unwrap();
        h.mirror
            .lock()
            .await
            .add_item(cart.context_id(), &item("extra", 100.0, 1))
            .await
            .unwrap();

        let total = h.service.get_total(cart.id()).await.unwrap();
        assert!((total - 10.0).abs() < TOTAL_EPSILON);
    }

    #[tokio::test]
    async fn test_mirror_expiring_first_aborts_before_local_write() {
        let clock = Arc::new(ManualClock::starting_now());
        // The mirror's clock runs ahead of the cart's.
        let mirror_clock = Arc::new(ManualClock::new(clock.now()));
        let factory = CartFactory::new(TTL, clock.clone()).unwrap();
        let mirror = MockContextStore::new(TTL, mirror_clock.clone()).unwrap();
        let (mut service, _notices) = CartService::new(factory, clock.clone(), mirror);

        let cart = service.create().await.unwrap();
        mirror_clock.advance(TTL + Duration::from_secs(1));

        let err = service.add_item(cart.id(), item("a", 1.0, 1)).await.unwrap_err();
        assert_eq!(err, CartError::Context(ContextError::Expired(cart.context_id().clone())));

        let stored = service.get_cart(cart.id()).await.unwrap();
        assert!(stored.items().is_empty());
        assert!(!service.context_exists(cart.context_id()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_timer_tears_down() {
        let mut h = harness();
        let cart = h.service.create().await.unwrap();

        let notice = h.notices.recv().await.unwrap();
        assert!(h.service.expire(&notice).await);

        assert_eq!(
            h.service.get_cart(cart.id()).await.unwrap_err(),
            CartError::NotFound(cart.id().clone())
        );
        assert!(!h.service.context_exists(cart.context_id()).await);
        assert_eq!(h.service.armed_timers(), 0);
    }

    /// A mirror that refuses every new context.
    struct RefusingContext;

    #[async_trait::async_trait]
    impl CustomerContext for RefusingContext {
        async fn create_context(
            &mut self,
            context_id: &ContextId,
            _cart_id: &CartId,
        ) -> Result<ContextId, ContextError> {
            Err(ContextError::AlreadyExists(context_id.clone()))
        }

        async fn add_item(&mut self, context_id: &ContextId, _item: &CartItem)
            -> Result<(), ContextError> {
            Err(ContextError::NotFound(context_id.clone()))
        }

        async fn remove_item(&mut self, context_id: &ContextId, _item_id: &str)
            -> Result<CartItem, ContextError> {
            Err(ContextError::NotFound(context_id.clone()))
        }

        async fn total(&mut self, context_id: &ContextId) -> Result<f64, ContextError> {
            Err(ContextError::NotFound(context_id.clone()))
        }

        async fn exists(&mut self, _context_id: &ContextId) -> bool {
            false
        }

        async fn delete_context(&mut self, _context_id: &ContextId) {}
    }

    #[tokio::test]
    async fn test_failed_context_creation_persists_nothing() {
        let clock = Arc::new(ManualClock::starting_now());
        let factory = CartFactory::new(TTL, clock.clone()).unwrap();
        let (mut service, _notices) = CartService::new(factory, clock, RefusingContext);

        let err = service.create().await.unwrap_err();
        assert!(matches!(err, CartError::Context(ContextError::AlreadyExists(_))));
        assert_eq!(service.cart_count(), 0);
        assert_eq!(service.armed_timers(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_disarms_timers() {
        let mut h = harness();
        h.service.create().await.unwrap();
        h.service.create().await.unwrap();
        assert_eq!(h.service.shutdown(), 2);
        assert_eq!(h.service.armed_timers(), 0);
        assert_eq!(h.service.cart_count(), 2);
    }
}
