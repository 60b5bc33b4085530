//! # Cart Actor
//!
//! The single writer in front of [`CartService`].
//!
//! ## Concurrency Model
//! The actor owns the service (and through it the cart store, the mirror and the
//! timer table) inside one Tokio task. It takes work from two places:
//!
//! - the request mailbox fed by [`CartClient`](crate::clients::CartClient)s, and
//! - the expiry channel fed by the scheduler's timer tasks.
//!
//! Both are drained by the same loop, one message at a time, so a timer firing can
//! never interleave with a half-finished `add_item`, and two callers mutating the same
//! cart are applied one after the other. No locks are needed around the stores.
//!
//! The loop ends when every client has been dropped. On the way out it disarms all
//! remaining timers.

use super::service::CartService;
use crate::clock::SharedClock;
use crate::context::CustomerContext;
use crate::error::CartError;
use crate::model::{Cart, CartFactory, CartId, CartItem, ContextId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, CartError>>;

/// Messages accepted by the [`CartActor`].
#[derive(Debug)]
pub enum CartRequest {
    Create {
        respond_to: Response<Cart>,
    },
    AddItem {
        cart_id: CartId,
        item: CartItem,
        respond_to: Response<Cart>,
    },
    RemoveItem {
        cart_id: CartId,
        item_id: String,
        respond_to: Response<Cart>,
    },
    Get {
        cart_id: CartId,
        respond_to: Response<Cart>,
    },
    Total {
        cart_id: CartId,
        respond_to: Response<f64>,
    },
    ContextExists {
        context_id: ContextId,
        respond_to: Response<bool>,
    },
    ArmedTimers {
        respond_to: Response<usize>,
    },
}

pub struct CartActor {
    receiver: mpsc::Receiver<CartRequest>,
    factory: CartFactory,
    clock: SharedClock,
}

impl CartActor {
    pub fn new(receiver: mpsc::Receiver<CartRequest>, factory: CartFactory, clock: SharedClock) -> Self {
        Self {
            receiver,
            factory,
            clock,
        }
    }

    /// Runs the event loop until the mailbox closes.
    ///
    /// The customer-context mirror is injected here rather than at construction, so the
    /// same actor can be wired to the in-memory mock or to anything else implementing
    /// [`CustomerContext`].
    pub async fn run<C: CustomerContext>(mut self, context: C) {
        let (mut service, mut notices) = CartService::new(self.factory, self.clock, context);
        info!("Cart actor started");

        loop {
            tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(request) => handle_request(&mut service, request).await,
                    None => break,
                },
                Some(notice) = notices.recv() => {
                    debug!(cart_id = %notice.cart_id, generation = notice.generation, "Expiry notice");
                    service.expire(&notice).await;
                }
            }
        }

        let disarmed = service.shutdown();
        info!(carts = service.cart_count(), disarmed, "Cart actor shutdown");
    }
}

async fn handle_request<C: CustomerContext>(service: &mut CartService<C>, request: CartRequest) {
    match request {
        CartRequest::Create { respond_to } => {
            let result = service.create().await;
            log_outcome("Create", None, &result);
            let _ = respond_to.send(result);
        }
        CartRequest::AddItem {
            cart_id,
            item,
            respond_to,
        } => {
            debug!(%cart_id, ?item, "AddItem");
            let result = service.add_item(&cart_id, item).await;
            log_outcome("AddItem", Some(&cart_id), &result);
            let _ = respond_to.send(result);
        }
        CartRequest::RemoveItem {
            cart_id,
            item_id,
            respond_to,
        } => {
            debug!(%cart_id, item_id, "RemoveItem");
            let result = service.remove_item(&cart_id, &item_id).await;
            log_outcome("RemoveItem", Some(&cart_id), &result);
            let _ = respond_to.send(result);
        }
        CartRequest::Get {
            cart_id,
            respond_to,
        } => {
            let result = service.get_cart(&cart_id).await;
            debug!(%cart_id, found = result.is_ok(), "Get");
            let _ = respond_to.send(result);
        }
        CartRequest::Total {
            cart_id,
            respond_to,
        } => {
            let result = service.get_total(&cart_id).await;
            log_outcome("Total", Some(&cart_id), &result);
            let _ = respond_to.send(result);
        }
        CartRequest::ContextExists {
            context_id,
            respond_to,
        } => {
            let exists = service.context_exists(&context_id).await;
            let _ = respond_to.send(Ok(exists));
        }
        CartRequest::ArmedTimers { respond_to } => {
            let _ = respond_to.send(Ok(service.armed_timers()));
        }
    }
}

fn log_outcome<T>(op: &'static str, cart_id: Option<&CartId>, result: &Result<T, CartError>) {
    if let Err(e) = result {
        match cart_id {
            Some(cart_id) => warn!(op, %cart_id, error = %e, "Request failed"),
            None => warn!(op, error = %e, "Request failed"),
        }
    }
}
