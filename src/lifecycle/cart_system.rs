use crate::cart_actor;
use crate::clients::CartClient;
use crate::clock::{SharedClock, SystemClock};
use crate::config::{Config, ConfigError};
use crate::context::{CustomerContext, MockContextStore};
use crate::error::CartError;
use crate::model::CartFactory;
use std::sync::Arc;
use tracing::{error, info};

/// The running cart system: one actor task and the client that talks to it.
///
/// `CartSystem` is responsible for:
/// - **Wiring**: building the cart factory and the customer-context mirror from one TTL
/// - **Lifecycle**: spawning the actor and stopping it cleanly
///
/// # Example
///
/// ```ignore
/// let system = CartSystem::new(&Config::from_env()?)?;
///
/// let cart = system.cart_client.create_cart().await?;
/// system.cart_client.add_item(cart.id().clone(), item).await?;
///
/// system.shutdown().await?;
/// ```
pub struct CartSystem {
    /// Client for interacting with the Cart actor
    pub cart_client: CartClient,

    /// Task handle of the actor (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl CartSystem {
    /// Starts a system backed by the in-memory context mirror and the system clock.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let clock: SharedClock = Arc::new(SystemClock);
        let mirror = MockContextStore::new(config.cart_expiry, clock.clone())?;
        Self::with_context(config, clock, mirror)
    }

    /// Starts a system with an explicit clock and context mirror.
    pub fn with_context<C: CustomerContext>(
        config: &Config,
        clock: SharedClock,
        context: C,
    ) -> Result<Self, ConfigError> {
        let factory = CartFactory::new(config.cart_expiry, clock.clone())?;
        let (actor, cart_client) = cart_actor::new(config.mailbox_capacity, factory, clock);

        let handle = tokio::spawn(actor.run(context));
        info!(
            ttl_ms = u64::try_from(config.cart_expiry.as_millis()).unwrap_or(u64::MAX),
            environment = %config.environment,
            "Cart system started"
        );

        Ok(Self {
            cart_client,
            handle,
        })
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the client closes the mailbox; the actor drains what is queued,
    /// disarms every expiry timer and exits. Clones of the client held elsewhere keep
    /// the actor alive until they are dropped too.
    pub async fn shutdown(self) -> Result<(), CartError> {
        info!("Shutting down cart system...");
        drop(self.cart_client);

        if let Err(e) = self.handle.await {
            error!("Cart actor task failed: {:?}", e);
            return Err(CartError::ActorFailed(e.to_string()));
        }

        info!("Cart system shutdown complete.");
        Ok(())
    }
}
