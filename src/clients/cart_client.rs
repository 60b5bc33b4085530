use crate::cart_actor::CartRequest;
use crate::error::CartError;
use crate::model::{Cart, CartId, CartItem, ContextId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the Cart actor.
///
/// Cheap to clone; every clone feeds the same mailbox. The actor stops once the last
/// clone is dropped.
#[derive(Clone, Debug)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, CartError>>) -> CartRequest,
    ) -> Result<T, CartError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| CartError::ActorClosed)?;
        response.await.map_err(|_| CartError::ActorDropped)?
    }

    #[instrument(skip(self))]
    pub async fn create_cart(&self) -> Result<Cart, CartError> {
        debug!("Sending request");
        self.request(|respond_to| CartRequest::Create { respond_to }).await
    }

    #[instrument(skip(self, item), fields(item_id = item.id()))]
    pub async fn add_item(&self, cart_id: CartId, item: CartItem) -> Result<Cart, CartError> {
        debug!(?item, "Sending request");
        self.request(|respond_to| CartRequest::AddItem {
            cart_id,
            item,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: impl Into<String> + std::fmt::Debug,
    ) -> Result<Cart, CartError> {
        debug!("Sending request");
        let item_id = item_id.into();
        self.request(|respond_to| CartRequest::RemoveItem {
            cart_id,
            item_id,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_cart(&self, cart_id: CartId) -> Result<Cart, CartError> {
        debug!("Sending request");
        self.request(|respond_to| CartRequest::Get {
            cart_id,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get_total(&self, cart_id: CartId) -> Result<f64, CartError> {
        debug!("Sending request");
        self.request(|respond_to| CartRequest::Total {
            cart_id,
            respond_to,
        })
        .await
    }

    /// Whether the customer-context mirror still holds a live context.
    pub async fn context_exists(&self, context_id: ContextId) -> Result<bool, CartError> {
        self.request(|respond_to| CartRequest::ContextExists {
            context_id,
            respond_to,
        })
        .await
    }

    /// Number of carts with an armed expiry timer.
    pub async fn armed_timers(&self) -> Result<usize, CartError> {
        self.request(|respond_to| CartRequest::ArmedTimers { respond_to })
            .await
    }
}
