//! Cart lifecycle orchestration and the actor that serializes it.

pub mod actor;
pub mod service;

pub use actor::*;
pub use service::*;

use crate::clients::CartClient;
use crate::clock::SharedClock;
use crate::model::CartFactory;
use tokio::sync::mpsc;

/// Creates a new Cart actor and its client.
pub fn new(buffer_size: usize, factory: CartFactory, clock: SharedClock) -> (CartActor, CartClient) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let actor = CartActor::new(receiver, factory, clock);
    let client = CartClient::new(sender);

    (actor, client)
}
