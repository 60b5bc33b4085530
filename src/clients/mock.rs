//! # Mock Mailbox
//!
//! Utilities for testing code that holds a [`CartClient`] without spawning the actor.
//!
//! [`create_mock_client`] returns a client plus the receiving end of its mailbox. The
//! `expect_*` helpers pull the next request off that mailbox and hand back its payload
//! and responder, so a test decides exactly what the "actor" answers.

use super::CartClient;
use crate::cart_actor::{CartRequest, Response};
use crate::model::{Cart, CartId, CartItem};
use tokio::sync::mpsc;

/// Creates a client whose requests land on the returned receiver.
pub fn create_mock_client(buffer_size: usize) -> (CartClient, mpsc::Receiver<CartRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (CartClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create(receiver: &mut mpsc::Receiver<CartRequest>) -> Option<Response<Cart>> {
    match receiver.recv().await {
        Some(CartRequest::Create { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an AddItem request
pub async fn expect_add_item(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(CartId, CartItem, Response<Cart>)> {
    match receiver.recv().await {
        Some(CartRequest::AddItem {
            cart_id,
            item,
            respond_to,
        }) => Some((cart_id, item, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Total request
pub async fn expect_total(
    receiver: &mut mpsc::Receiver<CartRequest>,
) -> Option<(CartId, Response<f64>)> {
    match receiver.recv().await {
        Some(CartRequest::Total {
            cart_id,
            respond_to,
        }) => Some((cart_id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CartError;
    use crate::model::ItemType;

    #[tokio::test]
    async fn test_mock_client_add_item() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move {
            let item = CartItem::new("plan-1", "p-75", "Unlimited", ItemType::Plan, 75.0, 1)
                .unwrap();
            client.add_item(CartId::new("cart-1"), item).await
        });

        let (cart_id, item, responder) = expect_add_item(&mut receiver)
            .await
            .expect("Expected AddItem request");
        assert_eq!(cart_id, CartId::new("cart-1"));
        assert_eq!(item.id(), "plan-1");
        responder.send(Err(CartError::Expired(cart_id))).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(CartError::Expired(CartId::new("cart-1"))));
    }

    #[tokio::test]
    async fn test_dropped_responder_surfaces_as_actor_dropped() {
        let (client, mut receiver) = create_mock_client(10);

        let task = tokio::spawn(async move { client.get_total(CartId::new("cart-1")).await });

        let (_, responder) = expect_total(&mut receiver).await.expect("Expected Total request");
        drop(responder);

        assert_eq!(task.await.unwrap(), Err(CartError::ActorDropped));
    }

    #[tokio::test]
    async fn test_closed_mailbox_surfaces_as_actor_closed() {
        let (client, receiver) = create_mock_client(10);
        drop(receiver);

        assert_eq!(client.create_cart().await.unwrap_err(), CartError::ActorClosed);
    }

    #[tokio::test]
    async fn test_expect_create() {
        let (client, mut receiver) = create_mock_client(10);
        let task = tokio::spawn(async move { client.create_cart().await });

        let responder = expect_create(&mut receiver).await.expect("Expected Create request");
        drop(responder);
        assert_eq!(task.await.unwrap().unwrap_err(), CartError::ActorDropped);
    }
}
