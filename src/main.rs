//! Demo: walks one cart through its whole lifecycle against the in-memory mirror.

use telecom_cart::config::Config;
use telecom_cart::lifecycle::{setup_tracing, CartSystem};
use telecom_cart::model::{CartItem, ItemType};
use telecom_cart::view::{CartView, TotalView};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Config::from_env()?;
    info!(environment = %config.environment, ttl_ms = u64::try_from(config.cart_expiry.as_millis()).unwrap_or(u64::MAX), "Starting telecom cart demo");

    let system = CartSystem::new(&config)?;
    let client = system.cart_client.clone();

    let span = tracing::info_span!("cart_session");
    let outcome = async {
        let cart = client.create_cart().await?;
        let cart_id = cart.id().clone();
        info!(%cart_id, "Cart created");

        let items = [
            CartItem::new("phone-1", "iphone-15", "iPhone 15", ItemType::Phone, 999.99, 1)?,
            CartItem::new("plan-1", "unlimited", "Unlimited Plan", ItemType::Plan, 75.0, 1)?,
            CartItem::new("accessory-1", "case", "Phone Case", ItemType::Accessory, 29.99, 2)?,
        ];
        for item in items {
            client.add_item(cart_id.clone(), item).await?;
        }

        let total = client.get_total(cart_id.clone()).await?;
        let view = TotalView {
            cart_id: cart_id.clone(),
            total,
        };
        info!(body = %serde_json::to_string(&view)?, "Total with accessories");

        // Adding the same line twice is rejected.
        let duplicate = CartItem::new("plan-1", "unlimited", "Unlimited Plan", ItemType::Plan, 75.0, 1)?;
        if let Err(e) = client.add_item(cart_id.clone(), duplicate).await {
            info!(status = e.status_code(), error = %e, "Duplicate rejected");
        }

        let cart = client.remove_item(cart_id.clone(), "accessory-1").await?;
        info!(body = %serde_json::to_string(&CartView::from(&cart))?, "Cart after removal");

        Ok::<_, Box<dyn std::error::Error>>(())
    }
    .instrument(span)
    .await;

    if let Err(e) = &outcome {
        error!(error = %e, "Cart session failed");
    }

    drop(client);
    system.shutdown().await?;

    info!("Demo completed");
    outcome
}
