//! JSON shapes exchanged with the transport layer.
//!
//! No server lives in this crate; these types pin down the wire format so that one
//! can be put in front of [`CartClient`](crate::clients::CartClient) without
//! reinventing it.

use crate::error::{CartError, ErrorKind, ValidationError};
use crate::model::{Cart, CartId, CartItem, ContextId, ItemType};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Body of `POST /cart/:id/item`. Every field is optional on the wire so that a
/// missing field can be reported as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub id: Option<String>,
    pub product_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<f64>,
}

const ADD_ITEM_FIELDS: &str = "id, productId, name, type, price, quantity";

impl AddItemRequest {
    pub fn into_item(self) -> Result<CartItem, ValidationError> {
        let missing = || ValidationError::MissingFields(ADD_ITEM_FIELDS);

        let id = non_empty(self.id).ok_or_else(missing)?;
        let product_id = non_empty(self.product_id).ok_or_else(missing)?;
        let name = non_empty(self.name).ok_or_else(missing)?;
        let item_type = non_empty(self.item_type).ok_or_else(missing)?;
        let price = self.price.ok_or_else(missing)?;
        let quantity = self.quantity.ok_or_else(missing)?;

        let item_type = item_type.parse::<ItemType>()?;
        CartItem::new(id, product_id, name, item_type, price, whole_quantity(quantity)?)
    }
}

/// Body of `DELETE /cart/:id/item`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub item_id: Option<String>,
}

impl RemoveItemRequest {
    pub fn item_id(self) -> Result<String, ValidationError> {
        non_empty(self.item_id).ok_or(ValidationError::MissingFields("itemId"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn whole_quantity(quantity: f64) -> Result<u32, ValidationError> {
    if quantity.fract() == 0.0 && quantity >= 1.0 && quantity <= f64::from(u32::MAX) {
        Ok(quantity as u32)
    } else {
        Err(ValidationError::InvalidQuantity(quantity))
    }
}

/// Cart JSON: `{id, contextId, items, total, createdAt, expiresAt}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub id: CartId,
    pub context_id: ContextId,
    pub items: Vec<CartItem>,
    pub total: f64,
    pub created_at: String,
    pub expires_at: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id().clone(),
            context_id: cart.context_id().clone(),
            items: cart.items().to_vec(),
            total: cart.total(),
            created_at: iso8601(cart.created_at()),
            expires_at: iso8601(cart.expires_at()),
        }
    }
}

fn iso8601(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalView {
    pub cart_id: CartId,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthView {
    pub status: &'static str,
}

impl HealthView {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// Error body. Internal failures get a generic `error` with the underlying
/// `message` attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&CartError> for ErrorBody {
    fn from(err: &CartError) -> Self {
        match err.kind() {
            ErrorKind::Internal => Self {
                error: "Internal server error".to_string(),
                message: Some(err.to_string()),
            },
            _ => Self {
                error: err.to_string(),
                message: None,
            },
        }
    }
}
