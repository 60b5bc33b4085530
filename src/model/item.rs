use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of product a line item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Plan,
    Phone,
    Accessory,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Plan => "plan",
            ItemType::Phone => "phone",
            ItemType::Accessory => "accessory",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(ItemType::Plan),
            "phone" => Ok(ItemType::Phone),
            "accessory" => Ok(ItemType::Accessory),
            other => Err(ValidationError::InvalidType(other.to_string())),
        }
    }
}

/// A validated line item.
///
/// Fields are private: the only way to obtain a `CartItem` is [`CartItem::new`],
/// so an item that fails validation never exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    id: String,
    product_id: String,
    name: String,
    #[serde(rename = "type")]
    item_type: ItemType,
    price: f64,
    quantity: u32,
}

impl CartItem {
    /// Builds and validates a line item.
    ///
    /// # Errors
    /// - [`ValidationError::EmptyField`] for a blank `id`, `product_id` or `name`
    /// - [`ValidationError::InvalidPrice`] for a negative or non-finite price
    /// - [`ValidationError::InvalidQuantity`] for a zero quantity
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        name: impl Into<String>,
        item_type: ItemType,
        price: f64,
        quantity: u32,
    ) -> Result<Self, ValidationError> {
        let item = Self {
            id: id.into(),
            product_id: product_id.into(),
            name: name.into(),
            item_type,
            price,
            quantity,
        };
        item.validate()?;
        Ok(item)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyField("Item ID"));
        }
        if self.product_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("Product ID"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Item name"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::InvalidPrice(self.price));
        }
        if self.quantity == 0 {
            return Err(ValidationError::InvalidQuantity(0.0));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price × quantity`.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}
