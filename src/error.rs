//! # Error Taxonomy
//!
//! Every failure the cart system can produce is a variant of one of the enums below.
//! Callers branch on the variant (or on [`CartError::kind`]) instead of inspecting
//! message text.
//!
//! - [`ValidationError`]: a [`CartItem`](crate::model::CartItem) could not be built.
//! - [`ContextError`]: the external customer-context mirror refused an operation.
//! - [`CartError`]: everything the orchestrator returns. Lower-layer errors are wrapped
//!   unchanged through `#[from]`.

use crate::model::{CartId, ContextId};
use thiserror::Error;

/// A malformed cart item.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: {0}")]
    MissingFields(&'static str),

    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Invalid item type: {0}")]
    InvalidType(String),

    #[error("Price must be a non-negative number, got {0}")]
    InvalidPrice(f64),

    #[error("Quantity must be a positive integer, got {0}")]
    InvalidQuantity(f64),
}

/// Errors raised by the external customer-context mirror.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ContextError {
    #[error("Context '{0}' not found")]
    NotFound(ContextId),

    /// The context's own clock says it is past its expiry. The entry has already
    /// been evicted by the time this is returned.
    #[error("Context '{0}' has expired")]
    Expired(ContextId),

    #[error("Context '{0}' already exists")]
    AlreadyExists(ContextId),

    #[error("Item with ID '{item_id}' already exists in context '{context_id}'")]
    DuplicateItem { context_id: ContextId, item_id: String },

    #[error("Item with ID '{item_id}' not found in context '{context_id}'")]
    ItemNotFound { context_id: ContextId, item_id: String },
}

/// Errors returned by the cart orchestrator and its client.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error("Cart with ID '{0}' not found")]
    NotFound(CartId),

    #[error("Cart with ID '{0}' has expired")]
    Expired(CartId),

    #[error("Item with ID '{0}' already exists in cart")]
    DuplicateItem(String),

    #[error("Item with ID '{0}' not found in cart")]
    ItemNotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("Cart actor closed")]
    ActorClosed,

    #[error("Cart actor dropped response channel")]
    ActorDropped,

    #[error("Cart actor failed: {0}")]
    ActorFailed(String),
}

/// Coarse classification of a [`CartError`], one per transport outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CartNotFound,
    CartExpired,
    InvalidItemOperation,
    Context,
    Validation,
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer answers with for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::CartNotFound => 404,
            ErrorKind::CartExpired => 410,
            ErrorKind::InvalidItemOperation | ErrorKind::Context | ErrorKind::Validation => 400,
            ErrorKind::Internal => 500,
        }
    }
}

impl CartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CartError::NotFound(_) => ErrorKind::CartNotFound,
            CartError::Expired(_) => ErrorKind::CartExpired,
            CartError::DuplicateItem(_) | CartError::ItemNotFound(_) => {
                ErrorKind::InvalidItemOperation
            }
            CartError::Validation(_) => ErrorKind::Validation,
            CartError::Context(_) => ErrorKind::Context,
            CartError::ActorClosed | CartError::ActorDropped | CartError::ActorFailed(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
