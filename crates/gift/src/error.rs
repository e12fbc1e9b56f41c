//! Gift error types.

use catalog_store::{MemberId, OptionId, StoreError};
use thiserror::Error;

/// Errors that can occur while sending a gift.
#[derive(Debug, Error)]
pub enum GiftError {
    /// The requested quantity is zero, negative or too large.
    #[error("Invalid quantity: {quantity} (must be between 1 and {max})", max = i32::MAX)]
    InvalidQuantity { quantity: i64 },

    /// Option not found.
    #[error("Option not found: {0}")]
    OptionNotFound(OptionId),

    /// Sender or receiver not found.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// The option holds fewer units than requested.
    #[error(
        "Insufficient stock for option {option_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        option_id: OptionId,
        requested: u32,
        available: u32,
    },

    /// The delivery step failed.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Catalog store error.
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl GiftError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GiftError::InvalidQuantity { .. } => "invalid_quantity",
            GiftError::OptionNotFound(_) => "option_not_found",
            GiftError::MemberNotFound(_) => "member_not_found",
            GiftError::InsufficientStock { .. } => "insufficient_stock",
            GiftError::Delivery(_) => "delivery",
            GiftError::Store(_) => "store",
        }
    }
}

impl From<StoreError> for GiftError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientStock {
                option_id,
                requested,
                available,
            } => GiftError::InsufficientStock {
                option_id,
                requested,
                available,
            },
            StoreError::OptionNotFound(option_id) => GiftError::OptionNotFound(option_id),
            other => GiftError::Store(other),
        }
    }
}

/// Convenience type alias for gift results.
pub type Result<T> = std::result::Result<T, GiftError>;
