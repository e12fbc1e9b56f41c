//! Domain error types.

use catalog_store::{CategoryId, MemberId, OptionId, ProductId, StoreError};
use thiserror::Error;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required name was absent or blank.
    #[error("{entity} name is required")]
    BlankName { entity: &'static str },

    /// A name longer than the catalog stores.
    #[error("{entity} name is too long (at most {max} characters)")]
    NameTooLong { entity: &'static str, max: usize },

    /// Invalid price.
    #[error("Invalid price: {price} (must be greater than 0)")]
    InvalidPrice { price: i64 },

    /// Invalid email address.
    #[error("Invalid email: {email:?}")]
    InvalidEmail { email: String },

    /// Initial option stock outside the storable range.
    #[error("Invalid stock quantity: {quantity} (must be between 0 and {max})", max = i32::MAX)]
    InvalidStock { quantity: i64 },

    /// Gift quantity outside the accepted range.
    #[error("Invalid quantity: {quantity} (must be between 1 and {max})", max = i32::MAX)]
    InvalidQuantity { quantity: i64 },

    /// Referenced category does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Referenced member does not exist.
    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    /// Referenced option does not exist.
    #[error("Option not found: {0}")]
    OptionNotFound(OptionId),

    /// An error occurred in the catalog store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
