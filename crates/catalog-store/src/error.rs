use thiserror::Error;

use crate::OptionId;

/// Errors that can occur when interacting with the catalog store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A decrement asked for more units than the option holds.
    /// The stored quantity is left unchanged.
    #[error(
        "Insufficient stock for option {option_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        option_id: OptionId,
        requested: u32,
        available: u32,
    },

    /// The option targeted by a stock operation does not exist.
    #[error("Option not found: {0}")]
    OptionNotFound(OptionId),

    /// An insert referenced a parent row that does not exist.
    #[error("Referenced {entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    /// A stored row could not be mapped onto a record.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for catalog store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
