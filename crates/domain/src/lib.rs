//! Domain layer for the gift catalog service.
//!
//! This crate provides:
//! - Catalog commands and their validation rules (`CatalogService`)
//! - The `Gift` value object handed to delivery
//! - `GiftQuantity`, the precondition every stock decrement goes through

pub mod catalog;
pub mod error;
pub mod gift;

pub use catalog::{
    CatalogService, CreateCategory, CreateOption, CreateProduct, RegisterMember,
};
pub use error::DomainError;
pub use gift::{Gift, GiftQuantity};
