//! Catalog commands.
//!
//! Commands carry caller input as received. Validation happens in
//! [`CatalogService`](super::CatalogService), so a command can hold values
//! that will be rejected.

use catalog_store::{CategoryId, ProductId};

/// Command to create a category.
#[derive(Debug, Clone, Default)]
pub struct CreateCategory {
    /// Category name. Absent and blank names are rejected.
    pub name: Option<String>,
}

impl CreateCategory {
    /// Creates a new CreateCategory command.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Command to create a product in an existing category.
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    /// Unit price; must be greater than 0.
    pub price: i64,
    pub image_url: String,
    pub category_id: CategoryId,
}

/// Command to register a member.
#[derive(Debug, Clone)]
pub struct RegisterMember {
    pub name: String,
    pub email: String,
}

impl RegisterMember {
    /// Creates a new RegisterMember command.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Command to add a stocked option to an existing product.
#[derive(Debug, Clone)]
pub struct CreateOption {
    pub product_id: ProductId,
    pub name: String,
    /// Initial stock; must be between 0 and `i32::MAX`.
    pub quantity: i64,
}
