//! Catalog records as stored, plus the insert payloads that create them.

use crate::{CategoryId, MemberId, OptionId, ProductId};

/// A registered member. Members are never modified once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub email: String,
}

/// Data for a member that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub email: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Data for a category that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

/// A product belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the smallest currency unit. Always positive.
    pub price: i64,
    pub image_url: String,
    pub category_id: CategoryId,
}

/// Data for a product that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub image_url: String,
    pub category_id: CategoryId,
}

/// A purchasable variant of a product carrying its own stock count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOption {
    pub id: OptionId,
    pub name: String,
    /// Units in stock.
    pub quantity: u32,
    pub product_id: ProductId,
}

/// Data for an option that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewOption {
    pub name: String,
    pub quantity: u32,
    pub product_id: ProductId,
}

/// An option loaded together with the product it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDetails {
    pub option: ProductOption,
    pub product: Product,
}
