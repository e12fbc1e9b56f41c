//! Catalog commands and the service that applies them.

mod commands;
mod service;

pub use commands::{CreateCategory, CreateOption, CreateProduct, RegisterMember};
pub use service::CatalogService;
