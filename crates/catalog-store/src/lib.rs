//! Catalog persistence for the gift catalog service.
//!
//! Members, categories, products and product options live behind the
//! [`CatalogStore`] trait. The only mutable counter, an option's stock
//! quantity, is changed exclusively through a [`StockTransaction`] obtained
//! from [`CatalogStore::begin`], which commits or rolls back as a unit.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CategoryId, MemberId, OptionId, ProductId};
pub use error::{Result, StoreError};
pub use memory::{InMemoryCatalogStore, InMemoryStockTransaction};
pub use postgres::{PostgresCatalogStore, PostgresStockTransaction};
pub use record::{
    Category, Member, NewCategory, NewMember, NewOption, NewProduct, OptionDetails, Product,
    ProductOption,
};
pub use store::{CatalogStore, CatalogStoreExt, StockTransaction};
