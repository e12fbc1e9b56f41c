use std::num::NonZeroU32;

use async_trait::async_trait;

use crate::{
    Category, CategoryId, Member, MemberId, NewCategory, NewMember, NewOption, NewProduct,
    OptionDetails, OptionId, Product, ProductId, ProductOption, Result, StoreError,
};

/// Core trait for catalog store implementations.
///
/// Plain reads and inserts run on their own. Stock changes only happen
/// through the [`StockTransaction`] returned by [`CatalogStore::begin`].
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// The unit of work type handed out by [`CatalogStore::begin`].
    type Transaction: StockTransaction;

    /// Starts a unit of work for a stock mutation.
    ///
    /// Nothing done through the transaction is visible to other readers
    /// until [`StockTransaction::commit`] succeeds. Dropping the transaction
    /// without committing discards its changes.
    async fn begin(&self) -> Result<Self::Transaction>;

    /// Stores a new member and returns it with its assigned id.
    async fn insert_member(&self, member: NewMember) -> Result<Member>;

    /// Retrieves a member by id.
    async fn get_member(&self, id: MemberId) -> Result<Option<Member>>;

    /// Stores a new category and returns it with its assigned id.
    async fn insert_category(&self, category: NewCategory) -> Result<Category>;

    /// Retrieves a category by id.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Retrieves all categories in insertion order.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Stores a new product.
    ///
    /// Fails with [`StoreError::MissingReference`] if the category does not exist.
    async fn insert_product(&self, product: NewProduct) -> Result<Product>;

    /// Retrieves a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Retrieves all products in insertion order.
    async fn list_products(&self) -> Result<Vec<Product>>;

    /// Stores a new option.
    ///
    /// Fails with [`StoreError::MissingReference`] if the product does not exist.
    async fn insert_option(&self, option: NewOption) -> Result<ProductOption>;

    /// Retrieves an option by id, reflecting committed stock only.
    async fn get_option(&self, id: OptionId) -> Result<Option<ProductOption>>;

    /// Retrieves the options of a product in insertion order.
    async fn list_options(&self, product_id: ProductId) -> Result<Vec<ProductOption>>;
}

/// A unit of work over the stock ledger.
///
/// Reads through the transaction see its own pending decrements.
#[async_trait]
pub trait StockTransaction: Send {
    /// Loads an option together with its product and claims it for this
    /// transaction, so a concurrent decrement cannot slip in unnoticed.
    async fn get_option_for_update(&mut self, id: OptionId) -> Result<Option<OptionDetails>>;

    /// Retrieves a member by id within the transaction.
    async fn get_member(&mut self, id: MemberId) -> Result<Option<Member>>;

    /// Removes `quantity` units from an option's stock and returns what is left.
    ///
    /// Fails with [`StoreError::InsufficientStock`] when the option holds
    /// fewer than `quantity` units; the stock is unchanged in that case.
    async fn decrement_stock(&mut self, id: OptionId, quantity: NonZeroU32) -> Result<u32>;

    /// Makes every change performed through this transaction durable.
    async fn commit(self) -> Result<()>;

    /// Discards every change performed through this transaction.
    async fn rollback(self) -> Result<()>;
}

/// Extension trait providing convenience methods for catalog stores.
#[async_trait]
pub trait CatalogStoreExt: CatalogStore {
    /// Loads an option together with its product, outside any transaction.
    async fn get_option_details(&self, id: OptionId) -> Result<Option<OptionDetails>> {
        let Some(option) = self.get_option(id).await? else {
            return Ok(None);
        };
        let product = self
            .get_product(option.product_id)
            .await?
            .ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "option {} references missing product {}",
                    option.id, option.product_id
                ))
            })?;
        Ok(Some(OptionDetails { option, product }))
    }
}

// Blanket implementation for all CatalogStore implementations
impl<T: CatalogStore + ?Sized> CatalogStoreExt for T {}
