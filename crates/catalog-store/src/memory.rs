use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::{
    Category, CategoryId, Member, MemberId, NewCategory, NewMember, NewOption, NewProduct,
    OptionDetails, OptionId, Product, ProductId, ProductOption, Result, StoreError,
    store::{CatalogStore, StockTransaction},
};

/// An option with the lock that stands in for its row lock.
#[derive(Debug)]
struct StoredOption {
    option: ProductOption,
    lock: Arc<Mutex<()>>,
}

#[derive(Debug, Default)]
struct CatalogState {
    members: BTreeMap<MemberId, Member>,
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    options: BTreeMap<OptionId, StoredOption>,
    member_seq: i64,
    category_seq: i64,
    product_seq: i64,
    option_seq: i64,
}

fn next_id(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

impl CatalogState {
    fn option_details(&self, id: OptionId) -> Result<Option<OptionDetails>> {
        let Some(stored) = self.options.get(&id) else {
            return Ok(None);
        };
        let product = self
            .products
            .get(&stored.option.product_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "option {id} references missing product {}",
                    stored.option.product_id
                ))
            })?;
        Ok(Some(OptionDetails {
            option: stored.option.clone(),
            product,
        }))
    }
}

/// In-memory catalog store implementation for testing and local runs.
///
/// This implementation keeps all records in memory and provides the same
/// interface as the PostgreSQL implementation. Ids are assigned from
/// per-table sequences starting at 1, so id order is insertion order.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    type Transaction = InMemoryStockTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        Ok(InMemoryStockTransaction {
            state: Arc::clone(&self.state),
            staged: BTreeMap::new(),
        })
    }

    async fn insert_member(&self, member: NewMember) -> Result<Member> {
        let mut state = self.state.write().await;
        let id = MemberId::new(next_id(&mut state.member_seq));
        let member = Member {
            id,
            name: member.name,
            email: member.email,
        };
        state.members.insert(id, member.clone());
        Ok(member)
    }

    async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category> {
        let mut state = self.state.write().await;
        let id = CategoryId::new(next_id(&mut state.category_seq));
        let category = Category {
            id,
            name: category.name,
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.state.read().await.categories.values().cloned().collect())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&product.category_id) {
            return Err(StoreError::MissingReference {
                entity: "category",
                id: product.category_id.as_i64(),
            });
        }

        let id = ProductId::new(next_id(&mut state.product_seq));
        let product = Product {
            id,
            name: product.name,
            price: product.price,
            image_url: product.image_url,
            category_id: product.category_id,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.state.read().await.products.values().cloned().collect())
    }

    async fn insert_option(&self, option: NewOption) -> Result<ProductOption> {
        let mut state = self.state.write().await;
        if !state.products.contains_key(&option.product_id) {
            return Err(StoreError::MissingReference {
                entity: "product",
                id: option.product_id.as_i64(),
            });
        }

        let id = OptionId::new(next_id(&mut state.option_seq));
        let option = ProductOption {
            id,
            name: option.name,
            quantity: option.quantity,
            product_id: option.product_id,
        };
        state.options.insert(
            id,
            StoredOption {
                option: option.clone(),
                lock: Arc::new(Mutex::new(())),
            },
        );
        Ok(option)
    }

    async fn get_option(&self, id: OptionId) -> Result<Option<ProductOption>> {
        Ok(self
            .state
            .read()
            .await
            .options
            .get(&id)
            .map(|stored| stored.option.clone()))
    }

    async fn list_options(&self, product_id: ProductId) -> Result<Vec<ProductOption>> {
        Ok(self
            .state
            .read()
            .await
            .options
            .values()
            .filter(|stored| stored.option.product_id == product_id)
            .map(|stored| stored.option.clone())
            .collect())
    }
}

/// Stock of one option as seen by the transaction holding its lock.
struct StagedStock {
    quantity: u32,
    dirty: bool,
    _guard: OwnedMutexGuard<()>,
}

/// Unit of work over an [`InMemoryCatalogStore`].
///
/// The first touch of an option takes that option's lock and keeps it until
/// the transaction commits, rolls back or is dropped, so transactions on the
/// same option run one after another. Decrements are staged locally and
/// applied under the store's write lock on commit.
pub struct InMemoryStockTransaction {
    state: Arc<RwLock<CatalogState>>,
    staged: BTreeMap<OptionId, StagedStock>,
}

impl InMemoryStockTransaction {
    /// Locks the option on first touch and returns this transaction's view
    /// of its stock.
    async fn stage(&mut self, id: OptionId) -> Result<Option<&mut StagedStock>> {
        if !self.staged.contains_key(&id) {
            let lock = match self.state.read().await.options.get(&id) {
                Some(stored) => Arc::clone(&stored.lock),
                None => return Ok(None),
            };
            let guard = lock.lock_owned().await;

            // Read after locking so the previous holder's commit is included
            let quantity = match self.state.read().await.options.get(&id) {
                Some(stored) => stored.option.quantity,
                None => return Ok(None),
            };
            self.staged.insert(
                id,
                StagedStock {
                    quantity,
                    dirty: false,
                    _guard: guard,
                },
            );
        }
        Ok(self.staged.get_mut(&id))
    }
}

#[async_trait]
impl StockTransaction for InMemoryStockTransaction {
    async fn get_option_for_update(&mut self, id: OptionId) -> Result<Option<OptionDetails>> {
        let Some(quantity) = self.stage(id).await?.map(|staged| staged.quantity) else {
            return Ok(None);
        };
        let Some(mut details) = self.state.read().await.option_details(id)? else {
            return Ok(None);
        };
        details.option.quantity = quantity;
        Ok(Some(details))
    }

    async fn get_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        Ok(self.state.read().await.members.get(&id).cloned())
    }

    async fn decrement_stock(&mut self, id: OptionId, quantity: NonZeroU32) -> Result<u32> {
        let staged = self
            .stage(id)
            .await?
            .ok_or(StoreError::OptionNotFound(id))?;

        let requested = quantity.get();
        let remaining =
            staged
                .quantity
                .checked_sub(requested)
                .ok_or(StoreError::InsufficientStock {
                    option_id: id,
                    requested,
                    available: staged.quantity,
                })?;

        staged.quantity = remaining;
        staged.dirty = true;
        Ok(remaining)
    }

    async fn commit(self) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(id) = self
            .staged
            .keys()
            .find(|id| !state.options.contains_key(*id))
        {
            return Err(StoreError::OptionNotFound(*id));
        }

        for (id, staged) in self.staged.iter().filter(|(_, staged)| staged.dirty) {
            if let Some(stored) = state.options.get_mut(id) {
                stored.option.quantity = staged.quantity;
            }
        }

        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        tracing::debug!(staged = self.staged.len(), "discarding staged stock changes");
        Ok(())
    }
}
