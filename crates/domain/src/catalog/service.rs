//! Catalog service providing validated create and read operations.

use catalog_store::{
    CatalogStore, CatalogStoreExt, Category, Member, MemberId, NewCategory, NewMember, NewOption,
    NewProduct, OptionDetails, OptionId, Product, ProductId, ProductOption, StoreError,
};

use crate::error::DomainError;

use super::{CreateCategory, CreateOption, CreateProduct, RegisterMember};

/// Longest name or email, in characters, the catalog columns hold.
pub const MAX_TEXT_LEN: usize = 255;

/// Returns the trimmed name, or `BlankName` if there is nothing left.
fn required_name(entity: &'static str, name: Option<&str>) -> Result<String, DomainError> {
    match name.map(str::trim) {
        Some(name) if name.chars().count() > MAX_TEXT_LEN => Err(DomainError::NameTooLong {
            entity,
            max: MAX_TEXT_LEN,
        }),
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(DomainError::BlankName { entity }),
    }
}

/// Service for managing the catalog: categories, products, options and members.
///
/// Every create operation validates its command before touching the store,
/// so a rejected command leaves no record behind.
pub struct CatalogService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    /// Creates a new catalog service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a category.
    #[tracing::instrument(skip(self))]
    pub async fn create_category(&self, cmd: CreateCategory) -> Result<Category, DomainError> {
        let name = required_name("Category", cmd.name.as_deref())?;
        let category = self.store.insert_category(NewCategory { name }).await?;

        metrics::counter!("catalog_records_created_total", "kind" => "category").increment(1);
        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    /// Returns all categories in insertion order.
    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.store.list_categories().await?)
    }

    /// Creates a product in an existing category.
    #[tracing::instrument(skip(self))]
    pub async fn create_product(&self, cmd: CreateProduct) -> Result<Product, DomainError> {
        if cmd.price <= 0 {
            return Err(DomainError::InvalidPrice { price: cmd.price });
        }
        let name = required_name("Product", Some(&cmd.name))?;

        if self.store.get_category(cmd.category_id).await?.is_none() {
            return Err(DomainError::CategoryNotFound(cmd.category_id));
        }

        let product = self
            .store
            .insert_product(NewProduct {
                name,
                price: cmd.price,
                image_url: cmd.image_url,
                category_id: cmd.category_id,
            })
            .await
            .map_err(|e| match e {
                StoreError::MissingReference { .. } => DomainError::CategoryNotFound(cmd.category_id),
                other => DomainError::Store(other),
            })?;

        metrics::counter!("catalog_records_created_total", "kind" => "product").increment(1);
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    /// Returns all products in insertion order.
    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.store.list_products().await?)
    }

    /// Registers a member.
    #[tracing::instrument(skip(self))]
    pub async fn register_member(&self, cmd: RegisterMember) -> Result<Member, DomainError> {
        let name = required_name("Member", Some(&cmd.name))?;
        let email = cmd.email.trim();
        if !email.contains('@') || email.chars().count() > MAX_TEXT_LEN {
            return Err(DomainError::InvalidEmail { email: cmd.email });
        }

        let member = self
            .store
            .insert_member(NewMember {
                name,
                email: email.to_string(),
            })
            .await?;

        metrics::counter!("catalog_records_created_total", "kind" => "member").increment(1);
        tracing::info!(member_id = %member.id, "member registered");
        Ok(member)
    }

    /// Retrieves a member by id.
    pub async fn get_member(&self, id: MemberId) -> Result<Member, DomainError> {
        self.store
            .get_member(id)
            .await?
            .ok_or(DomainError::MemberNotFound(id))
    }

    /// Adds a stocked option to an existing product.
    #[tracing::instrument(skip(self))]
    pub async fn create_option(&self, cmd: CreateOption) -> Result<ProductOption, DomainError> {
        let name = required_name("Option", Some(&cmd.name))?;
        let quantity = u32::try_from(cmd.quantity)
            .ok()
            .filter(|q| i32::try_from(*q).is_ok())
            .ok_or(DomainError::InvalidStock {
                quantity: cmd.quantity,
            })?;

        if self.store.get_product(cmd.product_id).await?.is_none() {
            return Err(DomainError::ProductNotFound(cmd.product_id));
        }

        let option = self
            .store
            .insert_option(NewOption {
                name,
                quantity,
                product_id: cmd.product_id,
            })
            .await
            .map_err(|e| match e {
                StoreError::MissingReference { .. } => DomainError::ProductNotFound(cmd.product_id),
                other => DomainError::Store(other),
            })?;

        metrics::counter!("catalog_records_created_total", "kind" => "option").increment(1);
        tracing::info!(option_id = %option.id, quantity, "option created");
        Ok(option)
    }

    /// Returns the options of a product in insertion order.
    pub async fn list_options(&self, product_id: ProductId) -> Result<Vec<ProductOption>, DomainError> {
        if self.store.get_product(product_id).await?.is_none() {
            return Err(DomainError::ProductNotFound(product_id));
        }
        Ok(self.store.list_options(product_id).await?)
    }

    /// Retrieves an option with its product.
    pub async fn get_option(&self, id: OptionId) -> Result<OptionDetails, DomainError> {
        self.store
            .get_option_details(id)
            .await?
            .ok_or(DomainError::OptionNotFound(id))
    }
}
