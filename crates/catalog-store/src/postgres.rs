use std::num::NonZeroU32;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::{
    Category, CategoryId, Member, MemberId, NewCategory, NewMember, NewOption, NewProduct,
    OptionDetails, OptionId, Product, ProductId, ProductOption, Result, StoreError,
    store::{CatalogStore, StockTransaction},
};

/// PostgreSQL-backed catalog store implementation.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to `database_url`.
    ///
    /// A gift transaction runs entirely on the one connection it begins on.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn row_to_member(row: PgRow) -> Result<Member> {
    Ok(Member {
        id: MemberId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
    })
}

fn row_to_category(row: PgRow) -> Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

fn row_to_product(row: PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        image_url: row.try_get("image_url")?,
        category_id: CategoryId::new(row.try_get("category_id")?),
    })
}

fn row_to_option(row: PgRow) -> Result<ProductOption> {
    Ok(ProductOption {
        id: OptionId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        quantity: stock_from_column(row.try_get("quantity")?)?,
        product_id: ProductId::new(row.try_get("product_id")?),
    })
}

fn row_to_option_details(row: PgRow) -> Result<OptionDetails> {
    let product_id = ProductId::new(row.try_get("product_id")?);
    Ok(OptionDetails {
        option: ProductOption {
            id: OptionId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            quantity: stock_from_column(row.try_get("quantity")?)?,
            product_id,
        },
        product: Product {
            id: product_id,
            name: row.try_get("product_name")?,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
            category_id: CategoryId::new(row.try_get("category_id")?),
        },
    })
}

fn stock_from_column(quantity: i32) -> Result<u32> {
    u32::try_from(quantity)
        .map_err(|_| StoreError::InvalidData(format!("negative stock quantity {quantity}")))
}

fn stock_to_column(quantity: u32) -> Result<i32> {
    i32::try_from(quantity)
        .map_err(|_| StoreError::InvalidData(format!("stock quantity {quantity} exceeds column range")))
}

/// Maps a foreign key violation on insert to [`StoreError::MissingReference`].
fn missing_reference(entity: &'static str, id: i64) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_foreign_key_violation()
        {
            return StoreError::MissingReference { entity, id };
        }
        StoreError::Database(e)
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    type Transaction = PostgresStockTransaction;

    async fn begin(&self) -> Result<Self::Transaction> {
        Ok(PostgresStockTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn insert_member(&self, member: NewMember) -> Result<Member> {
        let row = sqlx::query(
            "INSERT INTO members (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(&member.name)
        .bind(&member.email)
        .fetch_one(&self.pool)
        .await?;

        row_to_member(row)
    }

    async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
        sqlx::query("SELECT id, name, email FROM members WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_member)
            .transpose()
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category> {
        let row = sqlx::query("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(&category.name)
            .fetch_one(&self.pool)
            .await?;

        row_to_category(row)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_category)
            .transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(row_to_category).collect()
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price, image_url, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, image_url, category_id
            "#,
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.category_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference("category", product.category_id.as_i64()))?;

        row_to_product(row)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        sqlx::query("SELECT id, name, price, image_url, category_id FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_product)
            .transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, price, image_url, category_id FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_product).collect()
    }

    async fn insert_option(&self, option: NewOption) -> Result<ProductOption> {
        let row = sqlx::query(
            r#"
            INSERT INTO options (name, quantity, product_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, quantity, product_id
            "#,
        )
        .bind(&option.name)
        .bind(stock_to_column(option.quantity)?)
        .bind(option.product_id.as_i64())
        .fetch_one(&self.pool)
        .await
        .map_err(missing_reference("product", option.product_id.as_i64()))?;

        row_to_option(row)
    }

    async fn get_option(&self, id: OptionId) -> Result<Option<ProductOption>> {
        sqlx::query("SELECT id, name, quantity, product_id FROM options WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_option)
            .transpose()
    }

    async fn list_options(&self, product_id: ProductId) -> Result<Vec<ProductOption>> {
        let rows = sqlx::query(
            "SELECT id, name, quantity, product_id FROM options WHERE product_id = $1 ORDER BY id ASC",
        )
        .bind(product_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_option).collect()
    }
}

/// Unit of work over a [`PostgresCatalogStore`], backed by a database transaction.
///
/// Dropping it without calling [`StockTransaction::commit`] rolls the
/// database transaction back.
pub struct PostgresStockTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockTransaction for PostgresStockTransaction {
    async fn get_option_for_update(&mut self, id: OptionId) -> Result<Option<OptionDetails>> {
        sqlx::query(
            r#"
            SELECT o.id, o.name, o.quantity, o.product_id,
                   p.name AS product_name, p.price, p.image_url, p.category_id
            FROM options o
            JOIN products p ON p.id = o.product_id
            WHERE o.id = $1
            FOR UPDATE OF o
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&mut *self.tx)
        .await?
        .map(row_to_option_details)
        .transpose()
    }

    async fn get_member(&mut self, id: MemberId) -> Result<Option<Member>> {
        sqlx::query("SELECT id, name, email FROM members WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&mut *self.tx)
            .await?
            .map(row_to_member)
            .transpose()
    }

    async fn decrement_stock(&mut self, id: OptionId, quantity: NonZeroU32) -> Result<u32> {
        let requested = quantity.get();

        // A request beyond the column range can never be covered by stock
        if let Ok(amount) = i32::try_from(requested) {
            let remaining: Option<i32> = sqlx::query_scalar(
                r#"
                UPDATE options
                SET quantity = quantity - $2
                WHERE id = $1 AND quantity >= $2
                RETURNING quantity
                "#,
            )
            .bind(id.as_i64())
            .bind(amount)
            .fetch_optional(&mut *self.tx)
            .await?;

            if let Some(remaining) = remaining {
                return stock_from_column(remaining);
            }
        }

        let available: Option<i32> =
            sqlx::query_scalar("SELECT quantity FROM options WHERE id = $1")
                .bind(id.as_i64())
                .fetch_optional(&mut *self.tx)
                .await?;

        match available {
            Some(available) => Err(StoreError::InsufficientStock {
                option_id: id,
                requested,
                available: stock_from_column(available)?,
            }),
            None => Err(StoreError::OptionNotFound(id)),
        }
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
