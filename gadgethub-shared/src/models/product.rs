//! Product catalog model and database operations
//!
//! Products carry a mutable `stock` counter that checkout decrements (see
//! [`crate::checkout`]). The database enforces `stock >= 0` with the
//! `products_stock_non_negative` constraint.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE products (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     description TEXT,
//!     brand VARCHAR(255),
//!     category VARCHAR(255) NOT NULL,
//!     price NUMERIC(12, 2) NOT NULL CHECK (price >= 0),
//!     stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
//!     image_url VARCHAR(1024) NOT NULL,
//!     created_by UUID REFERENCES staff(id) ON DELETE SET NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::models::product::{CreateProduct, Product};
//! use rust_decimal::Decimal;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, admin_id: Uuid) -> Result<(), sqlx::Error> {
//! let product = Product::create(&pool, CreateProduct {
//!     name: "Pixel 9".to_string(),
//!     description: None,
//!     brand: Some("Google".to_string()),
//!     category: "Phones".to_string(),
//!     price: Decimal::new(79999, 2),
//!     stock: Some(5),
//!     image_url: None,
//!     created_by: Some(admin_id),
//! }).await?;
//!
//! let meta = Product::meta(&pool).await?;
//! assert!(meta.brands.contains(&"Google".to_string()));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::contains_pattern;

/// Image used when a product is created without one
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/150";

const COLUMNS: &str = "id, name, description, brand, category, price, stock, image_url, \
                       created_by, created_at, updated_at";

/// Catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Product name
    pub name: String,

    /// Free-form description
    pub description: Option<String>,

    /// Brand, used by the brand filter and catalog meta
    pub brand: Option<String>,

    /// Category, used by the category filter and catalog meta
    pub category: String,

    /// Unit price
    pub price: Decimal,

    /// Units available; never negative
    pub stock: i32,

    /// Product image
    pub image_url: String,

    /// Staff account that created the product, if it still exists
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product
#[derive(Debug, Clone)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: String,
    pub price: Decimal,
    /// Defaults to 0
    pub stock: Option<i32>,
    /// Defaults to [`DEFAULT_IMAGE_URL`]
    pub image_url: Option<String>,
    pub created_by: Option<Uuid>,
}

/// Partial product update; only `Some` fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

impl UpdateProduct {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.brand.is_none()
            && self.category.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
    }
}

/// Distinct brands and categories across the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogMeta {
    /// Sorted, non-empty brand names
    pub brands: Vec<String>,

    /// Sorted, non-empty category names
    pub categories: Vec<String>,
}

impl Product {
    /// Creates a new product
    ///
    /// # Errors
    ///
    /// Returns a check violation for a negative price or stock
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
             (name, description, brand, category, price, stock, image_url, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.brand)
            .bind(data.category)
            .bind(data.price)
            .bind(data.stock.unwrap_or(0))
            .bind(
                data.image_url
                    .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            )
            .bind(data.created_by)
            .fetch_one(pool)
            .await
    }

    /// Finds a product by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM products WHERE id = $1", COLUMNS);

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every product, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM products ORDER BY created_at DESC", COLUMNS);

        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Products whose category contains `category`, case-insensitively
    pub async fn list_by_category(pool: &PgPool, category: &str) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM products WHERE category ILIKE $1 ORDER BY created_at DESC",
            COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(contains_pattern(category))
            .fetch_all(pool)
            .await
    }

    /// Products whose brand contains `brand`, case-insensitively
    pub async fn list_by_brand(pool: &PgPool, brand: &str) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM products WHERE brand ILIKE $1 ORDER BY created_at DESC",
            COLUMNS
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(contains_pattern(brand))
            .fetch_all(pool)
            .await
    }

    /// Distinct non-blank brands and categories, sorted by code point
    pub async fn meta(pool: &PgPool) -> Result<CatalogMeta, sqlx::Error> {
        let brands: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT brand FROM products
            WHERE brand IS NOT NULL AND btrim(brand) <> ''
            ORDER BY brand COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;

        let categories: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT category FROM products
            WHERE btrim(category) <> ''
            ORDER BY category COLLATE "C"
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(CatalogMeta {
            brands: brands.into_iter().map(|(b,)| b).collect(),
            categories: categories.into_iter().map(|(c,)| c).collect(),
        })
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// The updated product, or `None` if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE products SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.brand.is_some() {
            bind_count += 1;
            query.push_str(&format!(", brand = ${}", bind_count));
        }
        if data.category.is_some() {
            bind_count += 1;
            query.push_str(&format!(", category = ${}", bind_count));
        }
        if data.price.is_some() {
            bind_count += 1;
            query.push_str(&format!(", price = ${}", bind_count));
        }
        if data.stock.is_some() {
            bind_count += 1;
            query.push_str(&format!(", stock = ${}", bind_count));
        }
        if data.image_url.is_some() {
            bind_count += 1;
            query.push_str(&format!(", image_url = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", COLUMNS));

        let mut q = sqlx::query_as::<_, Product>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(brand) = data.brand {
            q = q.bind(brand);
        }
        if let Some(category) = data.category {
            q = q.bind(category);
        }
        if let Some(price) = data.price {
            q = q.bind(price);
        }
        if let Some(stock) = data.stock {
            q = q.bind(stock);
        }
        if let Some(image_url) = data.image_url {
            q = q.bind(image_url);
        }

        q.fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
