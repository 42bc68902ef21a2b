//! Customer account model and database operations
//!
//! Customers register themselves, place orders and manage their own profile.
//! Their role is always `customer` and is not stored.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE customers (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL UNIQUE,
//!     password_hash VARCHAR(255) NOT NULL,
//!     phone VARCHAR(50),
//!     address TEXT,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::models::customer::{Customer, CreateCustomer};
//! use gadgethub_shared::db::pool::{create_pool, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool(DatabaseConfig::default()).await?;
//!
//! let customer = Customer::create(&pool, CreateCustomer {
//!     name: "Jane Doe".to_string(),
//!     email: "jane@example.com".to_string(),
//!     password_hash: "$argon2id$...".to_string(),
//!     phone: None,
//!     address: None,
//! }).await?;
//!
//! let found = Customer::find_by_email(&pool, "JANE@example.com").await?;
//! assert_eq!(found.map(|c| c.id), Some(customer.id));
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, name, email, password_hash, phone, address, created_at, updated_at";

/// Customer account
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique customer ID
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, stored lowercase
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Optional postal address
    pub address: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new customer
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a customer
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Customer {
    /// Creates a new customer
    ///
    /// The email is lowercased before insertion.
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate email (unique violation)
    pub async fn create(pool: &PgPool, data: CreateCustomer) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, email, password_hash, phone, address) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Customer>(&query)
            .bind(data.name)
            .bind(data.email.to_lowercase())
            .bind(data.password_hash)
            .bind(data.phone)
            .bind(data.address)
            .fetch_one(pool)
            .await
    }

    /// Finds a customer by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE id = $1", COLUMNS);

        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a customer by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers WHERE email = $1", COLUMNS);

        sqlx::query_as::<_, Customer>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Updates an existing customer
    ///
    /// Only `Some` fields in `data` are written; `updated_at` is always bumped.
    ///
    /// # Returns
    ///
    /// The updated customer, or `None` if it doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCustomer,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE customers SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", COLUMNS));

        let mut q = sqlx::query_as::<_, Customer>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email.to_lowercase());
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(address) = data.address {
            q = q.bind(address);
        }

        q.fetch_optional(pool).await
    }

    /// Replaces the password hash
    ///
    /// Returns false if the customer doesn't exist
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE customers SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a customer by ID
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation while the customer still has orders
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all customers, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM customers ORDER BY created_at DESC", COLUMNS);

        sqlx::query_as::<_, Customer>(&query).fetch_all(pool).await
    }

    /// Counts all customers
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM customers")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
