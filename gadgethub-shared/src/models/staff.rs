//! Staff account model and database operations
//!
//! Staff accounts carry a stored role, `admin` or `staff`, which is copied
//! into the token claim at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Role stored on a staff account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "staff_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Store administrator
    Admin,

    /// Store employee
    #[default]
    Staff,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Staff => "staff",
        }
    }
}

/// Staff account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub name: String,

    /// Email address, stored lowercase
    pub email: String,

    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub role: StaffRole,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a staff account
#[derive(Debug, Clone)]
pub struct CreateStaff {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: StaffRole,
}

/// Input for updating a staff account
#[derive(Debug, Clone, Default)]
pub struct UpdateStaff {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<StaffRole>,
}

impl Staff {
    /// Creates a new staff account
    pub async fn create(pool: &PgPool, data: CreateStaff) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Staff>(&query)
            .bind(data.name)
            .bind(data.email.to_lowercase())
            .bind(data.password_hash)
            .bind(data.role)
            .fetch_one(pool)
            .await
    }

    /// Inserts an admin account unless any admin already exists
    ///
    /// Single statement, so repeated or concurrent calls never create a
    /// second admin. Returns `None` when nothing was inserted, which includes
    /// the case where the email is already taken by a non-admin account.
    pub async fn create_admin_if_none(
        pool: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff (name, email, password_hash, role) \
             SELECT $1, $2, $3, 'admin' \
             WHERE NOT EXISTS (SELECT 1 FROM staff WHERE role = 'admin') \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Staff>(&query)
            .bind(name)
            .bind(email.to_lowercase())
            .bind(password_hash)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM staff WHERE id = $1", COLUMNS);

        sqlx::query_as::<_, Staff>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a staff account by email (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM staff WHERE email = $1", COLUMNS);

        sqlx::query_as::<_, Staff>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// Updates a staff account; only `Some` fields are written
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateStaff,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE staff SET updated_at = NOW()");
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
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", COLUMNS));

        let mut q = sqlx::query_as::<_, Staff>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email.to_lowercase());
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }

        q.fetch_optional(pool).await
    }

    /// Replaces the password hash; false if the account doesn't exist
    pub async fn set_password_hash(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE staff SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM staff WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts accounts with the admin role
    pub async fn count_admins(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM staff WHERE role = 'admin'")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lists all staff accounts, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM staff ORDER BY created_at DESC", COLUMNS);

        sqlx::query_as::<_, Staff>(&query).fetch_all(pool).await
    }

    /// Counts staff accounts (admins included)
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM staff")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
