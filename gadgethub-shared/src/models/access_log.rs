//! Access log model
//!
//! One row per handled HTTP request, written by the API server's request
//! logging middleware. Rows are never updated or deleted by the application.
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::models::access_log::{AccessLog, LogFilter, NewAccessLog};
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! AccessLog::create(&pool, NewAccessLog {
//!     method: "GET".to_string(),
//!     route: "/api/products?limit=5".to_string(),
//!     status_code: 200,
//!     user_id: None,
//!     user_name: None,
//!     user_role: None,
//!     ip: Some("127.0.0.1".to_string()),
//!     response_time_ms: 3,
//! }).await?;
//!
//! let filter = LogFilter::default();
//! let total = AccessLog::count(&pool, &filter).await?;
//! let page = AccessLog::list(&pool, &filter, 20, 0).await?;
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::contains_pattern;

const COLUMNS: &str = "id, method, route, status_code, user_id, user_name, user_role, ip, \
                       response_time_ms, created_at";

// Each filter is optional; a NULL parameter disables its clause.
const FILTER_CLAUSE: &str = "($1::text IS NULL OR user_name ILIKE $1) \
     AND ($2::text IS NULL OR route ILIKE $2) \
     AND ($3::timestamptz IS NULL OR created_at >= $3) \
     AND ($4::timestamptz IS NULL OR created_at < $4)";

/// Stored access log entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    #[serde(rename = "_id")]
    pub id: Uuid,

    pub method: String,

    /// Original request URI including the query string
    pub route: String,

    pub status_code: i32,

    pub user_id: Option<Uuid>,

    pub user_name: Option<String>,

    pub user_role: Option<String>,

    pub ip: Option<String>,

    #[serde(rename = "responseTime")]
    pub response_time_ms: i64,

    pub created_at: DateTime<Utc>,
}

/// Input for appending an entry
#[derive(Debug, Clone)]
pub struct NewAccessLog {
    pub method: String,
    pub route: String,
    pub status_code: i32,
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub user_role: Option<String>,
    pub ip: Option<String>,
    pub response_time_ms: i64,
}

/// Query filter for the admin log listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Case-insensitive substring of the responder's name
    pub user: Option<String>,

    /// Case-insensitive substring of the route
    pub route: Option<String>,

    /// Inclusive lower bound
    pub from: Option<DateTime<Utc>>,

    /// Exclusive upper bound
    pub until: Option<DateTime<Utc>>,
}

impl LogFilter {
    /// Builds a filter from calendar dates
    ///
    /// Both dates are inclusive: `end_date` covers the whole day, up to the
    /// next UTC midnight. Blank text filters are ignored.
    pub fn from_dates(
        user: Option<String>,
        route: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        Self {
            user: non_blank(user),
            route: non_blank(route),
            from: start_date.and_then(start_of_day),
            until: end_date
                .and_then(|d| d.checked_add_days(Days::new(1)))
                .and_then(start_of_day),
        }
    }
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

impl AccessLog {
    /// Appends one entry
    pub async fn create(pool: &PgPool, data: NewAccessLog) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_logs \
             (method, route, status_code, user_id, user_name, user_role, ip, response_time_ms) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, AccessLog>(&query)
            .bind(data.method)
            .bind(data.route)
            .bind(data.status_code)
            .bind(data.user_id)
            .bind(data.user_name)
            .bind(data.user_role)
            .bind(data.ip)
            .bind(data.response_time_ms)
            .fetch_one(pool)
            .await
    }

    /// Lists matching entries, newest first
    pub async fn list(
        pool: &PgPool,
        filter: &LogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM access_logs WHERE {} ORDER BY created_at DESC LIMIT $5 OFFSET $6",
            COLUMNS, FILTER_CLAUSE
        );

        sqlx::query_as::<_, AccessLog>(&query)
            .bind(filter.user.as_deref().map(contains_pattern))
            .bind(filter.route.as_deref().map(contains_pattern))
            .bind(filter.from)
            .bind(filter.until)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Counts matching entries
    pub async fn count(pool: &PgPool, filter: &LogFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM access_logs WHERE {}", FILTER_CLAUSE);

        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(filter.user.as_deref().map(contains_pattern))
            .bind(filter.route.as_deref().map(contains_pattern))
            .bind(filter.from)
            .bind(filter.until)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
