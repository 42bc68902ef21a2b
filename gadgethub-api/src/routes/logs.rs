/// Access log listing
///
/// # Endpoint
///
/// ```text
/// GET /api/logs?page=2&limit=50&user=grace&route=/api/orders&startDate=2024-05-01&endDate=2024-05-31
/// Authorization: Bearer <admin token>
/// ```
///
/// Every query parameter is optional. Dates are inclusive calendar days in
/// UTC.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use gadgethub_shared::{
    auth::{
        authorization::{require_role, ADMIN},
        middleware::AuthContext,
    },
    models::access_log::{AccessLog, LogFilter},
};
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;

/// Query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub user: Option<String>,
    pub route: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Filters echoed back with the page
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub user: Option<String>,
    pub route: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One page of log entries
#[derive(Debug, Serialize, Deserialize)]
pub struct LogPage {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub filters: AppliedFilters,
    pub logs: Vec<AccessLog>,
}

/// Clamped page number and size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Paging {
    page: i64,
    limit: i64,
}

impl Paging {
    fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    fn pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

/// List access log entries, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<LogQuery>, QueryRejection>,
) -> ApiResult<Json<LogPage>> {
    require_role(&auth, ADMIN)?;

    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ApiError::BadRequest(
                "startDate must not be after endDate".to_string(),
            ));
        }
    }

    let paging = Paging::new(query.page, query.limit);
    let filter = LogFilter::from_dates(
        query.user.clone(),
        query.route.clone(),
        query.start_date,
        query.end_date,
    );

    let total = AccessLog::count(&state.db, &filter).await?;
    let logs = AccessLog::list(&state.db, &filter, paging.limit, paging.offset()).await?;

    Ok(Json(LogPage {
        total,
        page: paging.page,
        pages: paging.pages(total),
        filters: AppliedFilters {
            user: filter.user,
            route: filter.route,
            start_date: query.start_date,
            end_date: query.end_date,
        },
        logs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults_and_clamping() {
        assert_eq!(Paging::new(None, None), Paging { page: 1, limit: 20 });
        assert_eq!(Paging::new(Some(0), Some(1000)), Paging { page: 1, limit: 200 });
        assert_eq!(Paging::new(Some(-3), Some(0)), Paging { page: 1, limit: 1 });
    }

    #[test]
    fn test_paging_offset_and_pages() {
        let paging = Paging::new(Some(3), Some(20));
        assert_eq!(paging.offset(), 40);
        assert_eq!(paging.pages(0), 0);
        assert_eq!(paging.pages(20), 1);
        assert_eq!(paging.pages(41), 3);
    }

    #[test]
    fn test_query_parses_dates() {
        let query: LogQuery =
            serde_json::from_str(r#"{"startDate":"2024-05-01","endDate":"2024-05-31"}"#).unwrap();

        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2024, 5, 31));
    }
}
