/// Dashboard endpoints
///
/// - `GET /api/stats/admin-dashboard` - Totals, monthly paid sales, orders per status (admin)
/// - `GET /api/stats/staff-dashboard` - Totals, stock levels, daily paid orders (admin, staff)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, ADMIN, ADMIN_OR_STAFF},
        middleware::AuthContext,
    },
    stats::{self, AdminDashboard, StaffDashboard},
};

pub async fn admin_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AdminDashboard>> {
    require_role(&auth, ADMIN)?;

    Ok(Json(stats::admin_dashboard(&state.db).await?))
}

pub async fn staff_dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<StaffDashboard>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    Ok(Json(stats::staff_dashboard(&state.db).await?))
}
