/// Staff account endpoints
///
/// # Endpoints
///
/// - `POST   /api/staff` - Register a staff or admin account (admin)
/// - `GET    /api/staff` - List staff accounts (admin, staff)
/// - `GET    /api/staff/:id` - One staff account (admin, staff)
/// - `PUT    /api/staff/:id` - Update (admin)
/// - `DELETE /api/staff/:id` - Delete (admin)
///
/// The last remaining admin can be neither deleted nor demoted.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
    routes::{
        auth::{issue_token, StaffSession},
        MessageResponse,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, ADMIN, ADMIN_OR_STAFF},
        middleware::AuthContext,
        password, Role,
    },
    models::staff::{CreateStaff, Staff, StaffRole, UpdateStaff},
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const LAST_ADMIN: &str = "Cannot remove the last admin account";

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterStaffRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Defaults to `staff`
    #[serde(default)]
    pub role: StaffRole,
}

/// Update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStaffRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub role: Option<StaffRole>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,
}

/// Register a staff account
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or `Staff already exists`
/// - `403 Forbidden`: Caller is not an admin
pub async fn register(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<RegisterStaffRequest>,
) -> ApiResult<(StatusCode, Json<StaffSession>)> {
    require_role(&auth, ADMIN)?;

    if Staff::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("Staff already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let staff = Staff::create(
        &state.db,
        CreateStaff {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
        },
    )
    .await?;

    tracing::info!(
        staff_id = %staff.id,
        role = staff.role.as_str(),
        created_by = %auth.account_id,
        "Staff account registered"
    );

    let role = Role::from(staff.role);
    let token = issue_token(&state, staff.id, &staff.name, role)?;

    Ok((
        StatusCode::CREATED,
        Json(StaffSession {
            id: staff.id,
            name: staff.name,
            email: staff.email,
            role,
            token,
        }),
    ))
}

/// List staff accounts
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Staff>>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    Ok(Json(Staff::list(&state.db).await?))
}

/// Fetch one staff account
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Staff>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    let staff = find_staff(&state.db, id).await?;

    Ok(Json(staff))
}

/// Update a staff account
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateStaffRequest>,
) -> ApiResult<Json<Staff>> {
    require_role(&auth, ADMIN)?;

    if req.role == Some(StaffRole::Staff) {
        let current = find_staff(&state.db, id).await?;
        ensure_not_last_admin(&state.db, &current).await?;
    }

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let staff = Staff::update(
        &state.db,
        id,
        UpdateStaff {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Staff not found".to_string()))?;

    Ok(Json(staff))
}

/// Delete a staff account
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, ADMIN)?;

    let staff = find_staff(&state.db, id).await?;
    ensure_not_last_admin(&state.db, &staff).await?;

    if !Staff::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Staff not found".to_string()));
    }

    tracing::info!(staff_id = %id, deleted_by = %auth.account_id, "Staff account deleted");

    Ok(Json(MessageResponse::new("Staff deleted successfully")))
}

async fn find_staff(pool: &PgPool, id: Uuid) -> ApiResult<Staff> {
    Staff::find_by_id(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Staff not found".to_string()))
}

async fn ensure_not_last_admin(pool: &PgPool, staff: &Staff) -> ApiResult<()> {
    if staff.role == StaffRole::Admin && Staff::count_admins(pool).await? <= 1 {
        return Err(ApiError::BadRequest(LAST_ADMIN.to_string()));
    }

    Ok(())
}
