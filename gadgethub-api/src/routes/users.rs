/// Password reset endpoints
///
/// Both endpoints work on either account table: the target ID is looked up
/// among staff first, then customers.
///
/// # Endpoints
///
/// - `PUT /api/users/reset-password/:id` - Change one's own password
/// - `PUT /api/users/admin/reset-password/:id` - Admin sets another account's password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, require_self, ADMIN},
        middleware::AuthContext,
        password,
    },
    models::{customer::Customer, staff::Staff},
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Self-service reset request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub current_password: String,

    #[serde(default)]
    pub new_password: String,
}

/// Admin-assisted reset request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminResetPasswordRequest {
    /// The calling admin's own password
    #[serde(default)]
    pub admin_password: String,

    #[serde(default)]
    pub new_password: String,
}

/// Account a reset applies to
#[derive(Debug)]
enum Target {
    Staff(Staff),
    Customer(Customer),
}

impl Target {
    fn label(&self) -> &'static str {
        match self {
            Target::Staff(_) => "Staff",
            Target::Customer(_) => "Customer",
        }
    }

    fn password_hash(&self) -> &str {
        match self {
            Target::Staff(s) => &s.password_hash,
            Target::Customer(c) => &c.password_hash,
        }
    }

    async fn set_password_hash(&self, pool: &PgPool, hash: &str) -> ApiResult<()> {
        let updated = match self {
            Target::Staff(s) => Staff::set_password_hash(pool, s.id, hash).await?,
            Target::Customer(c) => Customer::set_password_hash(pool, c.id, hash).await?,
        };

        if !updated {
            return Err(ApiError::NotFound("Target user not found".to_string()));
        }

        Ok(())
    }
}

async fn find_target(pool: &PgPool, id: Uuid) -> ApiResult<Option<Target>> {
    if let Some(staff) = Staff::find_by_id(pool, id).await? {
        return Ok(Some(Target::Staff(staff)));
    }

    Ok(Customer::find_by_id(pool, id).await?.map(Target::Customer))
}

fn check_new_password(new_password: &str) -> ApiResult<()> {
    password::validate_password_length(new_password).map_err(ApiError::BadRequest)
}

/// Change the caller's own password
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or new password too short
/// - `401 Unauthorized`: `Current password is incorrect`
/// - `403 Forbidden`: `:id` is not the caller
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_self(&auth, id)?;

    if req.current_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Both current and new passwords are required".to_string(),
        ));
    }
    check_new_password(&req.new_password)?;

    let target = find_target(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Target user not found".to_string()))?;

    if !password::verify_password(&req.current_password, target.password_hash())? {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let hash = password::hash_password(&req.new_password)?;
    target.set_password_hash(&state.db, &hash).await?;

    tracing::info!(account_id = %id, kind = target.label(), "Password changed");

    Ok(Json(MessageResponse::new(format!(
        "{} password changed successfully",
        target.label()
    ))))
}

/// Set another account's password
///
/// The admin re-enters their own password to confirm.
///
/// # Errors
///
/// - `400 Bad Request`: Missing field or new password too short
/// - `401 Unauthorized`: `Admin password is incorrect`
/// - `403 Forbidden`: Caller is not an admin
/// - `404 Not Found`: `Target user not found`
pub async fn admin_reset_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<AdminResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, ADMIN)?;

    if req.admin_password.is_empty() || req.new_password.is_empty() {
        return Err(ApiError::BadRequest(
            "Admin password and new password are required".to_string(),
        ));
    }
    check_new_password(&req.new_password)?;

    let admin = Staff::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Admin password is incorrect".to_string()))?;

    if !password::verify_password(&req.admin_password, &admin.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Admin password is incorrect".to_string(),
        ));
    }

    let target = find_target(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Target user not found".to_string()))?;

    let hash = password::hash_password(&req.new_password)?;
    target.set_password_hash(&state.db, &hash).await?;

    tracing::info!(
        account_id = %id,
        kind = target.label(),
        reset_by = %auth.account_id,
        "Password reset by admin"
    );

    Ok(Json(MessageResponse::new(format!(
        "{} password updated successfully by admin",
        target.label()
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let req: ResetPasswordRequest = serde_json::from_str(r#"{"newPassword":"abcdefgh"}"#).unwrap();
        assert!(req.current_password.is_empty());
        assert_eq!(req.new_password, "abcdefgh");

        let req: AdminResetPasswordRequest = serde_json::from_str("{}").unwrap();
        assert!(req.admin_password.is_empty());
    }

    #[test]
    fn test_new_password_length_only() {
        assert!(check_new_password("abcdefgh").is_ok());
        assert!(check_new_password("        ").is_ok());

        let err = check_new_password("abc").unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Password must be at least 8 characters");
    }
}
