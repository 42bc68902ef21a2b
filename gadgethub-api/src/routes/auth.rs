/// Authentication endpoints
///
/// Customers and staff log in through separate endpoints because they live in
/// separate account tables. Both issue the same kind of token: an HS256 JWT
/// whose claims carry the account ID, display name and role.
///
/// # Endpoints
///
/// - `POST /api/auth/customer/login` - Customer login
/// - `GET  /api/auth/customer/profile` - Caller's customer account
/// - `POST /api/auth/staff/login` - Staff or admin login
/// - `GET  /api/auth/staff/profile` - Caller's staff account
///
/// Unknown email and wrong password produce the same 401 response.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
};
use axum::{extract::State, Extension, Json};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, ADMIN_OR_STAFF, CUSTOMER},
        jwt::{self, Claims},
        middleware::AuthContext,
        password, Role,
    },
    models::{customer::Customer, staff::Staff},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide email and password"))]
    pub password: String,
}

/// Customer login/registration response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSession {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub token: String,
}

/// Staff login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSession {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// Signs a token for an account
pub(crate) fn issue_token(
    state: &AppState,
    account_id: Uuid,
    name: &str,
    role: Role,
) -> ApiResult<String> {
    let claims = Claims::with_expiration(account_id, name, role, state.token_lifetime());
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}

impl CustomerSession {
    pub(crate) fn issue(state: &AppState, customer: Customer) -> ApiResult<Self> {
        let token = issue_token(state, customer.id, &customer.name, Role::Customer)?;

        Ok(Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            role: Role::Customer,
            token,
        })
    }
}

/// Checks a password against a stored hash; `None` means the account wasn't found
///
/// Both failure cases return the same error.
fn check_credentials(password: &str, stored_hash: Option<&str>) -> ApiResult<()> {
    let Some(hash) = stored_hash else {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(password, hash)? {
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    Ok(())
}

/// Customer login
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/customer/login
/// Content-Type: application/json
///
/// { "email": "jane@example.com", "password": "secret123" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Invalid credentials
pub async fn customer_login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<CustomerSession>> {
    let customer = Customer::find_by_email(&state.db, &req.email).await?;
    check_credentials(&req.password, customer.as_ref().map(|c| c.password_hash.as_str()))?;

    let customer = customer.ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    tracing::info!(customer_id = %customer.id, "Customer logged in");

    Ok(Json(CustomerSession::issue(&state, customer)?))
}

/// Staff login
///
/// The token's role claim is the account's stored role (`admin` or `staff`)
/// at login time.
pub async fn staff_login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<StaffSession>> {
    let staff = Staff::find_by_email(&state.db, &req.email).await?;
    check_credentials(&req.password, staff.as_ref().map(|s| s.password_hash.as_str()))?;

    let staff = staff.ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;
    let role = Role::from(staff.role);
    let token = issue_token(&state, staff.id, &staff.name, role)?;

    tracing::info!(staff_id = %staff.id, role = %role, "Staff logged in");

    Ok(Json(StaffSession {
        id: staff.id,
        name: staff.name,
        email: staff.email,
        role,
        token,
    }))
}

/// The authenticated customer's own account
pub async fn customer_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Customer>> {
    require_role(&auth, CUSTOMER)?;

    let customer = Customer::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer))
}

/// The authenticated staff member's own account
pub async fn staff_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Staff>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    let staff = Staff::find_by_id(&state.db, auth.account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Staff not found".to_string()))?;

    Ok(Json(staff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_account_and_wrong_password_look_identical() {
        let hash = password::hash_password("correct-horse").unwrap();

        let unknown = check_credentials("whatever", None).unwrap_err();
        let wrong = check_credentials("battery-staple", Some(&hash)).unwrap_err();

        assert_eq!(unknown.status_code(), wrong.status_code());
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(wrong.to_string(), "Unauthorized: Invalid email or password");

        assert!(check_credentials("correct-horse", Some(&hash)).is_ok());
    }

    #[test]
    fn test_login_request_requires_both_fields() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@example.com"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@example.com","password":"pw"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_session_wire_format() {
        let session = StaffSession {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role: Role::Admin,
            token: "t".to_string(),
        };

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["_id"], session.id.to_string());
        assert_eq!(json["role"], "admin");
        assert_eq!(json["token"], "t");
    }
}
