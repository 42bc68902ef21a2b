/// Customer account endpoints
///
/// # Endpoints
///
/// - `POST   /api/customers` - Register (public)
/// - `GET    /api/customers` - List all customers (admin, staff)
/// - `GET    /api/customers/:id` - One customer (self, admin, staff)
/// - `PUT    /api/customers/:id` - Update (self, admin, staff)
/// - `DELETE /api/customers/:id` - Delete (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
    routes::{auth::CustomerSession, MessageResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, require_self_or_role, ADMIN, ADMIN_OR_STAFF},
        middleware::AuthContext,
        password,
    },
    models::customer::{CreateCustomer, Customer, UpdateCustomer},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterCustomerRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub phone: Option<String>,

    pub address: Option<String>,
}

/// Update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(min = 1, max = 255, message = "Name cannot be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    pub phone: Option<String>,

    pub address: Option<String>,
}

/// Register a new customer
///
/// # Response
///
/// `201 Created` with the account and a token, so the client is logged in
/// straight away.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or `Customer already exists`
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterCustomerRequest>,
) -> ApiResult<(StatusCode, Json<CustomerSession>)> {
    if Customer::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("Customer already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let customer = Customer::create(
        &state.db,
        CreateCustomer {
            name: req.name,
            email: req.email,
            password_hash,
            phone: req.phone,
            address: req.address,
        },
    )
    .await?;

    tracing::info!(customer_id = %customer.id, "Customer registered");

    Ok((
        StatusCode::CREATED,
        Json(CustomerSession::issue(&state, customer)?),
    ))
}

/// List every customer
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Customer>>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    Ok(Json(Customer::list(&state.db).await?))
}

/// Fetch one customer
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Customer>> {
    require_self_or_role(&auth, id, ADMIN_OR_STAFF)?;

    let customer = Customer::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer))
}

/// Update a customer
///
/// A new `password` is hashed before storing.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateCustomerRequest>,
) -> ApiResult<Json<Customer>> {
    require_self_or_role(&auth, id, ADMIN_OR_STAFF)?;

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let customer = Customer::update(
        &state.db,
        id,
        UpdateCustomer {
            name: req.name,
            email: req.email,
            password_hash,
            phone: req.phone,
            address: req.address,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(customer))
}

/// Delete a customer
///
/// # Errors
///
/// - `400 Bad Request`: The customer still has orders
/// - `404 Not Found`: No such customer
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, ADMIN)?;

    if !Customer::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    tracing::info!(customer_id = %id, deleted_by = %auth.account_id, "Customer deleted");

    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req: RegisterCustomerRequest = serde_json::from_str(
            r#"{"name":"Jane","email":"jane@example.com","password":"12345678"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let req: RegisterCustomerRequest =
            serde_json::from_str(r#"{"email":"jane@example.com","password":"1234567"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_update_request_only_validates_present_fields() {
        assert!(UpdateCustomerRequest::default().validate().is_ok());

        let req = UpdateCustomerRequest {
            password: Some("short".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
