/// Order endpoints
///
/// # Endpoints
///
/// - `POST   /api/orders` - Place an order (customer)
/// - `GET    /api/orders/my-orders` - Caller's orders (any authenticated account)
/// - `GET    /api/orders` - Every order (admin, staff)
/// - `PUT    /api/orders/:id` - Change order/payment status (admin, staff)
/// - `DELETE /api/orders/:id` - Delete (admin)
///
/// Placing an order runs [`checkout::place_order`], which validates stock and
/// decrements it in one transaction.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::ValidJson,
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use gadgethub_shared::{
    auth::{
        authorization::{require_role, ADMIN, ADMIN_OR_STAFF, CUSTOMER},
        middleware::AuthContext,
    },
    checkout::{self, PlaceOrder},
    models::order::{
        Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus, ShippingAddress, StatusUpdate,
    },
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Checkout request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "No order items found"))]
    pub order_items: Vec<OrderItem>,

    pub shipping_address: ShippingAddress,

    /// Defaults to `COD`
    #[serde(default)]
    pub payment_method: PaymentMethod,

    pub total_amount: Decimal,
}

/// Status change request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// `{ message, order }` body for order writes
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub message: String,
    pub order: Order,
}

/// Place an order
///
/// # Endpoint
///
/// ```text
/// POST /api/orders
/// Authorization: Bearer <customer token>
///
/// {
///   "orderItems": [{ "product": "<id>", "name": "Pixel 9", "quantity": 1, "price": 799 }],
///   "shippingAddress": { "address": "1 Main St", "city": "Pune", "state": "MH", "postalCode": "411001" },
///   "paymentMethod": "UPI",
///   "totalAmount": 799
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: No items, invalid quantity or insufficient stock
/// - `403 Forbidden`: Caller is not a customer
/// - `404 Not Found`: A line item names an unknown product
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderResponse>)> {
    require_role(&auth, CUSTOMER)?;

    if req.total_amount.is_sign_negative() && !req.total_amount.is_zero() {
        return Err(ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "totalAmount".to_string(),
            message: "Total amount cannot be negative".to_string(),
        }]));
    }

    let order = checkout::place_order(
        &state.db,
        PlaceOrder {
            customer_id: auth.account_id,
            order_items: req.order_items,
            shipping_address: req.shipping_address,
            payment_method: req.payment_method,
            total_amount: req.total_amount,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            message: "Order placed successfully".to_string(),
            order,
        }),
    ))
}

/// The caller's own orders, newest first
pub async fn my_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(Order::list_by_customer(&state.db, auth.account_id).await?))
}

/// Every order, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Order>>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    Ok(Json(Order::list(&state.db).await?))
}

/// Change an order's status
///
/// Any status may be set from any other. The caller is recorded as
/// `processedBy`.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    let order = Order::update_status(
        &state.db,
        id,
        StatusUpdate {
            order_status: req.order_status,
            payment_status: req.payment_status,
        },
        auth.account_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(
        order_id = %order.id,
        order_status = order.order_status.as_str(),
        processed_by = %auth.account_id,
        "Order status updated"
    );

    Ok(Json(OrderResponse {
        message: "Order updated successfully".to_string(),
        order,
    }))
}

/// Delete an order
///
/// Stock is not restored.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, ADMIN)?;

    if !Order::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }

    tracing::info!(order_id = %id, deleted_by = %auth.account_id, "Order deleted");

    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_defaults_to_cod() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{
                "orderItems": [{"product": "6f1c1d2e-8a4b-4c7e-9d3f-2b1a0c9e8d7f", "name": "Pixel 9", "quantity": 1, "price": 799}],
                "shippingAddress": {"address": "1 Main St", "city": "Pune", "state": "MH", "postalCode": "411001"},
                "totalAmount": 799
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.payment_method, PaymentMethod::Cod);
        assert_eq!(req.shipping_address.country, "India");
        assert_eq!(req.order_items[0].quantity, 1);
    }

    #[test]
    fn test_create_request_without_items_fails_validation() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{
                "shippingAddress": {"address": "1 Main St", "city": "Pune", "state": "MH", "postalCode": "411001"},
                "totalAmount": 0
            }"#,
        )
        .unwrap();

        match ApiError::from(req.validate().unwrap_err()) {
            ApiError::ValidationError(details) => {
                assert_eq!(details[0].field, "order_items");
                assert_eq!(details[0].message, "No order items found");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_request_accepts_partial_body() {
        let req: UpdateOrderRequest =
            serde_json::from_str(r#"{"paymentStatus":"Paid"}"#).unwrap();

        assert_eq!(req.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(req.order_status, None);
    }

    #[test]
    fn test_update_request_rejects_unknown_status() {
        assert!(serde_json::from_str::<UpdateOrderRequest>(r#"{"orderStatus":"Lost"}"#).is_err());
    }
}
