/// Product catalog endpoints
///
/// # Endpoints
///
/// - `GET    /api/products` - Whole catalog, newest first (public)
/// - `GET    /api/products/meta` - Distinct brands and categories (public)
/// - `GET    /api/products/:id` - One product (public)
/// - `GET    /api/products/category/:category` - Case-insensitive category match (public)
/// - `GET    /api/products/brand/:brand` - Case-insensitive brand match (public)
/// - `POST   /api/products` - Create (admin)
/// - `PUT    /api/products/:id` - Update (admin, staff)
/// - `DELETE /api/products/:id` - Delete (admin)

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
        authorization::{require_role, ADMIN, ADMIN_OR_STAFF},
        middleware::AuthContext,
    },
    models::product::{CatalogMeta, CreateProduct, Product, UpdateProduct},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Create request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(length(max = 255, message = "Brand must be at most 255 characters"))]
    pub brand: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Category is required"))]
    pub category: String,

    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,

    #[validate(length(min = 1, max = 1024, message = "Image URL cannot be empty"))]
    pub image_url: Option<String>,
}

/// Update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name cannot be empty"))]
    pub name: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 255, message = "Brand must be at most 255 characters"))]
    pub brand: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Category cannot be empty"))]
    pub category: Option<String>,

    pub price: Option<Decimal>,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,

    #[validate(length(min = 1, max = 1024, message = "Image URL cannot be empty"))]
    pub image_url: Option<String>,
}

fn price_error(message: &str) -> ApiError {
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: "price".to_string(),
        message: message.to_string(),
    }])
}

/// Rejects negative prices
fn check_price(price: Decimal) -> ApiResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(price_error("Price cannot be negative"));
    }

    Ok(price)
}

/// List the whole catalog
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(Product::list(&state.db).await?))
}

/// Distinct non-empty brands and categories, sorted
///
/// An empty catalog yields `{ "brands": [], "categories": [] }`.
pub async fn meta(State(state): State<AppState>) -> ApiResult<Json<CatalogMeta>> {
    Ok(Json(Product::meta(&state.db).await?))
}

/// Fetch one product
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Product>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Products whose category contains the path segment
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::list_by_category(&state.db, &category).await?;

    if products.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No products found in '{}' category",
            category
        )));
    }

    Ok(Json(products))
}

/// Products whose brand contains the path segment
pub async fn by_brand(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = Product::list_by_brand(&state.db, &brand).await?;

    if products.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No products found for brand '{}'",
            brand
        )));
    }

    Ok(Json(products))
}

/// Create a product
///
/// `createdBy` is the calling admin. Stock defaults to 0 and the image to a
/// placeholder.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    require_role(&auth, ADMIN)?;

    let price = req
        .price
        .ok_or_else(|| price_error("Price is required"))
        .and_then(check_price)?;

    let product = Product::create(
        &state.db,
        CreateProduct {
            name: req.name,
            description: req.description,
            brand: req.brand,
            category: req.category,
            price,
            stock: req.stock,
            image_url: req.image_url,
            created_by: Some(auth.account_id),
        },
    )
    .await?;

    tracing::info!(product_id = %product.id, created_by = %auth.account_id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Update a product
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    require_role(&auth, ADMIN_OR_STAFF)?;

    let price = req.price.map(check_price).transpose()?;

    let product = Product::update(
        &state.db,
        id,
        UpdateProduct {
            name: req.name,
            description: req.description,
            brand: req.brand,
            category: req.category,
            price,
            stock: req.stock,
            image_url: req.image_url,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(product))
}

/// Delete a product
///
/// Placed orders keep their line item snapshots.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, ADMIN)?;

    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = %id, deleted_by = %auth.account_id, "Product deleted");

    Ok(Json(MessageResponse::new("Product deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_price() {
        assert!(check_price(Decimal::new(79999, 2)).is_ok());
        assert!(check_price(Decimal::ZERO).is_ok());
        assert!(check_price(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_create_request_wire_names() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Pixel 9","category":"Phones","price":799,"stock":5,"imageUrl":"https://img.example.com/p9.png"}"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.price, Some(Decimal::new(799, 0)));
        assert_eq!(req.image_url.as_deref(), Some("https://img.example.com/p9.png"));
    }

    #[test]
    fn test_create_request_rejects_negative_stock() {
        let req: CreateProductRequest = serde_json::from_str(
            r#"{"name":"Pixel 9","category":"Phones","price":799,"stock":-1}"#,
        )
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock"));
    }

    #[test]
    fn test_update_request_empty_is_valid() {
        assert!(UpdateProductRequest::default().validate().is_ok());
    }
}
