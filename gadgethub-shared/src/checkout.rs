//! Order placement with stock reservation
//!
//! Checkout validates a cart against current stock, inserts the order and
//! decrements stock, all inside one transaction:
//!
//! 1. Lock every referenced product row (`SELECT ... FOR UPDATE`, ordered by
//!    ID so concurrent checkouts always lock in the same order)
//! 2. Walk the line items in request order against the locked stock levels,
//!    counting earlier lines for the same product
//! 3. Insert the order with `Pending` payment and order status
//! 4. Decrement each product with a conditional `UPDATE ... WHERE stock >= n`
//!
//! Any failure drops the transaction, which rolls everything back. A second
//! checkout racing for the same product blocks on the row lock and then sees
//! the reduced stock.
//!
//! # Example
//!
//! ```no_run
//! use gadgethub_shared::checkout::{place_order, PlaceOrder};
//! use gadgethub_shared::models::order::{OrderItem, PaymentMethod, ShippingAddress};
//! use rust_decimal::Decimal;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, customer_id: Uuid, product: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let order = place_order(&pool, PlaceOrder {
//!     customer_id,
//!     order_items: vec![OrderItem {
//!         product,
//!         name: "Pixel 9".to_string(),
//!         quantity: 1,
//!         price: Decimal::new(79999, 2),
//!         image_url: None,
//!     }],
//!     shipping_address: ShippingAddress {
//!         address: "12 MG Road".to_string(),
//!         city: "Pune".to_string(),
//!         state: "MH".to_string(),
//!         postal_code: "411001".to_string(),
//!         country: "India".to_string(),
//!     },
//!     payment_method: PaymentMethod::Upi,
//!     total_amount: Decimal::new(79999, 2),
//! }).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::order::{NewOrder, Order, OrderItem, PaymentMethod, ShippingAddress};

/// Error type for checkout
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The cart has no line items
    #[error("No order items found")]
    EmptyOrder,

    /// A line item references a product that doesn't exist
    #[error("Product not found: {name}")]
    ProductNotFound { name: String },

    /// A line item asks for zero or a negative quantity
    #[error("Invalid quantity for {name}")]
    InvalidQuantity { name: String },

    /// Not enough stock left for a line item
    #[error("Insufficient stock for {name}")]
    InsufficientStock { name: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checkout request
///
/// `customer_id` comes from the authenticated caller, never from the body.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
}

/// Checks line items against available stock
///
/// Items are checked in order and the first failing item is reported, named
/// by its client-supplied name. Stock consumed by earlier items for the same
/// product is taken into account.
///
/// # Returns
///
/// Total quantity to take from each product, keyed by product ID
pub fn reserve_stock(
    items: &[OrderItem],
    available: &HashMap<Uuid, i32>,
) -> Result<BTreeMap<Uuid, i32>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let mut reserved: BTreeMap<Uuid, i32> = BTreeMap::new();

    for item in items {
        let stock = *available
            .get(&item.product)
            .ok_or_else(|| CheckoutError::ProductNotFound {
                name: item.name.clone(),
            })?;

        if item.quantity < 1 {
            return Err(CheckoutError::InvalidQuantity {
                name: item.name.clone(),
            });
        }

        let already = reserved.get(&item.product).copied().unwrap_or(0);
        let remaining = stock - already;
        if remaining < item.quantity {
            return Err(CheckoutError::InsufficientStock {
                name: item.name.clone(),
            });
        }

        reserved.insert(item.product, already + item.quantity);
    }

    Ok(reserved)
}

/// Places an order and adjusts stock atomically
///
/// # Errors
///
/// - `EmptyOrder`, `ProductNotFound`, `InvalidQuantity`, `InsufficientStock`
///   for a cart that can't be fulfilled; nothing is written
/// - `Database` for anything else; the transaction is rolled back
pub async fn place_order(pool: &PgPool, request: PlaceOrder) -> Result<Order, CheckoutError> {
    if request.order_items.is_empty() {
        return Err(CheckoutError::EmptyOrder);
    }

    let mut product_ids: Vec<Uuid> = request.order_items.iter().map(|i| i.product).collect();
    product_ids.sort();
    product_ids.dedup();

    let mut tx = pool.begin().await?;

    let rows: Vec<(Uuid, i32)> = sqlx::query_as(
        r#"
        SELECT id, stock FROM products
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&product_ids[..])
    .fetch_all(&mut *tx)
    .await?;

    let available: HashMap<Uuid, i32> = rows.into_iter().collect();
    let reserved = reserve_stock(&request.order_items, &available)?;

    debug!(
        customer_id = %request.customer_id,
        products = reserved.len(),
        "Stock reserved"
    );

    let order = Order::insert(
        &mut *tx,
        NewOrder {
            customer_id: request.customer_id,
            order_items: request.order_items.clone(),
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            total_amount: request.total_amount,
        },
    )
    .await?;

    for (product_id, quantity) in &reserved {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Only reachable if the row changed despite the lock
            let name = request
                .order_items
                .iter()
                .find(|i| i.product == *product_id)
                .map(|i| i.name.clone())
                .unwrap_or_default();
            return Err(CheckoutError::InsufficientStock { name });
        }
    }

    tx.commit().await?;

    info!(
        order_id = %order.id,
        customer_id = %order.customer_id,
        items = order.order_items.len(),
        "Order placed"
    );

    Ok(order)
}
