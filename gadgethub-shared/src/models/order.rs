//! Order model and database operations
//!
//! An order stores a snapshot of its line items and shipping address as
//! JSONB, so later catalog edits never change a placed order. Orders are
//! created only through [`crate::checkout::place_order`], which also adjusts
//! stock.
//!
//! # Status fields
//!
//! - `paymentStatus`: `Pending` → `Paid` | `Failed`
//! - `orderStatus`: `Pending` → `Processing` → `Shipped` → `Delivered`, or `Cancelled`
//!
//! Staff may set either field to any value; no transition graph is enforced.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const COLUMNS: &str = "id, customer_id, order_items, shipping_address, payment_method, \
                       payment_status, order_status, total_amount, processed_by, \
                       created_at, updated_at";

/// How the customer intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method")]
pub enum PaymentMethod {
    #[default]
    #[sqlx(rename = "COD")]
    #[serde(rename = "COD")]
    Cod,

    #[sqlx(rename = "Credit Card")]
    #[serde(rename = "Credit Card")]
    CreditCard,

    #[sqlx(rename = "Debit Card")]
    #[serde(rename = "Debit Card")]
    DebitCard,

    #[sqlx(rename = "UPI")]
    #[serde(rename = "UPI")]
    Upi,

    #[sqlx(rename = "Net Banking")]
    #[serde(rename = "Net Banking")]
    NetBanking,
}

/// Payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

/// Fulfilment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Delivered and Cancelled orders need no further handling
    pub fn is_closed(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Line item snapshot taken at checkout
///
/// `name` and `price` are what the client sent; they are stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product ID
    pub product: Uuid,

    pub name: String,

    pub quantity: i32,

    pub price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn default_country() -> String {
    "India".to_string()
}

/// Delivery address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,

    #[serde(default = "default_country")]
    pub country: String,
}

/// Placed order
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Customer who placed the order
    #[serde(rename = "customer")]
    pub customer_id: Uuid,

    pub order_items: Json<Vec<OrderItem>>,

    pub shipping_address: Json<ShippingAddress>,

    pub payment_method: PaymentMethod,

    pub payment_status: PaymentStatus,

    pub order_status: OrderStatus,

    /// Client-declared total, not recomputed
    pub total_amount: Decimal,

    /// Staff account that last changed a status
    pub processed_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting an order
///
/// Both statuses always start at `Pending`.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_amount: Decimal,
}

/// Status change requested by staff
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusUpdate {
    pub order_status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl Order {
    /// Inserts an order with `Pending` payment and order status
    ///
    /// Takes any executor so checkout can run it inside its transaction.
    pub async fn insert<'e, E>(executor: E, data: NewOrder) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO orders \
             (customer_id, order_items, shipping_address, payment_method, \
              payment_status, order_status, total_amount) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(data.customer_id)
            .bind(Json(data.order_items))
            .bind(Json(data.shipping_address))
            .bind(data.payment_method)
            .bind(PaymentStatus::Pending)
            .bind(OrderStatus::Pending)
            .bind(data.total_amount)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM orders WHERE id = $1", COLUMNS);

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Orders placed by one customer, newest first
    pub async fn list_by_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY created_at DESC",
            COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Every order, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {} FROM orders ORDER BY created_at DESC", COLUMNS);

        sqlx::query_as::<_, Order>(&query).fetch_all(pool).await
    }

    /// Overwrites the given statuses and stamps `processed_by`
    ///
    /// Absent fields keep their current value. `processed_by` is stamped even
    /// when neither status is present.
    ///
    /// # Returns
    ///
    /// The updated order, or `None` if it doesn't exist
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        update: StatusUpdate,
        processed_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE orders SET \
                order_status = COALESCE($2, order_status), \
                payment_status = COALESCE($3, payment_status), \
                processed_by = $4, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            COLUMNS
        );

        sqlx::query_as::<_, Order>(&query)
            .bind(id)
            .bind(update.order_status)
            .bind(update.payment_status)
            .bind(processed_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CreditCard).unwrap(),
            "\"Credit Card\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"Net Banking\"").unwrap(),
            PaymentMethod::NetBanking
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"COD\"").unwrap(),
            PaymentMethod::Cod
        );
        assert!(serde_json::from_str::<PaymentMethod>("\"Bitcoin\"").is_err());
    }

    #[test]
    fn test_status_defaults_are_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
    }

    #[test]
    fn test_order_status_closed() {
        let open: Vec<_> = OrderStatus::ALL.iter().filter(|s| !s.is_closed()).collect();
        assert_eq!(
            open,
            vec![&OrderStatus::Pending, &OrderStatus::Processing, &OrderStatus::Shipped]
        );
    }

    #[test]
    fn test_shipping_address_country_defaults_to_india() {
        let address: ShippingAddress = serde_json::from_value(json!({
            "address": "12 MG Road",
            "city": "Pune",
            "state": "MH",
            "postalCode": "411001"
        }))
        .unwrap();

        assert_eq!(address.country, "India");
    }

    #[test]
    fn test_order_item_from_client_json() {
        let product = Uuid::new_v4();
        let item: OrderItem = serde_json::from_value(json!({
            "product": product,
            "name": "Pixel 9",
            "quantity": 2,
            "price": 799
        }))
        .unwrap();

        assert_eq!(item.product, product);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, Decimal::new(799, 0));
        assert!(item.image_url.is_none());
    }

    #[test]
    fn test_order_wire_format() {
        let customer = Uuid::new_v4();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: customer,
            order_items: Json(vec![]),
            shipping_address: Json(ShippingAddress {
                address: "1 Main".to_string(),
                city: "Delhi".to_string(),
                state: "DL".to_string(),
                postal_code: "110001".to_string(),
                country: "India".to_string(),
            }),
            payment_method: PaymentMethod::Upi,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            total_amount: Decimal::new(100, 0),
            processed_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customer"], customer.to_string());
        assert_eq!(json["paymentMethod"], "UPI");
        assert_eq!(json["orderStatus"], "Pending");
        assert_eq!(json["shippingAddress"]["postalCode"], "110001");
        assert!(json["orderItems"].as_array().unwrap().is_empty());
    }
}
