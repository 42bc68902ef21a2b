//! Dashboard aggregates for admin and staff
//!
//! Both dashboards are read-only snapshots computed on request. Sales
//! figures only count orders whose payment status is `Paid`, and every time
//! window is computed in UTC.
//!
//! The window helpers ([`month_window`], [`day_window`]) are pure so the
//! zero-filling and labelling can be tested without a database.

use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::models::{customer::Customer, order::Order, order::OrderStatus, product::Product};
use crate::models::staff::Staff;

/// Number of months in the admin sales chart, current month included
pub const SALES_MONTHS: u32 = 7;

/// Number of days in the staff sales chart, today included
pub const SALES_DAYS: u64 = 7;

/// Error type for dashboard queries
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Headline numbers on the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_orders: i64,
    /// Sum of `totalAmount` over paid orders
    pub total_sales: Decimal,
    pub total_products: i64,
    pub total_staff: i64,
}

/// Paid sales for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// Short month name, e.g. `Jan`
    pub month: String,
    pub sales: Decimal,
}

/// Number of orders in one status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Admin dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: AdminStats,
    pub sales_data: Vec<MonthlySales>,
    pub orders_data: Vec<StatusCount>,
}

/// Headline numbers on the staff dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffStats {
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_products: i64,
    /// Orders neither Delivered nor Cancelled
    pub pending_orders: i64,
}

/// Stock level of one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockLevel {
    pub name: String,
    pub stock: i32,
}

/// Paid orders placed on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyOrders {
    /// Short weekday name, e.g. `Mon`
    pub day: String,
    pub orders: i64,
}

/// Staff dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffDashboard {
    pub stats: StaffStats,
    pub stock_data: Vec<StockLevel>,
    pub sales_data: Vec<DailyOrders>,
}

/// First day of each month in the sales window, oldest first
pub fn month_window(today: NaiveDate) -> Vec<NaiveDate> {
    let current = today.with_day(1).unwrap_or(today);

    (0..SALES_MONTHS)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect()
}

/// Each day in the order window, oldest first
pub fn day_window(today: NaiveDate) -> Vec<NaiveDate> {
    (0..SALES_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}

/// Labels the month window and fills months without sales with zero
pub fn fill_monthly_sales(
    window: &[NaiveDate],
    totals: &HashMap<(i32, u32), Decimal>,
) -> Vec<MonthlySales> {
    window
        .iter()
        .map(|first| MonthlySales {
            month: first.format("%b").to_string(),
            sales: totals
                .get(&(first.year(), first.month()))
                .copied()
                .unwrap_or(Decimal::ZERO),
        })
        .collect()
}

/// Labels the day window and fills days without orders with zero
pub fn fill_daily_orders(window: &[NaiveDate], counts: &HashMap<NaiveDate, i64>) -> Vec<DailyOrders> {
    window
        .iter()
        .map(|day| DailyOrders {
            day: day.format("%a").to_string(),
            orders: counts.get(day).copied().unwrap_or(0),
        })
        .collect()
}

/// Counts for every status in lifecycle order, zero when absent
pub fn fill_status_counts(counts: &HashMap<OrderStatus, i64>) -> Vec<StatusCount> {
    OrderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            status: *status,
            count: counts.get(status).copied().unwrap_or(0),
        })
        .collect()
}

/// Computes the admin dashboard
pub async fn admin_dashboard(pool: &PgPool) -> Result<AdminDashboard, StatsError> {
    let total_orders = Order::count(pool).await?;
    let total_products = Product::count(pool).await?;
    let total_staff = Staff::count(pool).await?;

    let (total_sales,): (Option<Decimal>,) =
        sqlx::query_as("SELECT SUM(total_amount) FROM orders WHERE payment_status = 'Paid'")
            .fetch_one(pool)
            .await?;

    let status_rows: Vec<(OrderStatus, i64)> =
        sqlx::query_as("SELECT order_status, COUNT(*) FROM orders GROUP BY order_status")
            .fetch_all(pool)
            .await?;

    let window = month_window(Utc::now().date_naive());
    let window_start = window
        .first()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    let sales_rows: Vec<(i32, i32, Option<Decimal>)> = sqlx::query_as(
        r#"
        SELECT EXTRACT(YEAR FROM created_at AT TIME ZONE 'UTC')::int,
               EXTRACT(MONTH FROM created_at AT TIME ZONE 'UTC')::int,
               SUM(total_amount)
        FROM orders
        WHERE payment_status = 'Paid' AND created_at >= $1
        GROUP BY 1, 2
        "#,
    )
    .bind(window_start)
    .fetch_all(pool)
    .await?;

    let totals: HashMap<(i32, u32), Decimal> = sales_rows
        .into_iter()
        .map(|(year, month, sum)| ((year, month as u32), sum.unwrap_or(Decimal::ZERO)))
        .collect();

    Ok(AdminDashboard {
        stats: AdminStats {
            total_orders,
            total_sales: total_sales.unwrap_or(Decimal::ZERO),
            total_products,
            total_staff,
        },
        sales_data: fill_monthly_sales(&window, &totals),
        orders_data: fill_status_counts(&status_rows.into_iter().collect()),
    })
}

/// Computes the staff dashboard
pub async fn staff_dashboard(pool: &PgPool) -> Result<StaffDashboard, StatsError> {
    let total_orders = Order::count(pool).await?;
    let total_products = Product::count(pool).await?;
    let total_customers = Customer::count(pool).await?;

    let (pending_orders,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM orders WHERE order_status NOT IN ('Delivered', 'Cancelled')",
    )
    .fetch_one(pool)
    .await?;

    let stock_data: Vec<StockLevel> =
        sqlx::query_as("SELECT name, stock FROM products ORDER BY created_at")
            .fetch_all(pool)
            .await?;

    let window = day_window(Utc::now().date_naive());
    let window_start = window
        .first()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);

    let day_rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
        r#"
        SELECT (created_at AT TIME ZONE 'UTC')::date, COUNT(*)
        FROM orders
        WHERE payment_status = 'Paid' AND created_at >= $1
        GROUP BY 1
        "#,
    )
    .bind(window_start)
    .fetch_all(pool)
    .await?;

    Ok(StaffDashboard {
        stats: StaffStats {
            total_orders,
            total_customers,
            total_products,
            pending_orders,
        },
        stock_data,
        sales_data: fill_daily_orders(&window, &day_rows.into_iter().collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_window_crosses_year() {
        let window = month_window(date(2025, 2, 17));

        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), Some(&date(2024, 8, 1)));
        assert_eq!(window.last(), Some(&date(2025, 2, 1)));
    }

    #[test]
    fn test_day_window_ends_today() {
        let window = day_window(date(2025, 3, 2));

        assert_eq!(window.len(), 7);
        assert_eq!(window.first(), Some(&date(2025, 2, 24)));
        assert_eq!(window.last(), Some(&date(2025, 3, 2)));
    }

    #[test]
    fn test_fill_monthly_sales_labels_and_zero_fill() {
        let window = month_window(date(2025, 2, 17));
        let totals = HashMap::from([
            ((2024, 12), Decimal::new(1500, 0)),
            ((2025, 2), Decimal::new(25050, 2)),
            // outside the window
            ((2024, 1), Decimal::new(9, 0)),
        ]);

        let sales = fill_monthly_sales(&window, &totals);
        let months: Vec<&str> = sales.iter().map(|s| s.month.as_str()).collect();

        assert_eq!(months, vec!["Aug", "Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);
        assert_eq!(sales[4].sales, Decimal::new(1500, 0));
        assert_eq!(sales[6].sales, Decimal::new(25050, 2));
        assert_eq!(sales[0].sales, Decimal::ZERO);
    }

    #[test]
    fn test_fill_daily_orders_labels() {
        // 2025-03-02 is a Sunday
        let window = day_window(date(2025, 3, 2));
        let counts = HashMap::from([(date(2025, 3, 1), 4)]);

        let days = fill_daily_orders(&window, &counts);
        let labels: Vec<&str> = days.iter().map(|d| d.day.as_str()).collect();

        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(days[5].orders, 4);
        assert_eq!(days[6].orders, 0);
    }

    #[test]
    fn test_fill_status_counts_in_lifecycle_order() {
        let counts = HashMap::from([(OrderStatus::Delivered, 3), (OrderStatus::Pending, 1)]);
        let filled = fill_status_counts(&counts);

        let json = serde_json::to_value(&filled).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "status": "Pending", "count": 1 },
                { "status": "Processing", "count": 0 },
                { "status": "Shipped", "count": 0 },
                { "status": "Delivered", "count": 3 },
                { "status": "Cancelled", "count": 0 }
            ])
        );
    }

    #[test]
    fn test_admin_dashboard_wire_format() {
        let dashboard = AdminDashboard {
            stats: AdminStats {
                total_orders: 2,
                total_sales: Decimal::new(150, 0),
                total_products: 3,
                total_staff: 1,
            },
            sales_data: vec![],
            orders_data: vec![],
        };

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["stats"]["totalOrders"], 2);
        assert_eq!(json["stats"]["totalSales"], 150.0);
        assert!(json["salesData"].is_array());
        assert!(json["ordersData"].is_array());
    }
}
