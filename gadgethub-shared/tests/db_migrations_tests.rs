/// Integration tests for database migrations and start-up bootstrap
///
/// These tests require a running PostgreSQL database.
/// Run with: cargo test --test db_migrations_tests -- --ignored --test-threads=1

mod common;

use common::{migrated_pool, unique_email};
use gadgethub_shared::auth::password::{hash_password, verify_password};
use gadgethub_shared::db::bootstrap::{ensure_default_admin, AdminBootstrap};
use gadgethub_shared::db::migrations::run_migrations;
use gadgethub_shared::db::pool::close_pool;
use gadgethub_shared::models::staff::{CreateStaff, Staff, StaffRole};

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_migrations_are_idempotent() {
    let pool = migrated_pool().await;

    let result = run_migrations(&pool).await;
    assert!(result.is_ok(), "Second run failed: {:?}", result.err());

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_migration_creates_all_tables() {
    let pool = migrated_pool().await;

    for table in ["customers", "staff", "products", "orders", "access_logs"] {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .expect("Query failed");

        assert!(exists, "Table {} should exist", table);
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_stock_cannot_go_negative() {
    let pool = migrated_pool().await;
    let product = common::create_product(&pool, "Constraint Probe", 1).await;

    let result = sqlx::query("UPDATE products SET stock = -1 WHERE id = $1")
        .bind(product.id)
        .execute(&pool)
        .await;

    let err = result.expect_err("negative stock must be rejected");
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("products_stock_non_negative"));

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_default_admin_bootstrap_is_idempotent() {
    let pool = migrated_pool().await;

    let email = unique_email("admin");
    let first = ensure_default_admin(&pool, &email, "Admin@123")
        .await
        .expect("Bootstrap failed");
    let second = ensure_default_admin(&pool, &email, "Admin@123")
        .await
        .expect("Bootstrap failed");

    // Whatever the first run did, the second never adds another admin
    assert_eq!(second, AdminBootstrap::Skipped);
    assert!(Staff::count_admins(&pool).await.unwrap() >= 1);

    if let AdminBootstrap::Created { email: created } = first {
        let admin = Staff::find_by_email(&pool, &created).await.unwrap().unwrap();
        assert_eq!(admin.role, StaffRole::Admin);
        assert_eq!(admin.name, "System Administrator");
        assert!(verify_password("Admin@123", &admin.password_hash).unwrap());
    }

    close_pool(pool).await;
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL database"]
async fn test_staff_email_is_unique_case_insensitively() {
    let pool = migrated_pool().await;
    let email = unique_email("staff");
    let hash = hash_password("password123").unwrap();

    Staff::create(
        &pool,
        CreateStaff {
            name: "First".to_string(),
            email: email.clone(),
            password_hash: hash.clone(),
            role: StaffRole::Staff,
        },
    )
    .await
    .expect("First insert failed");

    let duplicate = Staff::create(
        &pool,
        CreateStaff {
            name: "Second".to_string(),
            email: email.to_uppercase(),
            password_hash: hash,
            role: StaffRole::Staff,
        },
    )
    .await;

    let err = duplicate.expect_err("duplicate email must be rejected");
    assert_eq!(
        err.as_database_error().and_then(|e| e.code()).as_deref(),
        Some("23505")
    );

    close_pool(pool).await;
}
