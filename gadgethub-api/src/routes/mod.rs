/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Customer and staff login, own profile
/// - `customers`: Customer registration and management
/// - `staff`: Staff account management
/// - `products`: Catalog browsing and management
/// - `orders`: Checkout and order management
/// - `users`: Password resets
/// - `stats`: Admin and staff dashboards
/// - `logs`: Access log listing

pub mod auth;
pub mod customers;
pub mod health;
pub mod logs;
pub mod orders;
pub mod products;
pub mod staff;
pub mod stats;
pub mod users;

use axum::extract::OriginalUri;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// `{ "message": ... }` body for operations with nothing else to return
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::NotFound(format!("Not Found - {}", uri))
}
