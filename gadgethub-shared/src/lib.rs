//! # SmartGadgets Hub Shared Library
//!
//! This crate contains the domain types, persistence and business logic used
//! by the SmartGadgets Hub API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Authentication and authorization utilities
//! - `db`: Connection pool, migrations and start-up bootstrap
//! - `checkout`: Order placement with stock reservation
//! - `stats`: Dashboard aggregates for admin and staff

pub mod auth;
pub mod checkout;
pub mod db;
pub mod models;
pub mod stats;

/// Current version of the SmartGadgets Hub shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
