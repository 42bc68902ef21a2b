//! # SmartGadgets Hub API Server Library
//!
//! This library provides the HTTP layer of the SmartGadgets Hub backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validated JSON body extractor
//! - `middleware`: Access log and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
