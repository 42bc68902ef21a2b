//! Database models for SmartGadgets Hub
//!
//! This module contains all database models and their CRUD operations.
//!
//! # Models
//!
//! - `customer`: Shopper accounts
//! - `staff`: Admin and staff accounts
//! - `product`: Catalog entries with a stock counter
//! - `order`: Placed orders with line item snapshots
//! - `access_log`: Append-only per-request log
//!
//! All models serialize with camelCase field names and `_id` as the identity key.

pub mod access_log;
pub mod customer;
pub mod order;
pub mod product;
pub mod staff;

/// Escapes `%`, `_` and `\` so user input matches literally inside a LIKE pattern
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Wraps user input as a `%substring%` pattern
pub(crate) fn contains_pattern(input: &str) -> String {
    format!("%{}%", escape_like(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("apple"), "apple");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_contains_pattern() {
        assert_eq!(contains_pattern("sam"), "%sam%");
        assert_eq!(contains_pattern("%"), "%\\%%");
    }
}
