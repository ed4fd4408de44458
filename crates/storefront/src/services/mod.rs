//! Business logic services for storefront.
//!
//! # Services
//!
//! - `dynamic_data` - Per-batch price, stock, and delivery aggregation with
//!   fingerprint caching

pub mod dynamic_data;
