//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `basalt_storefront`
//!
//! The dynamic product data engine is read-only over these tables:
//!
//! ## Tables
//!
//! - `prices` - Catalog base prices with validity windows
//! - `buyer_organizations` - Buyer membership in purchasing organizations
//! - `organization_prices` - Negotiated organization price overrides
//! - `warehouses` / `city_warehouses` - Warehouses and their city mapping
//! - `stock_balances` - On-hand and reserved quantities per warehouse
//! - `cities` - Cutoff time, base lead-days, and timezone per city
//! - `delivery_schedules` - Weekly or explicit-date delivery calendars

mod catalog;

pub use catalog::PgCatalog;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
