//! Row types returned by the catalog data source.
//!
//! These are the raw shapes the batched queries produce, one struct per data
//! source. The resolvers in `services::dynamic_data` fold them into the
//! aggregate value types from `basalt-core`.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use sqlx::FromRow;

use basalt_core::{ProductId, WarehouseId};

/// A currently-valid base price row, ordered most-recent `valid_from` first.
#[derive(Debug, Clone, FromRow)]
pub struct BasePriceRow {
    pub product_id: ProductId,
    pub price: Decimal,
}

/// A currently-valid organization override price row, ordered most-recent
/// `valid_from` first.
#[derive(Debug, Clone, FromRow)]
pub struct OverridePriceRow {
    pub product_id: ProductId,
    pub price: Decimal,
}

/// An active warehouse mapped to the requested city.
#[derive(Debug, Clone, FromRow)]
pub struct WarehouseRow {
    pub warehouse_id: WarehouseId,
    pub name: String,
}

/// A positive stock balance for one product at one warehouse.
#[derive(Debug, Clone, FromRow)]
pub struct StockLevelRow {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub warehouse_name: String,
    /// On-hand minus reserved, computed in SQL; always positive.
    pub available: i64,
}

/// Delivery settings for a city.
#[derive(Debug, Clone, FromRow)]
pub struct CityRow {
    /// Daily time-of-day after which same-day dispatch is no longer possible.
    pub cutoff_time: Option<NaiveTime>,
    /// Days added to estimates for out-of-stock products.
    pub delivery_base_days: Option<i32>,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: Option<String>,
}

/// A raw delivery schedule row; parsed into a `DeliverySchedule` by the
/// delivery resolver, with unparseable rows skipped.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    /// Restricts the schedule to one warehouse when set.
    pub warehouse_id: Option<WarehouseId>,
    /// Either `weekly` or `specific_dates`.
    pub delivery_mode: String,
    /// JSON array of ISO weekday numbers (1 = Monday), for weekly schedules.
    pub delivery_days: Option<String>,
    /// JSON array of `YYYY-MM-DD` strings, for explicit-date schedules.
    pub specific_dates: Option<String>,
}
