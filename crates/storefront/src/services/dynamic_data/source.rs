//! The seam between the dynamic data engine and its backing stores.
//!
//! The engine only ever issues one batched query per data source per batch
//! (the reason the batch size is capped), so the trait surface is a handful
//! of set-oriented lookups. The production implementation is
//! [`crate::db::PgCatalog`]; tests substitute an in-memory fake.

use thiserror::Error;

use basalt_core::{BuyerId, CityId, ProductId, WarehouseId};

use crate::models::catalog::{
    BasePriceRow, CityRow, OverridePriceRow, ScheduleRow, StockLevelRow, WarehouseRow,
};

/// An underlying store was unreachable or a query failed.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Batched, read-only access to the catalog, pricing, stock, and schedule
/// stores.
#[allow(async_fn_in_trait)]
pub trait ProductDataSource {
    /// Currently-valid base prices for the given products, most-recent
    /// `valid_from` first.
    async fn base_prices(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<BasePriceRow>, DataSourceError>;

    /// Currently-valid organization override prices visible to the buyer,
    /// most-recent `valid_from` first.
    async fn override_prices(
        &self,
        product_ids: &[ProductId],
        buyer_id: BuyerId,
    ) -> Result<Vec<OverridePriceRow>, DataSourceError>;

    /// Active warehouses mapped to the city.
    async fn city_warehouses(
        &self,
        city_id: CityId,
    ) -> Result<Vec<WarehouseRow>, DataSourceError>;

    /// Positive stock balances for the given products at the given warehouses.
    async fn stock_levels(
        &self,
        product_ids: &[ProductId],
        warehouse_ids: &[WarehouseId],
    ) -> Result<Vec<StockLevelRow>, DataSourceError>;

    /// Delivery settings for the city, if the city exists.
    async fn city(&self, city_id: CityId) -> Result<Option<CityRow>, DataSourceError>;

    /// Courier delivery schedules configured for the city.
    async fn delivery_schedules(
        &self,
        city_id: CityId,
    ) -> Result<Vec<ScheduleRow>, DataSourceError>;
}
