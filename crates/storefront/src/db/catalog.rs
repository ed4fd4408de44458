//! Postgres implementation of the engine's data source.
//!
//! Every method is a single round-trip batch query using `= ANY($n)` array
//! binds, so a full batch touches each store exactly once regardless of how
//! many products are requested.

use sqlx::PgPool;

use basalt_core::{BuyerId, CityId, ProductId, WarehouseId};

use crate::models::catalog::{
    BasePriceRow, CityRow, OverridePriceRow, ScheduleRow, StockLevelRow, WarehouseRow,
};
use crate::services::dynamic_data::{DataSourceError, ProductDataSource};

/// Read-only catalog access over a shared connection pool.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a new catalog over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_raw_ids(ids: &[ProductId]) -> Vec<i32> {
    ids.iter().map(ProductId::as_i32).collect()
}

impl ProductDataSource for PgCatalog {
    async fn base_prices(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<BasePriceRow>, DataSourceError> {
        let rows = sqlx::query_as::<_, BasePriceRow>(
            r"
            SELECT product_id, price
            FROM prices
            WHERE product_id = ANY($1)
                AND is_base
                AND valid_from <= CURRENT_DATE
                AND (valid_to IS NULL OR valid_to >= CURRENT_DATE)
            ORDER BY valid_from DESC
            ",
        )
        .bind(to_raw_ids(product_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn override_prices(
        &self,
        product_ids: &[ProductId],
        buyer_id: BuyerId,
    ) -> Result<Vec<OverridePriceRow>, DataSourceError> {
        let rows = sqlx::query_as::<_, OverridePriceRow>(
            r"
            SELECT op.product_id, op.price
            FROM buyer_organizations bo
            JOIN organization_prices op ON op.organization_id = bo.organization_id
            WHERE bo.buyer_id = $1
                AND op.product_id = ANY($2)
                AND op.valid_from <= CURRENT_DATE
                AND (op.valid_to IS NULL OR op.valid_to >= CURRENT_DATE)
            ORDER BY op.valid_from DESC
            ",
        )
        .bind(buyer_id)
        .bind(to_raw_ids(product_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn city_warehouses(
        &self,
        city_id: CityId,
    ) -> Result<Vec<WarehouseRow>, DataSourceError> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            r"
            SELECT DISTINCT w.warehouse_id, w.name
            FROM city_warehouses cw
            JOIN warehouses w ON w.warehouse_id = cw.warehouse_id
            WHERE cw.city_id = $1 AND w.is_active
            ",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn stock_levels(
        &self,
        product_ids: &[ProductId],
        warehouse_ids: &[WarehouseId],
    ) -> Result<Vec<StockLevelRow>, DataSourceError> {
        let warehouse_ids: Vec<i32> = warehouse_ids.iter().map(WarehouseId::as_i32).collect();

        let rows = sqlx::query_as::<_, StockLevelRow>(
            r"
            SELECT sb.product_id, sb.warehouse_id, w.name AS warehouse_name,
                   (sb.on_hand - sb.reserved)::BIGINT AS available
            FROM stock_balances sb
            JOIN warehouses w ON w.warehouse_id = sb.warehouse_id
            WHERE sb.product_id = ANY($1)
                AND sb.warehouse_id = ANY($2)
                AND sb.on_hand > sb.reserved
            ",
        )
        .bind(to_raw_ids(product_ids))
        .bind(warehouse_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn city(&self, city_id: CityId) -> Result<Option<CityRow>, DataSourceError> {
        let row = sqlx::query_as::<_, CityRow>(
            r"
            SELECT cutoff_time, delivery_base_days, timezone
            FROM cities
            WHERE city_id = $1
            ",
        )
        .bind(city_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delivery_schedules(
        &self,
        city_id: CityId,
    ) -> Result<Vec<ScheduleRow>, DataSourceError> {
        // delivery_type 1 = courier; pickup and freight schedules don't
        // contribute to the storefront delivery estimate
        let rows = sqlx::query_as::<_, ScheduleRow>(
            r"
            SELECT warehouse_id, delivery_mode, delivery_days, specific_dates
            FROM delivery_schedules
            WHERE city_id = $1 AND delivery_type = 1
            ",
        )
        .bind(city_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
