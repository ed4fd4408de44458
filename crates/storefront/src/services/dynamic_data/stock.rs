//! Stock aggregation: per-product availability across a city's warehouses.
//!
//! A city with no mapped warehouses yields an empty map - every product is
//! implicitly out of stock there. Products whose total availability is zero
//! are omitted rather than zero-valued; callers treat "missing" identically
//! to "zero stock".

use std::collections::HashMap;

use basalt_core::{CityId, ProductId, StockRecord, WarehouseAllocation, WarehouseId};

use crate::models::catalog::StockLevelRow;

use super::source::{DataSourceError, ProductDataSource};

/// Resolve available stock for the batch in the given city.
///
/// # Errors
///
/// Returns `DataSourceError` if the warehouse or stock store cannot be
/// queried.
pub async fn resolve_stock<S: ProductDataSource>(
    source: &S,
    product_ids: &[ProductId],
    city_id: CityId,
) -> Result<HashMap<ProductId, StockRecord>, DataSourceError> {
    let warehouses = source.city_warehouses(city_id).await?;
    if warehouses.is_empty() {
        return Ok(HashMap::new());
    }

    let warehouse_ids: Vec<WarehouseId> = warehouses.iter().map(|w| w.warehouse_id).collect();
    let rows = source.stock_levels(product_ids, &warehouse_ids).await?;

    Ok(aggregate_stock_rows(rows))
}

/// Sum positive allocations per product, keeping the per-warehouse split.
fn aggregate_stock_rows(rows: Vec<StockLevelRow>) -> HashMap<ProductId, StockRecord> {
    let mut stock: HashMap<ProductId, StockRecord> = HashMap::new();

    for row in rows {
        // The query already excludes non-positive balances; guard anyway so
        // a bad row can't produce a zero-valued allocation.
        if row.available <= 0 {
            continue;
        }

        let record = stock.entry(row.product_id).or_default();
        record.total_available += row.available;
        record.allocations.push(WarehouseAllocation {
            warehouse_id: row.warehouse_id,
            warehouse_name: row.warehouse_name,
            available: row.available,
        });
    }

    stock
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(product_id: i32, warehouse_id: i32, available: i64) -> StockLevelRow {
        StockLevelRow {
            product_id: ProductId::new(product_id),
            warehouse_id: WarehouseId::new(warehouse_id),
            warehouse_name: format!("warehouse-{warehouse_id}"),
            available,
        }
    }

    #[test]
    fn test_sums_across_warehouses() {
        let stock = aggregate_stock_rows(vec![row(1, 10, 3), row(1, 11, 4), row(2, 10, 1)]);

        let record = stock.get(&ProductId::new(1)).unwrap();
        assert_eq!(record.total_available, 7);
        assert_eq!(record.allocations.len(), 2);

        let record = stock.get(&ProductId::new(2)).unwrap();
        assert_eq!(record.total_available, 1);
    }

    #[test]
    fn test_total_matches_allocation_sum() {
        let stock = aggregate_stock_rows(vec![row(1, 10, 5), row(1, 11, 2)]);
        let record = stock.get(&ProductId::new(1)).unwrap();

        let sum: i64 = record.allocations.iter().map(|a| a.available).sum();
        assert_eq!(record.total_available, sum);
    }

    #[test]
    fn test_non_positive_rows_are_skipped() {
        let stock = aggregate_stock_rows(vec![row(1, 10, 0), row(1, 11, -2)]);
        assert!(stock.is_empty());
    }
}
