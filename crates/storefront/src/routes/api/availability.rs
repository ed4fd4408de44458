//! Batch availability check endpoint.
//!
//! `GET /api/availability?product_ids=1,2,3&city_id=5[&buyer_id=9]`
//!
//! Returns a JSON object keyed by product id string. Listing pages poll this
//! for every SKU on screen, so the heavy lifting lives in the dynamic data
//! engine and this handler only parses, delegates, and reshapes.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use basalt_core::{AggregatedProductEntry, BuyerId, CityId};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Query parameters for the availability check.
#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    /// Comma-separated product ids.
    pub product_ids: String,
    pub city_id: i32,
    /// Authenticated buyer, for organization pricing.
    pub buyer_id: Option<i32>,
}

/// One warehouse's share of the available quantity.
#[derive(Debug, Serialize)]
pub struct WarehouseQuantity {
    pub id: i32,
    pub name: String,
    pub quantity: i64,
}

/// Wire shape for one product's dynamic data.
#[derive(Debug, Serialize)]
pub struct ProductAvailability {
    pub quantity: i64,
    pub in_stock: bool,
    /// `DD.MM.YYYY`, or null when no schedule resolved.
    pub delivery_date: Option<String>,
    pub delivery_text: String,
    pub availability_text: String,
    pub price: Option<f64>,
    pub base_price: Option<f64>,
    pub has_special_price: bool,
    pub warehouses: Vec<WarehouseQuantity>,
}

impl From<&AggregatedProductEntry> for ProductAvailability {
    fn from(entry: &AggregatedProductEntry) -> Self {
        Self {
            quantity: entry.stock.total_available,
            in_stock: entry.available,
            delivery_date: entry
                .delivery
                .date
                .map(|date| date.format("%d.%m.%Y").to_string()),
            delivery_text: entry.delivery.text.clone(),
            availability_text: availability_text(entry.stock.total_available),
            price: entry.price.and_then(|p| p.effective.to_f64()),
            base_price: entry.price.and_then(|p| p.base.to_f64()),
            has_special_price: entry.price.is_some_and(|p| p.has_override),
            warehouses: entry
                .stock
                .allocations
                .iter()
                .map(|allocation| WarehouseQuantity {
                    id: allocation.warehouse_id.as_i32(),
                    name: allocation.warehouse_name.clone(),
                    quantity: allocation.available,
                })
                .collect(),
        }
    }
}

/// Display tier for the quantity badge.
fn availability_text(quantity: i64) -> String {
    if quantity > 10 {
        "In stock".to_owned()
    } else if quantity > 0 {
        format!("Only {quantity} left")
    } else {
        "On order".to_owned()
    }
}

/// Parse the comma-separated id list, dropping anything non-positive.
fn parse_product_ids(raw: &str) -> Vec<i32> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i32>().ok())
        .filter(|&id| id > 0)
        .collect()
}

/// Handle the availability check.
///
/// An empty post-filter id list is a valid degenerate case and returns an
/// empty object, not an error.
///
/// # Errors
///
/// Returns 400 for a non-positive city id or an oversized batch, 500 when a
/// data source fails.
pub async fn check(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<HashMap<String, ProductAvailability>>> {
    if params.city_id <= 0 {
        return Err(AppError::BadRequest("city_id must be positive".to_owned()));
    }

    let product_ids = parse_product_ids(&params.product_ids);
    let buyer_id = params.buyer_id.filter(|&id| id > 0).map(BuyerId::new);

    let batch = state
        .dynamic_data()
        .get_batch(&product_ids, CityId::new(params.city_id), buyer_id)
        .await?;

    let body = batch
        .iter()
        .map(|(id, entry)| (id.to_string(), ProductAvailability::from(entry)))
        .collect();

    Ok(Json(body))
}
