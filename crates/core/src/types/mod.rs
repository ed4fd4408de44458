//! Core types for Basalt.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod availability;
pub mod id;

pub use availability::{
    AggregatedProductEntry, DeliveryRecord, PriceRecord, StockRecord, WarehouseAllocation,
};
pub use id::*;
