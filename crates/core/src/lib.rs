//! Basalt Core - Shared types library.
//!
//! This crate provides common types used across all Basalt components:
//! - `storefront` - Public-facing B2B storefront service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the availability
//!   value types returned by the dynamic product data engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
