//! JSON API route handlers.

pub mod availability;
