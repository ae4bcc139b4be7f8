//! # IO Module
//!
//! Outer surfaces of the service: the axum REST handlers and the CSV
//! reader behind the `txns-to-json` helper.

pub mod csv_batch;
pub mod rest;

pub use rest::AppState;
