//! BOLETO — betting-slip engine for a sports wagering client.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod store;
pub mod analysis;
pub mod engine;
pub mod channel;
pub mod api;
