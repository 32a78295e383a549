//! # Proteus Core
//!
//! Shared, WASM-safe logic for Proteus: audit document models, the
//! category aggregator, chart data builders, the shared application state,
//! and the backend traits the fetch and action layers talk to.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! native-only dependencies. It compiles to both native targets and
//! `wasm32-unknown-unknown`.

pub mod aggregate;
pub mod backend;
pub mod chart;
pub mod models;
pub mod state;
