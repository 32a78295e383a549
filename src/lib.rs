//! # Proteus
//!
//! Dashboard core for auditing software repositories with Apache DRAT.
//!
//! Proteus reads per-project statistics (MIME type and license counts) from
//! a Solr statistics index, aggregates them into chart-ready structures, and
//! submits processing actions (crawl, index, map, reduce, reset) to the DRAT
//! server. Results are available as terminal tables (the `proteus` CLI) and
//! as JSON (the `proteus serve` HTTP API).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐   ┌─────────────────┐
//! │ Solr select  │──▶│ FetchCoordinator │──▶│ ViewController  │
//! │ (statistics) │   │ two-phase, cancel│   │ Panel::build    │
//! └──────────────┘   └──────────────────┘   └───────┬─────────┘
//!                                                   │
//!                      ┌────────────────────────────┤
//!                      ▼                            ▼
//!                 ┌──────────┐                ┌──────────┐
//!                 │   CLI    │                │   HTTP   │
//!                 │(proteus) │                │  (JSON)  │
//!                 └────┬─────┘                └────┬─────┘
//!                      └──────────┬────────────────┘
//!                                 ▼
//!                       ┌──────────────────┐   ┌──────────────┐
//!                       │ ActionSubmitter  │──▶│ DRAT actions │
//!                       │ SharedState      │   └──────────────┘
//!                       └──────────────────┘
//! ```
//!
//! Aggregation and chart math live in the `proteus-core` crate, which has
//! no I/O dependencies.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`progress`] | Fetch progress on stderr |
//! | [`solr`] | HTTP client for the statistics index |
//! | [`drat`] | HTTP client for DRAT actions |
//! | [`backends`] | Backend selection (network or fixture) |
//! | [`fetch`] | Two-phase, cancellable loads |
//! | [`view`] | View lifecycle and update suppression |
//! | [`panels`] | The dashboard panels |
//! | [`action`] | Action form validation and submission |
//! | [`render`] | Terminal tables |
//! | [`dashboard`] | CLI command implementations |
//! | [`server`] | JSON HTTP API |

pub mod action;
pub mod backends;
pub mod config;
pub mod dashboard;
pub mod drat;
pub mod fetch;
pub mod logging;
pub mod panels;
pub mod progress;
pub mod render;
pub mod server;
pub mod solr;
pub mod view;
