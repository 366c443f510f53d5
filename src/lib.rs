//! Libris - a digital library catalog
//!
//! The crate has two halves:
//! - [`server`]: serves the static site and the book metadata as JSON
//! - the catalog client: [`event_bus`], [`state`], [`dom`], [`api`],
//!   [`search`] and [`ui`], composed by [`app::LibraryApp`]
//!
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod api;
pub mod app;
pub mod cli;
pub mod cli_output;
pub mod config;
pub mod dom;
pub mod error;
pub mod event_bus;
pub mod logging;
pub mod models;
pub mod search;
pub mod server;
pub mod state;
pub mod traits;
pub mod ui;
pub mod util;
