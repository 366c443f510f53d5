//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP GET for the API client
//! - [`KeyValueStore`] - persistence for theme, history, saved books and settings
//! - [`Document`] - element lookup and mutation reporting for the UI

pub mod document;
pub mod http;
pub mod storage;

pub use document::Document;
pub use http::{Headers, HttpClient, HttpError, Response};
pub use storage::{load_json, save_json, KeyValueStore};
