//! Common test utilities for integration tests.
//!
//! Provides a sample catalog, a temporary public directory laid out the
//! way the server expects, and a helper that starts the server on a free
//! port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;

use libris::config::{LibraryConfig, ServerConfig};
use libris::server::start_server_on;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Six books, one per category plus an extra science title.
pub fn sample_catalog() -> Value {
    json!([
        {
            "id": 1,
            "title": "Dune",
            "author": "Frank Herbert",
            "category": "fiction",
            "description": "Politics and sand on a desert planet.",
            "rating": 4.6,
            "pages": 612,
            "publishDate": "1965-08-01",
            "language": "en"
        },
        {
            "id": 2,
            "title": "Cosmos",
            "author": "Carl Sagan",
            "category": "science",
            "description": "A personal voyage through the universe.",
            "rating": 4.8,
            "pages": 396,
            "publishDate": "1980-10-01"
        },
        {
            "id": 3,
            "title": "A Brief History of Time",
            "author": "Stephen Hawking",
            "category": "science",
            "description": "Black holes, the big bang and the nature of time.",
            "rating": 4.5,
            "pages": 256,
            "publishDate": "1988-04-01"
        },
        {
            "id": 4,
            "title": "SPQR",
            "author": "Mary Beard",
            "category": "history",
            "description": "A history of ancient Rome.",
            "rating": 4.2,
            "pages": 608
        },
        {
            "id": 5,
            "title": "Steve Jobs",
            "author": "Walter Isaacson",
            "category": "biography",
            "rating": 4.1,
            "pages": 656
        },
        {
            "id": 6,
            "title": "The Gruffalo",
            "author": "Julia Donaldson",
            "category": "children",
            "rating": 4.9,
            "pages": 32
        }
    ])
}

/// Create a public directory with `index.html` and, when given,
/// `books/metadata.json` containing `metadata`.
pub fn public_dir(metadata: Option<&str>) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("index.html"),
        "<!doctype html><title>Digital Library</title>",
    )
    .expect("Failed to write index.html");
    if let Some(metadata) = metadata {
        write_metadata(dir.path(), metadata);
    }
    dir
}

/// Overwrite the metadata file under `public`.
pub fn write_metadata(public: &Path, metadata: &str) {
    let books = public.join("books");
    std::fs::create_dir_all(&books).expect("Failed to create books dir");
    std::fs::write(books.join("metadata.json"), metadata).expect("Failed to write metadata");
}

/// Start the server on a random local port serving `public`.
pub async fn start_server(public: &Path) -> (JoinHandle<()>, SocketAddr) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        public_dir: public.to_path_buf(),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    start_server_on(listener, config)
        .await
        .expect("Failed to start server")
}

/// Client config pointed at `addr` with fast retries.
pub fn client_config(addr: SocketAddr) -> LibraryConfig {
    LibraryConfig::default()
        .with_api_base_url(format!("http://{}", addr))
        .with_retry(2, std::time::Duration::from_millis(10))
        .with_api_timeout(std::time::Duration::from_secs(2))
}
