//! Integration tests for the HTTP server.

mod common;

use common::{public_dir, sample_catalog, start_server, write_metadata};
use libris::config::ServerConfig;
use libris::server::bind;
use serde_json::Value;

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.expect("Failed to send request");
    let status = response.status().as_u16();
    let body = response.json().await.expect("Body was not JSON");
    (status, body)
}

#[tokio::test]
async fn test_books_endpoint_serves_metadata() {
    let catalog = sample_catalog();
    let dir = public_dir(Some(&catalog.to_string()));
    let (handle, addr) = start_server(dir.path()).await;

    let (status, body) = get_json(&format!("http://{}/api/books", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(body, catalog);

    // Legacy path serves the same thing
    let (status, legacy) = get_json(&format!("http://{}/api", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(legacy, body);

    handle.abort();
}

#[tokio::test]
async fn test_metadata_is_reread_per_request() {
    let dir = public_dir(Some("[]"));
    let (handle, addr) = start_server(dir.path()).await;

    let (_, before) = get_json(&format!("http://{}/api/books", addr)).await;
    assert_eq!(before.as_array().map(Vec::len), Some(0));

    write_metadata(dir.path(), r#"[{"id": 1, "title": "Dune"}]"#);
    let (_, after) = get_json(&format!("http://{}/api/books", addr)).await;
    assert_eq!(after[0]["title"], "Dune");

    handle.abort();
}

#[tokio::test]
async fn test_missing_metadata_returns_404() {
    let dir = public_dir(None);
    let (handle, addr) = start_server(dir.path()).await;

    let (status, body) = get_json(&format!("http://{}/api/books", addr)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Books metadata file not found");
    assert!(body["path"]
        .as_str()
        .unwrap()
        .ends_with("metadata.json"));

    handle.abort();
}

#[tokio::test]
async fn test_invalid_metadata_returns_error_body() {
    let dir = public_dir(Some("[{\"id\": 1,"));
    let (handle, addr) = start_server(dir.path()).await;

    let (status, body) = get_json(&format!("http://{}/api/books", addr)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid JSON in books metadata file");
    assert!(body["details"].is_string());

    handle.abort();
}

#[tokio::test]
async fn test_single_book_lookup() {
    let dir = public_dir(Some(&sample_catalog().to_string()));
    let (handle, addr) = start_server(dir.path()).await;

    let (status, body) = get_json(&format!("http://{}/api/books/2", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(body["title"], "Cosmos");

    let (status, body) = get_json(&format!("http://{}/api/books/99", addr)).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Book not found");
    assert_eq!(body["id"], "99");

    handle.abort();
}

#[tokio::test]
async fn test_health_and_static_files() {
    let dir = public_dir(Some("[]"));
    let (handle, addr) = start_server(dir.path()).await;

    let (status, body) = get_json(&format!("http://{}/health", addr)).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");

    let response = reqwest::get(format!("http://{}/index.html", addr))
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let html = response.text().await.expect("Failed to get body");
    assert!(html.contains("Digital Library"));

    let missing = reqwest::get(format!("http://{}/covers/none.jpg", addr))
        .await
        .expect("Failed to send request");
    assert_eq!(missing.status(), 404);

    handle.abort();
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = public_dir(Some("[]"));
    let (handle, addr) = start_server(dir.path()).await;

    let response = reqwest::Client::new()
        .get(format!("http://{}/api/books", addr))
        .header("Origin", "http://elsewhere.test")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );

    handle.abort();
}

#[tokio::test]
async fn test_port_in_use_is_reported() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = taken.local_addr().unwrap().port();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ServerConfig::default()
    };
    let err = bind(&config).await.unwrap_err();
    assert_eq!(err.error_code(), "E_SYS_ADDR_IN_USE");
    assert!(err.user_message().contains("PORT=3001"));
}
