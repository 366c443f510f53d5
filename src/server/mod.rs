//! HTTP server for the catalog.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /api/books`, `GET /api` | the metadata file as a JSON array |
//! | `GET /api/books/:id` | one record, or 404 `{error, id}` |
//! | `GET /health` | `{"status": "ok"}` |
//! | anything else | static files from the public directory |
//!
//! The metadata file is read on every request, so edits show up without a
//! restart.

mod catalog;

pub use catalog::{find_record, read_catalog, CatalogError};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::error::{classify_io_error, LibraryResult, SystemError};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct ServerState {
    metadata_path: Arc<PathBuf>,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            metadata_path: Arc::new(config.metadata_path()),
        }
    }
}

/// Build the router for `config`.
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/books", get(books_handler))
        .route("/api", get(books_handler))
        .route("/api/books/:id", get(book_handler))
        .route("/health", get(health_handler))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(ServerState::new(config))
}

/// Bind the listening socket. An address already in use is reported as
/// [`SystemError::AddressInUse`].
pub async fn bind(config: &ServerConfig) -> LibraryResult<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr).await.map_err(|e| {
        let err = match classify_io_error(e, None, "bind the server port") {
            SystemError::AddressInUse { .. } => SystemError::AddressInUse { addr: addr.clone() },
            other => other,
        };
        err.into()
    })
}

/// Serve until the process exits.
pub async fn serve(config: ServerConfig) -> LibraryResult<()> {
    let listener = bind(&config).await?;
    let app = router(&config);
    log_listening(&listener, &config);
    axum::serve(listener, app)
        .await
        .map_err(|e| classify_io_error(e, None, "serve HTTP").into())
}

/// Serve on an already bound listener in a background task.
///
/// Returns the task handle and the actual address, which is useful for
/// tests that bind port 0.
pub async fn start_server_on(
    listener: TcpListener,
    config: ServerConfig,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let addr = listener.local_addr()?;
    let app = router(&config);
    log_listening(&listener, &config);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((handle, addr))
}

fn log_listening(listener: &TcpListener, config: &ServerConfig) {
    match listener.local_addr() {
        Ok(addr) => tracing::info!(
            "Serving {} on http://{}",
            config.public_dir.display(),
            addr
        ),
        Err(e) => tracing::warn!("Server bound but local address unknown: {}", e),
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;
    tracing::info!("{} {} -> {}", method, path, response.status().as_u16());
    response
}

async fn books_handler(State(state): State<ServerState>) -> Result<Response, CatalogError> {
    let catalog = read_catalog(&state.metadata_path).await?;
    Ok(Json(catalog).into_response())
}

async fn book_handler(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Response, CatalogError> {
    let catalog = read_catalog(&state.metadata_path).await?;
    match find_record(&catalog, &id) {
        Some(record) => Ok(Json(record.clone()).into_response()),
        None => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Book not found", "id": id })),
        )
            .into_response()),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
