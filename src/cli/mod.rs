//! CLI commands for libris.
//!
//! - `serve` (default): run the HTTP server
//! - `browse`: run the catalog client headlessly against a server
//! - `--version`
//!
//! ```ignore
//! use libris::cli::{parse_args, run_cli_command};
//!
//! let command = parse_args(std::env::args())?;
//! run_cli_command(command, LibraryConfig::from_env()).await?;
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, USAGE};
pub use version::{handle_version_command, version_line, VERSION};

use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::adapters::{FileKeyValueStore, ReqwestHttpClient};
use crate::app::LibraryApp;
use crate::cli_output::{icons, print_books, print_footer, print_header, print_status};
use crate::config::LibraryConfig;
use crate::dom::MemoryDocument;
use crate::server;
use crate::traits::KeyValueStore;
use crate::ui::DomEvent;

/// Run a parsed command.
pub async fn run_cli_command(command: CliCommand, config: LibraryConfig) -> Result<()> {
    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Serve { port, public_dir } => {
            let mut config = config;
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(dir) = public_dir {
                config = config.with_public_dir(dir);
            }
            handle_serve_command(config).await
        }
        CliCommand::Browse {
            api,
            category,
            query,
        } => {
            let mut config = config;
            if let Some(api) = api {
                config = config.with_api_base_url(api);
            }
            handle_browse_command(config, category, query).await
        }
    }
}

async fn handle_serve_command(config: LibraryConfig) -> Result<()> {
    if !config.server.metadata_path().exists() {
        tracing::warn!(
            "No metadata file at {}; /api/books will return 404",
            config.server.metadata_path().display()
        );
    }

    if let Err(e) = server::serve(config.server).await {
        tracing::error!("Server failed: {}", e);
        eprintln!("{} {}", icons::FAILURE, e.user_message());
        return Err(e.into());
    }
    Ok(())
}

async fn handle_browse_command(
    config: LibraryConfig,
    category: Option<String>,
    query: String,
) -> Result<()> {
    let storage: Option<Arc<dyn KeyValueStore>> = match FileKeyValueStore::open_default() {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            tracing::warn!("Preferences unavailable, continuing without: {}", e);
            None
        }
    };
    let base_url = config.api.base_url.clone();
    let document = Arc::new(MemoryDocument::library_page(&config.dom));
    let client = ReqwestHttpClient::with_timeout(config.api.timeout);
    let app = LibraryApp::new(config, client, storage, document);

    app.start().await?;
    let result = print_catalog(&app, &base_url, category.as_deref(), &query);
    app.shutdown();
    result
}

fn print_catalog(
    app: &LibraryApp<ReqwestHttpClient>,
    base_url: &str,
    category: Option<&str>,
    query: &str,
) -> Result<()> {
    let state = app.store().snapshot();
    if state.has_error {
        print_status(icons::FAILURE, &state.error_message);
        return Err(eyre!("could not load books from {}", base_url));
    }

    print_header("LIBRIS CATALOG");
    print_status(
        icons::SUCCESS,
        &format!("Loaded {} books from {}", state.books.len(), base_url),
    );

    if let Some(category) = category {
        app.search().select_category(category)?;
    }
    if !query.trim().is_empty() {
        app.ui().handle_dom_event(DomEvent::SearchSubmit {
            value: query.to_string(),
        });
    }

    println!();
    print_books(&app.store().filtered_books());
    print_footer(&app.search().stats());
    Ok(())
}
