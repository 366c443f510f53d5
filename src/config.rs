//! Runtime configuration.
//!
//! Every component takes its settings from a [`LibraryConfig`] passed in at
//! construction. Defaults match the shipped catalog; a few values can be
//! overridden from the environment.
//!
//! # Example
//!
//! ```ignore
//! use libris::config::LibraryConfig;
//!
//! let config = LibraryConfig::from_env()
//!     .with_port(3001)
//!     .with_api_base_url("http://localhost:3001");
//! ```

use std::path::PathBuf;
use std::time::Duration;

/// Environment variable selecting the server port.
pub const PORT_ENV: &str = "PORT";
/// Environment variable selecting the static file directory.
pub const PUBLIC_DIR_ENV: &str = "LIBRIS_PUBLIC_DIR";
/// Environment variable selecting the client's API base URL.
pub const API_URL_ENV: &str = "LIBRIS_API_URL";

pub const DEFAULT_PORT: u16 = 3000;

/// Category filter values accepted by the search engine.
pub const SUPPORTED_CATEGORIES: &[&str] =
    &["all", "fiction", "science", "history", "biography", "children"];

/// Theme names accepted by the UI.
pub const SUPPORTED_THEMES: &[&str] = &["light", "dark", "auto"];

/// Persistence keys.
pub mod storage_keys {
    pub const THEME: &str = "theme";
    pub const SEARCH_HISTORY: &str = "searchHistory";
    pub const MY_LIBRARY: &str = "myLibrary";
    pub const SETTINGS: &str = "digitalLibrarySettings";
}

/// API client settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub books_path: String,
    pub book_path: String,
    pub health_path: String,
    pub timeout: Duration,
    /// Total attempts, including the first one.
    pub retry_attempts: u32,
    /// Base delay; attempt `n` waits `retry_delay * n` before retrying.
    pub retry_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: format!("http://localhost:{}", DEFAULT_PORT),
            books_path: "/api/books".to_string(),
            book_path: "/api/books".to_string(),
            health_path: "/health".to_string(),
            timeout: Duration::from_millis(10_000),
            retry_attempts: 3,
            retry_delay: Duration::from_millis(1_000),
        }
    }
}

/// UI controller settings.
#[derive(Debug, Clone)]
pub struct UiConfig {
    pub search_debounce: Duration,
    pub search_min_length: usize,
    pub max_search_length: usize,
    pub toast_duration: Duration,
    pub max_toasts: usize,
    pub default_theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce: Duration::from_millis(300),
            search_min_length: 2,
            max_search_length: 100,
            toast_duration: Duration::from_millis(4_000),
            max_toasts: 5,
            default_theme: "light".to_string(),
        }
    }
}

/// Event bus settings.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Listener count above which a warning is logged.
    pub max_listeners: usize,
    /// Per-handler timeout for async publish.
    pub async_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_listeners: 20,
            async_timeout: Duration::from_millis(5_000),
        }
    }
}

/// Element cache settings.
#[derive(Debug, Clone)]
pub struct DomConfig {
    /// Named selectors resolved at init.
    pub selectors: Vec<(String, String)>,
    pub retry_interval: Duration,
    pub retry_attempts: u32,
    /// Watch document mutations to swap placeholders for late elements and
    /// to notice removed ones.
    pub observe_mutations: bool,
}

impl Default for DomConfig {
    fn default() -> Self {
        let selectors = [
            "booksGrid",
            "searchInput",
            "sidebar",
            "sidebarToggle",
            "modalOverlay",
            "categoryList",
            "toastContainer",
            "themeToggle",
            "themeIcon",
            "themeText",
            "loadingScreen",
            "modalTitle",
            "modalCover",
            "modalAuthor",
            "modalCategory",
            "modalRating",
            "modalPages",
            "modalDescription",
            "modalClose",
            "totalBooksCount",
        ]
        .iter()
        .map(|key| (key.to_string(), format!("#{}", key)))
        .collect();

        Self {
            selectors,
            retry_interval: Duration::from_millis(1_000),
            retry_attempts: 3,
            observe_mutations: true,
        }
    }
}

/// Caching and history limits.
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    pub search_cache_size: usize,
    pub search_history_size: usize,
    pub state_history_size: usize,
    pub similar_books_limit: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            search_cache_size: 100,
            search_history_size: 10,
            state_history_size: 50,
            similar_books_limit: 4,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub public_dir: PathBuf,
}

impl ServerConfig {
    /// Location of the book metadata file.
    pub fn metadata_path(&self) -> PathBuf {
        self.public_dir.join("books").join("metadata.json")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default)]
pub struct LibraryConfig {
    pub api: ApiConfig,
    pub ui: UiConfig,
    pub bus: BusConfig,
    pub dom: DomConfig,
    pub performance: PerformanceConfig,
    pub server: ServerConfig,
}

impl LibraryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Set the static file directory.
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.server.public_dir = dir.into();
        self
    }

    /// Set the base URL the API client talks to.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API request timeout.
    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api.timeout = timeout;
        self
    }

    /// Set retry attempts and base delay.
    pub fn with_retry(mut self, attempts: u32, delay: Duration) -> Self {
        self.api.retry_attempts = attempts.max(1);
        self.api.retry_delay = delay;
        self
    }

    /// Set the element cache retry policy.
    pub fn with_dom_retry(mut self, attempts: u32, interval: Duration) -> Self {
        self.dom.retry_attempts = attempts;
        self.dom.retry_interval = interval;
        self
    }

    /// Set the realtime search debounce.
    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.ui.search_debounce = debounce;
        self
    }

    /// Build config from `PORT`, `LIBRIS_PUBLIC_DIR` and `LIBRIS_API_URL`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(port) = std::env::var(PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => {
                    config.server.port = port;
                    config.api.base_url = format!("http://localhost:{}", port);
                }
                Err(_) => tracing::warn!("Ignoring invalid {}={:?}", PORT_ENV, port),
            }
        }

        if let Ok(dir) = std::env::var(PUBLIC_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.server.public_dir = PathBuf::from(dir);
            }
        }

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config = config.with_api_base_url(url.trim());
            }
        }

        config
    }
}
