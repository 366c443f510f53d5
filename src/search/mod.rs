//! Search and filtering over the loaded catalog.
//!
//! - [`SearchEngine`]: token matching, relevance ranking, bounded result cache
//! - [`SearchFilters`]: category plus optional author and numeric filters
//! - [`SearchHistory`]: persisted list of submitted queries
//! - [`SearchManager`]: connects the engine to the bus and the state store
//! - Catalog statistics, similar-book suggestions and CSV/JSON export

mod cache;
mod engine;
mod export;
mod filters;
mod history;
mod manager;
mod similar;
mod stats;
mod tokenize;

pub use cache::SearchCache;
pub use engine::{SearchEngine, SearchOutcome};
pub use export::{export_books, ExportFormat};
pub use filters::{RawFilters, SearchFilters};
pub use history::SearchHistory;
pub use manager::SearchManager;
pub use similar::{similar_books, similarity};
pub use stats::{catalog_stats, category_counts, CatalogStats, PageStats, RatingStats};
pub use tokenize::{normalize, tokenize};
