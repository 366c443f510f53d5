//! Query matching, ranking and result caching.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::{PerformanceConfig, UiConfig};
use crate::models::Book;

use super::cache::SearchCache;
use super::filters::SearchFilters;
use super::tokenize::{normalize, tokenize};

const TITLE_PHRASE_SCORE: f64 = 10.0;
const TITLE_TOKEN_SCORE: f64 = 5.0;
const AUTHOR_PHRASE_SCORE: f64 = 8.0;
const AUTHOR_TOKEN_SCORE: f64 = 4.0;
const CATEGORY_TOKEN_SCORE: f64 = 3.0;
const DESCRIPTION_TOKEN_SCORE: f64 = 1.0;
const RATING_WEIGHT: f64 = 0.1;

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The query as applied, after trimming and truncation.
    pub query: String,
    pub results: Arc<Vec<Book>>,
    pub from_cache: bool,
}

/// Search over an owned book list.
///
/// A record matches when every query token is a substring of its
/// normalized searchable text and it passes the filters. Non-empty queries
/// are ranked by relevance; an empty query keeps catalog order.
pub struct SearchEngine {
    books: Arc<Vec<Book>>,
    /// Normalized searchable text, parallel to `books`
    haystacks: Vec<String>,
    cache: SearchCache,
    last_filters: Option<SearchFilters>,
    max_query_length: usize,
}

impl SearchEngine {
    pub fn new(cache_size: usize, max_query_length: usize) -> Self {
        Self {
            books: Arc::new(Vec::new()),
            haystacks: Vec::new(),
            cache: SearchCache::new(cache_size),
            last_filters: None,
            max_query_length,
        }
    }

    pub fn from_config(performance: &PerformanceConfig, ui: &UiConfig) -> Self {
        Self::new(performance.search_cache_size, ui.max_search_length)
    }

    /// Replace the catalog. Cached results are dropped.
    pub fn set_books(&mut self, books: Arc<Vec<Book>>) {
        self.haystacks = books
            .iter()
            .map(|b| normalize(&b.searchable_text()))
            .collect();
        self.books = books;
        self.cache.clear();
        tracing::debug!("Search engine indexed {} books", self.books.len());
    }

    pub fn books(&self) -> Arc<Vec<Book>> {
        self.books.clone()
    }

    pub fn search(&mut self, query: &str, filters: &SearchFilters) -> SearchOutcome {
        let query: String = query.trim().chars().take(self.max_query_length).collect();

        if self.last_filters.as_ref() != Some(filters) {
            if self.last_filters.is_some() {
                tracing::debug!("Filters changed, invalidating search cache");
            }
            self.cache.clear();
            self.last_filters = Some(filters.clone());
        }

        let tokens = tokenize(&query);
        let key = format!("{}|{}", tokens.join(" "), filters.key());
        if let Some(results) = self.cache.get(&key) {
            return SearchOutcome {
                query,
                results,
                from_cache: true,
            };
        }

        let mut matched: Vec<&Book> = self
            .books
            .iter()
            .zip(&self.haystacks)
            .filter(|(book, text)| {
                filters.matches(book) && tokens.iter().all(|t| text.contains(t.as_str()))
            })
            .map(|(book, _)| book)
            .collect();

        if !tokens.is_empty() {
            let phrase = tokens.join(" ");
            let mut scored: Vec<(f64, &Book)> = matched
                .into_iter()
                .map(|b| (relevance(b, &phrase, &tokens), b))
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
            matched = scored.into_iter().map(|(_, b)| b).collect();
        }

        let results = Arc::new(matched.into_iter().cloned().collect::<Vec<_>>());
        tracing::debug!(
            "Search {:?} ({}) matched {} of {}",
            query,
            filters.category,
            results.len(),
            self.books.len()
        );
        self.cache.insert(key, results.clone());

        SearchOutcome {
            query,
            results,
            from_cache: false,
        }
    }

    /// (hits, misses)
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

fn relevance(book: &Book, phrase: &str, tokens: &[String]) -> f64 {
    let title = normalize(&book.title);
    let author = normalize(&book.author);
    let category = book.category.to_lowercase();
    let description = normalize(&book.description);

    let mut score = 0.0;
    if title.contains(phrase) {
        score += TITLE_PHRASE_SCORE;
    }
    if author.contains(phrase) {
        score += AUTHOR_PHRASE_SCORE;
    }
    for token in tokens {
        if title.contains(token.as_str()) {
            score += TITLE_TOKEN_SCORE;
        }
        if author.contains(token.as_str()) {
            score += AUTHOR_TOKEN_SCORE;
        }
        if category.contains(token.as_str()) {
            score += CATEGORY_TOKEN_SCORE;
        }
        if description.contains(token.as_str()) {
            score += DESCRIPTION_TOKEN_SCORE;
        }
    }
    score + book.rating * RATING_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn catalog() -> Arc<Vec<Book>> {
        Arc::new(vec![
            Book {
                id: 1,
                title: "Dune".into(),
                author: "Frank Herbert".into(),
                category: "fiction".into(),
                description: "Spice and sand".into(),
                rating: 4.5,
                pages: 412,
                publish_date: "1965-08-01".into(),
                ..Book::default()
            },
            Book {
                id: 2,
                title: "Cosmos".into(),
                author: "Carl Sagan".into(),
                category: "science".into(),
                description: "A journey through dune fields of stars".into(),
                rating: 4.8,
                pages: 396,
                publish_date: "1980".into(),
                ..Book::default()
            },
            Book {
                id: 3,
                title: "The Histories".into(),
                author: "Herodotus".into(),
                category: "history".into(),
                rating: 4.0,
                pages: 716,
                ..Book::default()
            },
        ])
    }

    fn engine() -> SearchEngine {
        let mut engine = SearchEngine::new(100, 100);
        engine.set_books(catalog());
        engine
    }

    fn ids(outcome: &SearchOutcome) -> Vec<i64> {
        outcome.results.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_case_insensitive_match() {
        let mut engine = engine();
        let outcome = engine.search("DUNE", &SearchFilters::default());
        // Title match outranks a description match
        assert_eq!(ids(&outcome), vec![1, 2]);
    }

    #[test]
    fn test_every_token_must_match() {
        let mut engine = engine();
        let outcome = engine.search("frank dune", &SearchFilters::default());
        assert_eq!(ids(&outcome), vec![1]);
        let outcome = engine.search("frank cosmos", &SearchFilters::default());
        assert!(outcome.results.is_empty());
    }

    #[test]
    fn test_category_filter() {
        let mut engine = engine();
        let outcome = engine.search("", &SearchFilters::category(Category::Science));
        assert_eq!(ids(&outcome), vec![2]);
    }

    #[test]
    fn test_empty_query_keeps_catalog_order() {
        let mut engine = engine();
        let outcome = engine.search("   ", &SearchFilters::default());
        assert_eq!(ids(&outcome), vec![1, 2, 3]);
    }

    #[test]
    fn test_repeat_search_hits_cache() {
        let mut engine = engine();
        let first = engine.search("dune", &SearchFilters::default());
        let second = engine.search("  Dune ", &SearchFilters::default());
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.results, second.results);
        assert_eq!(engine.cache_stats(), (1, 1));
    }

    #[test]
    fn test_filter_change_invalidates_cache() {
        let mut engine = engine();
        engine.search("dune", &SearchFilters::default());
        engine.search("dune", &SearchFilters::category(Category::Fiction));
        let again = engine.search("dune", &SearchFilters::default());
        assert!(!again.from_cache);
        assert_eq!(engine.cache_stats(), (0, 3));
    }

    #[test]
    fn test_numeric_filters() {
        let mut engine = engine();
        let filters = SearchFilters::default().with_min_rating(4.6);
        assert_eq!(ids(&engine.search("", &filters)), vec![2]);

        let filters = SearchFilters::default().with_year(1965);
        assert_eq!(ids(&engine.search("", &filters)), vec![1]);

        let filters = SearchFilters::default().with_max_pages(400);
        assert_eq!(ids(&engine.search("", &filters)), vec![2]);
    }

    #[test]
    fn test_results_are_subset_of_books() {
        let mut engine = engine();
        let books = engine.books();
        for query in ["", "a", "the", "herodotus", "zzz"] {
            for category in Category::ALL {
                let outcome = engine.search(query, &SearchFilters::category(category));
                for book in outcome.results.iter() {
                    assert!(books.contains(book));
                    assert!(category.matches(book));
                }
            }
        }
    }

    #[test]
    fn test_query_truncated() {
        let mut engine = SearchEngine::new(10, 4);
        engine.set_books(catalog());
        let outcome = engine.search("dunexyz", &SearchFilters::default());
        assert_eq!(outcome.query, "dune");
        assert_eq!(ids(&outcome), vec![1, 2]);
    }

    #[test]
    fn test_set_books_clears_cache() {
        let mut engine = engine();
        engine.search("dune", &SearchFilters::default());
        engine.set_books(Arc::new(Vec::new()));
        let outcome = engine.search("dune", &SearchFilters::default());
        assert!(!outcome.from_cache);
        assert!(outcome.results.is_empty());
    }
}
