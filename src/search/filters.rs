//! The filter set applied alongside the query.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::models::{coerce_number, Book, Category};

/// Loosely typed filter values as they arrive from the page or the CLI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFilters {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub min_rating: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub max_pages: Option<Value>,
}

/// Validated filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub category: Category,
    /// Exact author, compared case-insensitively.
    pub author: Option<String>,
    pub min_rating: Option<f64>,
    pub year: Option<i32>,
    pub max_pages: Option<u32>,
}

impl SearchFilters {
    pub fn category(category: Category) -> Self {
        Self {
            category,
            ..Self::default()
        }
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = Some(pages);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Validate raw filters. An unsupported category is an error; numeric
    /// values that do not coerce to a number are dropped.
    pub fn from_raw(raw: &RawFilters) -> Result<SearchFilters, ValidationError> {
        let category = match raw.category.as_deref().map(str::trim) {
            None | Some("") => Category::All,
            Some(value) => Category::parse(value)?,
        };

        Ok(SearchFilters {
            category,
            author: raw
                .author
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from),
            min_rating: numeric(raw.min_rating.as_ref(), "minRating"),
            year: numeric(raw.year.as_ref(), "year")
                .filter(|y| y.fract() == 0.0)
                .map(|y| y as i32),
            max_pages: numeric(raw.max_pages.as_ref(), "maxPages")
                .filter(|p| *p >= 0.0)
                .map(|p| p.min(u32::MAX as f64) as u32),
        })
    }

    /// Whether `book` passes every active filter.
    pub fn matches(&self, book: &Book) -> bool {
        if !self.category.matches(book) {
            return false;
        }
        if let Some(author) = &self.author {
            if !book.author.eq_ignore_ascii_case(author) {
                return false;
            }
        }
        if let Some(min) = self.min_rating {
            if book.rating < min {
                return false;
            }
        }
        if let Some(year) = self.year {
            if book.year() != Some(year) {
                return false;
            }
        }
        if let Some(max) = self.max_pages {
            if book.pages > max {
                return false;
            }
        }
        true
    }

    /// Stable string form used in cache keys.
    pub fn key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.category.as_str(),
            self.author.as_deref().unwrap_or("").to_lowercase(),
            self.min_rating.map(|r| r.to_string()).unwrap_or_default(),
            self.year.map(|y| y.to_string()).unwrap_or_default(),
            self.max_pages.map(|p| p.to_string()).unwrap_or_default(),
        )
    }
}

fn numeric(value: Option<&Value>, name: &str) -> Option<f64> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let coerced = coerce_number(value);
    if coerced.is_none() {
        tracing::debug!("Ignoring non-numeric {} filter: {}", name, value);
    }
    coerced
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book(category: &str, rating: f64, pages: u32, date: &str) -> Book {
        Book {
            category: category.to_string(),
            rating,
            pages,
            publish_date: date.to_string(),
            ..Book::default()
        }
    }

    #[test]
    fn test_unsupported_category_rejected() {
        let raw = RawFilters {
            category: Some("poetry".into()),
            ..RawFilters::default()
        };
        assert!(matches!(
            SearchFilters::from_raw(&raw),
            Err(ValidationError::UnsupportedCategory { .. })
        ));
    }

    #[test]
    fn test_non_numeric_values_ignored() {
        let raw = RawFilters {
            category: Some("Science".into()),
            min_rating: Some(json!("high")),
            year: Some(json!("1965")),
            max_pages: Some(json!({"pages": 3})),
            ..RawFilters::default()
        };
        let filters = SearchFilters::from_raw(&raw).unwrap();
        assert_eq!(filters.category, Category::Science);
        assert_eq!(filters.min_rating, None);
        assert_eq!(filters.year, Some(1965));
        assert_eq!(filters.max_pages, None);
    }

    #[test]
    fn test_matches_all_predicates() {
        let filters = SearchFilters::category(Category::Fiction)
            .with_min_rating(4.0)
            .with_max_pages(500)
            .with_year(1965);

        assert!(filters.matches(&book("Fiction", 4.5, 412, "1965-08-01")));
        assert!(!filters.matches(&book("science", 4.5, 412, "1965")));
        assert!(!filters.matches(&book("fiction", 3.9, 412, "1965")));
        assert!(!filters.matches(&book("fiction", 4.5, 900, "1965")));
        assert!(!filters.matches(&book("fiction", 4.5, 412, "1966")));
    }

    #[test]
    fn test_key_distinguishes_filters() {
        let a = SearchFilters::category(Category::Fiction);
        let b = SearchFilters::category(Category::Fiction).with_min_rating(3.0);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), SearchFilters::category(Category::Fiction).key());
    }
}
