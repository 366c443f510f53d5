//! Catalog statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{Book, Category};

#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    pub average: f64,
    pub highest: Option<Book>,
    pub lowest: Option<Book>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageStats {
    pub total: u64,
    pub average: f64,
    pub longest: Option<Book>,
    pub shortest: Option<Book>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogStats {
    pub total_books: usize,
    pub filtered_books: usize,
    pub category_counts: BTreeMap<Category, usize>,
    pub rating: RatingStats,
    pub pages: PageStats,
    pub last_updated: DateTime<Utc>,
}

/// Books per category. `All` counts the whole list; every supported
/// category is present, with zero when empty.
pub fn category_counts(books: &[Book]) -> BTreeMap<Category, usize> {
    Category::ALL
        .iter()
        .map(|category| {
            let count = books.iter().filter(|b| category.matches(b)).count();
            (*category, count)
        })
        .collect()
}

/// Summaries over `books`; `filtered` is the size of the current view.
pub fn catalog_stats(books: &[Book], filtered: usize) -> CatalogStats {
    let count = books.len();
    let rating_sum: f64 = books.iter().map(|b| b.rating).sum();
    let page_total: u64 = books.iter().map(|b| u64::from(b.pages)).sum();

    // Ties keep the earliest book
    let highest = books
        .iter()
        .fold(None::<&Book>, |best, b| match best {
            Some(best) if best.rating >= b.rating => Some(best),
            _ => Some(b),
        })
        .cloned();
    let lowest = books
        .iter()
        .fold(None::<&Book>, |best, b| match best {
            Some(best) if best.rating <= b.rating => Some(best),
            _ => Some(b),
        })
        .cloned();
    let longest = books
        .iter()
        .fold(None::<&Book>, |best, b| match best {
            Some(best) if best.pages >= b.pages => Some(best),
            _ => Some(b),
        })
        .cloned();
    let shortest = books
        .iter()
        .fold(None::<&Book>, |best, b| match best {
            Some(best) if best.pages <= b.pages => Some(best),
            _ => Some(b),
        })
        .cloned();

    CatalogStats {
        total_books: count,
        filtered_books: filtered,
        category_counts: category_counts(books),
        rating: RatingStats {
            average: if count > 0 { rating_sum / count as f64 } else { 0.0 },
            highest,
            lowest,
        },
        pages: PageStats {
            total: page_total,
            average: if count > 0 { page_total as f64 / count as f64 } else { 0.0 },
            longest,
            shortest,
        },
        last_updated: Utc::now(),
    }
}
