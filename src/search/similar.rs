//! "More like this" suggestions for the book modal.

use std::cmp::Ordering;

use crate::models::Book;

const SAME_CATEGORY_SCORE: f64 = 5.0;
const SAME_AUTHOR_SCORE: f64 = 8.0;
const RATING_PROXIMITY_MAX: f64 = 3.0;
const PAGES_PROXIMITY_MAX: f64 = 2.0;
const MIN_SIMILARITY: f64 = 2.0;

/// Similarity between `candidate` and `target`.
///
/// Same category and same author add fixed amounts; close ratings add up
/// to 3 and close page counts up to 2.
pub fn similarity(target: &Book, candidate: &Book) -> f64 {
    let mut score = 0.0;
    if candidate.category.eq_ignore_ascii_case(&target.category) {
        score += SAME_CATEGORY_SCORE;
    }
    if candidate.author.to_lowercase() == target.author.to_lowercase() {
        score += SAME_AUTHOR_SCORE;
    }

    let rating_diff = (candidate.rating - target.rating).abs();
    score += (RATING_PROXIMITY_MAX - rating_diff).max(0.0);

    let longest = candidate.pages.max(target.pages);
    let pages_norm = if longest == 0 {
        0.0
    } else {
        f64::from(candidate.pages.abs_diff(target.pages)) / f64::from(longest)
    };
    score += (PAGES_PROXIMITY_MAX - pages_norm * 2.0).max(0.0);

    score
}

/// Up to `limit` books most similar to the book with `target_id`, best first.
/// Empty when the target is not in `books`.
pub fn similar_books(books: &[Book], target_id: i64, limit: usize) -> Vec<Book> {
    let Some(target) = books.iter().find(|b| b.id == target_id) else {
        tracing::debug!("No book {} to find similar books for", target_id);
        return Vec::new();
    };

    let mut scored: Vec<(f64, &Book)> = books
        .iter()
        .filter(|b| b.id != target_id)
        .map(|b| (similarity(target, b), b))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, b)| b.clone())
        .collect()
}
