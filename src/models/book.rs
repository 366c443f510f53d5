use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormatError;

pub const PLACEHOLDER_TITLE: &str = "Untitled";
pub const PLACEHOLDER_AUTHOR: &str = "Unknown author";
pub const DEFAULT_CATEGORY: &str = "general";
pub const DEFAULT_DESCRIPTION: &str = "No description available.";
pub const PLACEHOLDER_COVER: &str = "assets/images/book-placeholder.jpg";
pub const DEFAULT_LANGUAGE: &str = "en";

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// A catalog entry as served by `/api/books`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub category: String,
    pub description: String,
    pub cover: String,
    pub file_path: String,
    pub rating: f64,
    pub pages: u32,
    pub publish_date: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Default for Book {
    fn default() -> Self {
        Self {
            id: 0,
            title: PLACEHOLDER_TITLE.to_string(),
            author: PLACEHOLDER_AUTHOR.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            cover: PLACEHOLDER_COVER.to_string(),
            file_path: String::new(),
            rating: 0.0,
            pages: 0,
            publish_date: String::new(),
            language: DEFAULT_LANGUAGE.to_string(),
            isbn: None,
            tags: Vec::new(),
        }
    }
}

impl Book {
    /// Build a book from a raw JSON record, substituting defaults for
    /// missing or invalid fields. `position` is the record's index in the
    /// list and provides the id when the record has none.
    ///
    /// Only non-object records are rejected.
    pub fn from_value(value: &Value, position: usize) -> Result<Book, FormatError> {
        let record = value.as_object().ok_or_else(|| FormatError::NotAnObject {
            found: FormatError::kind_of(value),
        })?;

        let id = record
            .get("id")
            .and_then(coerce_number)
            .filter(|id| id.fract() == 0.0)
            .map(|id| id as i64)
            .unwrap_or(position as i64 + 1);

        let rating = record
            .get("rating")
            .and_then(coerce_number)
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .unwrap_or(0.0);

        let pages = record
            .get("pages")
            .and_then(coerce_number)
            .filter(|p| *p >= 0.0 && *p <= u32::MAX as f64)
            .map(|p| p as u32)
            .unwrap_or(0);

        let tags = match record.get("tags") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|t| t.as_str())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            _ => Vec::new(),
        };

        Ok(Book {
            id,
            title: text_or(record.get("title"), PLACEHOLDER_TITLE),
            author: text_or(record.get("author"), PLACEHOLDER_AUTHOR),
            category: text_or(record.get("category"), DEFAULT_CATEGORY),
            description: text_or(record.get("description"), DEFAULT_DESCRIPTION),
            cover: text_or(record.get("cover"), PLACEHOLDER_COVER),
            file_path: text_or(record.get("filePath"), ""),
            rating,
            pages,
            publish_date: text_or(record.get("publishDate"), ""),
            language: text_or(record.get("language"), DEFAULT_LANGUAGE),
            isbn: record
                .get("isbn")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            tags,
        })
    }

    /// Publication year, taken from the leading digits of `publish_date`.
    pub fn year(&self) -> Option<i32> {
        let digits: String = self
            .publish_date
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.len() == 4 {
            digits.parse().ok()
        } else {
            None
        }
    }

    /// Lower-cased concatenation of every searchable field.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            &self.title,
            &self.author,
            &self.category,
            &self.description,
        ];
        let id = self.id.to_string();
        parts.push(&id);
        if let Some(isbn) = &self.isbn {
            parts.push(isbn);
        }
        for tag in &self.tags {
            parts.push(tag);
        }
        parts.join(" ").to_lowercase()
    }
}

/// Numeric coercion for loosely typed JSON: numbers pass through, numeric
/// strings are parsed, everything else is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}
