use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SUPPORTED_CATEGORIES;
use crate::error::ValidationError;

use super::Book;

/// The closed set of category filters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Fiction,
    Science,
    History,
    Biography,
    Children,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::All,
        Category::Fiction,
        Category::Science,
        Category::History,
        Category::Biography,
        Category::Children,
    ];

    /// Case-insensitive parse. Anything outside the supported set is a
    /// validation failure.
    pub fn parse(value: &str) -> Result<Category, ValidationError> {
        let normalized = value.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnsupportedCategory {
                value: value.to_string(),
                supported: SUPPORTED_CATEGORIES.join(", "),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Fiction => "fiction",
            Category::Science => "science",
            Category::History => "history",
            Category::Biography => "biography",
            Category::Children => "children",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All books",
            Category::Fiction => "Fiction",
            Category::Science => "Science",
            Category::History => "History",
            Category::Biography => "Biography",
            Category::Children => "Children",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::All => "📚",
            Category::Fiction => "📖",
            Category::Science => "🔬",
            Category::History => "🏛️",
            Category::Biography => "👤",
            Category::Children => "🧸",
        }
    }

    /// Whether `book` belongs to this category.
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            Category::All => true,
            other => book.category.eq_ignore_ascii_case(other.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Category::parse("Science").unwrap(), Category::Science);
        assert_eq!(Category::parse(" ALL ").unwrap(), Category::All);
    }

    #[test]
    fn test_unsupported_category_rejected() {
        let err = Category::parse("poetry").unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedCategory { .. }));
    }

    #[test]
    fn test_as_str_round_trips_supported_list() {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, SUPPORTED_CATEGORIES);
    }
}
