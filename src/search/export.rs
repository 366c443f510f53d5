//! CSV and JSON export of a book list.

use std::fmt;
use std::str::FromStr;

use crate::error::{LibraryResult, ValidationError};
use crate::models::Book;

const CSV_HEADERS: [&str; 7] = ["ID", "Title", "Author", "Category", "Rating", "Pages", "Language"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ValidationError::InvalidField {
                field: "format".to_string(),
                message: format!("unsupported export format '{}'", other),
            }),
        }
    }
}

/// Render `books` in `format`.
pub fn export_books(books: &[Book], format: ExportFormat) -> LibraryResult<String> {
    tracing::debug!("Exporting {} books as {}", books.len(), format);
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(books)?),
        ExportFormat::Csv => Ok(to_csv(books)),
    }
}

fn to_csv(books: &[Book]) -> String {
    let mut lines = vec![CSV_HEADERS.join(",")];
    for book in books {
        lines.push(
            [
                book.id.to_string(),
                quote(&book.title),
                quote(&book.author),
                book.category.clone(),
                book.rating.to_string(),
                book.pages.to_string(),
                book.language.clone(),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune, \"Part One\"".to_string(),
            author: "Frank Herbert".to_string(),
            category: "fiction".to_string(),
            rating: 4.5,
            pages: 412,
            ..Book::default()
        }
    }

    #[test]
    fn test_csv() {
        let csv = export_books(&[dune()], ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Title,Author,Category,Rating,Pages,Language");
        assert_eq!(
            lines[1],
            r#"1,"Dune, ""Part One""","Frank Herbert",fiction,4.5,412,en"#
        );
    }

    #[test]
    fn test_json_uses_wire_field_names() {
        let json = export_books(&[dune()], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["filePath"], "");
        assert_eq!(value[0]["pages"], 412);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
