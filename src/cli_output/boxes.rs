//! Simple line-based CLI output utilities.

use crate::models::Book;
use crate::search::CatalogStats;
use crate::util::truncate_chars;

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Title column width in book rows.
const TITLE_WIDTH: usize = 32;

/// Print the main header.
///
/// ```text
/// LIBRIS CATALOG
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_header(title: &str) {
    println!();
    println!("{}", title);
    println!("{}", "═".repeat(LINE_WIDTH));
    println!();
}

/// Print a status line.
///
/// ```text
///   ✓ Loaded 12 books
/// ```
pub fn print_status(icon: &str, message: &str) {
    println!("  {} {}", icon, message);
}

/// One row per book, title truncated to fit.
///
/// ```text
///    3  Cosmos                            Carl Sagan   ★ 4.8
/// ```
pub fn format_book_row(book: &Book) -> String {
    format!(
        "{:>4}  {:<width$}  {}  ★ {:.1}",
        book.id,
        truncate_chars(&book.title, TITLE_WIDTH),
        book.author,
        book.rating,
        width = TITLE_WIDTH
    )
}

/// Print a book table, or a note when there is nothing to show.
pub fn print_books(books: &[Book]) {
    if books.is_empty() {
        print_status(icons::WARNING, "No books match");
        return;
    }
    println!("{}", "─".repeat(LINE_WIDTH));
    for book in books {
        println!("{}", format_book_row(book));
    }
    println!("{}", "─".repeat(LINE_WIDTH));
}

/// Print the footer with catalog totals.
///
/// ```text
/// ════════════════════════════════════════════════════════════
///   Showing 3 of 12 books, average rating 4.2
/// ════════════════════════════════════════════════════════════
/// ```
pub fn print_footer(stats: &CatalogStats) {
    println!("{}", "═".repeat(LINE_WIDTH));
    println!(
        "  Showing {} of {} books, average rating {:.1}",
        stats.filtered_books, stats.total_books, stats.rating.average
    );
    println!("{}", "═".repeat(LINE_WIDTH));
}

/// Status icons
pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const FAILURE: &str = "✗";
    pub const WARNING: &str = "⚠";
}
