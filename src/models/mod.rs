mod book;
mod category;
mod theme;

pub use book::{
    coerce_number, Book, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION, DEFAULT_LANGUAGE, MAX_RATING,
    MIN_RATING, PLACEHOLDER_AUTHOR, PLACEHOLDER_COVER, PLACEHOLDER_TITLE,
};
pub use category::Category;
pub use theme::Theme;
