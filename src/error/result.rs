//! Result type alias for library operations.

use super::context::ErrorContext;
use super::library_error::LibraryError;

/// Type alias for Results using LibraryError.
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Extension trait for Result types to add context to errors.
pub trait ResultExt<T> {
    /// Add context to an error if the result is Err.
    ///
    /// ```ignore
    /// use libris::error::{ErrorContext, ResultExt};
    ///
    /// let books = client.get_books().await
    ///     .context(ErrorContext::new("initial_load").with_component("app"))?;
    /// ```
    fn context(self, ctx: ErrorContext) -> LibraryResult<T>;

    /// Add context using a closure (only called on error).
    fn with_context<F>(self, f: F) -> LibraryResult<T>
    where
        F: FnOnce() -> ErrorContext;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<LibraryError>,
{
    fn context(self, ctx: ErrorContext) -> LibraryResult<T> {
        self.map_err(|e| e.into().with_context(ctx))
    }

    fn with_context<F>(self, f: F) -> LibraryResult<T>
    where
        F: FnOnce() -> ErrorContext,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
