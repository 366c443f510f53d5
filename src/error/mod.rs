//! Unified error handling for the library catalog.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Domain-specific Errors**: Network, Format, Validation, Storage, Dom and System errors
//! - **Unified Error Type**: `LibraryError` consolidates all error types
//! - **Error Context**: Rich debugging information attached to errors
//! - **Result Type Alias**: `LibraryResult<T>` for consistent return types
//!
//! # Propagation
//!
//! API and search errors are caught at the component boundary, published on
//! the event bus and shown as a non-fatal message with a retry action.
//! Storage errors are logged and swallowed. Only a failure to initialize the
//! core components is fatal.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout | Yes |
//! | Server | Backend errors (5xx), malformed payloads | Yes |
//! | Client | Programming errors | No |
//! | User | Invalid input | No |
//! | Storage | Persistence unavailable | No |
//! | System | OS/filesystem errors | Sometimes |
//! | Configuration | Config issues | No |

mod category;
mod context;
mod dom;
mod format;
mod library_error;
mod network;
mod result;
mod storage;
mod system;
mod validation;

pub use category::ErrorCategory;
pub use context::ErrorContext;
pub use dom::DomError;
pub use format::FormatError;
pub use library_error::LibraryError;
pub use network::{classify_reqwest_error, NetworkError};
pub use result::{LibraryResult, ResultExt};
pub use storage::StorageError;
pub use system::{classify_io_error, SystemError};
pub use validation::ValidationError;
