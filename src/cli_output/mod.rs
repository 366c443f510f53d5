//! Line-based terminal output for the CLI commands.

mod boxes;

pub use boxes::*;
