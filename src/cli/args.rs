//! Command-line argument parsing for libris.
//!
//! ```text
//! libris [serve] [--port N] [--public-dir DIR]
//! libris browse [--api URL] [--category C] [QUERY...]
//! libris --version
//! ```

use std::path::PathBuf;

use crate::error::ValidationError;

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Print usage
    Help,
    /// Run the HTTP server (default). `None` fields fall back to config.
    Serve {
        port: Option<u16>,
        public_dir: Option<PathBuf>,
    },
    /// Load the catalog from a running server and print matching books.
    Browse {
        api: Option<String>,
        category: Option<String>,
        query: String,
    },
}

/// Usage text for `--help`.
pub const USAGE: &str = "\
Usage:
  libris [serve] [--port N] [--public-dir DIR]
  libris browse [--api URL] [--category C] [QUERY...]
  libris --version";

/// Parse command-line arguments.
///
/// The first item is the program name and is skipped.
///
/// # Examples
///
/// ```
/// use libris::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["libris".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).unwrap(), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ValidationError>
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1).peekable();

    let browse = match args.peek().map(String::as_str) {
        Some("browse") => {
            args.next();
            true
        }
        Some("serve") => {
            args.next();
            false
        }
        _ => false,
    };

    let mut port = None;
    let mut public_dir = None;
    let mut api = None;
    let mut category = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--port" | "-p" if !browse => {
                let value = required_value(&arg, args.next())?;
                port = Some(value.parse::<u16>().map_err(|_| ValidationError::InvalidField {
                    field: "port".to_string(),
                    message: format!("'{}' is not a valid port", value),
                })?);
            }
            "--public-dir" if !browse => {
                public_dir = Some(PathBuf::from(required_value(&arg, args.next())?));
            }
            "--api" if browse => api = Some(required_value(&arg, args.next())?),
            "--category" | "-c" if browse => {
                category = Some(required_value(&arg, args.next())?)
            }
            other if browse && !other.starts_with('-') => words.push(arg),
            other => {
                return Err(ValidationError::InvalidField {
                    field: "argument".to_string(),
                    message: format!("unexpected '{}'", other),
                })
            }
        }
    }

    if browse {
        Ok(CliCommand::Browse {
            api,
            category,
            query: words.join(" "),
        })
    } else {
        Ok(CliCommand::Serve { port, public_dir })
    }
}

fn required_value(flag: &str, value: Option<String>) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::InvalidField {
        field: flag.trim_start_matches('-').to_string(),
        message: "missing value".to_string(),
    })
}
