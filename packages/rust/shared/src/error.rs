//! Error types for Unsloppable.
//!
//! Library crates use [`UnsloppableError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Two of the variants are recoverable per-record conditions
//! ([`UnsloppableError::RecordParse`] and [`UnsloppableError::TemplateBinding`]);
//! the pipeline turns them into skipped records instead of aborting.

use std::path::PathBuf;

/// Top-level error type for all Unsloppable operations.
#[derive(Debug, thiserror::Error)]
pub enum UnsloppableError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The input directory does not exist or is not a directory.
    #[error("analysis source unavailable: {path:?} is not a readable directory")]
    SourceUnavailable { path: PathBuf },

    /// One input file could not be turned into a record.
    #[error("failed to parse {path:?}: {message}")]
    RecordParse { path: PathBuf, message: String },

    /// One record could not be bound to its template.
    #[error("template binding failed for {ticker}: {message}")]
    TemplateBinding { ticker: String, message: String },

    /// A template source failed to compile.
    #[error("template error: {0}")]
    Template(String),

    /// Writing into the output directory failed.
    #[error("failed to write {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two tickers normalize to the same page filename.
    #[error("tickers {first:?} and {second:?} both map to page slug {slug:?}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },

    /// Nothing survived loading and rendering.
    #[error("no usable analysis records in {input_dir:?} ({skipped} skipped)")]
    NoUsableRecords { input_dir: PathBuf, skipped: usize },

    /// Filesystem I/O error outside the output directory.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, UnsloppableError>;

impl UnsloppableError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a record parse error for the given input file.
    pub fn record_parse(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::RecordParse {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a template binding error for the given ticker.
    pub fn template_binding(ticker: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::TemplateBinding {
            ticker: ticker.into(),
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a `std::io::Error` raised while writing site output.
    pub fn output_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }

    /// Whether the pipeline may skip the affected record and keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RecordParse { .. } | Self::TemplateBinding { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = UnsloppableError::config("input_dir must not be empty");
        assert_eq!(err.to_string(), "config error: input_dir must not be empty");

        let err = UnsloppableError::template_binding("AAPL", "Variable `x` not found");
        assert!(err.to_string().contains("AAPL"));
        assert!(err.to_string().contains("Variable `x`"));
    }

    #[test]
    fn slug_collision_names_both_tickers() {
        let err = UnsloppableError::SlugCollision {
            slug: "brk-b".into(),
            first: "BRK.B".into(),
            second: "BRK-B".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("BRK.B"));
        assert!(msg.contains("BRK-B"));
        assert!(msg.contains("brk-b"));
    }

    #[test]
    fn only_per_record_errors_are_recoverable() {
        assert!(UnsloppableError::record_parse("a.md", "no title").is_recoverable());
        assert!(UnsloppableError::template_binding("A", "boom").is_recoverable());
        assert!(!UnsloppableError::SourceUnavailable { path: "x".into() }.is_recoverable());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!UnsloppableError::output_write("docs/index.html", io).is_recoverable());
    }
}
