//! # xpld Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout xpld. Every failure
//! ends up as a single human-readable line on standard error and a non-zero
//! exit status; the types here exist so the different failure classes carry
//! precise messages and can be matched on in tests.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `XpldError`: A custom error enum using `thiserror` for the domain cases
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible propagation
//!
//! The error cases cover:
//! - Argument errors (missing source/output/archive path)
//! - Format identification errors (unknown or unsupported format)
//! - Filesystem errors (surface through `anyhow` context chains)
//! - Renderer incompatibility (tree view with an unsupported sort key)
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if source.as_os_str().is_empty() {
//!     return Err(XpldError::MissingArgument("source".into()).into());
//! }
//!
//! // Add context to filesystem errors using anyhow
//! let file = File::open(&path)
//!     .with_context(|| format!("Failed to open archive: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for xpld.
#[derive(Error, Debug)]
pub enum XpldError {
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Cannot identify archive format of '{path}'")]
    UnknownFormat { path: String },

    #[error("Unsupported archive format: {format} cannot be used to {operation}")]
    UnsupportedOperation { format: String, operation: String },

    #[error("{key} sort is unsupported when using `--tree`")]
    UnsupportedTreeSort { key: String },

    #[error("Refusing to extract '{name}': path escapes the output directory")]
    UnsafePath { name: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let missing = XpldError::MissingArgument("output".to_string());
        assert_eq!(missing.to_string(), "Missing required argument: output");

        let tree_sort = XpldError::UnsupportedTreeSort {
            key: "atime".into(),
        };
        assert_eq!(
            tree_sort.to_string(),
            "atime sort is unsupported when using `--tree`"
        );

        let unsupported = XpldError::UnsupportedOperation {
            format: "gz".into(),
            operation: "extract".into(),
        };
        assert_eq!(
            unsupported.to_string(),
            "Unsupported archive format: gz cannot be used to extract"
        );
    }

    #[test]
    fn test_error_downcasts_through_anyhow() {
        let err: anyhow::Error = XpldError::UnknownFormat {
            path: "notes.bin".into(),
        }
        .into();
        let err = err.context("Failed to inspect archive");
        assert!(matches!(
            err.downcast_ref::<XpldError>(),
            Some(XpldError::UnknownFormat { .. })
        ));
    }
}
