//! Author resolution errors
//!
//! The pipeline passes themselves never fail; only construction (layout
//! compilation) and the collaborators (walker, manifest) report errors.

use crate::scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

/// Author resolution errors
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A configured layout pattern could not be compiled
    #[error("Invalid layout pattern '{pattern}': {source}")]
    InvalidLayout {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Built-in expression failed to compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A configured layout pattern declares no author slot
    #[error("Layout pattern '{0}' has no author group")]
    LayoutWithoutAuthor(String),

    /// Metadata manifest could not be read or parsed
    #[error("Manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// File walker failure
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Shared config/IO failure
    #[error(transparent)]
    Common(#[from] shelf_common::Error),
}

/// Result type alias for author resolution
pub type ResolverResult<T> = std::result::Result<T, ResolverError>;
