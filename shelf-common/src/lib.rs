//! # Shelf Common Library
//!
//! Shared code for the Shelf library-maintenance tools:
//! - Common error and result types
//! - TOML configuration discovery, loading and atomic write-back
//! - Logging configuration block shared by every binary

pub mod config;
pub mod error;

pub use error::{Error, Result};
