//! shelf-ar library interface
//!
//! Author resolution for hierarchical book collections. The binary and the
//! integration tests both drive [`AuthorPipeline`].

pub mod abbreviations;
pub mod config;
pub mod consensus;
pub mod conversions;
pub mod error;
pub mod folder_cache;
pub mod layout;
pub mod metadata;
pub mod names;
pub mod normalizer;
pub mod pattern_extractor;
pub mod pipeline;
pub mod scanner;
pub mod source_resolver;
pub mod types;

pub use crate::config::{AppConfig, ResolverConfig};
pub use crate::error::{ResolverError, ResolverResult};
pub use crate::pipeline::{AuthorPipeline, Pass, PassStatistics, RunReport};
pub use crate::types::{AuthorSource, ItemInput, ItemRecord, COLLECTION_SENTINEL};
