//! Source Resolver (Pass 1)
//!
//! Strict priority, first success wins: ancestor directory, own file name,
//! embedded metadata, collection sentinel. The winning value passes through
//! the surname conversion table before it is recorded.

use crate::conversions::SurnameConversions;
use crate::folder_cache::FolderAttributionCache;
use crate::names::text::{clean_fragment, fold, split_names, unify_yo};
use crate::names::{AuthorName, NameDictionary};
use crate::pattern_extractor::{PatternExtractor, SiblingMetadata};
use crate::types::{AuthorSource, ItemRecord, COLLECTION_SENTINEL};
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

/// Outcome of Pass 1 for one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub author: String,
    pub source: AuthorSource,
}

impl Resolution {
    fn new(author: impl Into<String>, source: AuthorSource) -> Self {
        Self {
            author: author.into(),
            source,
        }
    }
}

/// Ancestor directories of an item path, nearest first, at most `depth_limit`
pub fn ancestor_dirs(path: &Path, depth_limit: usize) -> impl Iterator<Item = &Path> {
    path.parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .filter(|dir| dir.file_name().is_some())
        .take(depth_limit)
}

/// Pass 1 resolver; shares the warmed folder cache read-only
pub struct SourceResolver<'a> {
    depth_limit: usize,
    max_metadata_authors: usize,
    dictionary: &'a NameDictionary,
    folders: &'a FolderAttributionCache,
    extractor: &'a PatternExtractor<'a>,
    siblings: &'a SiblingMetadata,
    conversions: SurnameConversions<'a>,
}

impl<'a> SourceResolver<'a> {
    pub fn new(
        depth_limit: usize,
        max_metadata_authors: usize,
        dictionary: &'a NameDictionary,
        folders: &'a FolderAttributionCache,
        extractor: &'a PatternExtractor<'a>,
        siblings: &'a SiblingMetadata,
        conversions: SurnameConversions<'a>,
    ) -> Self {
        Self {
            depth_limit,
            max_metadata_authors,
            dictionary,
            folders,
            extractor,
            siblings,
            conversions,
        }
    }

    /// Prioritized attribution with the conversion table applied
    pub fn resolve(&self, record: &ItemRecord) -> Resolution {
        let mut resolution = self.prioritized(record);
        if let Some(converted) = self.conversions.convert(&resolution.author) {
            debug!(
                path = %record.path().display(),
                from = %resolution.author,
                to = %converted,
                "Conversion table hit"
            );
            resolution.author = converted;
        }
        resolution
    }

    fn prioritized(&self, record: &ItemRecord) -> Resolution {
        let path = record.path();

        for dir in ancestor_dirs(path, self.depth_limit) {
            if let Some(Some(attribution)) = self.folders.lookup(dir) {
                return Resolution::new(attribution.author.clone(), AuthorSource::Folder);
            }
        }

        let stem = record.file_stem();
        let siblings = self.siblings.names_in(record.parent_dir());
        if let Some(extraction) = self.extractor.extract(&stem, record.raw_metadata_authors(), siblings) {
            return Resolution::new(extraction.joined(), AuthorSource::Filename);
        }

        match self.metadata_authors(record.raw_metadata_authors()) {
            Some(author) => Resolution::new(author, AuthorSource::Metadata),
            None => {
                debug!(path = %path.display(), "No source names an author");
                Resolution::new(COLLECTION_SENTINEL, AuthorSource::Metadata)
            }
        }
    }

    /// Cleaned metadata names, or the sentinel for anthologies
    fn metadata_authors(&self, raw: &str) -> Option<String> {
        let mut names: Vec<String> = Vec::new();
        for name in split_names(&unify_yo(raw)) {
            let cleaned = clean_fragment(&name);
            if !AuthorName::parse(&cleaned, self.dictionary).is_valid() {
                continue;
            }
            if !names.iter().any(|n| fold(n) == fold(&cleaned)) {
                names.push(cleaned);
            }
        }

        if names.is_empty() {
            return None;
        }
        if names.len() > self.max_metadata_authors {
            debug!(count = names.len(), "Metadata lists an anthology");
            return Some(COLLECTION_SENTINEL.to_string());
        }
        Some(names.join("; "))
    }

    /// Attribute every record in parallel; returns the number attributed
    pub fn run(&self, records: &mut [ItemRecord]) -> usize {
        records
            .par_iter_mut()
            .map(|record| {
                let resolution = self.resolve(record);
                record.attribute(resolution.author, resolution.source);
                1
            })
            .sum()
    }
}
