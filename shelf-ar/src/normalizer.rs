//! Format Normalizer (Pass 3)
//!
//! Rewrites an author field into surname-first names joined with ", ".
//! Folder attributions are normalized from their own tokens only; other
//! sources may recover single-word co-author fragments from the item's own
//! metadata first.

use crate::names::text::split_names;
use crate::names::{AuthorName, NameDictionary};
use crate::pattern_extractor::{dedupe_folded, recover_by_surname};
use crate::types::{AuthorSource, ItemRecord, RewriteAuthority, COLLECTION_SENTINEL};
use rayon::prelude::*;

/// Separator of a normalized co-author list
pub const NAME_SEPARATOR: &str = ", ";

pub struct FormatNormalizer<'a> {
    dictionary: &'a NameDictionary,
}

impl<'a> FormatNormalizer<'a> {
    pub fn new(dictionary: &'a NameDictionary) -> Self {
        Self { dictionary }
    }

    /// Canonical form of one author field
    ///
    /// Abbreviated fields (containing a dot) and the sentinel come back as-is.
    pub fn normalize_field(&self, field: &str, source: Option<AuthorSource>, metadata: &str) -> String {
        if field.trim().is_empty() || field == COLLECTION_SENTINEL || field.contains('.') {
            return field.to_string();
        }

        let mut names = split_names(field);
        if source != Some(AuthorSource::Folder) && names.len() > 1 {
            names = self.recover_fragments(names, metadata);
        }

        let mut normalized: Vec<String> = names
            .iter()
            .map(|name| AuthorName::parse(name, self.dictionary).normalized())
            .collect();
        dedupe_folded(&mut normalized);
        normalized.join(NAME_SEPARATOR)
    }

    fn recover_fragments(&self, names: Vec<String>, metadata: &str) -> Vec<String> {
        let pool = split_names(metadata);
        names
            .into_iter()
            .flat_map(|name| {
                if name.split_whitespace().count() == 1 {
                    let recovered = recover_by_surname(&name, &pool);
                    if !recovered.is_empty() {
                        return recovered;
                    }
                }
                vec![name]
            })
            .collect()
    }

    /// Normalize one record through the rewrite guard
    pub fn apply(&self, record: &mut ItemRecord) -> bool {
        if record.is_collection() {
            return false;
        }
        let value = self.normalize_field(
            record.proposed_author(),
            record.author_source(),
            record.raw_metadata_authors(),
        );
        record.rewrite_author(value, RewriteAuthority::Normalization)
    }

    /// Normalize every record in parallel; returns the number changed
    pub fn run(&self, records: &mut [ItemRecord]) -> usize {
        records
            .par_iter_mut()
            .filter(|record| !record.is_collection())
            .map(|record| usize::from(self.apply(record)))
            .sum()
    }
}
