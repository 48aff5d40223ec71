//! Surname conversion table and the Canonicalization Mapper (Pass 5)
//!
//! The table is applied twice: to every Pass 1 attribution, so consensus
//! votes on converted spellings, and again in Pass 5 followed by a re-run of
//! Pass 3 normalization, since a conversion may introduce new tokens or flip
//! order. Lookups are exact: the whole field, then each name of a co-author
//! list, then the last or first word of a multi-word name. The table is the
//! only source allowed to change the tokens of a folder attribution.

use crate::names::text::split_names;
use crate::normalizer::FormatNormalizer;
use crate::types::{ItemRecord, RewriteAuthority, COLLECTION_SENTINEL};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Literal author rewrites
#[derive(Debug, Clone, Copy)]
pub struct SurnameConversions<'a> {
    table: &'a BTreeMap<String, String>,
}

impl<'a> SurnameConversions<'a> {
    pub fn new(table: &'a BTreeMap<String, String>) -> Self {
        Self { table }
    }

    /// Converted field, or `None` when no entry applies
    pub fn convert(&self, field: &str) -> Option<String> {
        let field = field.trim();
        if self.table.is_empty() || field.is_empty() || field == COLLECTION_SENTINEL {
            return None;
        }
        if let Some(target) = self.table.get(field) {
            return Some(target.clone());
        }

        let separator = if field.contains(';') { "; " } else { ", " };
        let mut hit = false;
        let names: Vec<String> = split_names(field)
            .into_iter()
            .map(|name| match self.convert_name(&name) {
                Some(converted) => {
                    hit = true;
                    converted
                }
                None => name,
            })
            .collect();
        hit.then(|| names.join(separator))
    }

    /// Whole name, else its last word, else its first word
    fn convert_name(&self, name: &str) -> Option<String> {
        if let Some(target) = self.table.get(name) {
            return Some(target.clone());
        }

        let mut words: Vec<&str> = name.split_whitespace().collect();
        if words.len() < 2 {
            return None;
        }
        let last = words.len() - 1;
        let position = if self.table.contains_key(words[last]) {
            last
        } else if self.table.contains_key(words[0]) {
            0
        } else {
            return None;
        };
        let target = self.table.get(words[position])?;
        words[position] = target.as_str();
        Some(words.join(" "))
    }
}

pub struct CanonicalizationMapper<'a> {
    conversions: SurnameConversions<'a>,
    normalizer: &'a FormatNormalizer<'a>,
}

impl<'a> CanonicalizationMapper<'a> {
    pub fn new(table: &'a BTreeMap<String, String>, normalizer: &'a FormatNormalizer<'a>) -> Self {
        Self {
            conversions: SurnameConversions::new(table),
            normalizer,
        }
    }

    pub fn convert(&self, field: &str) -> Option<String> {
        self.conversions.convert(field)
    }

    /// Convert then normalize one record; returns true if the field changed
    pub fn apply(&self, record: &mut ItemRecord) -> bool {
        if record.is_collection() || record.proposed_author().is_empty() {
            return false;
        }

        let mut changed = false;
        if let Some(converted) = self.convert(record.proposed_author()) {
            debug!(
                path = %record.path().display(),
                from = record.proposed_author(),
                to = %converted,
                "Conversion table hit"
            );
            changed |= record.rewrite_author(converted, RewriteAuthority::Conversion);
        }
        changed |= self.normalizer.apply(record);
        changed
    }

    pub fn run(&self, records: &mut [ItemRecord]) -> usize {
        records
            .par_iter_mut()
            .map(|record| usize::from(self.apply(record)))
            .sum()
    }
}
