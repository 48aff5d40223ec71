//! Abbreviation Expander (Pass 6)
//!
//! Two phases. [`SurnameIndex::build`] runs once over the finished batch;
//! expansion then reads the index concurrently and never writes to it.
//! "С.Гоблин" and "Гоблин С." expand only when the index holds exactly one
//! full name for the surname and its given name fits the initial.

use crate::error::ResolverResult;
use crate::names::text::{fold, split_names, unify_yo};
use crate::names::{AuthorName, NameDictionary};
use crate::types::{ItemRecord, RewriteAuthority};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

const ABBREVIATION_PATTERN: &str = r"^(?:(?P<lead>(?:\p{Lu}\.\s*){1,2})(?P<lead_surname>\p{Lu}[\p{L}-]+)|(?P<trail_surname>\p{Lu}[\p{L}-]+)\s+(?P<trail>(?:\p{Lu}\.\s*){1,2}))$";

/// Folded surname → distinct full names
#[derive(Debug, Default)]
pub struct SurnameIndex {
    by_surname: HashMap<String, Vec<String>>,
}

impl SurnameIndex {
    /// Index every non-sentinel, non-abbreviated author and every raw
    /// metadata name of the batch
    pub fn build(records: &[ItemRecord], dictionary: &NameDictionary) -> Self {
        let mut index = Self::default();
        for record in records {
            if !record.is_collection() {
                for name in split_names(record.proposed_author()) {
                    index.insert(&name, dictionary);
                }
            }
            for name in split_names(&unify_yo(record.raw_metadata_authors())) {
                index.insert(&name, dictionary);
            }
        }
        index
    }

    fn insert(&mut self, name: &str, dictionary: &NameDictionary) {
        if name.contains('.') {
            return;
        }
        let parsed = AuthorName::parse(name, dictionary);
        let (Some(surname), Some(_)) = (parsed.surname(), parsed.given()) else {
            return;
        };
        let full = parsed.normalized();
        let entries = self.by_surname.entry(fold(surname)).or_default();
        if !entries.iter().any(|e| fold(e) == fold(&full)) {
            entries.push(full);
        }
    }

    pub fn lookup(&self, surname: &str) -> &[String] {
        self.by_surname
            .get(&fold(surname))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_surname.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_surname.is_empty()
    }
}

pub struct AbbreviationExpander<'a> {
    index: &'a SurnameIndex,
    dictionary: &'a NameDictionary,
    pattern: Regex,
}

impl<'a> AbbreviationExpander<'a> {
    pub fn new(index: &'a SurnameIndex, dictionary: &'a NameDictionary) -> ResolverResult<Self> {
        Ok(Self {
            index,
            dictionary,
            pattern: Regex::new(ABBREVIATION_PATTERN)?,
        })
    }

    /// Unique full name for one abbreviated name
    pub fn expand_name(&self, name: &str) -> Option<String> {
        let caps = self.pattern.captures(name.trim())?;
        let (initials, surname) = match (caps.name("lead"), caps.name("lead_surname")) {
            (Some(initials), Some(surname)) => (initials.as_str(), surname.as_str()),
            _ => (caps.name("trail")?.as_str(), caps.name("trail_surname")?.as_str()),
        };

        let [candidate] = self.index.lookup(surname) else {
            debug!(name, "No unique full name for abbreviation");
            return None;
        };

        let initial = initials.chars().next().map(|c| fold(&c.to_string()))?;
        let parsed = AuthorName::parse(candidate, self.dictionary);
        let given_initial = parsed.given()?.chars().next().map(|c| fold(&c.to_string()))?;
        (initial == given_initial).then(|| candidate.clone())
    }

    /// Expand every abbreviated name of a field; `None` if nothing expanded
    pub fn expand_field(&self, field: &str) -> Option<String> {
        if !field.contains('.') {
            return None;
        }
        let separator = if field.contains(';') { "; " } else { ", " };
        let mut hit = false;
        let names: Vec<String> = split_names(field)
            .into_iter()
            .map(|name| {
                if name.contains('.') {
                    if let Some(full) = self.expand_name(&name) {
                        hit = true;
                        return full;
                    }
                }
                name
            })
            .collect();
        hit.then(|| names.join(separator))
    }

    pub fn apply(&self, record: &mut ItemRecord) -> bool {
        if record.is_collection() {
            return false;
        }
        match self.expand_field(record.proposed_author()) {
            Some(expanded) => record.rewrite_author(expanded, RewriteAuthority::Expansion),
            None => false,
        }
    }

    pub fn run(&self, records: &mut [ItemRecord]) -> usize {
        records
            .par_iter_mut()
            .map(|record| usize::from(self.apply(record)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorSource, ItemInput};

    fn record(path: &str, author: &str, metadata: &str, source: AuthorSource) -> ItemRecord {
        ItemRecord::attributed(ItemInput::new(path, metadata, ""), author, source)
    }

    /// **[TC-U-ABBR-010-01]** Unit test: Verify unique surname expands
    #[test]
    fn tc_u_abbr_010_01_unique_expansion() {
        let dict = NameDictionary::default();
        let mut records = vec![
            record("a/1.fb2", "Харников Александр", "", AuthorSource::Filename),
            record("b/2.fb2", "А.Харников", "", AuthorSource::Filename),
            record("c/3.fb2", "Харников А.", "", AuthorSource::Metadata),
        ];

        let index = SurnameIndex::build(&records, &dict);
        let expander = AbbreviationExpander::new(&index, &dict).unwrap();
        assert_eq!(expander.run(&mut records), 2);

        assert_eq!(records[1].proposed_author(), "Харников Александр");
        assert_eq!(records[2].proposed_author(), "Харников Александр");
    }

    /// **[TC-U-ABBR-020-01]** Unit test: Verify unknown or ambiguous abbreviations stay literal
    #[test]
    fn tc_u_abbr_020_01_ambiguity_safety() {
        let dict = NameDictionary::default();
        let mut records = vec![
            record("a/1.fb2", "С.Гоблин", "", AuthorSource::Filename),
            record("b/1.fb2", "Петров Иван", "Сергей Петров", AuthorSource::Filename),
            record("b/2.fb2", "С.Петров", "", AuthorSource::Filename),
        ];

        let index = SurnameIndex::build(&records, &dict);
        let expander = AbbreviationExpander::new(&index, &dict).unwrap();
        assert_eq!(expander.run(&mut records), 0);

        assert_eq!(records[0].proposed_author(), "С.Гоблин");
        assert_eq!(records[2].proposed_author(), "С.Петров");
    }

    /// **[TC-U-ABBR-020-02]** Unit test: Verify mismatched initial is not expanded
    #[test]
    fn tc_u_abbr_020_02_initial_must_fit() {
        let dict = NameDictionary::default();
        let records = vec![record("a/1.fb2", "Орлов Борис", "", AuthorSource::Filename)];
        let index = SurnameIndex::build(&records, &dict);
        let expander = AbbreviationExpander::new(&index, &dict).unwrap();

        assert_eq!(expander.expand_name("Б.Орлов").as_deref(), Some("Орлов Борис"));
        assert_eq!(expander.expand_name("К.Орлов"), None);
    }

    /// **[TC-U-ABBR-030-01]** Unit test: Verify folder abbreviation is never expanded
    #[test]
    fn tc_u_abbr_030_01_folder_not_expanded() {
        let dict = NameDictionary::default();
        let mut records = vec![
            record("Б.Орлов/1.fb2", "Б.Орлов", "", AuthorSource::Folder),
            record("x/2.fb2", "Орлов Борис", "", AuthorSource::Filename),
        ];
        let index = SurnameIndex::build(&records, &dict);
        let expander = AbbreviationExpander::new(&index, &dict).unwrap();

        assert_eq!(expander.run(&mut records), 0);
        assert_eq!(records[0].proposed_author(), "Б.Орлов");
    }
}
