//! Consensus Resolver (Pass 4)
//!
//! Groups items by parent directory. Within a group, items not attributed by
//! a folder (and not carrying the sentinel) adopt the most frequent author
//! among them; ties go to the value seen first. Runs as a barrier over the
//! whole batch.

use crate::types::ItemRecord;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Groups smaller than this are left as resolved
pub const MIN_CONSENSUS_GROUP: usize = 2;

/// Most frequent value; ties broken by first occurrence
pub fn majority<'v, I>(values: I) -> Option<&'v str>
where
    I: IntoIterator<Item = &'v str>,
{
    let mut counts: Vec<(&'v str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    // max_by_key returns the last maximum; iterate reversed to keep the first
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(value, _)| value)
}

#[derive(Debug, Clone, Copy)]
pub struct ConsensusResolver {
    min_group: usize,
}

impl Default for ConsensusResolver {
    fn default() -> Self {
        Self {
            min_group: MIN_CONSENSUS_GROUP,
        }
    }
}

impl ConsensusResolver {
    pub fn new(min_group: usize) -> Self {
        Self {
            min_group: min_group.max(1),
        }
    }

    /// Apply directory majorities; returns the number of records changed
    pub fn run(&self, records: &mut [ItemRecord]) -> usize {
        let mut order: Vec<PathBuf> = Vec::new();
        let mut groups: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            if record.is_folder_sourced() || record.is_collection() || record.proposed_author().is_empty() {
                continue;
            }
            let dir = record.parent_dir().to_path_buf();
            groups
                .entry(dir.clone())
                .or_insert_with(|| {
                    order.push(dir);
                    Vec::new()
                })
                .push(idx);
        }

        let mut changed = 0;
        for dir in order {
            let Some(members) = groups.get(&dir) else {
                continue;
            };
            if members.len() < self.min_group {
                continue;
            }
            let winner = match majority(members.iter().map(|&i| records[i].proposed_author())) {
                Some(value) => value.to_string(),
                None => continue,
            };
            debug!(dir = %dir.display(), members = members.len(), winner = %winner, "Directory consensus");
            for &idx in members {
                if records[idx].adopt_consensus(&winner) {
                    changed += 1;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorSource, ItemInput, COLLECTION_SENTINEL};

    fn record(path: &str, author: &str, source: AuthorSource) -> ItemRecord {
        ItemRecord::attributed(ItemInput::new(path, "", ""), author, source)
    }

    /// **[TC-U-CONS-010-01]** Unit test: Verify majority with first-seen tie-break
    #[test]
    fn tc_u_cons_010_01_majority() {
        assert_eq!(majority(["A", "B", "A", "A", "C"]), Some("A"));
        assert_eq!(majority(["B", "A", "C"]), Some("B"));
        assert_eq!(majority(["C", "B", "B", "C"]), Some("C"));
        assert_eq!(majority(std::iter::empty::<&str>()), None);
    }

    /// **[TC-U-CONS-020-01]** Unit test: Verify group of five converges on the majority
    #[test]
    fn tc_u_cons_020_01_group_converges() {
        let mut records: Vec<ItemRecord> = ["A", "B", "A", "A", "C"]
            .iter()
            .enumerate()
            .map(|(i, author)| record(&format!("shelf/{i}.fb2"), author, AuthorSource::Filename))
            .collect();

        let changed = ConsensusResolver::default().run(&mut records);

        assert_eq!(changed, 5);
        for rec in &records {
            assert_eq!(rec.proposed_author(), "A");
            assert_eq!(rec.author_source(), Some(AuthorSource::Consensus));
        }
    }

    /// **[TC-U-CONS-030-01]** Unit test: Verify folder and sentinel records are excluded
    #[test]
    fn tc_u_cons_030_01_excluded_records() {
        let mut records = vec![
            record("shelf/1.fb2", "Волков Тим", AuthorSource::Folder),
            record("shelf/2.fb2", "Кулагин Ян", AuthorSource::Metadata),
            record("shelf/3.fb2", "Кулагин Ян", AuthorSource::Filename),
            record("shelf/4.fb2", "Петров Иван", AuthorSource::Filename),
            record("shelf/5.fb2", COLLECTION_SENTINEL, AuthorSource::Metadata),
        ];

        ConsensusResolver::default().run(&mut records);

        assert_eq!(records[0].proposed_author(), "Волков Тим");
        assert_eq!(records[0].author_source(), Some(AuthorSource::Folder));
        assert_eq!(records[3].proposed_author(), "Кулагин Ян");
        assert!(records[4].is_collection());
        assert_eq!(records[4].author_source(), Some(AuthorSource::Metadata));
    }

    /// **[TC-U-CONS-040-01]** Unit test: Verify lone items and separate directories stay apart
    #[test]
    fn tc_u_cons_040_01_groups_are_per_directory() {
        let mut records = vec![
            record("a/1.fb2", "Петров Иван", AuthorSource::Filename),
            record("b/1.fb2", "Орлов Борис", AuthorSource::Filename),
            record("b/2.fb2", "Орлов Борис", AuthorSource::Metadata),
        ];

        let changed = ConsensusResolver::default().run(&mut records);

        assert_eq!(changed, 2);
        assert_eq!(records[0].author_source(), Some(AuthorSource::Filename));
        assert_eq!(records[1].author_source(), Some(AuthorSource::Consensus));
    }
}
