//! Pattern Extractor (Pass 2, file-name path)
//!
//! Matches a file-name stem against the file layout library, cleans the
//! captured author text and expands it into full names, recovering
//! surname-only fragments from the item's own metadata and from the metadata
//! of its siblings.

use crate::layout::LayoutLibrary;
use crate::names::text::{clean_fragment, fold, split_names, surname_stem, unify_yo};
use crate::names::{AuthorName, NameDictionary};
use crate::types::ItemRecord;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names recovered from a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Normalized, deduplicated, alphabetically sorted
    pub names: Vec<String>,
    /// Layout that matched
    pub layout: String,
}

impl Extraction {
    /// Field value: names joined with "; "
    pub fn joined(&self) -> String {
        self.names.join("; ")
    }
}

/// Metadata author names of every item, grouped by parent directory
#[derive(Debug, Default)]
pub struct SiblingMetadata {
    by_dir: HashMap<PathBuf, Vec<String>>,
}

impl SiblingMetadata {
    pub fn build(records: &[ItemRecord]) -> Self {
        let mut by_dir: HashMap<PathBuf, Vec<String>> = HashMap::new();
        for record in records {
            let names = by_dir.entry(record.parent_dir().to_path_buf()).or_default();
            for name in split_names(&unify_yo(record.raw_metadata_authors())) {
                if !names.iter().any(|n| fold(n) == fold(&name)) {
                    names.push(name);
                }
            }
        }
        Self { by_dir }
    }

    pub fn names_in(&self, dir: &Path) -> &[String] {
        self.by_dir.get(dir).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Every pool name carrying a word with the same surname stem as `token`
///
/// Collects all matches: co-authors may share a surname.
pub fn recover_by_surname(token: &str, pool: &[String]) -> Vec<String> {
    let stem = surname_stem(token);
    if stem.is_empty() {
        return Vec::new();
    }
    let mut found: Vec<String> = Vec::new();
    for candidate in pool {
        let words: Vec<&str> = candidate.split_whitespace().collect();
        if words.len() < 2 {
            continue;
        }
        let shares_stem = words.iter().any(|w| surname_stem(w) == stem);
        if shares_stem && !found.iter().any(|f| fold(f) == fold(candidate)) {
            found.push(candidate.clone());
        }
    }
    found
}

/// Complete a multi-word name from the pool
///
/// Same words in another order keep the file-name order; a pool name that
/// strictly contains every word wins; anything else keeps the file name.
fn complete_from_pool(token: &str, pool: &[String]) -> String {
    let mut words = folded_words(token);
    words.sort();
    for candidate in pool {
        let mut other = folded_words(candidate);
        other.sort();
        if other == words {
            return token.to_string();
        }
        if other.len() > words.len() && is_sub_multiset(&words, &other) {
            return candidate.clone();
        }
    }
    token.to_string()
}

fn folded_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(fold).collect()
}

fn is_sub_multiset(small: &[String], large: &[String]) -> bool {
    let mut remaining: Vec<&String> = large.iter().collect();
    small.iter().all(|word| match remaining.iter().position(|w| *w == word) {
        Some(idx) => {
            remaining.swap_remove(idx);
            true
        }
        None => false,
    })
}

/// Pass 2 extractor
pub struct PatternExtractor<'a> {
    layouts: &'a LayoutLibrary,
    dictionary: &'a NameDictionary,
}

impl<'a> PatternExtractor<'a> {
    pub fn new(layouts: &'a LayoutLibrary, dictionary: &'a NameDictionary) -> Self {
        Self {
            layouts,
            dictionary,
        }
    }

    /// Extract author names from a file-name stem
    ///
    /// `None` when no layout matches or the best match yields no usable name.
    pub fn extract(&self, stem: &str, own_metadata: &str, siblings: &[String]) -> Option<Extraction> {
        let best = self.layouts.best_match(stem)?;
        let cleaned = unify_yo(&clean_fragment(best.author()?));
        if cleaned.is_empty() || self.dictionary.is_noise(&cleaned) {
            debug!(stem, "File-name author is empty or noise");
            return None;
        }

        let mut tokens = split_names(&cleaned);
        dedupe_folded(&mut tokens);

        let mut pool = split_names(&unify_yo(own_metadata));
        pool.extend(siblings.iter().cloned());
        dedupe_folded(&mut pool);

        let mut names = Vec::new();
        for token in tokens {
            let candidate = AuthorName::parse(&token, self.dictionary);
            if !candidate.looks_like_person(self.dictionary, true) {
                debug!(stem, token = %token, "Dropping non-name token");
                continue;
            }
            let single_word = token.split_whitespace().count() == 1 && !token.contains(['.', '(']);
            if single_word {
                let recovered = recover_by_surname(&token, &pool);
                if recovered.is_empty() {
                    names.push(candidate.normalized());
                } else {
                    debug!(stem, token = %token, recovered = ?recovered, "Recovered surname from metadata");
                    names.extend(recovered.iter().map(|n| self.normalize(n)));
                }
            } else {
                names.push(self.normalize(&complete_from_pool(&token, &pool)));
            }
        }

        dedupe_folded(&mut names);
        if names.is_empty() {
            return None;
        }
        names.sort_by_key(|n| fold(n));

        Some(Extraction {
            names,
            layout: best.layout().pattern().to_string(),
        })
    }

    fn normalize(&self, name: &str) -> String {
        AuthorName::parse(name, self.dictionary).normalized()
    }
}

/// Remove case/ё-insensitive duplicates, keeping first occurrences
pub fn dedupe_folded(items: &mut Vec<String>) {
    let mut seen: Vec<String> = Vec::with_capacity(items.len());
    items.retain(|item| {
        let key = fold(item);
        if seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::layout::LayoutKind;

    struct Fixture {
        layouts: LayoutLibrary,
        dict: NameDictionary,
    }

    impl Fixture {
        fn new() -> Self {
            let config = ResolverConfig::default();
            Self {
                layouts: LayoutLibrary::compile(LayoutKind::File, &config.file_layouts).unwrap(),
                dict: NameDictionary::from_config(&config),
            }
        }

        fn extract(&self, stem: &str, metadata: &str, siblings: &[&str]) -> Option<String> {
            let siblings: Vec<String> = siblings.iter().map(|s| s.to_string()).collect();
            PatternExtractor::new(&self.layouts, &self.dict)
                .extract(stem, metadata, &siblings)
                .map(|e| e.joined())
        }
    }

    /// **[TC-U-PATX-010-01]** Unit test: Verify co-author list is sorted
    #[test]
    fn tc_u_patx_010_01_sorted_output() {
        let fx = Fixture::new();
        assert_eq!(
            fx.extract("Орлов Борис, Земляной Андрей - Позывной", "", &[]).as_deref(),
            Some("Земляной Андрей; Орлов Борис")
        );
        assert_eq!(
            fx.extract("Земляной Андрей, Орлов Борис - Позывной", "", &[]).as_deref(),
            Some("Земляной Андрей; Орлов Борис")
        );
    }

    /// **[TC-U-PATX-020-01]** Unit test: Verify surname-only recovery collects all matches
    #[test]
    fn tc_u_patx_020_01_recovers_all_co_authors() {
        let fx = Fixture::new();
        assert_eq!(
            fx.extract("Белаш - Тени", "Людмила Белаш; Александр Белаш", &[]).as_deref(),
            Some("Белаш Александр; Белаш Людмила")
        );
    }

    /// **[TC-U-PATX-020-02]** Unit test: Verify gender inflection matches via stems
    #[test]
    fn tc_u_patx_020_02_inflection_recovery() {
        let fx = Fixture::new();
        assert_eq!(
            fx.extract("Каменские - Дом", "", &["Юрий Каменский", "Вера Каменская"]).as_deref(),
            Some("Каменская Вера; Каменский Юрий")
        );
    }

    /// **[TC-U-PATX-030-01]** Unit test: Verify file-name completeness is never reduced
    #[test]
    fn tc_u_patx_030_01_completeness_preserved() {
        let fx = Fixture::new();
        // Same words, other order: file-name order, then normalized
        assert_eq!(
            fx.extract("Волков Тим - Книга", "Тим Волков", &[]).as_deref(),
            Some("Волков Тим")
        );
        // Metadata strictly more complete wins
        assert_eq!(
            fx.extract("Петров Иван - Книга", "Иван Сергеевич Петров", &[]).as_deref(),
            Some("Петров Иван Сергеевич")
        );
        // Less complete metadata never replaces the file-name form
        assert_eq!(
            fx.extract("Петров Иван Сергеевич - Книга", "Иван Петров", &[]).as_deref(),
            Some("Петров Иван Сергеевич")
        );
    }

    /// **[TC-U-PATX-040-01]** Unit test: Verify non-matching or noise stems yield nothing
    #[test]
    fn tc_u_patx_040_01_no_result() {
        let fx = Fixture::new();
        assert_eq!(fx.extract("Просто название", "Иван Петров", &[]), None);
        assert_eq!(fx.extract("Сборник - Рассказы", "", &[]), None);
    }

    #[test]
    fn test_sibling_metadata_groups_by_parent() {
        use crate::types::ItemInput;
        let records: Vec<ItemRecord> = vec![
            ItemInput::new("a/1.fb2", "Юрий Каменский", "").into(),
            ItemInput::new("a/2.fb2", "Вера Каменская; юрий каменский", "").into(),
            ItemInput::new("b/3.fb2", "Иван Петров", "").into(),
        ];
        let siblings = SiblingMetadata::build(&records);
        assert_eq!(siblings.names_in(Path::new("a")), ["Юрий Каменский", "Вера Каменская"]);
        assert_eq!(siblings.names_in(Path::new("b")).len(), 1);
        assert!(siblings.names_in(Path::new("c")).is_empty());
    }
}
