//! Folder Attribution Cache
//!
//! Memoizes the outcome of reading an author out of one directory name, keyed
//! by directory path. The pipeline fills it in one single-threaded sweep over
//! the distinct ancestor directories of the batch; Pass 1 then reads it
//! concurrently without locking. [`FolderAttributionCache::resolve`] covers
//! callers that look up directories lazily.

use crate::layout::{LayoutGroup, LayoutLibrary, LayoutMatch};
use crate::names::text::{clean_fragment, collapse_whitespace, singularize_family, unify_yo};
use crate::names::{AuthorName, NameDictionary};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Author read from a directory name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderAttribution {
    /// Co-authors joined with "; "
    pub author: String,
    /// Layout that produced it
    pub layout: String,
}

/// Parses directory names into author attributions
pub struct FolderNameParser<'a> {
    layouts: &'a LayoutLibrary,
    dictionary: &'a NameDictionary,
}

impl<'a> FolderNameParser<'a> {
    pub fn new(layouts: &'a LayoutLibrary, dictionary: &'a NameDictionary) -> Self {
        Self {
            layouts,
            dictionary,
        }
    }

    /// Try every matching layout, best first, until one yields valid names
    pub fn parse(&self, folder_name: &str) -> Option<FolderAttribution> {
        let name = collapse_whitespace(folder_name);
        if name.is_empty() {
            return None;
        }
        if self.dictionary.is_noise(&name) {
            debug!(folder = %name, "Skipping anthology folder");
            return None;
        }

        self.layouts.matches(&name).iter().find_map(|m| {
            let author = self.interpret(m)?;
            Some(FolderAttribution {
                author,
                layout: m.layout().pattern().to_string(),
            })
        })
    }

    fn interpret(&self, m: &LayoutMatch<'_>) -> Option<String> {
        let captured = m.author()?;
        // A lone word is a person only when the layout set it apart
        let allow_single = m.score() > 1;

        if let Some(alias) = m.group(LayoutGroup::Alias) {
            let pseudonym = format!("{} ({})", collapse_whitespace(captured), alias.trim());
            return self.accept(&pseudonym, allow_single).then_some(pseudonym);
        }

        let text = unify_yo(&clean_fragment(captured));
        if text.is_empty() || self.dictionary.is_noise(&text) {
            return None;
        }

        let names = if let Some((left, right)) = text.split_once(" и ") {
            self.family_pair(left, right)?
        } else if text.contains([',', ';']) {
            self.co_authors(&text)?
        } else {
            self.accept(&text, allow_single).then(|| vec![text.clone()])?
        };
        Some(names.join("; "))
    }

    /// "Живовы Георгий и Геннадий" → Живов Георгий, Живов Геннадий
    fn family_pair(&self, left: &str, right: &str) -> Option<Vec<String>> {
        let left_words: Vec<&str> = left.split_whitespace().collect();
        let right = right.trim();
        if left_words.len() == 2 && right.split_whitespace().count() == 1 {
            let surname = singularize_family(left_words[0]);
            let names = vec![
                format!("{} {}", surname, left_words[1]),
                format!("{} {}", surname, right),
            ];
            return names.iter().all(|n| self.accept(n, false)).then_some(names);
        }
        let names = vec![left.trim().to_string(), right.to_string()];
        names.iter().all(|n| self.accept(n, false)).then_some(names)
    }

    /// "Surname Given, Given2" → "Surname Given; Given2 Surname"
    fn co_authors(&self, text: &str) -> Option<Vec<String>> {
        let parts: Vec<&str> = text
            .split([',', ';'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let first = *parts.first()?;
        let shared_surname = first.split_whitespace().next()?.to_string();

        let mut names = Vec::with_capacity(parts.len());
        for (i, part) in parts.iter().enumerate() {
            let name = if i > 0 && part.split_whitespace().count() == 1 {
                format!("{} {}", part, shared_surname)
            } else {
                part.to_string()
            };
            if !self.accept(&name, false) {
                return None;
            }
            names.push(name);
        }
        Some(names)
    }

    fn accept(&self, text: &str, allow_single: bool) -> bool {
        AuthorName::parse(text, self.dictionary).looks_like_person(self.dictionary, allow_single)
    }
}

/// Per-run directory → attribution memo
#[derive(Debug, Default)]
pub struct FolderAttributionCache {
    entries: HashMap<PathBuf, Option<FolderAttribution>>,
}

impl FolderAttributionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every directory once; already cached directories are skipped
    pub fn warm<'p, I>(&mut self, dirs: I, parser: &FolderNameParser<'_>)
    where
        I: IntoIterator<Item = &'p Path>,
    {
        for dir in dirs {
            self.resolve(dir, parser);
        }
    }

    /// Read-check-then-write lookup
    pub fn resolve(&mut self, dir: &Path, parser: &FolderNameParser<'_>) -> Option<&FolderAttribution> {
        self.entries
            .entry(dir.to_path_buf())
            .or_insert_with(|| {
                let name = dir.file_name()?.to_string_lossy();
                let found = parser.parse(&name);
                if let Some(attribution) = &found {
                    debug!(dir = %dir.display(), author = %attribution.author, layout = %attribution.layout, "Folder attribution");
                }
                found
            })
            .as_ref()
    }

    /// Cached outcome; `None` if the directory was never resolved
    pub fn lookup(&self, dir: &Path) -> Option<Option<&FolderAttribution>> {
        self.entries.get(dir).map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directories that produced an attribution
    pub fn attributed_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::layout::LayoutKind;

    fn parse(folder: &str) -> Option<String> {
        let config = ResolverConfig::default();
        let dict = NameDictionary::from_config(&config);
        let layouts = LayoutLibrary::compile(LayoutKind::Folder, &config.folder_layouts).unwrap();
        FolderNameParser::new(&layouts, &dict)
            .parse(folder)
            .map(|a| a.author)
    }

    /// **[TC-U-FOLD-010-01]** Unit test: Verify plain and subtitled author folders
    #[test]
    fn tc_u_fold_010_01_plain_layouts() {
        assert_eq!(parse("Волков Тим").as_deref(), Some("Волков Тим"));
        assert_eq!(
            parse("Максим Шаттам - Собрание сочинений").as_deref(),
            Some("Максим Шаттам")
        );
        // A single word needs a layout that sets it apart
        assert_eq!(parse("Фантастика"), None);
    }

    /// **[TC-U-FOLD-010-02]** Unit test: Verify bracketed author takes the last group
    #[test]
    fn tc_u_fold_010_02_bracketed_author() {
        assert_eq!(parse("МВП-2 (1) Одиссея (Чернов)").as_deref(), Some("Чернов"));
        assert_eq!(
            parse("Защита Периметра (Абенд Эдвард)").as_deref(),
            Some("Абенд Эдвард")
        );
    }

    /// **[TC-U-FOLD-010-03]** Unit test: Verify pseudonym folder follows layout declaration order
    #[test]
    fn tc_u_fold_010_03_pseudonym_folder() {
        // Default order reads the bracket as the author of a one-word series
        assert_eq!(parse("Гоблин (MeXXanik)").as_deref(), Some("MeXXanik"));

        let mut config = ResolverConfig::default();
        config.folder_layouts = vec!["Author (Alias)".to_string(), "Series (Author)".to_string()];
        let dict = NameDictionary::from_config(&config);
        let layouts = LayoutLibrary::compile(LayoutKind::Folder, &config.folder_layouts).unwrap();
        let attribution = FolderNameParser::new(&layouts, &dict)
            .parse("Гоблин (MeXXanik)")
            .unwrap();
        assert_eq!(attribution.author, "Гоблин (MeXXanik)");
        assert_eq!(attribution.layout, "Author (Alias)");
    }

    /// **[TC-U-FOLD-020-01]** Unit test: Verify co-author folder recovers shared surname
    #[test]
    fn tc_u_fold_020_01_co_author_surname() {
        assert_eq!(
            parse("Белаш Александр, Людмила").as_deref(),
            Some("Белаш Александр; Людмила Белаш")
        );
    }

    /// **[TC-U-FOLD-020-02]** Unit test: Verify plural family folder
    #[test]
    fn tc_u_fold_020_02_plural_family() {
        assert_eq!(
            parse("Живовы Георгий и Геннадий").as_deref(),
            Some("Живов Георгий; Живов Геннадий")
        );
    }

    /// **[TC-U-FOLD-030-01]** Unit test: Verify anthology folder is never an author
    #[test]
    fn tc_u_fold_030_01_blacklist_guard() {
        assert_eq!(parse("Сборник разных авторов"), None);
        assert_eq!(parse("Антология (Иван Петров)"), None);
    }

    /// **[TC-U-FOLD-040-01]** Unit test: Verify cache memoizes per directory
    #[test]
    fn tc_u_fold_040_01_cache_memoizes() {
        let config = ResolverConfig::default();
        let dict = NameDictionary::from_config(&config);
        let layouts = LayoutLibrary::compile(LayoutKind::Folder, &config.folder_layouts).unwrap();
        let parser = FolderNameParser::new(&layouts, &dict);
        let mut cache = FolderAttributionCache::new();

        let dirs = [
            Path::new("lib/Волков Тим"),
            Path::new("lib/Волков Тим"),
            Path::new("lib/Разное"),
        ];
        cache.warm(dirs.iter().copied(), &parser);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.attributed_count(), 1);
        assert_eq!(
            cache
                .lookup(Path::new("lib/Волков Тим"))
                .flatten()
                .map(|a| a.author.as_str()),
            Some("Волков Тим")
        );
        assert_eq!(cache.lookup(Path::new("lib/Разное")), Some(None));
        assert_eq!(cache.lookup(Path::new("lib/unseen")), None);
    }
}
