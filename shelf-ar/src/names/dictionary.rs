//! Known given names, noise markers and name suffixes
//!
//! Built once per run from [`ResolverConfig`] and shared read-only by every
//! pass. All lookups go through [`fold`], so "Пётр" and "петр" are the same
//! entry.

use super::text::fold;
use crate::config::ResolverConfig;
use std::collections::HashSet;

/// Grammatical gender of a known given name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

/// Read-only name dictionaries for one run
#[derive(Debug, Clone)]
pub struct NameDictionary {
    male: HashSet<String>,
    female: HashSet<String>,
    noise: Vec<String>,
    suffixes: HashSet<String>,
    noise_similarity: f64,
}

impl NameDictionary {
    pub fn from_config(config: &ResolverConfig) -> Self {
        let folded = |items: &[String]| -> HashSet<String> {
            items.iter().map(|s| fold(s.trim())).collect()
        };
        Self {
            male: folded(&config.male_names),
            female: folded(&config.female_names),
            noise: config
                .noise_words
                .iter()
                .map(|s| fold(s.trim()))
                .filter(|s| !s.is_empty())
                .collect(),
            suffixes: config
                .name_suffixes
                .iter()
                .map(|s| fold(s.trim().trim_end_matches('.')))
                .collect(),
            noise_similarity: config.noise_similarity,
        }
    }

    /// Gender of a known given name
    pub fn gender(&self, token: &str) -> Option<Gender> {
        let key = fold(token.trim_matches(|c: char| !c.is_alphabetic()));
        if self.male.contains(&key) {
            Some(Gender::Male)
        } else if self.female.contains(&key) {
            Some(Gender::Female)
        } else {
            None
        }
    }

    pub fn is_given_name(&self, token: &str) -> bool {
        self.gender(token).is_some()
    }

    /// Trailing name suffix such as "мл." or "старший"
    pub fn is_suffix(&self, token: &str) -> bool {
        self.suffixes.contains(&fold(token.trim_end_matches('.')))
    }

    /// Text names an anthology/compilation rather than a person
    ///
    /// Matches when the text opens with a whole noise word, or any of its
    /// words is within the configured similarity of one.
    pub fn is_noise(&self, text: &str) -> bool {
        let folded = fold(text.trim());
        if folded.is_empty() {
            return false;
        }
        if self.noise.iter().any(|n| starts_with_word(&folded, n)) {
            return true;
        }
        folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 3)
            .any(|word| {
                self.noise
                    .iter()
                    .any(|n| strsim::normalized_levenshtein(word, n) >= self.noise_similarity)
            })
    }
}

/// `word` is a prefix of `text` ending on a word boundary
fn starts_with_word(text: &str, word: &str) -> bool {
    text.strip_prefix(word)
        .is_some_and(|rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
}

impl Default for NameDictionary {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **[TC-U-DICT-010-01]** Unit test: Verify given-name lookup ignores case and ё
    #[test]
    fn tc_u_dict_010_01_given_names() {
        let dict = NameDictionary::default();
        assert_eq!(dict.gender("Тим"), Some(Gender::Male));
        assert_eq!(dict.gender("ПЁТР"), Some(Gender::Male));
        assert_eq!(dict.gender("Людмила"), Some(Gender::Female));
        assert_eq!(dict.gender("Волков"), None);
    }

    /// **[TC-U-DICT-020-01]** Unit test: Verify anthology markers are noise
    #[test]
    fn tc_u_dict_020_01_noise_detection() {
        let dict = NameDictionary::default();
        assert!(dict.is_noise("Сборник разных авторов"));
        assert!(dict.is_noise("Лучшая антология"));
        // One typo away from a marker
        assert!(dict.is_noise("Антологiя фантастики"));
        assert!(!dict.is_noise("Волков Тим"));
        assert!(!dict.is_noise("Живовы Георгий и Геннадий"));
    }

    /// **[TC-U-DICT-020-02]** Unit test: Verify surnames close to a noise word are people
    #[test]
    fn tc_u_dict_020_02_surnames_are_not_noise() {
        let dict = NameDictionary::default();
        assert!(!dict.is_noise("Авторова Анна"));
        assert!(!dict.is_noise("Циклаури Нина"));
        assert!(!dict.is_noise("Архипов Олег"));
        assert!(!dict.is_noise("Сериков Павел"));
        // A whole leading noise word still counts
        assert!(dict.is_noise("Цикл Иван Петров"));
        assert!(dict.is_noise("Серия: Фантастика"));
    }

    #[test]
    fn test_suffixes() {
        let dict = NameDictionary::default();
        assert!(dict.is_suffix("мл."));
        assert!(dict.is_suffix("Старший"));
        assert!(!dict.is_suffix("Петров"));
    }
}
