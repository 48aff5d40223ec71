//! Name Model: one person's name and its canonical surname-first form

use super::dictionary::NameDictionary;
use super::text::{
    collapse_whitespace, has_surname_ending, is_initials, is_patronymic, unify_yo, vowel_ratio,
};

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 120;

/// Structural reading of a name
#[derive(Debug, Clone, PartialEq, Eq)]
enum Shape {
    /// Fails validity; rendered as-is
    Invalid,
    /// Abbreviated or pseudonym form, never reordered
    Verbatim,
    Parts {
        surname: String,
        given: Option<String>,
        patronymic: Option<String>,
    },
}

/// A candidate author name as captured from one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName {
    raw: String,
    shape: Shape,
}

impl AuthorName {
    /// Parse a raw candidate against the dictionaries
    pub fn parse(raw: &str, dict: &NameDictionary) -> Self {
        let raw = collapse_whitespace(&unify_yo(raw));
        let shape = if !is_structurally_valid(&raw) || dict.is_noise(&raw) {
            Shape::Invalid
        } else if has_dotted_token(&raw, dict) || is_pseudonym(&raw) {
            Shape::Verbatim
        } else {
            infer_parts(&raw, dict)
        };
        Self { raw, shape }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.shape != Shape::Invalid
    }

    /// Surname-first rendering: "Surname Given [Patronymic]"
    pub fn normalized(&self) -> String {
        match &self.shape {
            Shape::Invalid | Shape::Verbatim => self.raw.clone(),
            Shape::Parts {
                surname,
                given,
                patronymic,
            } => [Some(surname), given.as_ref(), patronymic.as_ref()]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    pub fn surname(&self) -> Option<&str> {
        match &self.shape {
            Shape::Parts { surname, .. } => Some(surname),
            _ => None,
        }
    }

    pub fn given(&self) -> Option<&str> {
        match &self.shape {
            Shape::Parts { given, .. } => given.as_deref(),
            _ => None,
        }
    }

    /// 0 invalid, 1 surname only, 2 surname and given name, 3 with patronymic
    ///
    /// Abbreviated and pseudonym forms score 1.
    pub fn completeness(&self) -> u8 {
        match &self.shape {
            Shape::Invalid => 0,
            Shape::Verbatim => 1,
            Shape::Parts {
                given, patronymic, ..
            } => 1 + u8::from(given.is_some()) + u8::from(patronymic.is_some()),
        }
    }

    /// Plausibly a person's name rather than a title or phrase
    ///
    /// Multi-word names need a known given name, an initial or a patronymic;
    /// a bare single word is accepted only when `allow_single_word`.
    pub fn looks_like_person(&self, dict: &NameDictionary, allow_single_word: bool) -> bool {
        if !self.is_valid() {
            return false;
        }
        let main = self.raw.split('(').next().unwrap_or_default().trim();
        let words: Vec<&str> = main
            .split_whitespace()
            .filter(|w| !dict.is_suffix(w))
            .collect();
        if words.is_empty() || words.len() > 4 {
            return false;
        }
        if !words.iter().all(|w| starts_uppercase(w)) {
            return false;
        }
        if let [word] = words.as_slice() {
            // "С.Гоблин"
            if word.contains('.') {
                return word.split('.').any(|p| p.chars().count() > 1);
            }
            return allow_single_word || self.raw.contains('(');
        }
        words.iter().any(|w| {
            dict.is_given_name(w)
                || is_initials(w)
                || is_patronymic(w)
                || w.contains('.') && w.split('.').any(|p| p.chars().count() > 1)
        })
    }
}

/// Abbreviation marker outside of name suffixes ("мл.")
fn has_dotted_token(raw: &str, dict: &NameDictionary) -> bool {
    raw.split_whitespace()
        .any(|w| w.contains('.') && !dict.is_suffix(w))
}

fn starts_uppercase(word: &str) -> bool {
    word.trim_start_matches(|c: char| !c.is_alphabetic())
        .chars()
        .next()
        .is_some_and(char::is_uppercase)
}

fn is_structurally_valid(raw: &str) -> bool {
    let length = raw.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&length) {
        return false;
    }
    if raw.contains(['/', '\\']) || raw.contains("..") {
        return false;
    }
    if raw.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    raw.split(|c: char| !c.is_alphabetic())
        .any(|token| token.chars().count() >= MIN_NAME_CHARS)
}

/// "Гоблин (MeXXanik)": one main word followed by a parenthesized alias
fn is_pseudonym(raw: &str) -> bool {
    match raw.split_once('(') {
        Some((main, rest)) => main.split_whitespace().count() == 1 && rest.trim_end().ends_with(')'),
        None => false,
    }
}

fn infer_parts(raw: &str, dict: &NameDictionary) -> Shape {
    let words: Vec<String> = raw
        .replace(['(', ')'], " ")
        .split_whitespace()
        .filter(|w| w.chars().count() > 1 && !dict.is_suffix(w))
        .map(str::to_string)
        .collect();

    let parts = |surname: &str, given: Option<&str>, patronymic: Option<&str>| Shape::Parts {
        surname: surname.to_string(),
        given: given.map(str::to_string),
        patronymic: patronymic.map(str::to_string),
    };

    match words.as_slice() {
        [] => Shape::Invalid,
        [only] => parts(only, None, None),
        [a, b] => {
            let (surname, given) = order_pair(a, b, dict);
            parts(surname, Some(given), None)
        }
        [first, second, rest @ ..] => {
            let last = rest.last().unwrap_or(second);
            if is_patronymic(last) {
                // Given name always precedes its patronymic
                let given = words[words.len() - 2].as_str();
                return parts(first, Some(given), Some(last.as_str()));
            }
            if let Some(idx) = words.iter().position(|w| is_patronymic(w)) {
                if idx >= 1 {
                    return parts(last, Some(words[idx - 1].as_str()), Some(words[idx].as_str()));
                }
            }
            if dict.is_given_name(first) && !dict.is_given_name(last) {
                return parts(last, Some(first.as_str()), None);
            }
            // Unrecognized trailing tokens are dropped
            let (surname, given) = order_pair(first, second, dict);
            parts(surname, Some(given), None)
        }
    }
}

/// Decide which of two tokens is the surname; returns (surname, given)
///
/// Dictionary membership first, then surname endings, then the lower vowel
/// ratio. Ties keep input order, so the result is stable under re-ordering.
fn order_pair<'a>(a: &'a str, b: &'a str, dict: &NameDictionary) -> (&'a str, &'a str) {
    match (dict.is_given_name(a), dict.is_given_name(b)) {
        (true, false) => return (b, a),
        (false, true) => return (a, b),
        _ => {}
    }
    match (has_surname_ending(a), has_surname_ending(b)) {
        (true, false) => return (a, b),
        (false, true) => return (b, a),
        _ => {}
    }
    if vowel_ratio(b) < vowel_ratio(a) {
        (b, a)
    } else {
        (a, b)
    }
}
