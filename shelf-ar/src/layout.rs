//! Layout library
//!
//! A layout is a simple pattern such as `"Author - Title (Series)"`. Bare
//! words become lazy named captures, `(Word)` and `[Word]` capture bracketed
//! text, whitespace matches any whitespace run, and everything else is
//! literal. Each compiled layout is a tagged variant `{kind, matcher, groups}`
//! and all layouts are scored uniformly: the score of a match is the number
//! of non-empty groups it captured, ties going to the earlier layout.

use crate::error::{ResolverError, ResolverResult};
use regex::Regex;
use std::cmp::Reverse;

/// Where a layout applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Folder,
    File,
}

/// Semantic role of a captured group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutGroup {
    Author,
    Title,
    Series,
    Subtitle,
    Alias,
    Other,
}

impl LayoutGroup {
    fn from_word(word: &str) -> Self {
        match word.to_lowercase().as_str() {
            "author" | "name" | "authors" => LayoutGroup::Author,
            "title" | "book" => LayoutGroup::Title,
            "series" | "cycle" => LayoutGroup::Series,
            "subtitle" | "folder" => LayoutGroup::Subtitle,
            "alias" | "pseudonym" => LayoutGroup::Alias,
            _ => LayoutGroup::Other,
        }
    }
}

/// One compiled layout
#[derive(Debug, Clone)]
pub struct Layout {
    pattern: String,
    kind: LayoutKind,
    matcher: Regex,
    groups: Vec<(String, LayoutGroup)>,
}

impl Layout {
    pub fn compile(pattern: &str, kind: LayoutKind) -> ResolverResult<Self> {
        let mut expr = String::from("^");
        let mut literal = String::new();
        let mut groups: Vec<(String, LayoutGroup)> = Vec::new();
        let mut chars = pattern.trim().chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '(' | '[' => {
                    let close = if c == '(' { ')' } else { ']' };
                    let word: String = chars.by_ref().take_while(|&ch| ch != close).collect();
                    push_literal(&mut expr, &mut literal);
                    let name = register_group(&mut groups, word.trim());
                    let open = regex::escape(&c.to_string());
                    let close = regex::escape(&close.to_string());
                    expr.push_str(&format!("{open}(?P<{name}>[^{close}]+){close}"));
                }
                c if c.is_alphabetic() => {
                    let mut word = c.to_string();
                    while let Some(&next) = chars.peek() {
                        if !(next.is_alphanumeric() || next == '_') {
                            break;
                        }
                        word.push(next);
                        chars.next();
                    }
                    push_literal(&mut expr, &mut literal);
                    let name = register_group(&mut groups, &word);
                    expr.push_str(&format!("(?P<{name}>.+?)"));
                }
                _ => literal.push(c),
            }
        }
        push_literal(&mut expr, &mut literal);
        expr.push('$');

        if !groups.iter().any(|(_, g)| *g == LayoutGroup::Author) {
            return Err(ResolverError::LayoutWithoutAuthor(pattern.to_string()));
        }

        let matcher = Regex::new(&expr).map_err(|source| ResolverError::InvalidLayout {
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            kind,
            matcher,
            groups,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Declared group roles, in pattern order
    pub fn group_roles(&self) -> impl Iterator<Item = LayoutGroup> + '_ {
        self.groups.iter().map(|(_, role)| *role)
    }

    fn capture(&self, text: &str) -> Option<Vec<(LayoutGroup, String)>> {
        let caps = self.matcher.captures(text)?;
        Some(
            self.groups
                .iter()
                .filter_map(|(name, role)| {
                    let value = caps.name(name)?.as_str().trim();
                    (!value.is_empty()).then(|| (*role, value.to_string()))
                })
                .collect(),
        )
    }
}

fn push_literal(expr: &mut String, literal: &mut String) {
    let mut in_space = false;
    for c in literal.chars() {
        if c.is_whitespace() {
            if !in_space {
                expr.push_str(r"\s+");
            }
            in_space = true;
        } else {
            expr.push_str(&regex::escape(&c.to_string()));
            in_space = false;
        }
    }
    literal.clear();
}

/// Register a group and return its unique regex name (`author`, `author_2`, ...)
fn register_group(groups: &mut Vec<(String, LayoutGroup)>, word: &str) -> String {
    let base: String = word
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let base = if base.is_empty() { "group".to_string() } else { base };
    let taken = groups
        .iter()
        .filter(|(name, _)| *name == base || name.starts_with(&format!("{base}_")))
        .count();
    let name = if taken == 0 {
        base
    } else {
        format!("{base}_{}", taken + 1)
    };
    groups.push((name.clone(), LayoutGroup::from_word(word)));
    name
}

/// A successful match of one layout
#[derive(Debug, Clone)]
pub struct LayoutMatch<'a> {
    layout: &'a Layout,
    index: usize,
    captures: Vec<(LayoutGroup, String)>,
}

impl<'a> LayoutMatch<'a> {
    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    /// Declaration index within the library
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of non-empty captured groups
    pub fn score(&self) -> usize {
        self.captures.len()
    }

    /// First non-empty capture with the given role
    pub fn group(&self, role: LayoutGroup) -> Option<&str> {
        self.captures
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, v)| v.as_str())
    }

    pub fn author(&self) -> Option<&str> {
        self.group(LayoutGroup::Author)
    }
}

/// Ordered set of layouts of one kind
#[derive(Debug, Clone)]
pub struct LayoutLibrary {
    kind: LayoutKind,
    layouts: Vec<Layout>,
}

impl LayoutLibrary {
    /// Compile the patterns in declaration order (most specific first)
    pub fn compile(kind: LayoutKind, patterns: &[String]) -> ResolverResult<Self> {
        let layouts = patterns
            .iter()
            .map(|p| Layout::compile(p, kind))
            .collect::<ResolverResult<Vec<_>>>()?;
        Ok(Self { kind, layouts })
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Every layout that matches and captured an author, best first
    pub fn matches(&self, text: &str) -> Vec<LayoutMatch<'_>> {
        let text = text.trim();
        let mut found: Vec<LayoutMatch<'_>> = self
            .layouts
            .iter()
            .enumerate()
            .filter_map(|(index, layout)| {
                let captures = layout.capture(text)?;
                let m = LayoutMatch {
                    layout,
                    index,
                    captures,
                };
                m.author().is_some().then_some(m)
            })
            .collect();
        // Stable: equal scores keep declaration order
        found.sort_by_key(|m| Reverse(m.score()));
        found
    }

    pub fn best_match(&self, text: &str) -> Option<LayoutMatch<'_>> {
        self.matches(text).into_iter().next()
    }
}
