//! Item records and attribution provenance
//!
//! `ItemRecord` keeps its author field private: every rewrite after the
//! initial attribution goes through [`ItemRecord::rewrite_author`], which
//! enforces that a folder attribution is never diluted by a lower-confidence
//! source.

use crate::names::text::fold;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Placeholder author for items no source attributes (anthologies, compilations)
pub const COLLECTION_SENTINEL: &str = "Сборник";

/// Which source produced the current author attribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorSource {
    /// Directory name in the item's ancestry (terminal, highest confidence)
    Folder,
    /// The item's own file name
    Filename,
    /// Attribution embedded in the item
    Metadata,
    /// Majority vote within the parent directory
    Consensus,
}

impl AuthorSource {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorSource::Folder => "folder",
            AuthorSource::Filename => "filename",
            AuthorSource::Metadata => "metadata",
            AuthorSource::Consensus => "consensus",
        }
    }
}

impl fmt::Display for AuthorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pass requesting an author rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAuthority {
    /// Word-order normalization (Pass 3, and the re-run inside Pass 5)
    Normalization,
    /// Directory majority vote (Pass 4)
    Consensus,
    /// Literal conversion table (Pass 5)
    Conversion,
    /// Abbreviation expansion (Pass 6)
    Expansion,
}

/// Raw item as delivered by the walker and metadata reader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    /// Item path relative to the library root
    pub path: PathBuf,
    /// Unmodified embedded author string (empty when unreadable)
    pub metadata_authors: String,
    /// Embedded title (empty when unreadable)
    pub title: String,
}

impl ItemInput {
    pub fn new(
        path: impl Into<PathBuf>,
        metadata_authors: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            metadata_authors: metadata_authors.into(),
            title: title.into(),
        }
    }
}

/// One processed item; serializes to the output tuple
/// `(path, raw_metadata_authors, proposed_author, author_source, title)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    path: PathBuf,
    raw_metadata_authors: String,
    proposed_author: String,
    author_source: Option<AuthorSource>,
    title: String,
    /// Folder-derived value as set by Pass 1 or a later conversion
    #[serde(skip)]
    folder_origin: Option<String>,
}

impl From<ItemInput> for ItemRecord {
    fn from(input: ItemInput) -> Self {
        Self {
            path: input.path,
            raw_metadata_authors: input.metadata_authors,
            proposed_author: String::new(),
            author_source: None,
            title: input.title,
            folder_origin: None,
        }
    }
}

impl ItemRecord {
    /// Record that has already been attributed; used by pass-level callers and tests
    pub fn attributed(input: ItemInput, author: impl Into<String>, source: AuthorSource) -> Self {
        let mut record = Self::from(input);
        record.attribute(author.into(), source);
        record
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parent directory, the consensus grouping key
    pub fn parent_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// File name without extension
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn raw_metadata_authors(&self) -> &str {
        &self.raw_metadata_authors
    }

    pub fn proposed_author(&self) -> &str {
        &self.proposed_author
    }

    pub fn author_source(&self) -> Option<AuthorSource> {
        self.author_source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Folder-derived value this record is bound to, if any
    pub fn folder_origin(&self) -> Option<&str> {
        self.folder_origin.as_deref()
    }

    /// True when the record carries the collection sentinel
    pub fn is_collection(&self) -> bool {
        self.proposed_author == COLLECTION_SENTINEL
    }

    pub fn is_folder_sourced(&self) -> bool {
        self.author_source == Some(AuthorSource::Folder)
    }

    /// Initial attribution (Pass 1)
    pub(crate) fn attribute(&mut self, author: String, source: AuthorSource) {
        self.folder_origin = (source == AuthorSource::Folder).then(|| author.clone());
        self.proposed_author = author;
        self.author_source = Some(source);
    }

    /// Rewrite the author field on behalf of a later pass
    ///
    /// Returns true if the field changed. The sentinel is final. For a
    /// folder-sourced record, consensus is refused, conversion is accepted and
    /// rebinds the folder origin, and any other rewrite is accepted only if it
    /// introduces no token absent from the folder origin.
    pub fn rewrite_author(&mut self, value: String, authority: RewriteAuthority) -> bool {
        if value == self.proposed_author || self.is_collection() || value.trim().is_empty() {
            return false;
        }

        if self.is_folder_sourced() {
            match authority {
                RewriteAuthority::Consensus => {
                    debug!(path = %self.path.display(), "Consensus refused for folder attribution");
                    return false;
                }
                RewriteAuthority::Conversion => {
                    self.folder_origin = Some(value.clone());
                }
                RewriteAuthority::Normalization | RewriteAuthority::Expansion => {
                    let origin = self.folder_origin.as_deref().unwrap_or(&self.proposed_author);
                    if !tokens_within(&value, origin) {
                        debug!(
                            path = %self.path.display(),
                            origin,
                            rejected = %value,
                            ?authority,
                            "Rewrite would add tokens to folder attribution"
                        );
                        return false;
                    }
                }
            }
        }

        self.proposed_author = value;
        true
    }

    /// Adopt a directory majority value (Pass 4)
    pub fn adopt_consensus(&mut self, value: &str) -> bool {
        if self.is_folder_sourced() || self.is_collection() {
            return false;
        }
        let changed = self.proposed_author != value
            || self.author_source != Some(AuthorSource::Consensus);
        if self.proposed_author != value {
            self.rewrite_author(value.to_string(), RewriteAuthority::Consensus);
        }
        self.author_source = Some(AuthorSource::Consensus);
        changed
    }
}

/// Folded word tokens of an author field, separators and punctuation removed
pub fn author_tokens(field: &str) -> Vec<String> {
    field
        .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .map(fold)
        .collect()
}

fn tokens_within(candidate: &str, origin: &str) -> bool {
    let allowed = author_tokens(origin);
    author_tokens(candidate).iter().all(|t| allowed.contains(t))
}
