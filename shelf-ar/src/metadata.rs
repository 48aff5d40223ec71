//! Metadata reader collaborator
//!
//! Supplies the raw embedded author and title strings per item. Anything
//! unreadable is substituted with empty strings here, so the pipeline never
//! sees an error.

use crate::error::{ResolverError, ResolverResult};
use crate::types::ItemInput;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raw embedded attribution of one item
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ItemMetadata {
    pub authors: String,
    pub title: String,
}

/// Source of embedded attribution strings
pub trait MetadataReader: Sync {
    /// Metadata for an item path relative to the library root
    fn read(&self, path: &Path) -> ItemMetadata;
}

impl MetadataReader for HashMap<PathBuf, ItemMetadata> {
    fn read(&self, path: &Path) -> ItemMetadata {
        self.get(path).cloned().unwrap_or_default()
    }
}

/// Reader backed by a JSON manifest: `{ "<relative path>": {"authors": .., "title": ..} }`
#[derive(Debug, Default)]
pub struct ManifestReader {
    entries: HashMap<PathBuf, ItemMetadata>,
}

impl ManifestReader {
    pub fn load(path: &Path) -> ResolverResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResolverError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let raw: HashMap<String, ItemMetadata> =
            serde_json::from_str(&content).map_err(|e| ResolverError::Manifest {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        info!(entries = raw.len(), manifest = %path.display(), "Metadata manifest loaded");
        Ok(Self::from_entries(raw))
    }

    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, ItemMetadata)>,
        K: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, meta)| (manifest_key(key.as_ref()), meta))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetadataReader for ManifestReader {
    fn read(&self, path: &Path) -> ItemMetadata {
        match self.entries.get(&manifest_key(&path.to_string_lossy())) {
            Some(meta) => meta.clone(),
            None => {
                debug!(path = %path.display(), "No metadata entry");
                ItemMetadata::default()
            }
        }
    }
}

/// Manifests may use either separator
fn manifest_key(path: &str) -> PathBuf {
    PathBuf::from(path.replace('\\', "/").trim_start_matches("./"))
}

/// Pair each scanned path with its metadata
pub fn collect_items(paths: &[PathBuf], reader: &dyn MetadataReader) -> Vec<ItemInput> {
    paths
        .iter()
        .map(|path| {
            let meta = reader.read(path);
            ItemInput {
                path: path.clone(),
                metadata_authors: meta.authors,
                title: meta.title,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_normalizes_separators() {
        let reader = ManifestReader::from_entries([(
            r"Волков Тим\book.fb2",
            ItemMetadata {
                authors: "Тим Волков".to_string(),
                title: "Книга".to_string(),
            },
        )]);

        let meta = reader.read(Path::new("Волков Тим/book.fb2"));
        assert_eq!(meta.authors, "Тим Волков");
        assert_eq!(reader.read(Path::new("missing.fb2")), ItemMetadata::default());
    }

    #[test]
    fn test_load_reports_malformed_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(ManifestReader::load(&path), Err(ResolverError::Manifest { .. })));
    }

    #[test]
    fn test_collect_items_substitutes_empty_strings() {
        let mut map = HashMap::new();
        map.insert(
            PathBuf::from("a.fb2"),
            ItemMetadata {
                authors: "Иван Петров".to_string(),
                title: String::new(),
            },
        );
        let items = collect_items(&[PathBuf::from("a.fb2"), PathBuf::from("b.fb2")], &map);

        assert_eq!(items[0].metadata_authors, "Иван Петров");
        assert_eq!(items[1], ItemInput::new("b.fb2", "", ""));
    }
}
