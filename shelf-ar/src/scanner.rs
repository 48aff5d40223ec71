//! Library scanner
//!
//! Recursive discovery of book files under a library root. Traversal is
//! sequential (symlink-loop detection needs shared state); results are
//! relative to the root and sorted so batches are deterministic.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Library scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Cannot access file
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// Scan result with statistics
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Item paths relative to the root, sorted
    pub files: Vec<PathBuf>,
    /// Count of files by extension
    pub by_extension: BTreeMap<String, usize>,
    /// Entries that could not be read
    pub errors: Vec<String>,
}

/// Book file scanner
pub struct LibraryScanner {
    ignore_patterns: Vec<String>,
    extensions: Vec<String>,
    max_depth: Option<usize>,
}

impl LibraryScanner {
    /// Create new scanner for `.fb2` files with default ignore patterns
    ///
    /// Ignores system files like .DS_Store, Thumbs.db, .git, etc.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                "@eaDir".to_string(),
            ],
            extensions: vec!["fb2".to_string()],
            max_depth: None,
        }
    }

    /// Replace the accepted extensions (case-insensitive, no leading dot)
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Scan directory for book files
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        Ok(self.scan_with_stats(root_path)?.files)
    }

    /// Scan with statistics
    pub fn scan_with_stats(&self, root_path: &Path) -> Result<ScanResult, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let mut result = ScanResult::default();
        let mut symlink_visited = HashSet::new();

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, &mut symlink_visited));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let Some(ext) = self.book_extension(entry.path()) else {
                        continue;
                    };
                    match entry.path().strip_prefix(root_path) {
                        Ok(relative) => {
                            *result.by_extension.entry(ext).or_insert(0) += 1;
                            result.files.push(relative.to_path_buf());
                        }
                        Err(e) => {
                            let err = ScanError::FileAccessError(entry.path().to_path_buf(), e.to_string());
                            result.errors.push(err.to_string());
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    result.errors.push(e.to_string());
                    // Continue scanning, don't abort
                }
            }
        }

        result.files.sort();
        tracing::debug!(
            files = result.files.len(),
            errors = result.errors.len(),
            root = %root_path.display(),
            "Scan complete"
        );

        Ok(result)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry, symlink_visited: &mut HashSet<PathBuf>) -> bool {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        // Skip ignored patterns
        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern.as_str()) {
                return false;
            }
        }

        // Detect symlink loops
        if entry.file_type().is_symlink() {
            if let Ok(canonical) = path.canonicalize() {
                if !symlink_visited.insert(canonical) {
                    tracing::warn!("Symlink loop detected: {}", path.display());
                    return false;
                }
            }
        }

        true
    }

    /// Lower-cased extension if it is an accepted book extension
    fn book_extension(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        self.extensions.contains(&ext).then_some(ext)
    }
}

impl Default for LibraryScanner {
    fn default() -> Self {
        Self::new()
    }
}
