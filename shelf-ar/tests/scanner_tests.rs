//! Library scanner and manifest against real directories

use shelf_ar::metadata::{collect_items, ManifestReader};
use shelf_ar::scanner::{LibraryScanner, ScanError};
use shelf_ar::{AuthorPipeline, AuthorSource, ResolverConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"<FictionBook/>").unwrap();
}

fn library() -> TempDir {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "Волков Тим/Книга.fb2");
    touch(dir.path(), "Волков Тим/cover.jpg");
    touch(dir.path(), "misc/Иван Петров - Рассказ.FB2");
    touch(dir.path(), "misc/deep/deeper/Орлов Борис - Позывной.fb2");
    touch(dir.path(), ".git/objects/stray.fb2");
    dir
}

#[test]
fn test_scan_finds_books_relative_and_sorted() {
    let lib = library();

    let files = LibraryScanner::new().scan(lib.path()).unwrap();

    assert_eq!(
        files,
        vec![
            PathBuf::from("misc/deep/deeper/Орлов Борис - Позывной.fb2"),
            PathBuf::from("misc/Иван Петров - Рассказ.FB2"),
            PathBuf::from("Волков Тим/Книга.fb2"),
        ]
    );
}

#[test]
fn test_scan_with_stats_counts_extensions() {
    let lib = library();

    let result = LibraryScanner::new()
        .with_extensions(["fb2", "jpg"])
        .scan_with_stats(lib.path())
        .unwrap();

    assert_eq!(result.by_extension.get("fb2"), Some(&3));
    assert_eq!(result.by_extension.get("jpg"), Some(&1));
    assert!(result.errors.is_empty());
}

#[test]
fn test_scan_respects_max_depth() {
    let lib = library();

    let files = LibraryScanner::new().with_max_depth(2).scan(lib.path()).unwrap();

    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.components().count() == 2));
}

#[test]
fn test_scan_file_as_directory() {
    let lib = library();
    let result = LibraryScanner::new().scan(&lib.path().join("Волков Тим/Книга.fb2"));
    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
}

#[cfg(unix)]
#[test]
fn test_scan_survives_symlink_loop() {
    let lib = library();
    std::os::unix::fs::symlink(lib.path(), lib.path().join("misc/loop")).unwrap();

    let files = LibraryScanner::new().scan(lib.path()).unwrap();

    assert_eq!(files.len(), 3);
}

/// **[TC-I-SCAN-010-01]** Integration test: Scan, manifest and pipeline together
#[test]
fn tc_i_scan_010_01_scan_to_records() {
    let lib = library();
    let manifest_path = lib.path().join("manifest.json");
    fs::write(
        &manifest_path,
        r#"{
            "Волков Тим/Книга.fb2": {"authors": "Тим Волков; Ян Кулагин", "title": "Книга"},
            "misc/Иван Петров - Рассказ.FB2": {"authors": "", "title": "Рассказ"}
        }"#,
    )
    .unwrap();

    let files = LibraryScanner::new().scan(lib.path()).unwrap();
    let reader = ManifestReader::load(&manifest_path).unwrap();
    let items = collect_items(&files, &reader);
    let records = AuthorPipeline::new(ResolverConfig::default())
        .unwrap()
        .run(items);

    let volkov = records
        .iter()
        .find(|r| r.path() == Path::new("Волков Тим/Книга.fb2"))
        .unwrap();
    assert_eq!(volkov.proposed_author(), "Волков Тим");
    assert_eq!(volkov.author_source(), Some(AuthorSource::Folder));
    assert_eq!(volkov.title(), "Книга");

    let petrov = records
        .iter()
        .find(|r| r.path() == Path::new("misc/Иван Петров - Рассказ.FB2"))
        .unwrap();
    assert_eq!(petrov.proposed_author(), "Петров Иван");
}
