#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use yomi_dictionary::Store;
use zip::write::SimpleFileOptions;

pub const FIXTURE_TITLE: &str = "Test Dictionary";

/// A reduced stand-in for a full-size reference dictionary: 20 terms,
/// 2 kanji, 10 term-meta, 4 kanji-meta and 5 tag rows. It keeps the
/// 打 / 打つ / 打ち込む family (10 exact hits across six readings) and adds
/// one term per conjugation class the search tests need.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/valid-dictionary")
}

/// Fixture files as (name, contents), index first, banks by name
pub fn fixture_files() -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = std::fs::read_dir(fixture_dir())
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().into_owned();
            (name, std::fs::read(entry.path()).unwrap())
        })
        .collect();
    files.sort_by_key(|(name, _)| (name != "index.json", name.clone()));
    files
}

pub fn build_zip(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(name.as_str(), SimpleFileOptions::default()).unwrap();
        zip.write_all(body).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// The fixture dictionary zipped under `prefix`, optionally with the
/// index written as the last entry
pub fn fixture_zip(prefix: &str, index_last: bool) -> Vec<u8> {
    let mut files: Vec<(String, Vec<u8>)> = fixture_files()
        .into_iter()
        .map(|(name, body)| (format!("{prefix}{name}"), body))
        .collect();
    if index_last {
        files.rotate_left(1);
    }
    build_zip(&files)
}

pub fn create_test_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("dict.db")).unwrap();
    (store, temp_dir)
}
