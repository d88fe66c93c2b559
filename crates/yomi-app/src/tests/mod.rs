
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use yomi_config::Config;
use zip::write::SimpleFileOptions;

use crate::state::AppState;

/// Fresh state over an empty store, plus the fixture archive written to disk
pub(crate) fn create_test_state() -> (Arc<AppState>, PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.store.db_path = temp_dir.path().join("yomi.db");
    config.import.batch_size = 3;
    let state = Arc::new(AppState::new(config).unwrap());

    let archive = temp_dir.path().join("fixture.zip");
    std::fs::write(&archive, fixture_zip()).unwrap();

    (state, archive, temp_dir)
}

fn fixture_zip() -> Vec<u8> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../yomi-dictionary/tests/fixtures/valid-dictionary");
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for path in files {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(&std::fs::read(&path).unwrap()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
