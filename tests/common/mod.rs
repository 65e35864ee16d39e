use std::fs;
use std::path::PathBuf;

use jsonquery::Document;

pub fn fixture_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn load_fixture(name: &str) -> Document {
    let path = fixture_root().join(name);
    let file = fs::File::open(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {err}", path.display()));
    jsonquery::from_reader(file)
        .unwrap_or_else(|err| panic!("failed to build fixture {}: {err}", path.display()))
}
