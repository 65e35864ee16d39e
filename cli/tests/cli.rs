use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const STORE: &str = r#"{"store":{"book":[{"title":"A","price":8.95},{"title":"B","price":22.99}],"open":true}}"#;

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents).expect("write test file");
}

#[test]
fn prints_whole_document_as_json() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    write_file(&input, r#"{"b":1,"a":[true,null]}"#);

    let expected = "{\n  \"a\": [\n    true,\n    null\n  ],\n  \"b\": 1\n}";

    cargo_bin_cmd!("jsonquery")
        .arg(&input)
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn prints_whole_document_as_markup() {
    cargo_bin_cmd!("jsonquery")
        .args(["--format", "xml"])
        .write_stdin(r#"{"name":"John","tags":["x"]}"#)
        .assert()
        .success()
        .stdout(r#"<?xml version="1.0" encoding="utf-8"?><root><name>John</name><tags><element>x</element></tags></root>"#);
}

#[test]
fn query_matches_as_json_array() {
    cargo_bin_cmd!("jsonquery")
        .args(["-q", "//book/*[price < 10]/title"])
        .write_stdin(STORE)
        .assert()
        .success()
        .stdout("[\n  \"A\"\n]");
}

#[test]
fn query_first_match_as_text() {
    cargo_bin_cmd!("jsonquery")
        .args(["-q", "//title", "--first", "--format", "text"])
        .write_stdin(STORE)
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn query_all_matches_as_text_lines() {
    cargo_bin_cmd!("jsonquery")
        .args(["-q", "//price", "--format", "text", "--no-cache"])
        .write_stdin(STORE)
        .assert()
        .success()
        .stdout("8.95\n22.99");
}

#[test]
fn first_without_match_prints_null() {
    cargo_bin_cmd!("jsonquery")
        .args(["-q", "//missing", "--first"])
        .write_stdin(STORE)
        .assert()
        .success()
        .stdout("null");
}

#[test]
fn invalid_query_fails() {
    cargo_bin_cmd!("jsonquery")
        .args(["-q", "//book["])
        .write_stdin(STORE)
        .assert()
        .failure()
        .stderr(contains("ERROR").and(contains("invalid query `//book[`")));
}

#[test]
fn malformed_input_fails() {
    cargo_bin_cmd!("jsonquery")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(contains("ERROR"));
}

#[test]
fn writes_to_output_file() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.json");
    let output = dir.path().join("out.xml");
    write_file(&input, STORE);

    cargo_bin_cmd!("jsonquery")
        .arg(&input)
        .args(["-q", "/store/open", "--format", "xml"])
        .args(["-o", output.to_str().expect("output path")])
        .assert()
        .success()
        .stdout(contains("out.xml"));

    let contents = fs::read_to_string(&output).expect("read output");
    assert_eq!(
        contents,
        r#"<?xml version="1.0" encoding="utf-8"?><root><open>true</open></root>"#
    );
}
