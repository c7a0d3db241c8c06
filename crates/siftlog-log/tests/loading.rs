//! Integration tests for loading record logs from disk.

use serde_json::json;
use siftlog_log::{Error, FileSource, LogSource, load, load_from_reader};
use std::io::Write;
use tempfile::NamedTempFile;

fn store_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn loads_tagged_records_in_file_order() {
    let file = store_with(concat!(
        "E{\"name\":\"Ann\",\"age\":30}\n",
        "E{\"name\":\"Bo\",\"age\":20}\n",
        "X{\"ignored\":true}\n",
        "E{\"name\":\"Cy\",\"age\":25}\n",
    ));

    let records = load(file.path()).await.unwrap();

    let names: Vec<_> = records.iter().map(|r| r.get("name").cloned()).collect();
    assert_eq!(
        names,
        vec![Some(json!("Ann")), Some(json!("Bo")), Some(json!("Cy"))]
    );
}

#[tokio::test]
async fn last_line_without_newline_is_loaded() {
    let file = store_with("E{\"a\":1}\nE{\"a\":2}");
    let records = load(file.path()).await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn crlf_line_endings_are_accepted() {
    let file = store_with("E{\"a\":1}\r\nX\r\nE{\"a\":2}\r\n");
    let records = load(file.path()).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("a"), Some(&json!(2)));
}

#[tokio::test]
async fn nested_values_survive_loading() {
    let file = store_with("E{\"user\":{\"name\":\"Ann\"},\"tags\":[\"a\",\"b\"]}\n");
    let records = load(file.path()).await.unwrap();
    assert_eq!(records[0].get("user"), Some(&json!({"name": "Ann"})));
    assert_eq!(records[0].get("tags"), Some(&json!(["a", "b"])));
}

#[tokio::test]
async fn malformed_entry_aborts_the_load() {
    let file = store_with("E{\"a\":1}\nE{\"a\":\nE{\"a\":3}\n");

    let err = load(file.path()).await.unwrap_err();

    assert!(matches!(err, Error::MalformedEntry { line_number: 2, .. }));
    assert!(err.to_string().contains("line 2"));
}

#[tokio::test]
async fn malformed_untagged_lines_are_ignored() {
    let file = store_with("D{{{{\nE{\"a\":1}\n#comment\n");
    let records = load(file.path()).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("absent.log")).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[tokio::test]
async fn file_source_sees_appended_entries() {
    let mut file = store_with("E{\"a\":1}\n");
    let source = FileSource::new(file.path());
    assert_eq!(source.load().await.unwrap().len(), 1);

    file.write_all(b"E{\"a\":2}\n").unwrap();
    file.flush().unwrap();
    assert_eq!(source.load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn non_utf8_bytes_on_ignored_lines_are_skipped() {
    let data: &[u8] = b"E{\"a\":1}\nX\xff\xfe\nE{\"a\":2}\n";
    let records = load_from_reader(data).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("a"), Some(&json!(1)));
    assert_eq!(records[1].get("a"), Some(&json!(2)));
}

#[tokio::test]
async fn non_utf8_bytes_in_a_record_fail_as_malformed_entry() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"E{\"a\":\"\xff\"}\n").unwrap();

    let err = load(file.path()).await.unwrap_err();
    assert!(matches!(err, Error::MalformedEntry { line_number: 1, .. }));
}
