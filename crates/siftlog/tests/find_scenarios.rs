//! End-to-end query scenarios against a store on disk.

use serde_json::{Value, json};
use siftlog::{Engine, EndRule, Error, Query};
use std::io::Write;
use tempfile::NamedTempFile;

const STORE: &str = concat!(
    "E{\"name\":\"Ann\",\"age\":30}\n",
    "E{\"name\":\"Bo\",\"age\":20}\n",
    "X{\"ignored\":true}\n",
    "E{\"name\":\"Cy\",\"age\":25}\n",
);

fn store_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

async fn run(store: &NamedTempFile, query: Value, end_rule: Option<Value>) -> Value {
    let engine = Engine::open(store.path(), vec!["name".to_string()]);
    let query = Query::from_value(query).unwrap();
    let end_rule = end_rule.map(|v| EndRule::from_value(v).unwrap());
    let output = engine.find(&query, end_rule.as_ref()).await.unwrap();
    Value::Array(output.into_iter().map(Value::Object).collect())
}

#[tokio::test]
async fn greater_than_keeps_store_order() {
    let store = store_with(STORE);
    let output = run(&store, json!({"age": {"$gt": 21}}), None).await;
    assert_eq!(
        output,
        json!([{"name": "Ann", "age": 30}, {"name": "Cy", "age": 25}])
    );
}

#[tokio::test]
async fn or_keeps_records_matching_any_rule_set() {
    let store = store_with(STORE);
    let output = run(
        &store,
        json!({"$or": [{"age": {"$lt": 22}}, {"name": {"$eq": "Cy"}}]}),
        None,
    )
    .await;
    assert_eq!(
        output,
        json!([{"name": "Bo", "age": 20}, {"name": "Cy", "age": 25}])
    );
}

#[tokio::test]
async fn text_matches_whole_words_only() {
    let store = store_with(STORE);

    let output = run(&store, json!({"$text": "ann"}), None).await;
    assert_eq!(output, json!([{"name": "Ann", "age": 30}]));

    let output = run(&store, json!({"$text": "an"}), None).await;
    assert_eq!(output, json!([]));
}

#[tokio::test]
async fn empty_query_with_sort_and_projection() {
    let store = store_with(STORE);
    let output = run(
        &store,
        json!({}),
        Some(json!({"sort": {"age": -1}, "projection": {"name": 1}})),
    )
    .await;
    assert_eq!(
        output,
        json!([{"name": "Ann"}, {"name": "Cy"}, {"name": "Bo"}])
    );
}

#[tokio::test]
async fn top_level_keys_are_anded() {
    let store = store_with(STORE);
    let output = run(
        &store,
        json!({"age": {"$lt": 28}, "$and": [{"name": {"$in": ["Ann", "Cy"]}}]}),
        None,
    )
    .await;
    assert_eq!(output, json!([{"name": "Cy", "age": 25}]));
}

#[tokio::test]
async fn empty_and_returns_everything_and_empty_or_nothing() {
    let store = store_with(STORE);
    assert_eq!(run(&store, json!({"$and": []}), None).await.as_array().unwrap().len(), 3);
    assert_eq!(run(&store, json!({"$or": []}), None).await, json!([]));
}

#[tokio::test]
async fn misspelled_combinator_filters_a_missing_field() {
    let store = store_with(STORE);
    let output = run(&store, json!({"$nd": {"$eq": 1}}), None).await;
    assert_eq!(output, json!([]));
}

#[tokio::test]
async fn type_mismatch_filters_instead_of_failing() {
    let store = store_with(STORE);
    let output = run(&store, json!({"name": {"$gt": 1}}), None).await;
    assert_eq!(output, json!([]));
}

#[tokio::test]
async fn each_find_rereads_the_store() {
    let mut store = store_with(STORE);
    let engine = Engine::open(store.path(), vec![]);
    assert_eq!(engine.find(&Query::new(), None).await.unwrap().len(), 3);

    store.write_all(b"E{\"name\":\"Di\",\"age\":41}\n").unwrap();
    store.flush().unwrap();
    assert_eq!(engine.find(&Query::new(), None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn malformed_entry_fails_the_whole_query() {
    let store = store_with("E{\"name\":\"Ann\"}\nE{\"name\":\n");
    let engine = Engine::open(store.path(), vec![]);

    let err = engine.find(&Query::new(), None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Log(siftlog_log::Error::MalformedEntry { line_number: 2, .. })
    ));
}

#[tokio::test]
async fn unreadable_store_fails_the_query() {
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::open(dir.path().join("missing.log"), vec![]);

    let err = engine.find(&Query::new(), None).await.unwrap_err();
    assert!(matches!(err, Error::Log(siftlog_log::Error::Io(_))));
}
