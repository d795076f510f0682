//! Document Store Tests
//!
//! Tests for the in-memory store including:
//! - Database and collection lifecycle
//! - Document CRUD and upsert
//! - JSON-file persistence

use cosmoql::{DbError, DocumentStore};
use serde_json::json;
use tempfile::TempDir;

fn create_test_store() -> DocumentStore {
    let store = DocumentStore::new();
    store.create_database("shop").unwrap();
    store.create_collection("shop", "products", vec![]).unwrap();
    store
}

// ============================================================================
// Database and Collection Tests
// ============================================================================

#[test]
fn test_database_lifecycle() {
    let store = DocumentStore::new();

    let created = store.create_database("db1").unwrap();
    assert_eq!(created.id, "db1");
    assert_eq!(store.get_database("db1").unwrap(), created);

    store.create_database("db2").unwrap();
    let ids: Vec<String> = store.list_databases().into_iter().map(|db| db.id).collect();
    assert_eq!(ids, vec!["db1", "db2"]);

    store.delete_database("db1").unwrap();
    assert!(matches!(
        store.get_database("db1"),
        Err(DbError::DatabaseNotFound(_))
    ));
    assert!(matches!(
        store.delete_database("db1"),
        Err(DbError::DatabaseNotFound(_))
    ));
}

#[test]
fn test_duplicate_database_conflicts() {
    let store = DocumentStore::new();
    store.create_database("db").unwrap();
    assert!(matches!(
        store.create_database("db"),
        Err(DbError::DatabaseAlreadyExists(_))
    ));
}

#[test]
fn test_collection_lifecycle() {
    let store = create_test_store();

    store.create_collection("shop", "orders", vec![]).unwrap();
    let ids: Vec<String> = store
        .list_collections("shop")
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec!["products", "orders"]);

    assert!(matches!(
        store.create_collection("shop", "orders", vec![]),
        Err(DbError::CollectionAlreadyExists(_))
    ));
    assert!(matches!(
        store.create_collection("missing", "orders", vec![]),
        Err(DbError::DatabaseNotFound(_))
    ));

    store.delete_collection("shop", "orders").unwrap();
    assert!(matches!(
        store.get_collection("shop", "orders"),
        Err(DbError::CollectionNotFound(_))
    ));
}

#[test]
fn test_deleting_database_drops_collections() {
    let store = create_test_store();
    store.delete_database("shop").unwrap();
    store.create_database("shop").unwrap();
    assert!(store.list_collections("shop").unwrap().is_empty());
}

// ============================================================================
// Document Tests
// ============================================================================

#[test]
fn test_document_crud() {
    let store = create_test_store();

    let created = store
        .create_document("shop", "products", json!({"id": "p1", "price": 10}), false)
        .unwrap();
    assert_eq!(created["price"], json!(10));

    let fetched = store.get_document("shop", "products", "p1").unwrap();
    assert_eq!(fetched, created);

    store.delete_document("shop", "products", "p1").unwrap();
    assert!(matches!(
        store.get_document("shop", "products", "p1"),
        Err(DbError::DocumentNotFound(_))
    ));
}

#[test]
fn test_duplicate_document_conflicts_without_upsert() {
    let store = create_test_store();
    store
        .create_document("shop", "products", json!({"id": "p1"}), false)
        .unwrap();

    let err = store
        .create_document("shop", "products", json!({"id": "p1"}), false)
        .unwrap_err();
    assert!(matches!(err, DbError::DocumentAlreadyExists(ref id) if id == "p1"));
}

#[test]
fn test_upsert_replaces_in_place() {
    let store = create_test_store();
    for id in ["a", "b", "c"] {
        store
            .create_document("shop", "products", json!({"id": id, "v": 1}), false)
            .unwrap();
    }

    store
        .create_document("shop", "products", json!({"id": "b", "v": 2}), true)
        .unwrap();

    let docs = store.list_documents("shop", "products").unwrap();
    let summary: Vec<(String, i64)> = docs
        .iter()
        .map(|d| (d["id"].as_str().unwrap().to_string(), d["v"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 1)
        ]
    );
}

#[test]
fn test_upsert_inserts_when_missing() {
    let store = create_test_store();
    store
        .create_document("shop", "products", json!({"id": "new"}), true)
        .unwrap();
    assert_eq!(store.list_documents("shop", "products").unwrap().len(), 1);
}

#[test]
fn test_documents_keep_insertion_order() {
    let store = create_test_store();
    for id in ["z", "m", "a"] {
        store
            .create_document("shop", "products", json!({"id": id}), false)
            .unwrap();
    }

    let ids: Vec<String> = store
        .document_iterator("shop", "products")
        .unwrap()
        .map(|doc| doc.unwrap()["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["z", "m", "a"]);
}

#[test]
fn test_document_in_missing_collection() {
    let store = create_test_store();
    assert!(matches!(
        store.create_document("shop", "nope", json!({"id": "1"}), false),
        Err(DbError::CollectionNotFound(_))
    ));
    assert!(matches!(
        store.document_iterator("nope", "products"),
        Err(DbError::DatabaseNotFound(_))
    ));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_dump_and_load_round_trip() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = tmp_dir.path().join("state.json");

    let store = create_test_store();
    store
        .create_collection("shop", "orders", vec!["/customer".to_string()])
        .unwrap();
    let doc = store
        .create_document("shop", "products", json!({"id": "p1", "tags": ["x"]}), false)
        .unwrap();
    store.dump_to_json(&path).unwrap();

    let restored = DocumentStore::from_json_file(&path).unwrap();
    assert_eq!(restored.list_databases(), store.list_databases());
    assert_eq!(
        restored.list_collections("shop").unwrap(),
        store.list_collections("shop").unwrap()
    );
    assert_eq!(restored.get_document("shop", "products", "p1").unwrap(), doc);
}

#[test]
fn test_load_replaces_existing_state() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = tmp_dir.path().join("state.json");

    let empty = DocumentStore::new();
    empty.dump_to_json(&path).unwrap();

    let store = create_test_store();
    store.load_from_json(&path).unwrap();
    assert!(store.list_databases().is_empty());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = DocumentStore::new();
    assert!(matches!(
        store.load_from_json(&tmp_dir.path().join("absent.json")),
        Err(DbError::IoError(_))
    ));
}

#[test]
fn test_load_malformed_file_is_json_error() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = tmp_dir.path().join("bad.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = DocumentStore::new();
    assert!(matches!(
        store.load_from_json(&path),
        Err(DbError::JsonError(_))
    ));
}
