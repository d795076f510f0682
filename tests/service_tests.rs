//! Query Service Tests
//!
//! End-to-end queries against stored collections, parameter handling and the
//! parse-fallback policy.

use cosmoql::{parameters_to_map, Config, DbError, DocumentStore, Parameters, QueryError, QueryService};
use serde_json::{json, Value};
use tempfile::TempDir;

fn create_test_service(return_all_on_parse_error: bool) -> QueryService {
    let store = DocumentStore::new();
    store.create_database("db").unwrap();
    store.create_collection("db", "people", vec![]).unwrap();

    let people = [
        json!({"id": "1", "name": "Ann", "age": 31, "city": "Oslo", "tags": ["a", "b"]}),
        json!({"id": "2", "name": "Bob", "age": 25, "city": "Rome", "tags": ["b"]}),
        json!({"id": "3", "name": "Cid", "age": 42, "city": "Oslo", "tags": []}),
    ];
    for person in people {
        store.create_document("db", "people", person, false).unwrap();
    }

    let config = Config {
        return_all_on_parse_error,
        ..Config::default()
    };
    QueryService::new(store, &config)
}

fn ids(results: &[Value]) -> Vec<&str> {
    results.iter().filter_map(|r| r["id"].as_str()).collect()
}

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_filter_and_project() {
    let service = create_test_service(false);
    let results = service
        .execute(
            "db",
            "people",
            "SELECT c.name FROM c WHERE c.age > 30",
            Parameters::new(),
        )
        .unwrap();
    assert_eq!(results, vec![json!({"name": "Ann"}), json!({"name": "Cid"})]);
}

#[test]
fn test_system_fields_are_queryable() {
    let service = create_test_service(false);
    let results = service
        .execute(
            "db",
            "people",
            "SELECT VALUE IS_NUMBER(c._ts) FROM c",
            Parameters::new(),
        )
        .unwrap();
    assert_eq!(results, vec![json!(true), json!(true), json!(true)]);
}

#[test]
fn test_parameters_from_request_list() {
    let service = create_test_service(false);
    let parameters = parameters_to_map(&[json!({"name": "@city", "value": "Oslo"})]).unwrap();

    let results = service
        .execute(
            "db",
            "people",
            "SELECT c.id FROM c WHERE c.city = @city ORDER BY c.age DESC",
            parameters,
        )
        .unwrap();
    assert_eq!(ids(&results), vec!["3", "1"]);
}

#[test]
fn test_group_by_over_store() {
    let service = create_test_service(false);
    let results = service
        .execute(
            "db",
            "people",
            "SELECT c.city, COUNT(c.id) AS n FROM c GROUP BY c.city",
            Parameters::new(),
        )
        .unwrap();
    assert_eq!(
        results,
        vec![
            json!({"city": "Oslo", "n": 2}),
            json!({"city": "Rome", "n": 1})
        ]
    );
}

#[test]
fn test_join_over_store() {
    let service = create_test_service(false);
    let results = service
        .execute(
            "db",
            "people",
            "SELECT c.id, t AS tag FROM c JOIN t IN c.tags",
            Parameters::new(),
        )
        .unwrap();
    assert_eq!(
        results,
        vec![
            json!({"id": "1", "tag": "a"}),
            json!({"id": "1", "tag": "b"}),
            json!({"id": "2", "tag": "b"})
        ]
    );
}

#[test]
fn test_missing_collection_is_error() {
    let service = create_test_service(false);
    let err = service
        .execute("db", "ghosts", "SELECT * FROM c", Parameters::new())
        .unwrap_err();
    assert!(matches!(err, DbError::CollectionNotFound(_)));
}

// ============================================================================
// Parse-Fallback Tests
// ============================================================================

#[test]
fn test_parse_error_returns_all_documents_when_enabled() {
    let service = create_test_service(true);
    let results = service
        .execute("db", "people", "SELEC nonsense", Parameters::new())
        .unwrap();
    assert_eq!(ids(&results), vec!["1", "2", "3"]);
}

#[test]
fn test_parse_error_is_reported_when_disabled() {
    let service = create_test_service(false);
    let err = service
        .execute("db", "people", "SELEC nonsense", Parameters::new())
        .unwrap_err();
    assert!(matches!(err, DbError::Query(QueryError::ParseError(_))));
}

#[test]
fn test_fallback_still_requires_collection() {
    let service = create_test_service(true);
    assert!(matches!(
        service.execute("db", "ghosts", "SELEC", Parameters::new()),
        Err(DbError::CollectionNotFound(_))
    ));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_query_after_reload() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = tmp_dir.path().join("state.json");

    let service = create_test_service(false);
    service.store().dump_to_json(&path).unwrap();

    let restored = QueryService::new(
        DocumentStore::from_json_file(&path).unwrap(),
        &Config::default(),
    );
    let results = restored
        .execute(
            "db",
            "people",
            "SELECT VALUE c.name FROM c WHERE ARRAY_CONTAINS(c.tags, \"b\")",
            Parameters::new(),
        )
        .unwrap();
    assert_eq!(results, vec![json!("Ann"), json!("Bob")]);
}
