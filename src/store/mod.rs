//! In-memory document store.
//!
//! Databases hold collections, collections hold JSON documents keyed by their
//! `id` in insertion order. All state sits behind one `parking_lot::RwLock`;
//! queries read a snapshot through [`DocumentStore::document_iterator`].

mod iterator;
mod persist;

pub use iterator::DocumentIterator;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// System properties stamped on every stored document
pub const SYSTEM_FIELDS: [&str; 3] = ["_rid", "_ts", "_etag"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    #[serde(rename = "_rid")]
    pub rid: String,
    #[serde(rename = "_ts")]
    pub ts: i64,
    #[serde(rename = "_etag")]
    pub etag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionKey {
    pub paths: Vec<String>,
    #[serde(default = "default_partition_kind")]
    pub kind: String,
}

fn default_partition_kind() -> String {
    "Hash".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    #[serde(rename = "_rid")]
    pub rid: String,
    #[serde(rename = "_ts")]
    pub ts: i64,
    #[serde(rename = "_etag")]
    pub etag: String,
    #[serde(rename = "partitionKey", default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<PartitionKey>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct StoreState {
    #[serde(default)]
    databases: Vec<DatabaseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseEntry {
    #[serde(flatten)]
    info: DatabaseInfo,
    #[serde(default)]
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionEntry {
    #[serde(flatten)]
    info: CollectionInfo,
    #[serde(default)]
    documents: Vec<Value>,
    /// id -> position in `documents`
    #[serde(skip)]
    positions: HashMap<String, usize>,
}

impl StoreState {
    /// Rebuild the id lookups after deserializing.
    pub(crate) fn reindex(&mut self) {
        for db in &mut self.databases {
            for coll in &mut db.collections {
                coll.reindex_from(0);
            }
        }
    }
}

impl CollectionEntry {
    fn new(info: CollectionInfo) -> Self {
        Self {
            info,
            documents: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn push(&mut self, id: String, document: Value) {
        self.positions.insert(id, self.documents.len());
        self.documents.push(document);
    }

    fn remove(&mut self, index: usize) {
        let removed = self.documents.remove(index);
        if let Some(id) = document_id(&removed) {
            if self.positions.get(id) == Some(&index) {
                self.positions.remove(id);
            }
        }
        self.reindex_from(index);
    }

    /// Refresh the positions of every document from `start` on. When a
    /// loaded file repeats an id, the first document wins.
    fn reindex_from(&mut self, start: usize) {
        if start == 0 {
            self.positions.clear();
        }
        for (index, doc) in self.documents.iter().enumerate().skip(start) {
            if let Some(id) = document_id(doc) {
                let position = self.positions.entry(id.to_string()).or_insert(index);
                if *position > index {
                    *position = index;
                }
            }
        }
    }
}

fn document_id(document: &Value) -> Option<&str> {
    document.get("id").and_then(Value::as_str)
}

fn new_rid() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_etag() -> String {
    format!("\"{}\"", Uuid::new_v4())
}

/// Shared handle to the store; clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    state: Arc<RwLock<StoreState>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Databases ====================

    pub fn create_database(&self, id: &str) -> DbResult<DatabaseInfo> {
        let mut state = self.state.write();
        if state.databases.iter().any(|db| db.info.id == id) {
            return Err(DbError::DatabaseAlreadyExists(id.to_string()));
        }

        let info = DatabaseInfo {
            id: id.to_string(),
            rid: new_rid(),
            ts: Utc::now().timestamp(),
            etag: new_etag(),
        };
        state.databases.push(DatabaseEntry {
            info: info.clone(),
            collections: Vec::new(),
        });
        tracing::info!("Created database '{}'", id);
        Ok(info)
    }

    pub fn get_database(&self, id: &str) -> DbResult<DatabaseInfo> {
        let state = self.state.read();
        state
            .databases
            .iter()
            .find(|db| db.info.id == id)
            .map(|db| db.info.clone())
            .ok_or_else(|| DbError::DatabaseNotFound(id.to_string()))
    }

    pub fn list_databases(&self) -> Vec<DatabaseInfo> {
        let state = self.state.read();
        state.databases.iter().map(|db| db.info.clone()).collect()
    }

    pub fn delete_database(&self, id: &str) -> DbResult<()> {
        let mut state = self.state.write();
        let index = state
            .databases
            .iter()
            .position(|db| db.info.id == id)
            .ok_or_else(|| DbError::DatabaseNotFound(id.to_string()))?;
        state.databases.remove(index);
        tracing::info!("Deleted database '{}'", id);
        Ok(())
    }

    // ==================== Collections ====================

    pub fn create_collection(
        &self,
        database: &str,
        id: &str,
        partition_key_paths: Vec<String>,
    ) -> DbResult<CollectionInfo> {
        let mut state = self.state.write();
        let db = find_database_mut(&mut state, database)?;
        if db.collections.iter().any(|c| c.info.id == id) {
            return Err(DbError::CollectionAlreadyExists(id.to_string()));
        }

        let info = CollectionInfo {
            id: id.to_string(),
            rid: new_rid(),
            ts: Utc::now().timestamp(),
            etag: new_etag(),
            partition_key: (!partition_key_paths.is_empty()).then(|| PartitionKey {
                paths: partition_key_paths,
                kind: default_partition_kind(),
            }),
        };
        db.collections.push(CollectionEntry::new(info.clone()));
        tracing::info!("Created collection '{}/{}'", database, id);
        Ok(info)
    }

    pub fn get_collection(&self, database: &str, id: &str) -> DbResult<CollectionInfo> {
        let state = self.state.read();
        find_collection(&state, database, id).map(|c| c.info.clone())
    }

    pub fn list_collections(&self, database: &str) -> DbResult<Vec<CollectionInfo>> {
        let state = self.state.read();
        let db = find_database(&state, database)?;
        Ok(db.collections.iter().map(|c| c.info.clone()).collect())
    }

    pub fn delete_collection(&self, database: &str, id: &str) -> DbResult<()> {
        let mut state = self.state.write();
        let db = find_database_mut(&mut state, database)?;
        let index = db
            .collections
            .iter()
            .position(|c| c.info.id == id)
            .ok_or_else(|| DbError::CollectionNotFound(id.to_string()))?;
        db.collections.remove(index);
        tracing::info!("Deleted collection '{}/{}'", database, id);
        Ok(())
    }

    // ==================== Documents ====================

    /// Store a document and return it with its system properties.
    ///
    /// A missing `id` is generated. An existing `id` is a conflict unless
    /// `upsert` is set, in which case the stored document is replaced in place.
    pub fn create_document(
        &self,
        database: &str,
        collection: &str,
        document: Value,
        upsert: bool,
    ) -> DbResult<Value> {
        let mut fields = match document {
            Value::Object(fields) => fields,
            other => {
                return Err(DbError::InvalidDocument(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        let id = match fields.get("id") {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(other) => {
                return Err(DbError::InvalidDocument(format!(
                    "'id' must be a non-empty string, got {}",
                    other
                )))
            }
        };
        fields.insert("id".to_string(), Value::String(id.clone()));
        stamp_system_fields(&mut fields);
        let document = Value::Object(fields);

        let mut state = self.state.write();
        let coll = find_collection_mut(&mut state, database, collection)?;
        match coll.position(&id) {
            Some(index) if upsert => {
                coll.documents[index] = document.clone();
                tracing::debug!("Replaced document '{}' in '{}/{}'", id, database, collection);
            }
            Some(_) => return Err(DbError::DocumentAlreadyExists(id)),
            None => {
                coll.push(id.clone(), document.clone());
                tracing::debug!("Inserted document '{}' into '{}/{}'", id, database, collection);
            }
        }

        Ok(document)
    }

    pub fn get_document(&self, database: &str, collection: &str, id: &str) -> DbResult<Value> {
        let state = self.state.read();
        let coll = find_collection(&state, database, collection)?;
        coll.position(id)
            .map(|index| coll.documents[index].clone())
            .ok_or_else(|| DbError::DocumentNotFound(id.to_string()))
    }

    pub fn list_documents(&self, database: &str, collection: &str) -> DbResult<Vec<Value>> {
        let state = self.state.read();
        Ok(find_collection(&state, database, collection)?.documents.clone())
    }

    pub fn delete_document(&self, database: &str, collection: &str, id: &str) -> DbResult<()> {
        let mut state = self.state.write();
        let coll = find_collection_mut(&mut state, database, collection)?;
        let index = coll
            .position(id)
            .ok_or_else(|| DbError::DocumentNotFound(id.to_string()))?;
        coll.remove(index);
        Ok(())
    }

    /// Snapshot of a collection as a query document source.
    pub fn document_iterator(&self, database: &str, collection: &str) -> DbResult<DocumentIterator> {
        Ok(DocumentIterator::new(self.list_documents(database, collection)?))
    }
}

fn stamp_system_fields(fields: &mut Map<String, Value>) {
    fields.insert("_rid".to_string(), Value::String(new_rid()));
    fields.insert("_ts".to_string(), Value::from(Utc::now().timestamp()));
    fields.insert("_etag".to_string(), Value::String(new_etag()));
}

fn find_database<'a>(state: &'a StoreState, id: &str) -> DbResult<&'a DatabaseEntry> {
    state
        .databases
        .iter()
        .find(|db| db.info.id == id)
        .ok_or_else(|| DbError::DatabaseNotFound(id.to_string()))
}

fn find_database_mut<'a>(state: &'a mut StoreState, id: &str) -> DbResult<&'a mut DatabaseEntry> {
    state
        .databases
        .iter_mut()
        .find(|db| db.info.id == id)
        .ok_or_else(|| DbError::DatabaseNotFound(id.to_string()))
}

fn find_collection<'a>(
    state: &'a StoreState,
    database: &str,
    id: &str,
) -> DbResult<&'a CollectionEntry> {
    find_database(state, database)?
        .collections
        .iter()
        .find(|c| c.info.id == id)
        .ok_or_else(|| DbError::CollectionNotFound(id.to_string()))
}

fn find_collection_mut<'a>(
    state: &'a mut StoreState,
    database: &str,
    id: &str,
) -> DbResult<&'a mut CollectionEntry> {
    find_database_mut(state, database)?
        .collections
        .iter_mut()
        .find(|c| c.info.id == id)
        .ok_or_else(|| DbError::CollectionNotFound(id.to_string()))
}
