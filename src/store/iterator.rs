use cosmoql_core::QueryResult;
use serde_json::Value;

/// Document source handed to the query executor.
///
/// Owns a snapshot of the collection taken when it was created, so writes
/// made while a query runs are not observed.
#[derive(Debug)]
pub struct DocumentIterator {
    documents: std::vec::IntoIter<Value>,
}

impl DocumentIterator {
    pub(crate) fn new(documents: Vec<Value>) -> Self {
        Self {
            documents: documents.into_iter(),
        }
    }
}

impl Iterator for DocumentIterator {
    type Item = QueryResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents.next().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStore;
    use serde_json::json;

    #[test]
    fn test_snapshot_ignores_later_writes() {
        let store = DocumentStore::new();
        store.create_database("db").unwrap();
        store.create_collection("db", "c", vec![]).unwrap();
        store
            .create_document("db", "c", json!({"id": "a"}), false)
            .unwrap();

        let iter = store.document_iterator("db", "c").unwrap();
        store
            .create_document("db", "c", json!({"id": "b"}), false)
            .unwrap();

        let ids: Vec<String> = iter
            .map(|doc| doc.unwrap()["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a"]);
    }
}
