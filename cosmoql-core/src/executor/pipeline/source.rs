use std::sync::Arc;

use serde_json::Value;

use crate::ast::{Parameters, SelectItemKind, SelectStatement};
use crate::error::QueryResult;
use crate::executor::row::{resolve_destination_column_name, RowContext};

/// Turns raw documents into row contexts bound under the FROM alias and `$root`.
pub(crate) struct SourceIterator<I> {
    documents: Option<I>,
    table_name: String,
    parameters: Arc<Parameters>,
}

impl<I> SourceIterator<I>
where
    I: Iterator<Item = QueryResult<Value>>,
{
    pub(crate) fn new(documents: I, table_name: String, parameters: Arc<Parameters>) -> Self {
        Self {
            documents: Some(documents),
            table_name,
            parameters,
        }
    }
}

impl<I> Iterator for SourceIterator<I>
where
    I: Iterator<Item = QueryResult<Value>>,
{
    type Item = QueryResult<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        let documents = self.documents.as_mut()?;
        match documents.next() {
            Some(Ok(document)) => Some(Ok(RowContext::new(
                document,
                &self.table_name,
                Arc::clone(&self.parameters),
            ))),
            Some(Err(err)) => Some(Err(err)),
            None => {
                self.documents = None;
                None
            }
        }
    }
}

/// Name the source documents are bound under.
///
/// For `FROM (SELECT ... FROM x) AS y` this is the inner source `x`, since the
/// subquery runs against the raw documents.
pub(crate) fn initial_table_name(statement: &SelectStatement) -> String {
    let table = match &statement.table.select_item.kind {
        SelectItemKind::SubQuery(inner) => &inner.table,
        _ => &statement.table,
    };

    table.value.clone().unwrap_or_else(|| {
        resolve_destination_column_name(&table.select_item, 0, &statement.parameters)
    })
}
