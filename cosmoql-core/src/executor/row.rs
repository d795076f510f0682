//! Row contexts and select-item resolution.
//!
//! A [`RowContext`] binds table aliases to values for one row in flight.
//! Resolution never fails: anything that cannot be evaluated is `null`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::ast::{
    ArithmeticOperator, BinaryExpression, Constant, Parameters, SelectItem, SelectItemKind,
    SelectStatement,
};

use super::builtins;
use super::helpers::{as_number, number_value};

/// Alias under which the originating document is always bound.
pub const ROOT_TABLE: &str = "$root";

/// Evaluation frame for a single row.
#[derive(Debug, Clone, Default)]
pub struct RowContext {
    pub(crate) tables: HashMap<String, Arc<Value>>,
    pub(crate) parameters: Arc<Parameters>,
    /// Rows sharing this row's GROUP BY key; read by aggregate functions
    pub(crate) grouped_rows: Vec<RowContext>,
}

impl RowContext {
    /// Bind `document` under `table_name` and under `$root`.
    pub fn new(document: Value, table_name: &str, parameters: Arc<Parameters>) -> Self {
        let document = Arc::new(document);
        let mut tables = HashMap::with_capacity(2);
        tables.insert(table_name.to_string(), Arc::clone(&document));
        tables.insert(ROOT_TABLE.to_string(), document);

        Self {
            tables,
            parameters,
            grouped_rows: Vec::new(),
        }
    }

    /// A value bound under `name`, if any.
    pub fn table(&self, name: &str) -> Option<&Value> {
        self.tables.get(name).map(|value| value.as_ref())
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        self.tables.insert(name.to_string(), Arc::new(value));
    }

    /// Shallow copy (new alias map, shared values) with one extra binding.
    pub(crate) fn with_binding(&self, name: &str, value: Value) -> Self {
        let mut row = Self {
            tables: self.tables.clone(),
            parameters: Arc::clone(&self.parameters),
            grouped_rows: Vec::new(),
        };
        row.bind(name, value);
        row
    }

    /// Resolve a select item to a value, applying `NOT` to boolean results.
    pub fn resolve(&self, item: &SelectItem) -> Value {
        let value = self.resolve_kind(item);
        match value {
            Value::Bool(b) if item.invert => Value::Bool(!b),
            other => other,
        }
    }

    /// Resolve an optional function argument; a missing argument is `null`.
    pub(crate) fn resolve_argument(&self, argument: Option<&SelectItem>) -> Value {
        argument.map(|item| self.resolve(item)).unwrap_or(Value::Null)
    }

    fn resolve_kind(&self, item: &SelectItem) -> Value {
        match &item.kind {
            SelectItemKind::Field => self.resolve_path(&item.path),
            SelectItemKind::Object => {
                let mut object = Map::new();
                for (index, child) in item.select_items.iter().enumerate() {
                    let name = resolve_destination_column_name(child, index, &self.parameters);
                    object.insert(name, self.resolve(child));
                }
                Value::Object(object)
            }
            SelectItemKind::Array => Value::Array(
                item.select_items
                    .iter()
                    .map(|child| self.resolve(child))
                    .collect(),
            ),
            SelectItemKind::Constant(constant) => self.resolve_constant(constant),
            SelectItemKind::FunctionCall(call) => builtins::call(self, call),
            SelectItemKind::SubQuery(statement) => self.resolve_sub_query(statement),
            SelectItemKind::BinaryExpression(expression) => self.resolve_binary(expression),
            SelectItemKind::Expression(expression) => Value::Bool(self.evaluate(expression)),
        }
    }

    /// Walk a field path from the table named by its first segment.
    fn resolve_path(&self, path: &[String]) -> Value {
        let Some((first, rest)) = path.split_first() else {
            return Value::Null;
        };
        let Some(mut current) = self.table(first) else {
            return Value::Null;
        };

        for segment in rest {
            let Some(key) = self.resolve_segment(segment) else {
                return Value::Null;
            };
            let next = match current {
                Value::Object(map) => map.get(key.as_ref()),
                Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }

        current.clone()
    }

    /// `@name` segments subscript with the parameter's string value.
    fn resolve_segment<'a>(&'a self, segment: &'a str) -> Option<Cow<'a, str>> {
        if segment.starts_with('@') {
            match self.parameters.get(segment) {
                Some(Value::String(s)) => Some(Cow::Borrowed(s.as_str())),
                Some(Value::Number(n)) => Some(Cow::Owned(n.to_string())),
                _ => {
                    tracing::debug!("Path parameter {} is not bound to a string", segment);
                    None
                }
            }
        } else {
            Some(Cow::Borrowed(segment))
        }
    }

    fn resolve_constant(&self, constant: &Constant) -> Value {
        match constant {
            Constant::String(s) => Value::String(s.clone()),
            Constant::Integer(n) => Value::from(*n),
            Constant::Float(f) => number_value(*f),
            Constant::Boolean(b) => Value::Bool(*b),
            Constant::Null => Value::Null,
            Constant::Parameter(name) => self.parameters.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    fn resolve_binary(&self, expression: &BinaryExpression) -> Value {
        let left = self.resolve(&expression.left);
        let right = self.resolve(&expression.right);
        let (Some(a), Some(b)) = (as_number(&left), as_number(&right)) else {
            tracing::debug!("Arithmetic on non-numeric operands: {} and {}", left, right);
            return Value::Null;
        };

        let result = match expression.operation {
            ArithmeticOperator::Add => a + b,
            ArithmeticOperator::Subtract => a - b,
            ArithmeticOperator::Multiply => a * b,
            ArithmeticOperator::Divide => {
                if b == 0.0 {
                    tracing::debug!("Division by zero");
                    return Value::Null;
                }
                a / b
            }
        };
        number_value(result)
    }

    /// Run a correlated subquery with this row as its only input.
    fn resolve_sub_query(&self, statement: &SelectStatement) -> Value {
        let source = std::iter::once(Ok(self.clone()));
        let mut results = super::execute_rows(statement, Box::new(source));

        if statement.exists {
            return Value::Bool(matches!(results.next(), Some(Ok(_))));
        }

        let mut rows = Vec::new();
        for result in results {
            match result {
                Ok(value) => rows.push(value),
                Err(err) => tracing::debug!("Subquery row dropped: {}", err),
            }
        }
        Value::Array(rows)
    }
}

/// Output column name for a projected item: the alias, else the last path
/// segment, else `$N` (1-based). Names starting with `@` are replaced by the
/// parameter's string value.
pub fn resolve_destination_column_name(
    item: &SelectItem,
    index: usize,
    parameters: &Parameters,
) -> String {
    let name = item
        .alias
        .clone()
        .or_else(|| item.path.last().cloned())
        .unwrap_or_else(|| format!("${}", index + 1));

    if name.starts_with('@') {
        if let Some(Value::String(bound)) = parameters.get(&name) {
            return bound.clone();
        }
    }
    name
}
