//! Aggregate functions over the rows of a group.

use serde_json::Value;

use crate::ast::{FunctionCallType, SelectItem};
use crate::executor::helpers::{as_number, number_value};
use crate::executor::row::RowContext;

/// Evaluate `target` in every grouped row of `row` and fold the results.
///
/// Numeric aggregates skip non-numbers and yield `null` when nothing is left.
/// COUNT counts non-null values.
pub fn call(function: FunctionCallType, target: Option<&SelectItem>, row: &RowContext) -> Value {
    let values = row
        .grouped_rows
        .iter()
        .map(|grouped| grouped.resolve_argument(target));

    if function == FunctionCallType::AggregateCount {
        return Value::from(values.filter(|value| !value.is_null()).count());
    }

    let numbers: Vec<f64> = values.filter_map(|value| as_number(&value)).collect();
    if numbers.is_empty() {
        return Value::Null;
    }

    let result = match function {
        FunctionCallType::AggregateSum => numbers.iter().sum::<f64>(),
        FunctionCallType::AggregateAvg => numbers.iter().sum::<f64>() / numbers.len() as f64,
        FunctionCallType::AggregateMax => numbers.iter().copied().fold(f64::MIN, f64::max),
        FunctionCallType::AggregateMin => numbers.iter().copied().fold(f64::MAX, f64::min),
        other => {
            tracing::debug!("{:?} is not an aggregate", other);
            return Value::Null;
        }
    };

    number_value(result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    fn group(documents: Vec<Value>) -> RowContext {
        let rows: Vec<RowContext> = documents
            .into_iter()
            .map(|doc| RowContext::new(doc, "c", Arc::default()))
            .collect();
        let mut representative = rows[0].clone();
        representative.grouped_rows = rows;
        representative
    }

    #[test]
    fn test_numeric_aggregates_skip_missing() {
        let row = group(vec![
            json!({"v": 123}),
            json!({"v": 456}),
            json!({"v": "text"}),
            json!({}),
        ]);
        let target = SelectItem::path(&["c", "v"]);
        let run = |function| call(function, Some(&target), &row);

        assert_eq!(run(FunctionCallType::AggregateSum), json!(579.0));
        assert_eq!(run(FunctionCallType::AggregateAvg), json!(289.5));
        assert_eq!(run(FunctionCallType::AggregateMax), json!(456.0));
        assert_eq!(run(FunctionCallType::AggregateMin), json!(123.0));
        assert_eq!(run(FunctionCallType::AggregateCount), json!(3));
    }

    #[test]
    fn test_max_of_negatives() {
        let row = group(vec![json!({"v": -4}), json!({"v": -2.5})]);
        let target = SelectItem::path(&["c", "v"]);
        assert_eq!(
            call(FunctionCallType::AggregateMax, Some(&target), &row),
            json!(-2.5)
        );
    }

    #[test]
    fn test_empty_numeric_group_is_null() {
        let row = group(vec![json!({"v": "a"})]);
        let target = SelectItem::path(&["c", "v"]);
        assert_eq!(call(FunctionCallType::AggregateAvg, Some(&target), &row), Value::Null);
        assert_eq!(call(FunctionCallType::AggregateCount, Some(&target), &row), json!(1));
    }
}
