//! WHERE-clause evaluation.

use std::cmp::Ordering;

use serde_json::Value;

use crate::ast::{
    ComparisonExpression, ComparisonOperator, Expression, LogicalOperator, SelectItem,
};

use super::helpers::compare_values;
use super::row::RowContext;

impl RowContext {
    /// Evaluate a predicate. Anything that does not resolve to boolean `true`
    /// is false.
    pub fn evaluate(&self, expression: &Expression) -> bool {
        match expression {
            Expression::Comparison(comparison) => self.evaluate_comparison(comparison),
            Expression::Logical(logical) => match logical.operation {
                LogicalOperator::And => logical.expressions.iter().all(|e| self.evaluate(e)),
                LogicalOperator::Or => logical.expressions.iter().any(|e| self.evaluate(e)),
            },
            Expression::Constant(constant) => {
                self.resolve(&SelectItem::constant(constant.clone())) == Value::Bool(true)
            }
            Expression::SelectItem(item) => self.resolve(item) == Value::Bool(true),
        }
    }

    fn evaluate_comparison(&self, comparison: &ComparisonExpression) -> bool {
        let left = self.resolve(&comparison.left);
        let right = self.resolve(&comparison.right);
        let ordering = compare_values(&left, &right);

        match comparison.operation {
            ComparisonOperator::Equal => ordering == Ordering::Equal,
            ComparisonOperator::NotEqual => ordering != Ordering::Equal,
            ComparisonOperator::LessThan => ordering == Ordering::Less,
            ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
            ComparisonOperator::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOperator::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::ast::{ComparisonExpression, Constant, LogicalExpression, Parameters};

    use super::*;

    fn row() -> RowContext {
        let mut parameters = Parameters::new();
        parameters.insert("@on".to_string(), json!(true));
        RowContext::new(
            json!({"n": 5, "s": "abc", "flag": true, "text": "yes"}),
            "c",
            Arc::new(parameters),
        )
    }

    fn compare(field: &str, operation: ComparisonOperator, right: Value) -> Expression {
        let right = match right {
            Value::String(s) => Constant::String(s),
            Value::Bool(b) => Constant::Boolean(b),
            Value::Number(n) => Constant::Integer(n.as_i64().unwrap_or_default()),
            _ => Constant::Null,
        };
        Expression::Comparison(ComparisonExpression {
            left: SelectItem::path(&["c", field]),
            right: SelectItem::constant(right),
            operation,
        })
    }

    #[test]
    fn test_comparison_operators() {
        let row = row();
        assert!(row.evaluate(&compare("n", ComparisonOperator::Equal, json!(5))));
        assert!(row.evaluate(&compare("n", ComparisonOperator::NotEqual, json!(4))));
        assert!(row.evaluate(&compare("n", ComparisonOperator::LessThan, json!(6))));
        assert!(row.evaluate(&compare("n", ComparisonOperator::GreaterThanOrEqual, json!(5))));
        assert!(row.evaluate(&compare("s", ComparisonOperator::LessThanOrEqual, json!("abd"))));
        assert!(!row.evaluate(&compare("s", ComparisonOperator::Equal, json!(5))));
    }

    #[test]
    fn test_missing_field_sorts_lowest() {
        let row = row();
        assert!(row.evaluate(&compare("missing", ComparisonOperator::LessThan, json!(0))));
        assert!(!row.evaluate(&compare("missing", ComparisonOperator::Equal, json!(0))));
    }

    #[test]
    fn test_logical_expressions() {
        let row = row();
        let and = Expression::Logical(LogicalExpression {
            expressions: vec![
                compare("n", ComparisonOperator::Equal, json!(5)),
                compare("flag", ComparisonOperator::Equal, json!(false)),
            ],
            operation: LogicalOperator::And,
        });
        assert!(!row.evaluate(&and));

        let or = Expression::Logical(LogicalExpression {
            expressions: vec![
                compare("n", ComparisonOperator::Equal, json!(4)),
                compare("flag", ComparisonOperator::Equal, json!(true)),
            ],
            operation: LogicalOperator::Or,
        });
        assert!(row.evaluate(&or));
    }

    #[test]
    fn test_constant_and_item_filters_need_boolean_true() {
        let row = row();
        assert!(row.evaluate(&Expression::Constant(Constant::Boolean(true))));
        assert!(row.evaluate(&Expression::Constant(Constant::Parameter("@on".to_string()))));
        assert!(!row.evaluate(&Expression::Constant(Constant::Integer(1))));

        assert!(row.evaluate(&Expression::SelectItem(SelectItem::path(&["c", "flag"]))));
        assert!(!row.evaluate(&Expression::SelectItem(SelectItem::path(&["c", "text"]))));

        let mut negated = SelectItem::path(&["c", "flag"]);
        negated.invert = true;
        assert!(!row.evaluate(&Expression::SelectItem(negated)));
    }
}
