//! Conditional and membership functions.

use serde_json::Value;

use crate::ast::FunctionCallType;
use crate::executor::helpers::values_equal;

pub fn call(function: FunctionCallType, args: &[Value]) -> Option<Value> {
    let result = match function {
        FunctionCallType::Iif => {
            let branch = if matches!(args.first(), Some(Value::Bool(true))) {
                1
            } else {
                2
            };
            args.get(branch).cloned().unwrap_or(Value::Null)
        }

        FunctionCallType::In => {
            let Some((needle, candidates)) = args.split_first() else {
                return Some(Value::Bool(false));
            };
            Value::Bool(candidates.iter().any(|c| values_equal(needle, c)))
        }

        _ => return None,
    };

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_iif_needs_boolean_true() {
        let args = |cond: Value| [cond, json!("yes"), json!("no")];
        assert_eq!(call(FunctionCallType::Iif, &args(json!(true))), Some(json!("yes")));
        assert_eq!(call(FunctionCallType::Iif, &args(json!(false))), Some(json!("no")));
        assert_eq!(call(FunctionCallType::Iif, &args(json!(1))), Some(json!("no")));
    }

    #[test]
    fn test_in_uses_value_comparison() {
        assert_eq!(
            call(FunctionCallType::In, &[json!(1), json!("1"), json!(1.0)]),
            Some(json!(true))
        );
        assert_eq!(
            call(FunctionCallType::In, &[json!("a"), json!("b")]),
            Some(json!(false))
        );
        assert_eq!(
            call(FunctionCallType::In, &[Value::Null, Value::Null]),
            Some(json!(true))
        );
    }
}
