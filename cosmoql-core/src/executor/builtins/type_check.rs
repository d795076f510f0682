//! Type checking builtin functions.

use serde_json::Value;

use crate::ast::FunctionCallType;
use crate::executor::helpers::is_integer;

/// Call a type check function. Returns None if the function is not a type check.
pub fn call(function: FunctionCallType, args: &[Value]) -> Option<Value> {
    let value = args.first().unwrap_or(&Value::Null);

    let result = match function {
        // Absent fields and JSON null are indistinguishable at this point.
        FunctionCallType::IsDefined => !value.is_null(),
        FunctionCallType::IsNull => value.is_null(),
        FunctionCallType::IsArray => value.is_array(),
        FunctionCallType::IsBool => value.is_boolean(),
        FunctionCallType::IsNumber => value.is_number(),
        FunctionCallType::IsInteger => is_integer(value),
        FunctionCallType::IsFiniteNumber => match value {
            Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
            _ => false,
        },
        FunctionCallType::IsObject => value.is_object(),
        FunctionCallType::IsString => value.is_string(),
        FunctionCallType::IsPrimitive => matches!(
            value,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        ),
        _ => return None,
    };

    Some(Value::Bool(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(function: FunctionCallType, value: Value) -> bool {
        call(function, &[value]).unwrap().as_bool().unwrap()
    }

    #[test]
    fn test_type_checks() {
        assert!(check(FunctionCallType::IsDefined, json!(0)));
        assert!(!check(FunctionCallType::IsDefined, Value::Null));
        assert!(check(FunctionCallType::IsNull, Value::Null));
        assert!(check(FunctionCallType::IsArray, json!([])));
        assert!(check(FunctionCallType::IsBool, json!(false)));
        assert!(check(FunctionCallType::IsNumber, json!(1.5)));
        assert!(check(FunctionCallType::IsInteger, json!(2)));
        assert!(!check(FunctionCallType::IsInteger, json!(2.5)));
        assert!(check(FunctionCallType::IsFiniteNumber, json!(2.5)));
        assert!(!check(FunctionCallType::IsFiniteNumber, json!("2")));
        assert!(check(FunctionCallType::IsObject, json!({})));
        assert!(check(FunctionCallType::IsString, json!("")));
        assert!(check(FunctionCallType::IsPrimitive, Value::Null));
        assert!(!check(FunctionCallType::IsPrimitive, json!([1])));
    }
}
