//! Array and set builtin functions.

use serde_json::Value;

use crate::ast::FunctionCallType;
use crate::executor::helpers::{as_integer, values_equal};

/// Call an array function. Returns None if the function is not an array function.
pub fn call(function: FunctionCallType, args: &[Value]) -> Option<Value> {
    let result = match function {
        FunctionCallType::ArrayConcat => {
            let mut result = Vec::new();
            for arg in args {
                result.extend(array_arg(Some(arg)).iter().cloned());
            }
            Value::Array(result)
        }

        FunctionCallType::ArrayLength => Value::from(array_arg(args.first()).len()),

        FunctionCallType::ArraySlice => {
            let items = array_arg(args.first());
            let Some(start) = args.get(1).and_then(as_integer) else {
                tracing::debug!("ARRAY_SLICE expects an integer start");
                return Some(Value::Array(Vec::new()));
            };
            let length = match args.get(2) {
                None | Some(Value::Null) => None,
                Some(value) => match as_integer(value) {
                    Some(n) => Some(n),
                    None => {
                        tracing::debug!("ARRAY_SLICE expects an integer length");
                        return Some(Value::Array(Vec::new()));
                    }
                },
            };
            Value::Array(slice(items, start, length).to_vec())
        }

        FunctionCallType::ArrayContains => {
            let items = array_arg(args.first());
            let needle = args.get(1).unwrap_or(&Value::Null);
            let partial = matches!(args.get(2), Some(Value::Bool(true)));
            Value::Bool(items.iter().any(|item| contains_match(item, needle, partial)))
        }

        FunctionCallType::ArrayContainsAny => {
            let items = array_arg(args.first());
            let needles = args.get(1..).unwrap_or_default();
            Value::Bool(
                needles
                    .iter()
                    .any(|needle| items.iter().any(|item| values_equal(item, needle))),
            )
        }

        FunctionCallType::ArrayContainsAll => {
            let items = array_arg(args.first());
            let needles = args.get(1..).unwrap_or_default();
            Value::Bool(
                needles
                    .iter()
                    .all(|needle| items.iter().any(|item| values_equal(item, needle))),
            )
        }

        FunctionCallType::SetIntersect => {
            let first = array_arg(args.first());
            let second = array_arg(args.get(1));
            Value::Array(
                second
                    .iter()
                    .filter(|item| first.contains(item))
                    .cloned()
                    .collect(),
            )
        }

        FunctionCallType::SetUnion => {
            let mut result: Vec<Value> = Vec::new();
            for item in array_arg(args.first()).iter().chain(array_arg(args.get(1))) {
                if !result.contains(item) {
                    result.push(item.clone());
                }
            }
            Value::Array(result)
        }

        _ => return None,
    };

    Some(result)
}

/// The argument as an array slice; anything else reads as empty.
fn array_arg(arg: Option<&Value>) -> &[Value] {
    match arg {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => &[],
        Some(other) => {
            tracing::debug!("Expected array argument, got {}", other);
            &[]
        }
    }
}

/// Negative `start` counts from the end; bounds clamp instead of failing.
fn slice(items: &[Value], start: i64, length: Option<i64>) -> &[Value] {
    let len = items.len() as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    if start >= len {
        return &[];
    }

    let end = match length {
        Some(n) if n <= 0 => start,
        Some(n) => start.saturating_add(n).min(len),
        None => len,
    };
    &items[start as usize..end as usize]
}

/// Equality under `values_equal`, or with `partial` an object needle matches when
/// each of its keys equals the element's.
fn contains_match(item: &Value, needle: &Value, partial: bool) -> bool {
    if partial {
        if let (Value::Object(element), Value::Object(fields)) = (item, needle) {
            return fields
                .iter()
                .all(|(key, value)| element.get(key).is_some_and(|v| values_equal(v, value)));
        }
    }
    values_equal(item, needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(function: FunctionCallType, args: &[Value]) -> Value {
        call(function, args).unwrap()
    }

    #[test]
    fn test_concat_and_length() {
        assert_eq!(
            run(FunctionCallType::ArrayConcat, &[json!([1, 2]), json!(["a"]), json!(null)]),
            json!([1, 2, "a"])
        );
        assert_eq!(run(FunctionCallType::ArrayLength, &[json!([1, 2, 3])]), json!(3));
        assert_eq!(run(FunctionCallType::ArrayLength, &[json!("abc")]), json!(0));
    }

    #[test]
    fn test_slice() {
        let arr = json!(["a", "b", "c", "d"]);
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr.clone(), json!(1), json!(2)]),
            json!(["b", "c"])
        );
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr.clone(), json!(-2), Value::Null]),
            json!(["c", "d"])
        );
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr.clone(), json!(-10), json!(1)]),
            json!(["a"])
        );
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr.clone(), json!(1), json!(100)]),
            json!(["b", "c", "d"])
        );
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr.clone(), json!(9), json!(1)]),
            json!([])
        );
        assert_eq!(
            run(FunctionCallType::ArraySlice, &[arr, json!("1"), json!(1)]),
            json!([])
        );
    }

    #[test]
    fn test_contains() {
        let arr = json!([{"a": 1, "b": 2}, "x", 3]);
        assert_eq!(
            run(FunctionCallType::ArrayContains, &[arr.clone(), json!("x"), Value::Null]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContains, &[arr.clone(), json!({"a": 1}), Value::Null]),
            json!(false)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContains, &[arr.clone(), json!({"a": 1}), json!(true)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContainsAny, &[arr.clone(), json!(9), json!(3)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContainsAll, &[arr.clone(), json!("x"), json!(9)]),
            json!(false)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContainsAll, &[arr, json!("x"), json!(3)]),
            json!(true)
        );
    }

    #[test]
    fn test_set_functions() {
        assert_eq!(
            run(FunctionCallType::SetIntersect, &[json!([1, 2, 3]), json!([3, 4, 2])]),
            json!([3, 2])
        );
        assert_eq!(
            run(FunctionCallType::SetUnion, &[json!([1, 2, 2]), json!([3, 1])]),
            json!([1, 2, 3])
        );
        assert_eq!(
            run(FunctionCallType::SetIntersect, &[json!([1]), json!("x")]),
            json!([])
        );
    }

    #[test]
    fn test_contains_matches_numbers_by_value() {
        assert_eq!(run(FunctionCallType::ArrayContains, &[json!([1, 2]), json!(1.0)]), json!(true));
        assert_eq!(
            run(FunctionCallType::ArrayContainsAny, &[json!([1.5, 2]), json!(9), json!(2.0)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContainsAll, &[json!([1, 2, 3]), json!(3.0), json!(1)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContains, &[json!([1, "1"]), json!(true)]),
            json!(false)
        );
        assert_eq!(
            run(FunctionCallType::ArrayContains, &[json!([{"a": [1]}]), json!({"a": [1]})]),
            json!(true)
        );
    }
}
