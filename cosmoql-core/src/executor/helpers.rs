//! Compare and coerce helpers shared by the evaluator, the function library
//! and the pipeline stages.

use std::cmp::Ordering;

use serde_json::Value;

/// Order two JSON values.
///
/// - `null` sorts before every other value.
/// - Numbers compare by their `f64` value, whatever their representation.
/// - Strings and booleans compare natively (`false < true`).
/// - Arrays and objects are `Equal` when structurally equal, `Greater` otherwise.
/// - Values of different types are never equal; the left one is `Greater`.
pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(0.0);
            let b = b.as_f64().unwrap_or(0.0);
            a.partial_cmp(&b).unwrap_or(Ordering::Greater)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            if left == right {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        }
        _ => Ordering::Greater,
    }
}

/// Equality under [`compare_values`] (so `1 == 1.0`).
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    compare_values(left, right) == Ordering::Equal
}

/// True for integer-valued JSON numbers (not floats that happen to be whole).
#[inline]
pub fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64(),
        _ => false,
    }
}

/// The value as an `i64` when it is an integer number.
#[inline]
pub fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// The value as an `f64` when it is any number.
#[inline]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Build a number value; NaN and infinities become `null`.
#[inline]
pub fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Stringify a scalar for CONCAT, ToString, UPPER and LOWER.
///
/// Integers print in decimal, floats with six fractional digits and booleans
/// as `true`/`false`. `null`, arrays and objects print as the empty string.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => match n.as_u64() {
                Some(u) => u.to_string(),
                None => format!("{:.6}", n.as_f64().unwrap_or(0.0)),
            },
        },
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Composite GROUP BY key: every part stringified and followed by `:`.
///
/// Distinct tuples can collide (`1` and `"1"` share a key).
pub fn group_key(values: &[Value]) -> String {
    let mut key = String::new();
    for value in values {
        match value {
            Value::Null => key.push_str("<nil>"),
            Value::String(s) => key.push_str(s),
            other => key.push_str(&other.to_string()),
        }
        key.push(':');
    }
    key
}

/// Stable merge sort that tolerates comparators which are not total orders.
///
/// `slice::sort_by` may panic on an inconsistent comparator, and
/// [`compare_values`] is inconsistent for mixed types.
pub fn stable_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }

    merged
}
