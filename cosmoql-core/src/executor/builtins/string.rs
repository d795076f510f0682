//! String builtin functions.
//!
//! Positions and lengths count characters, not bytes.

use serde_json::Value;

use crate::ast::FunctionCallType;
use crate::executor::helpers::{as_integer, stringify};

/// Longest string REPLICATE may produce, in characters
pub const MAX_REPLICATE_LENGTH: usize = 10_000;

/// Call a string function. Returns None if the function is not a string function.
pub fn call(function: FunctionCallType, args: &[Value]) -> Option<Value> {
    let result = match function {
        FunctionCallType::StringEquals => {
            let (a, b) = case_folded(args);
            Value::Bool(a == b)
        }

        FunctionCallType::Contains => {
            let (a, b) = case_folded(args);
            Value::Bool(a.contains(&b))
        }

        FunctionCallType::EndsWith => {
            let (a, b) = case_folded(args);
            Value::Bool(a.ends_with(&b))
        }

        FunctionCallType::StartsWith => {
            let (a, b) = case_folded(args);
            Value::Bool(a.starts_with(&b))
        }

        FunctionCallType::Concat => Value::String(args.iter().map(stringify).collect()),

        FunctionCallType::IndexOf => {
            let s = string_arg(args, 0);
            let needle = string_arg(args, 1);
            let start = args.get(2).and_then(as_integer).unwrap_or(0).max(0) as usize;
            Value::from(index_of(s, needle, start))
        }

        FunctionCallType::ToString => {
            Value::String(args.first().map(stringify).unwrap_or_default())
        }

        FunctionCallType::Upper => {
            let s = args.first().map(stringify).unwrap_or_default();
            Value::String(s.to_uppercase())
        }

        FunctionCallType::Lower => {
            let s = args.first().map(stringify).unwrap_or_default();
            Value::String(s.to_lowercase())
        }

        FunctionCallType::Left => {
            let s = string_arg(args, 0);
            match length_arg(args, 1, "LEFT") {
                Some(n) => Value::String(s.chars().take(n).collect()),
                None => Value::String(String::new()),
            }
        }

        FunctionCallType::Right => {
            let s = string_arg(args, 0);
            match length_arg(args, 1, "RIGHT") {
                Some(n) => {
                    let skip = s.chars().count().saturating_sub(n);
                    Value::String(s.chars().skip(skip).collect())
                }
                None => Value::String(String::new()),
            }
        }

        FunctionCallType::Substring => {
            let s = string_arg(args, 0);
            let start = args.get(1).and_then(as_integer);
            let length = args.get(2).and_then(as_integer);
            match (start, length) {
                (Some(start), Some(length)) if length > 0 => {
                    let start = start.max(0) as usize;
                    Value::String(s.chars().skip(start).take(length as usize).collect())
                }
                (Some(_), Some(_)) => Value::String(String::new()),
                _ => {
                    tracing::debug!("SUBSTRING expects integer start and length");
                    Value::String(String::new())
                }
            }
        }

        FunctionCallType::Length => Value::from(string_arg(args, 0).chars().count()),

        FunctionCallType::LTrim => {
            Value::String(string_arg(args, 0).trim_start_matches(' ').to_string())
        }

        FunctionCallType::RTrim => {
            Value::String(string_arg(args, 0).trim_end_matches(' ').to_string())
        }

        FunctionCallType::Trim => Value::String(string_arg(args, 0).trim_matches(' ').to_string()),

        FunctionCallType::Replace => {
            let s = string_arg(args, 0);
            let from = string_arg(args, 1);
            let to = string_arg(args, 2);
            Value::String(s.replace(from, to))
        }

        FunctionCallType::Replicate => {
            let s = string_arg(args, 0);
            match args.get(1).and_then(as_integer) {
                Some(times) if times > 0 => {
                    let times = usize::try_from(times).unwrap_or(usize::MAX);
                    match s.chars().count().checked_mul(times) {
                        Some(length) if length <= MAX_REPLICATE_LENGTH => {
                            Value::String(s.repeat(times))
                        }
                        _ => {
                            tracing::debug!(
                                "REPLICATE result exceeds {} characters",
                                MAX_REPLICATE_LENGTH
                            );
                            Value::Null
                        }
                    }
                }
                Some(_) => Value::String(String::new()),
                None => {
                    tracing::debug!("REPLICATE expects an integer repeat count");
                    Value::String(String::new())
                }
            }
        }

        FunctionCallType::Reverse => Value::String(string_arg(args, 0).chars().rev().collect()),

        _ => return None,
    };

    Some(result)
}

/// The argument at `index` as a string; anything else reads as empty.
fn string_arg(args: &[Value], index: usize) -> &str {
    match args.get(index) {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => "",
        Some(other) => {
            tracing::debug!("Expected string argument, got {}", other);
            ""
        }
    }
}

/// The first two string arguments, lowercased when the third is `true`.
fn case_folded(args: &[Value]) -> (String, String) {
    let a = string_arg(args, 0);
    let b = string_arg(args, 1);
    if matches!(args.get(2), Some(Value::Bool(true))) {
        (a.to_lowercase(), b.to_lowercase())
    } else {
        (a.to_string(), b.to_string())
    }
}

/// A non-negative character count for LEFT/RIGHT; `None` means empty result.
fn length_arg(args: &[Value], index: usize, name: &str) -> Option<usize> {
    match args.get(index).and_then(as_integer) {
        Some(n) if n > 0 => Some(n as usize),
        Some(_) => None,
        None => {
            tracing::debug!("{} expects an integer length", name);
            None
        }
    }
}

fn index_of(s: &str, needle: &str, start: usize) -> i64 {
    let Some((byte_start, _)) = s.char_indices().nth(start) else {
        return -1;
    };
    match s[byte_start..].find(needle) {
        Some(found) => (start + s[byte_start..byte_start + found].chars().count()) as i64,
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(function: FunctionCallType, args: &[Value]) -> Value {
        call(function, args).unwrap()
    }

    #[test]
    fn test_string_equals_and_case_flag() {
        assert_eq!(
            run(FunctionCallType::StringEquals, &[json!("abc"), json!("ABC"), Value::Null]),
            json!(false)
        );
        assert_eq!(
            run(FunctionCallType::StringEquals, &[json!("abc"), json!("ABC"), json!(true)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::StringEquals, &[json!("abc"), json!("ABC"), json!("yes")]),
            json!(false)
        );
    }

    #[test]
    fn test_contains_prefix_suffix() {
        assert_eq!(
            run(FunctionCallType::Contains, &[json!("hello world"), json!("o w")]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::StartsWith, &[json!("Hello"), json!("he"), json!(true)]),
            json!(true)
        );
        assert_eq!(
            run(FunctionCallType::EndsWith, &[json!("Hello"), json!("LO")]),
            json!(false)
        );
        assert_eq!(run(FunctionCallType::Contains, &[json!(12), json!("1")]), json!(false));
    }

    #[test]
    fn test_concat_and_to_string() {
        assert_eq!(
            run(
                FunctionCallType::Concat,
                &[json!("a"), json!(1), json!(true), json!(null), json!(2.5)]
            ),
            json!("a1true2.500000")
        );
        assert_eq!(run(FunctionCallType::ToString, &[json!(123)]), json!("123"));
        assert_eq!(run(FunctionCallType::Upper, &[json!("aBc")]), json!("ABC"));
        assert_eq!(run(FunctionCallType::Lower, &[json!(false)]), json!("false"));
    }

    #[test]
    fn test_index_of() {
        assert_eq!(run(FunctionCallType::IndexOf, &[json!("abcabc"), json!("c")]), json!(2));
        assert_eq!(
            run(FunctionCallType::IndexOf, &[json!("abcabc"), json!("c"), json!(3)]),
            json!(5)
        );
        assert_eq!(
            run(FunctionCallType::IndexOf, &[json!("abc"), json!("x"), Value::Null]),
            json!(-1)
        );
        assert_eq!(
            run(FunctionCallType::IndexOf, &[json!("abc"), json!("a"), json!(10)]),
            json!(-1)
        );
        assert_eq!(run(FunctionCallType::IndexOf, &[json!("héllo"), json!("l")]), json!(2));
    }

    #[test]
    fn test_left_right_substring_clamp() {
        assert_eq!(run(FunctionCallType::Left, &[json!("hello"), json!(2)]), json!("he"));
        assert_eq!(run(FunctionCallType::Left, &[json!("hi"), json!(10)]), json!("hi"));
        assert_eq!(run(FunctionCallType::Left, &[json!("hi"), json!(0)]), json!(""));
        assert_eq!(run(FunctionCallType::Left, &[json!("hi"), json!("2")]), json!(""));
        assert_eq!(run(FunctionCallType::Right, &[json!("hello"), json!(3)]), json!("llo"));
        assert_eq!(run(FunctionCallType::Right, &[json!("hi"), json!(9)]), json!("hi"));
        assert_eq!(
            run(FunctionCallType::Substring, &[json!("hello"), json!(1), json!(3)]),
            json!("ell")
        );
        assert_eq!(
            run(FunctionCallType::Substring, &[json!("hello"), json!(3), json!(100)]),
            json!("lo")
        );
        assert_eq!(
            run(FunctionCallType::Substring, &[json!("hello"), json!(10), json!(2)]),
            json!("")
        );
    }

    #[test]
    fn test_length_trim_replace() {
        assert_eq!(run(FunctionCallType::Length, &[json!("héllo")]), json!(5));
        assert_eq!(run(FunctionCallType::LTrim, &[json!("  a  ")]), json!("a  "));
        assert_eq!(run(FunctionCallType::RTrim, &[json!("  a  ")]), json!("  a"));
        assert_eq!(run(FunctionCallType::Trim, &[json!("  a  ")]), json!("a"));
        assert_eq!(run(FunctionCallType::Trim, &[json!("\ta\t")]), json!("\ta\t"));
        assert_eq!(
            run(FunctionCallType::Replace, &[json!("a-b-c"), json!("-"), json!("+")]),
            json!("a+b+c")
        );
    }

    #[test]
    fn test_replicate_and_reverse() {
        assert_eq!(run(FunctionCallType::Replicate, &[json!("ab"), json!(3)]), json!("ababab"));
        assert_eq!(run(FunctionCallType::Replicate, &[json!("ab"), json!(-1)]), json!(""));
        assert_eq!(run(FunctionCallType::Reverse, &[json!("añb")]), json!("bña"));
    }

    #[test]
    fn test_replicate_length_limit() {
        assert_eq!(
            run(FunctionCallType::Replicate, &[json!("ab"), json!(i64::MAX)]),
            Value::Null
        );
        assert_eq!(
            run(FunctionCallType::Replicate, &[json!("ab"), json!(1_000_000_000)]),
            Value::Null
        );
        assert_eq!(
            run(FunctionCallType::Replicate, &[json!("ab"), json!(5_001)]),
            Value::Null
        );

        let at_limit = run(FunctionCallType::Replicate, &[json!("ab"), json!(5_000)]);
        assert_eq!(at_limit.as_str().map(str::len), Some(MAX_REPLICATE_LENGTH));

        assert_eq!(
            run(FunctionCallType::Replicate, &[json!(""), json!(i64::MAX)]),
            json!("")
        );
    }

    #[test]
    fn test_not_a_string_function() {
        assert_eq!(call(FunctionCallType::MathAbs, &[json!(1)]), None);
    }
}
