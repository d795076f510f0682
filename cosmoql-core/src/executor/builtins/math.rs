//! Math builtin functions.
//!
//! Trigonometry takes radians; ACOS, ASIN and ATAN return degrees. The INT*
//! family only accepts integer operands.

use std::f64::consts::PI;

use serde_json::Value;

use crate::ast::FunctionCallType;
use crate::executor::helpers::{as_integer, as_number, number_value};

/// Call a math function. Returns None if the function is not a math function.
pub fn call(function: FunctionCallType, args: &[Value]) -> Option<Value> {
    let result = match function {
        FunctionCallType::MathAbs => integer_or_float(args, i64::checked_abs, f64::abs),
        FunctionCallType::MathCeiling => integer_or_float(args, Some, f64::ceil),
        FunctionCallType::MathFloor => integer_or_float(args, Some, f64::floor),
        FunctionCallType::MathRound => integer_or_float(args, Some, f64::round),

        FunctionCallType::MathTrunc => unary(args, "TRUNC", f64::trunc),
        FunctionCallType::MathCos => unary(args, "COS", f64::cos),
        FunctionCallType::MathSin => unary(args, "SIN", f64::sin),
        FunctionCallType::MathTan => unary(args, "TAN", f64::tan),
        FunctionCallType::MathExp => unary(args, "EXP", f64::exp),
        FunctionCallType::MathSqrt => unary(args, "SQRT", f64::sqrt),
        FunctionCallType::MathSquare => unary(args, "SQUARE", |x| x * x),
        FunctionCallType::MathDegrees => unary(args, "DEGREES", f64::to_degrees),
        FunctionCallType::MathRadians => unary(args, "RADIANS", f64::to_radians),
        FunctionCallType::MathAtan => unary(args, "ATAN", |x| x.atan().to_degrees()),

        FunctionCallType::MathAcos => match number_arg(args, 0, "ACOS") {
            Some(x) if (-1.0..=1.0).contains(&x) => number_value(x.acos().to_degrees()),
            Some(_) => domain_error("ACOS", "argument outside [-1, 1]"),
            None => Value::Null,
        },

        FunctionCallType::MathAsin => match number_arg(args, 0, "ASIN") {
            Some(x) if (-1.0..=1.0).contains(&x) => number_value(x.asin().to_degrees()),
            Some(_) => domain_error("ASIN", "argument outside [-1, 1]"),
            None => Value::Null,
        },

        FunctionCallType::MathCot => match number_arg(args, 0, "COT") {
            Some(x) if x.tan() != 0.0 => number_value(1.0 / x.tan()),
            Some(_) => domain_error("COT", "tangent is zero"),
            None => Value::Null,
        },

        FunctionCallType::MathLog10 => match number_arg(args, 0, "LOG10") {
            Some(x) if x > 0.0 => number_value(x.log10()),
            Some(_) => domain_error("LOG10", "argument must be positive"),
            None => Value::Null,
        },

        FunctionCallType::MathLog => {
            let base = match args.get(1) {
                None | Some(Value::Null) => std::f64::consts::E,
                Some(value) => match as_number(value) {
                    Some(b) if b > 0.0 && b != 1.0 => b,
                    _ => return Some(domain_error("LOG", "base must be > 0 and != 1")),
                },
            };
            match number_arg(args, 0, "LOG") {
                Some(x) if x > 0.0 => number_value(x.ln() / base.ln()),
                Some(_) => domain_error("LOG", "argument must be positive"),
                None => Value::Null,
            }
        }

        FunctionCallType::MathNumberBin => {
            let bin = match args.get(1) {
                None | Some(Value::Null) => 1.0,
                Some(value) => match as_number(value) {
                    Some(b) if b != 0.0 => b,
                    _ => return Some(domain_error("NUMBERBIN", "bin size must be non-zero")),
                },
            };
            match number_arg(args, 0, "NUMBERBIN") {
                Some(x) => number_value((x / bin).floor() * bin),
                None => Value::Null,
            }
        }

        FunctionCallType::MathSign => match args.first() {
            Some(value) => match as_integer(value) {
                Some(n) => Value::from(n.signum()),
                None => match as_number(value) {
                    Some(x) if x > 0.0 => Value::from(1),
                    Some(x) if x < 0.0 => Value::from(-1),
                    Some(_) => Value::from(0),
                    None => Value::Null,
                },
            },
            None => Value::Null,
        },

        FunctionCallType::MathAtn2 => {
            match (number_arg(args, 0, "ATN2"), number_arg(args, 1, "ATN2")) {
                (Some(y), Some(x)) => number_value(y.atan2(x)),
                _ => Value::Null,
            }
        }

        FunctionCallType::MathPower => {
            match (number_arg(args, 0, "POWER"), number_arg(args, 1, "POWER")) {
                (Some(base), Some(exponent)) => number_value(base.powf(exponent)),
                _ => Value::Null,
            }
        }

        FunctionCallType::MathPi => number_value(PI),
        FunctionCallType::MathRand => number_value(rand::random::<f64>()),

        FunctionCallType::MathIntBitNot => match args.first().and_then(as_integer) {
            Some(n) => Value::from(!n),
            None => domain_error("INTBITNOT", "operand must be an integer"),
        },

        FunctionCallType::MathIntAdd => integer_binary(args, "INTADD", i64::checked_add),
        FunctionCallType::MathIntSub => integer_binary(args, "INTSUB", i64::checked_sub),
        FunctionCallType::MathIntMul => integer_binary(args, "INTMUL", i64::checked_mul),
        FunctionCallType::MathIntDiv => integer_binary(args, "INTDIV", i64::checked_div),
        FunctionCallType::MathIntMod => integer_binary(args, "INTMOD", i64::checked_rem),
        FunctionCallType::MathIntBitAnd => integer_binary(args, "INTBITAND", |a, b| Some(a & b)),
        FunctionCallType::MathIntBitOr => integer_binary(args, "INTBITOR", |a, b| Some(a | b)),
        FunctionCallType::MathIntBitXor => integer_binary(args, "INTBITXOR", |a, b| Some(a ^ b)),
        FunctionCallType::MathIntBitLeftShift => {
            integer_binary(args, "INTBITLEFTSHIFT", |a, b| {
                u32::try_from(b).ok().and_then(|shift| a.checked_shl(shift))
            })
        }
        FunctionCallType::MathIntBitRightShift => {
            integer_binary(args, "INTBITRIGHTSHIFT", |a, b| {
                u32::try_from(b).ok().and_then(|shift| a.checked_shr(shift))
            })
        }

        _ => return None,
    };

    Some(result)
}

fn domain_error(name: &str, reason: &str) -> Value {
    tracing::debug!("{}: {}", name, reason);
    Value::Null
}

fn number_arg(args: &[Value], index: usize, name: &str) -> Option<f64> {
    let value = args.get(index).and_then(as_number);
    if value.is_none() {
        tracing::debug!("{} expects a numeric argument", name);
    }
    value
}

fn unary(args: &[Value], name: &str, op: impl Fn(f64) -> f64) -> Value {
    match number_arg(args, 0, name) {
        Some(x) => number_value(op(x)),
        None => Value::Null,
    }
}

/// Integers stay integers; floats go through `float_op`.
fn integer_or_float(
    args: &[Value],
    int_op: impl Fn(i64) -> Option<i64>,
    float_op: impl Fn(f64) -> f64,
) -> Value {
    let Some(value) = args.first() else {
        return Value::Null;
    };
    if let Some(n) = as_integer(value) {
        if let Some(result) = int_op(n) {
            return Value::from(result);
        }
    }
    match as_number(value) {
        Some(x) => number_value(float_op(x)),
        None => Value::Null,
    }
}

fn integer_binary(args: &[Value], name: &str, op: impl Fn(i64, i64) -> Option<i64>) -> Value {
    let a = args.first().and_then(as_integer);
    let b = args.get(1).and_then(as_integer);
    match (a, b) {
        (Some(a), Some(b)) => match op(a, b) {
            Some(result) => Value::from(result),
            None => domain_error(name, "overflow or division by zero"),
        },
        _ => domain_error(name, "operands must be integers"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(function: FunctionCallType, args: &[Value]) -> Value {
        call(function, args).unwrap()
    }

    fn approx(value: Value, expected: f64) {
        let actual = value.as_f64().unwrap();
        assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
    }

    #[test]
    fn test_rounding_keeps_integers() {
        assert_eq!(run(FunctionCallType::MathAbs, &[json!(-5)]), json!(5));
        assert_eq!(run(FunctionCallType::MathAbs, &[json!(-5.5)]), json!(5.5));
        assert_eq!(run(FunctionCallType::MathCeiling, &[json!(3.2)]), json!(4.0));
        assert_eq!(run(FunctionCallType::MathFloor, &[json!(3)]), json!(3));
        assert_eq!(run(FunctionCallType::MathRound, &[json!(2.5)]), json!(3.0));
        assert_eq!(run(FunctionCallType::MathRound, &[json!(-2.5)]), json!(-3.0));
        assert_eq!(run(FunctionCallType::MathTrunc, &[json!(7)]), json!(7.0));
        assert_eq!(run(FunctionCallType::MathAbs, &[json!("x")]), Value::Null);
    }

    #[test]
    fn test_inverse_trig_returns_degrees() {
        approx(run(FunctionCallType::MathAcos, &[json!(0)]), 90.0);
        approx(run(FunctionCallType::MathAsin, &[json!(1)]), 90.0);
        approx(run(FunctionCallType::MathAtan, &[json!(1)]), 45.0);
        assert_eq!(run(FunctionCallType::MathAcos, &[json!(2)]), Value::Null);
        assert_eq!(run(FunctionCallType::MathAsin, &[json!(-1.5)]), Value::Null);
    }

    #[test]
    fn test_trig_and_conversions() {
        approx(run(FunctionCallType::MathCos, &[json!(0)]), 1.0);
        approx(run(FunctionCallType::MathSin, &[json!(0)]), 0.0);
        approx(run(FunctionCallType::MathCot, &[json!(1)]), 1.0 / 1f64.tan());
        assert_eq!(run(FunctionCallType::MathCot, &[json!(0)]), Value::Null);
        approx(run(FunctionCallType::MathDegrees, &[json!(PI)]), 180.0);
        approx(run(FunctionCallType::MathRadians, &[json!(180)]), PI);
        approx(run(FunctionCallType::MathAtn2, &[json!(1), json!(1)]), PI / 4.0);
    }

    #[test]
    fn test_logarithms() {
        approx(run(FunctionCallType::MathLog10, &[json!(1000)]), 3.0);
        assert_eq!(run(FunctionCallType::MathLog10, &[json!(0)]), Value::Null);
        approx(run(FunctionCallType::MathLog, &[json!(std::f64::consts::E)]), 1.0);
        approx(run(FunctionCallType::MathLog, &[json!(8), json!(2)]), 3.0);
        assert_eq!(run(FunctionCallType::MathLog, &[json!(8), json!(1)]), Value::Null);
        assert_eq!(run(FunctionCallType::MathLog, &[json!(-1)]), Value::Null);
    }

    #[test]
    fn test_powers_and_roots() {
        assert_eq!(run(FunctionCallType::MathSquare, &[json!(4)]), json!(16.0));
        assert_eq!(run(FunctionCallType::MathSqrt, &[json!(16)]), json!(4.0));
        assert_eq!(run(FunctionCallType::MathSqrt, &[json!(-1)]), Value::Null);
        assert_eq!(run(FunctionCallType::MathPower, &[json!(2), json!(10)]), json!(1024.0));
        approx(run(FunctionCallType::MathExp, &[json!(1)]), std::f64::consts::E);
    }

    #[test]
    fn test_sign_and_number_bin() {
        assert_eq!(run(FunctionCallType::MathSign, &[json!(-3.2)]), json!(-1));
        assert_eq!(run(FunctionCallType::MathSign, &[json!(0)]), json!(0));
        assert_eq!(run(FunctionCallType::MathSign, &[json!(9)]), json!(1));
        assert_eq!(run(FunctionCallType::MathNumberBin, &[json!(7.6)]), json!(7.0));
        assert_eq!(run(FunctionCallType::MathNumberBin, &[json!(7), json!(5)]), json!(5.0));
        assert_eq!(run(FunctionCallType::MathNumberBin, &[json!(7), json!(0)]), Value::Null);
    }

    #[test]
    fn test_integer_family() {
        assert_eq!(run(FunctionCallType::MathIntAdd, &[json!(2), json!(3)]), json!(5));
        assert_eq!(run(FunctionCallType::MathIntSub, &[json!(2), json!(3)]), json!(-1));
        assert_eq!(run(FunctionCallType::MathIntMul, &[json!(4), json!(3)]), json!(12));
        assert_eq!(run(FunctionCallType::MathIntDiv, &[json!(7), json!(2)]), json!(3));
        assert_eq!(run(FunctionCallType::MathIntMod, &[json!(7), json!(2)]), json!(1));
        assert_eq!(run(FunctionCallType::MathIntDiv, &[json!(7), json!(0)]), Value::Null);
        assert_eq!(run(FunctionCallType::MathIntBitAnd, &[json!(6), json!(3)]), json!(2));
        assert_eq!(run(FunctionCallType::MathIntBitOr, &[json!(6), json!(3)]), json!(7));
        assert_eq!(run(FunctionCallType::MathIntBitXor, &[json!(6), json!(3)]), json!(5));
        assert_eq!(run(FunctionCallType::MathIntBitLeftShift, &[json!(1), json!(4)]), json!(16));
        assert_eq!(run(FunctionCallType::MathIntBitRightShift, &[json!(16), json!(2)]), json!(4));
        assert_eq!(run(FunctionCallType::MathIntBitNot, &[json!(0)]), json!(-1));
        assert_eq!(run(FunctionCallType::MathIntAdd, &[json!(2.0), json!(3)]), Value::Null);
    }

    #[test]
    fn test_constants() {
        approx(run(FunctionCallType::MathPi, &[]), PI);
        let r = run(FunctionCallType::MathRand, &[]).as_f64().unwrap();
        assert!((0.0..1.0).contains(&r));
    }
}
