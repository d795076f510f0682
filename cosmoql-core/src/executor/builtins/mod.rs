//! Builtin functions.
//!
//! Every function is total: wrong argument types, missing arguments and domain
//! violations produce `null` (or `false`/empty for predicates and
//! collections) instead of an error.

mod aggregate;
mod array;
mod math;
mod misc;
mod string;
mod type_check;

use serde_json::Value;

use crate::ast::{FunctionCall, FunctionCallType};

use super::row::RowContext;

/// Container for builtin function implementations.
pub struct BuiltinFunctions;

impl BuiltinFunctions {
    /// Call a non-aggregate function over already-resolved arguments.
    ///
    /// Aggregates need sibling rows and return `null` here; they are evaluated
    /// through a [`RowContext`] instead.
    pub fn call(function: FunctionCallType, args: &[Value]) -> Value {
        if let Some(result) = string::call(function, args) {
            return result;
        }

        if let Some(result) = math::call(function, args) {
            return result;
        }

        if let Some(result) = array::call(function, args) {
            return result;
        }

        if let Some(result) = type_check::call(function, args) {
            return result;
        }

        if let Some(result) = misc::call(function, args) {
            return result;
        }

        tracing::debug!("{:?} cannot be called without row context", function);
        Value::Null
    }
}

/// Evaluate a function call against a row.
pub(crate) fn call(row: &RowContext, call: &FunctionCall) -> Value {
    if call.function.is_aggregate() {
        let target = call.arguments.first().and_then(Option::as_ref);
        return aggregate::call(call.function, target, row);
    }

    let args: Vec<Value> = call
        .arguments
        .iter()
        .map(|argument| row.resolve_argument(argument.as_ref()))
        .collect();

    BuiltinFunctions::call(call.function, &args)
}
