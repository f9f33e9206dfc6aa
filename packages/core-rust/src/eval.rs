//! Evaluation pipeline for client-supplied operations.
//!
//! Validation runs in a fixed order and the first failure wins: operation
//! name, argument count, numeric coercion, then the arithmetic itself. The
//! `Display` output of [`EvalError`] is the exact message clients see.

use serde_json::Value;
use thiserror::Error;

use crate::ops::{ApplyError, Operation};

/// Largest magnitude at which an IEEE double still represents every integer
/// exactly (2^53). Beyond it a JSON float cannot prove the client sent an
/// integer.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// A failed evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The name resolved to nothing in the closed operation set.
    #[error("Error: unknown operation: {0}")]
    UnknownOperation(String),
    /// Fewer arguments than the operation's arity.
    #[error("Error: Not enough arguments to perform the operation {0}")]
    NotEnoughArguments(String),
    /// More arguments than the operation's arity.
    #[error("Error: Too many arguments to perform the operation {0}")]
    TooManyArguments(String),
    /// At least one argument did not coerce to an integer.
    #[error("Error: Arguments must be numeric (integers)")]
    NotNumeric,
    /// Division with a zero divisor.
    #[error("Error while performing operation Divide: division by 0")]
    DivisionByZero,
    /// Factorial of a negative operand.
    #[error("Error while performing operation Factorial: not supported for the negative number")]
    NegativeFactorial,
    /// The arithmetic itself failed; `operation` keeps the client's casing.
    #[error("Error while performing operation {operation}: {reason}")]
    OperationFailed {
        operation: String,
        reason: ApplyError,
    },
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Arguments after numeric coercion, in evaluation order.
    pub arguments: Vec<i64>,
    /// The computed value.
    pub result: i64,
}

/// Runs the full pipeline on a raw request: resolve the name, check the
/// argument count against the operation's arity, coerce every argument, and
/// evaluate.
///
/// # Errors
///
/// Returns the first check that fails as an `EvalError`; its `Display`
/// output is the exact client-facing message.
pub fn evaluate(name: &str, raw_arguments: &[Value]) -> Result<Evaluation, EvalError> {
    let operation =
        Operation::resolve(name).ok_or_else(|| EvalError::UnknownOperation(name.to_string()))?;
    let arity = operation.arity();
    if raw_arguments.len() < arity {
        return Err(EvalError::NotEnoughArguments(name.to_string()));
    }
    if raw_arguments.len() > arity {
        return Err(EvalError::TooManyArguments(name.to_string()));
    }
    let arguments = raw_arguments
        .iter()
        .map(coerce_integer)
        .collect::<Option<Vec<i64>>>()
        .ok_or(EvalError::NotNumeric)?;
    let result = execute(operation, name, &arguments)?;
    Ok(Evaluation { arguments, result })
}

/// Applies a resolved operation, mapping arithmetic failures onto the
/// client-facing variants. `name` is echoed in the generic failure message
/// with the casing the client used.
///
/// # Errors
///
/// Returns `EvalError` when the apply step fails.
pub fn execute(operation: Operation, name: &str, arguments: &[i64]) -> Result<i64, EvalError> {
    operation.apply(arguments).map_err(|reason| match reason {
        ApplyError::DivisionByZero => EvalError::DivisionByZero,
        ApplyError::NegativeFactorial => EvalError::NegativeFactorial,
        reason @ (ApplyError::Overflow | ApplyError::NegativeExponent) => {
            EvalError::OperationFailed {
                operation: name.to_string(),
                reason,
            }
        }
    })
}

/// Coerces a JSON value to an `i64` if it is losslessly one: an in-range
/// integer, a float that is a whole number within 2^53, or a string holding
/// a decimal integer. Everything else, booleans included, is non-numeric.
#[allow(clippy::cast_possible_truncation)]
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Some(integer);
            }
            let float = number.as_f64()?;
            (float.fract() == 0.0 && float.abs() <= MAX_EXACT_FLOAT).then_some(float as i64)
        }
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
