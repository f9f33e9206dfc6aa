//! The closed set of calculator operations.
//!
//! Operation names resolve case-insensitively at the service boundary; from
//! there on a resolved [`Operation`] flows through typed code and every
//! dispatch is an exhaustive match. Arithmetic is checked: a result that does
//! not fit in an `i64` is an [`ApplyError`], never a wrapped value.

use thiserror::Error;

/// Why applying an operation to otherwise well-formed arguments failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// Division with a zero divisor.
    #[error("division by 0")]
    DivisionByZero,
    /// Factorial of a negative operand.
    #[error("not supported for the negative number")]
    NegativeFactorial,
    /// The mathematical result does not fit in an `i64`.
    #[error("integer overflow")]
    Overflow,
    /// Exponentiation with a negative exponent.
    #[error("negative exponent")]
    NegativeExponent,
}

/// A calculator operation.
///
/// The set is closed by design: there is no name-to-function table to extend
/// at runtime, and adding a variant forces every match in the crate to handle
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Plus,
    Minus,
    Times,
    Divide,
    Pow,
    Abs,
    Fact,
}

impl Operation {
    /// Resolves a client-supplied name, ignoring ASCII case. Returns `None`
    /// for anything outside the closed set.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "plus" => Some(Self::Plus),
            "minus" => Some(Self::Minus),
            "times" => Some(Self::Times),
            "divide" => Some(Self::Divide),
            "pow" => Some(Self::Pow),
            "abs" => Some(Self::Abs),
            "fact" => Some(Self::Fact),
            _ => None,
        }
    }

    /// Number of arguments the operation consumes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Plus | Self::Minus | Self::Times | Self::Divide | Self::Pow => 2,
            Self::Abs | Self::Fact => 1,
        }
    }

    /// Applies the operation to exactly [`arity`](Self::arity) arguments.
    /// Binary operations read the arguments as (first, second) in slice
    /// order. Callers validate the argument count before calling.
    ///
    /// # Errors
    ///
    /// Returns `ApplyError` when the arguments break a domain precondition
    /// or the result does not fit in an `i64`.
    pub fn apply(self, args: &[i64]) -> Result<i64, ApplyError> {
        match (self, args) {
            (Self::Plus, &[a, b]) => a.checked_add(b).ok_or(ApplyError::Overflow),
            (Self::Minus, &[a, b]) => a.checked_sub(b).ok_or(ApplyError::Overflow),
            (Self::Times, &[a, b]) => a.checked_mul(b).ok_or(ApplyError::Overflow),
            (Self::Divide, &[a, b]) => floor_div(a, b),
            (Self::Pow, &[base, exp]) => pow(base, exp),
            (Self::Abs, &[a]) => a.checked_abs().ok_or(ApplyError::Overflow),
            (Self::Fact, &[n]) => factorial(n),
            _ => unreachable!("argument count is validated before apply"),
        }
    }
}

/// Floor division, rounding toward negative infinity. `i64::MIN / -1` is the
/// one overflowing pair.
fn floor_div(a: i64, b: i64) -> Result<i64, ApplyError> {
    if b == 0 {
        return Err(ApplyError::DivisionByZero);
    }
    let quotient = a.checked_div(b).ok_or(ApplyError::Overflow)?;
    let remainder = a % b;
    if remainder != 0 && (remainder < 0) != (b < 0) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

/// Exponentiation over `i64`. Negative exponents are rejected rather than
/// rounded. Bases 0, 1, and -1 short-circuit so arbitrarily large exponents
/// stay cheap and exact; `0^0` is 1.
fn pow(base: i64, exp: i64) -> Result<i64, ApplyError> {
    if exp < 0 {
        return Err(ApplyError::NegativeExponent);
    }
    match base {
        0 => Ok(i64::from(exp == 0)),
        1 => Ok(1),
        -1 => Ok(if exp % 2 == 0 { 1 } else { -1 }),
        _ => {
            let exp = u32::try_from(exp).map_err(|_| ApplyError::Overflow)?;
            base.checked_pow(exp).ok_or(ApplyError::Overflow)
        }
    }
}

/// Checked factorial. Anything past `20!` overflows an `i64`.
fn factorial(n: i64) -> Result<i64, ApplyError> {
    if n < 0 {
        return Err(ApplyError::NegativeFactorial);
    }
    let mut product: i64 = 1;
    for factor in 2..=n {
        product = product.checked_mul(factor).ok_or(ApplyError::Overflow)?;
    }
    Ok(product)
}
