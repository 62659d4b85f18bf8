//! Entry points for a caller such as a UI layer.
//!
//! The `*_text` variants take their numeric parameters as typed by a user and
//! report unreadable numbers as [`InputFormatError`] before any expression
//! work happens.

use crate::differentiate::Derivative;
use crate::error::{EvalError, InputFormatError, RequestError};
use crate::function::Function;
use crate::integrate::Quadrature;

/// Value of `expression` at `x`.
pub fn evaluate_at(expression: &str, x: f64) -> Result<f64, EvalError> {
    trace!("evaluate_at x={x} expression={expression:?}");
    let result = Function::new(expression).and_then(|f| f.call(x));
    trace!("evaluate_at -> {result:?}");
    result
}

/// Approximate derivative of `expression` at `x` with step `h`.
pub fn derivative(
    kind: Derivative,
    h: f64,
    x: f64,
    expression: &str,
) -> Result<f64, EvalError> {
    trace!("derivative {kind} h={h} x={x} expression={expression:?}");
    let f = Function::new(expression)?;
    let result = kind.apply(h, x, |x| f.call(x));
    trace!("derivative -> {result:?}");
    result
}

/// Approximate integral of `expression` over `[a, b]` with step `h`.
pub fn integrate(
    kind: Quadrature,
    h: f64,
    a: f64,
    b: f64,
    expression: &str,
) -> Result<f64, EvalError> {
    trace!("integrate {kind} h={h} [{a}, {b}] expression={expression:?}");
    let f = Function::new(expression)?;
    let result = kind.apply(h, a, b, |x| f.call(x));
    trace!("integrate -> {result:?}");
    result
}

/// Reads a finite base-10 floating point number, ignoring surrounding
/// whitespace. `NaN` and infinities are rejected.
pub fn parse_number(field: &'static str, text: &str) -> Result<f64, InputFormatError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InputFormatError::new(field, text))
}

pub fn evaluate_at_text(expression: &str, x: &str) -> Result<f64, RequestError> {
    let x = parse_number("x", x)?;
    Ok(evaluate_at(expression, x)?)
}

pub fn derivative_text(
    kind: Derivative,
    h: &str,
    x: &str,
    expression: &str,
) -> Result<f64, RequestError> {
    let h = parse_number("step size", h)?;
    let x = parse_number("point", x)?;
    Ok(derivative(kind, h, x, expression)?)
}

pub fn integrate_text(
    kind: Quadrature,
    h: &str,
    a: &str,
    b: &str,
    expression: &str,
) -> Result<f64, RequestError> {
    let h = parse_number("step size", h)?;
    let a = parse_number("interval start", a)?;
    let b = parse_number("interval end", b)?;
    Ok(integrate(kind, h, a, b, expression)?)
}
