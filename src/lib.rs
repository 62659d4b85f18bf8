//! Math expression parser/evaluator for numerical calculus.
//!
//! # Why?
//!
//! Finite-difference derivatives and composite quadrature sample a formula
//! thousands of times per call. Re-parsing the text on every sample is
//! wasteful, and sharing a parser cursor between samples is a correctness
//! hazard. We parse a formula once into an immutable syntax tree, resolve its
//! variables to positional slots, then evaluate the tree against a fresh slot
//! array on every sample.
//!
//! # Example
//!
//! ```rust
//! use calculus_expr::*;
//!
//! let f = Function::new("x^2 + 2*x").unwrap();
//! assert_eq!(f.call(3.0), Ok(15.0));
//!
//! let slope = derivative(Derivative::First5, 1e-3, 3.0, "x^2 + 2*x").unwrap();
//! assert!((slope - 8.0).abs() < 1e-6);
//!
//! let area = integrate(Quadrature::Simpson, 0.1, 0.0, 1.0, "x^2").unwrap();
//! assert!((area - 1.0 / 3.0).abs() < 1e-6);
//!
//! assert_eq!(evaluate_at("1 / (x - 2)", 2.0), Err(EvalError::DivisionByZero));
//! ```
//!
//! # Grammar
//!
//! Whitespace is removed before parsing. `^` is left-associative
//! (`2^3^2 == 64`) and unary `-` binds tighter than `^` (`-2^2 == 4`).
//!
//! Set `CALCULUS_EXPR_TRACE=1` to log requests to stderr.

#[macro_use]
mod trace;

mod differentiate;
mod error;
mod evaluate;
mod expression;
mod function;
mod integrate;
mod parse;
mod request;

/// Uses the [`pest`] parsing expression grammar language.
///
/// ```text
#[doc = include_str!("grammar.pest")]
/// ```
pub mod grammar_doc {}

pub use differentiate::*;
pub use error::*;
pub use evaluate::*;
pub use expression::*;
pub use function::*;
pub use integrate::*;
pub use parse::{ParseError, Rule, MAX_NESTING};
pub use request::*;
pub use trace::TRACE_ENV;

/// The free variable of a [`Function`].
pub const VARIABLE: &str = "x";

/// Name of the constant bound to Euler's number.
pub const EULER: &str = "e";
