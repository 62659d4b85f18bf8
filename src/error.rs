use crate::parse::{ParseError, Rule};

use pest::error::LineColLocation;
use thiserror::Error;

/// Everything that can go wrong while parsing, evaluating or sampling an
/// expression.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("`{function}` is undefined for {argument}")]
    Domain {
        function: &'static str,
        argument: f64,
    },

    #[error("invalid differentiation step {step} at point {point}")]
    InvalidStep { step: f64, point: f64 },

    #[error("invalid integration range [{start}, {end}] with step {step}")]
    InvalidRange { step: f64, start: f64, end: f64 },
}

impl From<ParseError> for EvalError {
    fn from(error: ParseError) -> Self {
        Self::Syntax(error.into())
    }
}

/// A malformed expression.
///
/// `column` is 1-based and counts characters of the expression with its
/// whitespace removed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("syntax error at column {column}: {message}")]
pub struct SyntaxError {
    pub column: usize,
    pub message: String,
}

impl From<ParseError> for SyntaxError {
    fn from(error: ParseError) -> Self {
        let column = match error.line_col {
            LineColLocation::Pos((_, col)) | LineColLocation::Span((_, col), _) => col,
        };
        let error = error.renamed_rules(describe_rule);
        Self {
            column,
            message: error.variant.message().into_owned(),
        }
    }
}

fn describe_rule(rule: &Rule) -> String {
    let name = match rule {
        Rule::EOI => "end of input",
        Rule::expr => "expression",
        Rule::add => "`+`",
        Rule::subtract => "`-`",
        Rule::multiply => "`*`",
        Rule::divide => "`/`",
        Rule::power => "`^`",
        Rule::neg => "`-`",
        Rule::log_call => "`log(base, value)`",
        Rule::unary_call => "function call",
        Rule::function => "function name",
        Rule::real_literal => "number",
        Rule::variable => "variable",
        #[allow(unreachable_patterns)]
        other => return format!("{other:?}"),
    };
    name.to_owned()
}

/// A caller-supplied parameter that is not what it claims to be, e.g. a step
/// size of `"abc"`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid {field}: `{input}`")]
pub struct InputFormatError {
    pub field: &'static str,
    pub input: String,
}

impl InputFormatError {
    pub fn new(field: &'static str, input: &str) -> Self {
        Self {
            field,
            input: input.to_owned(),
        }
    }
}

/// Failure of a text-driven request: either the parameters could not be read
/// or the evaluation itself failed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RequestError {
    #[error(transparent)]
    InputFormat(#[from] InputFormatError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
