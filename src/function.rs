use crate::error::EvalError;
use crate::expression::{Expression, RealExpression, Resolution};

#[cfg(feature = "rayon")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// A formula in `x` that can be sampled any number of times.
///
/// The formula is parsed once. `e` is replaced by Euler's number when the
/// function is built and `x` is supplied on every call, so calls share no
/// mutable state and may run concurrently.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    body: RealExpression,
}

const X_SLOT: usize = 0;

impl Function {
    /// Parses `expression` and binds its variables.
    ///
    /// Fails with [`EvalError::UndefinedVariable`] if the formula mentions
    /// anything other than `x` and `e`.
    pub fn new(expression: &str) -> Result<Self, EvalError> {
        Self::from_expression(&Expression::parse(expression)?)
    }

    pub fn from_expression(expression: &Expression) -> Result<Self, EvalError> {
        let body = expression.bind(|name| match name {
            crate::VARIABLE => Some(Resolution::Slot(X_SLOT)),
            crate::EULER => Some(Resolution::Constant(std::f64::consts::E)),
            _ => None,
        })?;
        Ok(Self { body })
    }

    /// `f(x)`.
    pub fn call(&self, x: f64) -> Result<f64, EvalError> {
        self.body.evaluate(&[x])
    }

    /// Samples the function at every point of `xs`, failing on the first
    /// error.
    pub fn evaluate_many(&self, xs: &[f64]) -> Result<Vec<f64>, EvalError> {
        #[cfg(feature = "rayon")]
        {
            xs.par_iter().map(|&x| self.call(x)).collect()
        }
        #[cfg(not(feature = "rayon"))]
        {
            xs.iter().map(|&x| self.call(x)).collect()
        }
    }
}
