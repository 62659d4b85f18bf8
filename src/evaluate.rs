use std::collections::HashMap;

use crate::error::EvalError;
use crate::expression::{BinaryOp, Builtin, Expression, RealExpression, Resolution};

/// Identifier → value mapping visible during one evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<String, f64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// `x` bound to `x` and `e` bound to Euler's number.
    pub fn for_sample(x: f64) -> Self {
        Self::new()
            .with(crate::VARIABLE, x)
            .with(crate::EULER, std::f64::consts::E)
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }
}

/// Parse `expression` and evaluate it against `bindings`.
pub fn evaluate(expression: &str, bindings: &Bindings) -> Result<f64, EvalError> {
    Expression::parse(expression)?.evaluate(bindings)
}

impl Expression {
    /// Variable names in order of their [`BindingId`](crate::BindingId).
    pub fn variable_names(&self) -> &[String] {
        &self.variables
    }

    /// Evaluates the expression with every variable looked up in `bindings`.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        let slots = self
            .variables
            .iter()
            .map(|name| {
                bindings
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedVariable(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.root.evaluate(&slots)
    }

    /// Produces a tree whose variables are either positional slots or
    /// constants, as decided by `resolve`.
    ///
    /// The result is meant to be evaluated many times with
    /// [`RealExpression::evaluate`]; the caller is responsible for passing
    /// enough slots to cover every [`Resolution::Slot`] it handed out.
    pub fn bind(
        &self,
        resolve: impl Fn(&str) -> Option<Resolution>,
    ) -> Result<RealExpression, EvalError> {
        let table = self
            .variables
            .iter()
            .map(|name| resolve(name).ok_or_else(|| EvalError::UndefinedVariable(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.root.rebind(&table))
    }
}

impl RealExpression {
    /// Calculates the value of the expression, reading variables from
    /// `bindings`.
    pub fn evaluate(&self, bindings: &[f64]) -> Result<f64, EvalError> {
        match self {
            Self::Binding(binding) => Ok(bindings[*binding]),
            Self::Call(builtin, only) => builtin.apply(only.evaluate(bindings)?),
            Self::Chain(head, tail) => tail
                .iter()
                .try_fold(head.evaluate(bindings)?, |acc, (op, operand)| {
                    op.apply(acc, operand.evaluate(bindings)?)
                }),
            Self::Literal(value) => Ok(*value),
            Self::Log(base, value) => log(base.evaluate(bindings)?, value.evaluate(bindings)?),
            Self::Neg(only) => Ok(-only.evaluate(bindings)?),
        }
    }

    fn rebind(&self, table: &[Resolution]) -> Self {
        let rebind_box = |e: &RealExpression| Box::new(e.rebind(table));
        match self {
            Self::Binding(binding) => match table[*binding] {
                Resolution::Slot(slot) => Self::Binding(slot),
                Resolution::Constant(value) => Self::Literal(value),
            },
            Self::Call(builtin, only) => Self::Call(*builtin, rebind_box(only)),
            Self::Chain(head, tail) => Self::Chain(
                rebind_box(head),
                tail.iter()
                    .map(|(op, operand)| (*op, operand.rebind(table)))
                    .collect(),
            ),
            Self::Literal(value) => Self::Literal(*value),
            Self::Log(base, value) => Self::Log(rebind_box(base), rebind_box(value)),
            Self::Neg(only) => Self::Neg(rebind_box(only)),
        }
    }
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        match self {
            Self::Add => Ok(lhs + rhs),
            Self::Sub => Ok(lhs - rhs),
            Self::Mul => Ok(lhs * rhs),
            Self::Div if rhs == 0.0 => Err(EvalError::DivisionByZero),
            Self::Div => Ok(lhs / rhs),
            Self::Pow => Ok(lhs.powf(rhs)),
        }
    }
}

impl Builtin {
    pub fn apply(self, argument: f64) -> Result<f64, EvalError> {
        match self {
            Self::Sin => Ok(argument.sin()),
            Self::Cos => Ok(argument.cos()),
            Self::Tan => Ok(argument.tan()),
            Self::Ln if argument <= 0.0 => Err(self.domain_error(argument)),
            Self::Ln => Ok(argument.ln()),
            Self::Sqrt if argument < 0.0 => Err(self.domain_error(argument)),
            Self::Sqrt => Ok(argument.sqrt()),
        }
    }

    fn domain_error(self, argument: f64) -> EvalError {
        EvalError::Domain {
            function: self.name(),
            argument,
        }
    }
}

/// `log(base, value)`, i.e. `ln(value) / ln(base)`.
fn log(base: f64, value: f64) -> Result<f64, EvalError> {
    if value <= 0.0 {
        return Err(EvalError::Domain {
            function: "log",
            argument: value,
        });
    }
    if base <= 0.0 || base == 1.0 {
        return Err(EvalError::Domain {
            function: "log base",
            argument: base,
        });
    }
    Ok(value.ln() / base.ln())
}
