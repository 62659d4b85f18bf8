use std::fmt;

/// A parsed calculation: the syntax tree plus the names of the variables it
/// refers to.
///
/// Every [`RealExpression::Binding`] in `root` indexes into `variables`.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub(crate) root: RealExpression,
    pub(crate) variables: Vec<String>,
}

/// An `f64`-valued expression.
#[derive(Clone, Debug, PartialEq)]
pub enum RealExpression {
    /// `head op₁ t₁ op₂ t₂ …`, folded left to right. Every operator in one
    /// chain has the same precedence, so `x+x+…+x` stays one level deep.
    Chain(Box<RealExpression>, Vec<(BinaryOp, RealExpression)>),

    // Unary real ops.
    Neg(Box<RealExpression>),

    // Function calls.
    Call(Builtin, Box<RealExpression>),
    /// `log(base, value)`.
    Log(Box<RealExpression>, Box<RealExpression>),

    // Constant.
    Literal(f64),

    // Input variable.
    Binding(BindingId),
}

impl RealExpression {
    /// `self op rhs`. Extends `self` instead of nesting it when it is already
    /// a chain at `op`'s precedence.
    pub(crate) fn chain(self, op: BinaryOp, rhs: RealExpression) -> Self {
        match self {
            Self::Chain(head, mut tail)
                if tail
                    .first()
                    .is_some_and(|(first, _)| first.precedence() == op.precedence()) =>
            {
                tail.push((op, rhs));
                Self::Chain(head, tail)
            }
            lhs => Self::Chain(Box::new(lhs), vec![(op, rhs)]),
        }
    }
}

/// Left-associative infix operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 0,
            Self::Mul | Self::Div => 1,
            Self::Pow => 2,
        }
    }
}

/// Single-argument functions callable from an expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Ln,
    Sqrt,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "ln" => Some(Self::Ln),
            "sqrt" => Some(Self::Sqrt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index into the `&[f64]` slots passed to expression evaluation.
pub type BindingId = usize;

/// How [`Expression::bind`] supplies a variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resolution {
    /// Read from this position of the slots given at evaluation time.
    Slot(BindingId),
    /// Replace with a fixed value.
    Constant(f64),
}
