use std::collections::HashSet;

use crate::error::EvalError;
use crate::expression::{BinaryOp, BindingId, Builtin, Expression, RealExpression};

use once_cell::sync::Lazy;
use pest::error::ErrorVariant;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::{Parser, Position};
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar.pest"] // relative to project `src`
struct ExpressionParser;

pub type ParseError = pest::error::Error<Rule>;

impl Expression {
    /// Names of the variables referenced by `input`.
    pub fn parse_variable_names(input: &str) -> Result<HashSet<String>, EvalError> {
        let input = strip_whitespace(input);
        check_nesting(&input)?;
        Ok(ExpressionParser::parse(Rule::calculation, &input)?
            .flatten()
            .filter(|p| p.as_rule() == Rule::variable)
            .map(|p| p.as_str().to_string())
            .collect())
    }

    /// Parse the expression from `input`.
    ///
    /// Whitespace anywhere in `input` is ignored. As variable names are
    /// encountered during parsing, they are replaced by [`BindingId`]s in the
    /// syntax tree, so the [`Expression`] can be evaluated many times without
    /// looking names up again.
    pub fn parse(input: &str) -> Result<Self, EvalError> {
        let input = strip_whitespace(input);
        check_nesting(&input)?;
        let expr = ExpressionParser::parse(Rule::calculation, &input)?
            .next()
            .expect("calculation starts with an expression");
        let mut variables = Vec::new();
        let root = climb_recursive(expr.into_inner(), &mut variables)?;
        Ok(Self { root, variables })
    }
}

fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Deepest parenthesis nesting accepted by [`Expression::parse`].
///
/// Parsing and evaluation recurse once per level; operator chains of any
/// length are flat.
pub const MAX_NESTING: usize = 64;

fn check_nesting(input: &str) -> Result<(), ParseError> {
    let mut depth = 0usize;
    for (offset, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => continue,
        }
        if depth > MAX_NESTING {
            let pos = Position::new(input, offset).unwrap_or_else(|| Position::from_start(input));
            return Err(ParseError::new_from_pos(
                ErrorVariant::CustomError {
                    message: format!("parentheses nested deeper than {MAX_NESTING} levels"),
                },
                pos,
            ));
        }
    }
    Ok(())
}

static PRATT_PARSER: Lazy<PrattParser<Rule>> = Lazy::new(|| {
    use Assoc::*;
    use Rule::*;

    // `neg` binds tighter than `^`, so `-2^2` is `(-2)^2`.
    PrattParser::new()
        .op(Op::infix(add, Left) | Op::infix(subtract, Left))
        .op(Op::infix(multiply, Left) | Op::infix(divide, Left))
        .op(Op::infix(power, Left))
        .op(Op::prefix(neg))
});

fn climb_recursive(
    input: Pairs<Rule>,
    variables: &mut Vec<String>,
) -> Result<RealExpression, EvalError> {
    PRATT_PARSER
        .map_primary(|pair: Pair<Rule>| match pair.as_rule() {
            Rule::expr => climb_recursive(pair.into_inner(), variables),
            Rule::real_literal => {
                let literal_str = pair.as_str();
                literal_str
                    .parse::<f64>()
                    .map(RealExpression::Literal)
                    .map_err(|_| {
                        EvalError::from(ParseError::new_from_span(
                            ErrorVariant::CustomError {
                                message: format!("invalid number `{literal_str}`"),
                            },
                            pair.as_span(),
                        ))
                    })
            }
            Rule::variable => Ok(RealExpression::Binding(intern(variables, pair.as_str()))),
            Rule::unary_call => {
                let mut inner = pair.into_inner();
                let name = inner.next().expect("function name");
                let builtin = Builtin::from_name(name.as_str())
                    .unwrap_or_else(|| panic!("Unexpected function: {}", name.as_str()));
                let argument = climb_recursive(inner, variables)?;
                Ok(RealExpression::Call(builtin, Box::new(argument)))
            }
            Rule::log_call => {
                let mut inner = pair.into_inner();
                let base = inner.next().expect("log base");
                let value = inner.next().expect("log value");
                Ok(RealExpression::Log(
                    Box::new(climb_recursive(base.into_inner(), variables)?),
                    Box::new(climb_recursive(value.into_inner(), variables)?),
                ))
            }
            x => panic!("Unexpected primary rule {x:?}"),
        })
        .map_prefix(|op: Pair<Rule>, only| match op.as_rule() {
            Rule::neg => Ok(RealExpression::Neg(Box::new(only?))),
            x => panic!("Unexpected unary operator {x:?}"),
        })
        .map_infix(|lhs, op: Pair<Rule>, rhs| {
            let op = match op.as_rule() {
                Rule::add => BinaryOp::Add,
                Rule::subtract => BinaryOp::Sub,
                Rule::multiply => BinaryOp::Mul,
                Rule::divide => BinaryOp::Div,
                Rule::power => BinaryOp::Pow,
                x => panic!("Unexpected operator {x:?}"),
            };
            Ok(lhs?.chain(op, rhs?))
        })
        .parse(input)
}

fn intern(variables: &mut Vec<String>, name: &str) -> BindingId {
    match variables.iter().position(|v| v == name) {
        Some(id) => id,
        None => {
            variables.push(name.to_owned());
            variables.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use BinaryOp::*;
    use RealExpression::*;

    fn parse_root(input: &str) -> RealExpression {
        Expression::parse(input).unwrap().root
    }

    fn lit(value: f64) -> Box<RealExpression> {
        Box::new(Literal(value))
    }

    fn chain(head: RealExpression, tail: &[(BinaryOp, RealExpression)]) -> RealExpression {
        Chain(Box::new(head), tail.to_vec())
    }

    #[test]
    fn parse_variable_names() {
        let vars = Expression::parse_variable_names("x + y * sin(zed) - log(e, x)").unwrap();
        assert_eq!(vars.len(), 4, "{vars:?}");
        assert!(vars.contains("x"), "{vars:?}");
        assert!(vars.contains("y"), "{vars:?}");
        assert!(vars.contains("zed"), "{vars:?}");
        assert!(vars.contains("e"), "{vars:?}");
    }

    #[test]
    fn repeated_variables_share_a_binding() {
        let parsed = Expression::parse("x * e + x").unwrap();
        assert_eq!(parsed.variable_names(), ["x", "e"]);
        assert_eq!(
            parsed.root,
            chain(
                chain(Binding(0), &[(Mul, Binding(1))]),
                &[(Add, Binding(0))]
            )
        );
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(parse_root(" 1 +\t2 "), parse_root("1+2"));
        assert_eq!(parse_root("s i n ( 0 )"), parse_root("sin(0)"));
        assert_eq!(parse_root("1 2"), Literal(12.0));
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(
            parse_root("1 + 2 * 3"),
            chain(Literal(1.0), &[(Add, chain(Literal(2.0), &[(Mul, Literal(3.0))]))])
        );
        assert_eq!(
            parse_root("8 - 4 - 2"),
            chain(Literal(8.0), &[(Sub, Literal(4.0)), (Sub, Literal(2.0))])
        );
        assert_eq!(
            parse_root("2 ^ 3 ^ 2"),
            chain(Literal(2.0), &[(Pow, Literal(3.0)), (Pow, Literal(2.0))])
        );
        assert_eq!(
            parse_root("-2 ^ 2"),
            chain(Neg(lit(2.0)), &[(Pow, Literal(2.0))])
        );
        assert_eq!(
            parse_root("2 * -3"),
            chain(Literal(2.0), &[(Mul, Neg(lit(3.0)))])
        );
        assert_eq!(
            parse_root("1 * 2 + 3 / 4 - 5"),
            chain(
                chain(Literal(1.0), &[(Mul, Literal(2.0))]),
                &[
                    (Add, chain(Literal(3.0), &[(Div, Literal(4.0))])),
                    (Sub, Literal(5.0))
                ]
            )
        );
    }

    #[test]
    fn function_calls() {
        assert_eq!(parse_root("sqrt(4)"), Call(Builtin::Sqrt, lit(4.0)));
        assert_eq!(parse_root("log(2, 8)"), Log(lit(2.0), lit(8.0)));
        assert_eq!(
            parse_root("ln(1 + 1)"),
            Call(Builtin::Ln, Box::new(chain(Literal(1.0), &[(Add, Literal(1.0))])))
        );
        // Letters run together form a single identifier.
        let parsed = Expression::parse("sinx").unwrap();
        assert_eq!(parsed.variable_names(), ["sinx"]);
    }

    #[test]
    fn decimal_literals() {
        assert_eq!(parse_root("0.25"), Literal(0.25));
        assert_eq!(parse_root(".5"), Literal(0.5));
        assert_eq!(parse_root("3."), Literal(3.0));
    }

    #[test]
    fn operator_chains_stay_flat() {
        let n = 100_000;
        match parse_root(&vec!["x"; n].join("+")) {
            Chain(head, tail) => {
                assert_eq!(*head, Binding(0));
                assert_eq!(tail.len(), n - 1);
                assert!(tail.iter().all(|t| *t == (Add, Binding(0))));
            }
            other => panic!("Expected a chain, got {other:?}"),
        }
    }

    #[test]
    fn nesting_is_capped() {
        let nested = |depth: usize| format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
        assert!(Expression::parse(&nested(MAX_NESTING)).is_ok());
        match Expression::parse(&nested(MAX_NESTING + 1)) {
            Err(EvalError::Syntax(e)) => {
                assert_eq!(e.column, MAX_NESTING + 1);
                assert!(e.message.contains("nested"), "{}", e.message);
            }
            other => panic!("Expected syntax error, got {other:?}"),
        }
        let calls = format!("{}x{}", "sin(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert!(matches!(
            Expression::parse_variable_names(&calls),
            Err(EvalError::Syntax(_))
        ));
    }

    #[test]
    fn malformed_inputs_are_syntax_errors() {
        for input in [
            "", "1+", "(1", "1)", "--2", "log(2 8)", "log(2,8", "sin(1", "1.2.3", "2(3)", "x2",
            "1e5", "#", ".", "sin()",
        ] {
            match Expression::parse(input) {
                Err(EvalError::Syntax(_)) => {}
                other => panic!("{input:?}: expected syntax error, got {other:?}"),
            }
        }
    }
}
