//! Composite quadrature over `[a, b]` with step `h`.
//!
//! Any sample error aborts the integration; partial sums are never returned.

use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, InputFormatError};

/// Which composite rule to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrature {
    Midpoint,
    Trapezoidal,
    Simpson,
}

impl Quadrature {
    pub const ALL: [Self; 3] = [Self::Midpoint, Self::Trapezoidal, Self::Simpson];

    pub fn apply<F>(self, h: f64, a: f64, b: f64, f: F) -> Result<f64, EvalError>
    where
        F: Fn(f64) -> Result<f64, EvalError>,
    {
        match self {
            Self::Midpoint => midpoint_rule(h, a, b, f),
            Self::Trapezoidal => trapezoidal_rule(h, a, b, f),
            Self::Simpson => simpson_rule(h, a, b, f),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Midpoint => "Midpoint Rule",
            Self::Trapezoidal => "Trapezoidal Rule",
            Self::Simpson => "Simpson's Rule",
        }
    }
}

impl fmt::Display for Quadrature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Quadrature {
    type Err = InputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let key = key.strip_suffix(" rule").unwrap_or(&key);
        match key {
            "midpoint" => Ok(Self::Midpoint),
            "trapezoidal" | "trapezoid" => Ok(Self::Trapezoidal),
            "simpson" | "simpson's" => Ok(Self::Simpson),
            _ => Err(InputFormatError::new("integration method", s)),
        }
    }
}

fn check_range(h: f64, a: f64, b: f64) -> Result<(), EvalError> {
    let valid = h > 0.0 && h.is_finite() && a.is_finite() && b.is_finite() && a <= b;
    if !valid {
        return Err(invalid_range(h, a, b));
    }
    Ok(())
}

fn invalid_range(h: f64, a: f64, b: f64) -> EvalError {
    EvalError::InvalidRange {
        step: h,
        start: a,
        end: b,
    }
}

/// Number of whole steps of width `h` in `[a, b]`, truncated.
fn whole_steps(h: f64, a: f64, b: f64) -> usize {
    ((b - a) / h) as usize
}

/// `h · Σ f(left + h/2)` where `left` walks from `a` by repeated addition of
/// `h` while it is below `b`.
///
/// The last step is not clipped to `b`, and `left` accumulates rounding, so
/// e.g. ten steps of `0.1` from `0` stay below `1` and an eleventh is taken.
pub fn midpoint_rule<F>(h: f64, a: f64, b: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_range(h, a, b)?;
    let mut sum = 0.0;
    let mut left = a;
    while left < b {
        sum += f(left + h / 2.0)?;
        let next = left + h;
        if next == left {
            // `h` vanishes next to `left`; the walk would never reach `b`.
            return Err(invalid_range(h, a, b));
        }
        left = next;
    }
    Ok(h * sum)
}

/// `h · (½(f(a) + f(b)) + Σ_{i=1}^{n−1} f(a + ih))` with `n = ⌊(b − a)/h⌋`.
pub fn trapezoidal_rule<F>(h: f64, a: f64, b: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_range(h, a, b)?;
    let n = whole_steps(h, a, b);
    let mut sum = 0.5 * (f(a)? + f(b)?);
    for i in 1..n {
        sum += f(a + i as f64 * h)?;
    }
    Ok(h * sum)
}

/// Composite Simpson's rule.
///
/// The step count `⌊(b − a)/h⌋` is rounded up to an even number (at least 2)
/// and the step shrunk to fit `[a, b]` exactly.
pub fn simpson_rule<F>(h: f64, a: f64, b: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_range(h, a, b)?;
    if a == b {
        return Ok(0.0);
    }
    let mut n = whole_steps(h, a, b).max(2);
    if n % 2 != 0 {
        n += 1;
    }
    let h = (b - a) / n as f64;

    let mut sum = f(a)? + f(b)?;
    for i in 1..n {
        let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
        sum += weight * f(a + i as f64 * h)?;
    }
    Ok(sum * h / 3.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Function;

    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    fn sampler(expression: &str) -> impl Fn(f64) -> Result<f64, EvalError> {
        let f = Function::new(expression).unwrap();
        move |x| f.call(x)
    }

    #[test]
    fn constant_is_exact() {
        for rule in Quadrature::ALL {
            assert_eq!(rule.apply(0.5, 0.0, 1.0, sampler("1")), Ok(1.0), "{rule}");
        }
    }

    #[test]
    fn square_on_unit_interval() {
        let trapezoidal = trapezoidal_rule(0.01, 0.0, 1.0, sampler("x^2")).unwrap();
        assert_abs_diff_eq!(trapezoidal, 1.0 / 3.0, epsilon = 1e-3);

        let simpson = simpson_rule(0.1, 0.0, 1.0, sampler("x^2")).unwrap();
        assert_abs_diff_eq!(simpson, 1.0 / 3.0, epsilon = 1e-6);

        let midpoint = midpoint_rule(0.25, 0.0, 1.0, sampler("x^2")).unwrap();
        assert_eq!(midpoint, 0.328125);
    }

    #[test]
    fn midpoint_overshoots_with_accumulated_steps() {
        let nodes = Cell::new(0);
        let result = midpoint_rule(0.1, 0.0, 1.0, |_| {
            nodes.set(nodes.get() + 1);
            Ok(1.0)
        })
        .unwrap();
        assert_eq!(nodes.get(), 11);
        assert_abs_diff_eq!(result, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn midpoint_last_step_is_not_clipped() {
        // Steps start at 0 and 0.75; the second covers [0.75, 1.5).
        let result = midpoint_rule(0.75, 0.0, 1.0, sampler("x")).unwrap();
        assert_eq!(result, 0.75 * (0.375 + 1.125));
    }

    #[test]
    fn trapezoidal_uses_truncated_step_count() {
        // n = 2: nodes a and a + h, plus the half-weighted endpoint b.
        let result = trapezoidal_rule(0.4, 0.0, 1.0, sampler("x")).unwrap();
        assert_abs_diff_eq!(result, 0.4 * (0.5 * (0.0 + 1.0) + 0.4), epsilon = 1e-15);
        assert_eq!(trapezoidal_rule(0.5, 0.0, 1.0, sampler("x")), Ok(0.5));
    }

    #[test]
    fn simpson_rounds_step_count_up_to_even() {
        // 5 steps of 0.2 become 6 of 1/6; exact for cubics.
        let cubic = simpson_rule(0.2, 0.0, 1.0, sampler("x^3")).unwrap();
        assert_abs_diff_eq!(cubic, 0.25, epsilon = 1e-12);

        // A step wider than the interval still yields two panels.
        let square = simpson_rule(2.0, 0.0, 1.0, sampler("x^2")).unwrap();
        assert_abs_diff_eq!(square, 1.0 / 3.0, epsilon = 1e-12);

        assert_eq!(simpson_rule(0.1, 2.0, 2.0, sampler("x")), Ok(0.0));
    }

    #[test]
    fn simpson_beats_trapezoidal_on_smooth_functions() {
        let exact = 1.0 - 1.0f64.cos();
        let trapezoidal = trapezoidal_rule(0.05, 0.0, 1.0, sampler("sin(x)")).unwrap();
        let simpson = simpson_rule(0.05, 0.0, 1.0, sampler("sin(x)")).unwrap();
        assert!((simpson - exact).abs() < (trapezoidal - exact).abs());
        assert_abs_diff_eq!(simpson, exact, epsilon = 1e-7);
    }

    #[test]
    fn invalid_ranges() {
        for rule in Quadrature::ALL {
            for (h, a, b) in [
                (-1.0, 0.0, 1.0),
                (0.0, 0.0, 1.0),
                (0.1, 1.0, 0.0),
                (f64::NAN, 0.0, 1.0),
                (0.1, 0.0, f64::INFINITY),
            ] {
                assert!(
                    matches!(
                        rule.apply(h, a, b, sampler("x")),
                        Err(EvalError::InvalidRange { .. })
                    ),
                    "{rule} h={h} [{a}, {b}]"
                );
            }
        }
    }

    #[test]
    fn midpoint_rejects_steps_that_cannot_advance() {
        assert!(matches!(
            midpoint_rule(1.0, 1e20, 2e20, sampler("x")),
            Err(EvalError::InvalidRange { .. })
        ));
    }

    #[test]
    fn sample_errors_abort_integration() {
        // The node at 0.5 hits the pole.
        for rule in [Quadrature::Trapezoidal, Quadrature::Simpson] {
            assert_eq!(
                rule.apply(0.25, 0.0, 1.0, sampler("1/(x - 0.5)")),
                Err(EvalError::DivisionByZero),
                "{rule}"
            );
        }
        assert_eq!(
            midpoint_rule(0.5, -1.0, 1.0, sampler("ln(x)")),
            Err(EvalError::Domain {
                function: "ln",
                argument: -0.75
            })
        );
    }

    #[test]
    fn parse_labels() {
        assert_eq!("Simpson's Rule".parse(), Ok(Quadrature::Simpson));
        assert_eq!("trapezoidal".parse(), Ok(Quadrature::Trapezoidal));
        assert_eq!("MIDPOINT RULE".parse(), Ok(Quadrature::Midpoint));
        for rule in Quadrature::ALL {
            assert_eq!(rule.to_string().parse(), Ok(rule));
        }
        assert_eq!(
            "Romberg".parse::<Quadrature>(),
            Err(InputFormatError::new("integration method", "Romberg"))
        );
    }
}
