//! Central finite-difference approximations.
//!
//! Each algorithm samples `f` at points symmetric around `x`. A failing sample
//! aborts the approximation with that sample's error.

use std::fmt;
use std::str::FromStr;

use crate::error::{EvalError, InputFormatError};

/// Which finite-difference formula to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Derivative {
    /// First derivative, 3-point central difference.
    First3,
    /// First derivative, 5-point central difference.
    First5,
    /// Second derivative, 3-point central difference.
    Second,
}

impl Derivative {
    pub const ALL: [Self; 3] = [Self::First3, Self::First5, Self::Second];

    pub fn apply<F>(self, h: f64, x: f64, f: F) -> Result<f64, EvalError>
    where
        F: Fn(f64) -> Result<f64, EvalError>,
    {
        match self {
            Self::First3 => central_difference_3_point(h, x, f),
            Self::First5 => central_difference_5_point(h, x, f),
            Self::Second => second_central_difference(h, x, f),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::First3 => "3-point central difference",
            Self::First5 => "5-point central difference",
            Self::Second => "second derivative",
        }
    }
}

impl fmt::Display for Derivative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Derivative {
    type Err = InputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == key)
            .or(match key.as_str() {
                "first3" | "3-point" | "3" => Some(Self::First3),
                "first5" | "5-point" | "5" => Some(Self::First5),
                "second" => Some(Self::Second),
                _ => None,
            })
            .ok_or_else(|| InputFormatError::new("differentiation method", s))
    }
}

fn check_step(h: f64, x: f64) -> Result<(), EvalError> {
    if h == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    if !h.is_finite() || !x.is_finite() {
        return Err(EvalError::InvalidStep { step: h, point: x });
    }
    Ok(())
}

/// `(f(x+h) − f(x−h)) / 2h`
pub fn central_difference_3_point<F>(h: f64, x: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_step(h, x)?;
    Ok((f(x + h)? - f(x - h)?) / (2.0 * h))
}

/// `(−f(x+2h) + 8f(x+h) − 8f(x−h) + f(x−2h)) / 12h`
pub fn central_difference_5_point<F>(h: f64, x: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_step(h, x)?;
    Ok(
        (-f(x + 2.0 * h)? + 8.0 * f(x + h)? - 8.0 * f(x - h)? + f(x - 2.0 * h)?)
            / (12.0 * h),
    )
}

/// `(f(x+h) − 2f(x) + f(x−h)) / h²`
pub fn second_central_difference<F>(h: f64, x: f64, f: F) -> Result<f64, EvalError>
where
    F: Fn(f64) -> Result<f64, EvalError>,
{
    check_step(h, x)?;
    Ok((f(x + h)? - 2.0 * f(x)? + f(x - h)?) / (h * h))
}
