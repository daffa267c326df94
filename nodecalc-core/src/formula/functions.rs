//! Built-in functions.

use crate::error::{CoreError, Result};

/// A one-argument function callable from a formula.
///
/// Trigonometric functions take their argument in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
}

impl Function {
    /// Look up a function by its identifier. Matching is case-sensitive.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "sqrt" => Ok(Self::Sqrt),
            "sin" => Ok(Self::Sin),
            "cos" => Ok(Self::Cos),
            "tan" => Ok(Self::Tan),
            other => Err(CoreError::UnknownFunction(other.to_string())),
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Sin => x.to_radians().sin(),
            Self::Cos => x.to_radians().cos(),
            Self::Tan => x.to_radians().tan(),
        }
    }
}
