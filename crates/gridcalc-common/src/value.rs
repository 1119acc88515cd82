//! The value a cell reads as.

use core::fmt;

use crate::{EvalError, EvalResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a cell's content evaluates to.
///
/// Empty cells read as `Number(0.0)`; text cells read as their text with
/// any leading escape sign removed; formula cells read as their memoized
/// evaluation outcome.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Error(EvalError),
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<EvalError> {
        match self {
            Self::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Error(e) => write!(f, "{e}"),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<EvalError> for CellValue {
    fn from(e: EvalError) -> Self {
        Self::Error(e)
    }
}

impl From<EvalResult> for CellValue {
    fn from(result: EvalResult) -> Self {
        match result {
            Ok(n) => Self::Number(n),
            Err(e) => Self::Error(e),
        }
    }
}
