//! Error taxonomy for the engine.
//!
//! Two families with different propagation rules:
//!
//! - **`SheetError`** aborts an edit. The target cell, its graph edges,
//!   and any cached result stay exactly as they were.
//! - **`EvalError`** is a *value*: once evaluation crosses the formula
//!   facade it travels inside `CellValue`/`EvalResult` rather than
//!   unwinding, and dependent formulas collapse to the first error they
//!   observe.

use core::fmt;
use std::error::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/* ───────────────────── Evaluation-time errors ─────────────────────── */

/// Category of a failed formula evaluation.
///
/// `Display` renders the user-visible sigil (`#REF!`, ...), which is how
/// these surface in printed sheets.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum EvalError {
    /// Reference to a position outside the grid.
    Ref,
    /// Text operand that cannot be read as a number.
    Value,
    /// Non-finite arithmetic result or out-of-range numeric conversion.
    Arithmetic,
}

impl EvalError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ref => "#REF!",
            Self::Value => "#VALUE!",
            Self::Arithmetic => "#ARITHM!",
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error for EvalError {}

/// Outcome of evaluating a formula: a finite number or a typed error.
pub type EvalResult = Result<f64, EvalError>;

/* ───────────────────── Edit-protocol errors ───────────────────────── */

/// Why an edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    /// The addressed position fails `Position::is_valid`.
    InvalidPosition,
    /// The formula text did not parse; carries the parser's message.
    Formula(String),
    /// Committing the edit would create a dependency cycle.
    CircularDependency,
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPosition => f.write_str("invalid position"),
            Self::Formula(message) => write!(f, "formula error: {message}"),
            Self::CircularDependency => f.write_str("circular dependency"),
        }
    }
}

impl Error for SheetError {}
