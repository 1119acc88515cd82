//! Shared building blocks of the gridcalc engine.
//!
//! Everything here is plain data: grid coordinates and their textual
//! labels, the value a cell reads as, and the two error families
//! (edit-protocol failures and evaluation-time failures). The parser and
//! the evaluation core both sit on top of this crate.

pub mod error;
pub mod position;
pub mod value;

pub use error::{EvalError, EvalResult, SheetError};
pub use position::{
    MAX_COLS, MAX_POSITION_LENGTH, MAX_POS_LETTER_COUNT, MAX_ROWS, Position, Size,
};
pub use value::CellValue;

/// Marks the remainder of a cell's text as a formula expression.
pub const FORMULA_SIGN: char = '=';

/// Suppresses formula interpretation; stripped when the value is read.
pub const ESCAPE_SIGN: char = '\'';
