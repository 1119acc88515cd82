//! Formula facade: parse once, evaluate against a sheet.

use gridcalc_common::{CellValue, EvalError, EvalResult, Position, SheetError};
use gridcalc_parse::{AstNode, canonical, parse};

use crate::interpreter;
use crate::sheet::Sheet;

/// A parsed formula expression.
///
/// The canonical re-printed form and the sorted, deduplicated reference
/// list are fixed at parse time; evaluation is repeatable against any
/// sheet state.
#[derive(Debug, Clone)]
pub struct Formula {
    ast: AstNode,
    expression: String,
    referenced: Vec<Position>,
}

impl Formula {
    /// Parse an expression (without the leading formula sign).
    pub fn parse(expr: &str) -> Result<Self, SheetError> {
        let ast = parse(expr).map_err(|e| SheetError::Formula(e.to_string()))?;
        let expression = canonical(&ast);
        let referenced = ast.referenced_cells();
        Ok(Self {
            ast,
            expression,
            referenced,
        })
    }

    /// Evaluate against the current sheet contents.
    ///
    /// The outcome is a value either way: evaluation failures come back
    /// as `Err(EvalError)`, never as a panic or an edit-protocol error.
    pub fn evaluate(&self, sheet: &Sheet) -> EvalResult {
        interpreter::eval(&self.ast, &|pos| resolve_operand(sheet, pos))
    }

    /// The canonical expression text, parenthesized minimally.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Positions this formula reads, sorted and deduplicated.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }
}

/// How a referenced cell reads as a number.
///
/// Absent and empty cells read as zero. Text is read the way the
/// strtod family reads it: leading whitespace is skipped, then the
/// entire rest must be a decimal number, so trailing whitespace or any
/// other leftover is a value failure. Out-of-range magnitudes are an
/// arithmetic failure.
fn resolve_operand(sheet: &Sheet, pos: Position) -> EvalResult {
    let cell = match sheet.cell_at(pos) {
        Some(cell) => cell,
        None => return Ok(0.0),
    };
    match cell.value(sheet) {
        CellValue::Number(n) => Ok(n),
        CellValue::Error(e) => Err(e),
        CellValue::Text(s) => {
            if s.is_empty() {
                return Ok(0.0);
            }
            match s.trim_start().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(n),
                Ok(_) => Err(EvalError::Arithmetic),
                Err(_) => Err(EvalError::Value),
            }
        }
    }
}
