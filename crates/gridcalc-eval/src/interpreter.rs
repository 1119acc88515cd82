//! AST interpretation against a cell resolver.
//!
//! The resolver is how a referenced position becomes a number; the
//! formula facade supplies one backed by the sheet. Errors are ordinary
//! `Err` values and the first one wins via `?`.

use gridcalc_common::{EvalError, EvalResult, Position};
use gridcalc_parse::{AstNode, BinaryOp, UnaryOp};

pub(crate) fn eval<R>(node: &AstNode, resolve: &R) -> EvalResult
where
    R: Fn(Position) -> EvalResult,
{
    match node {
        AstNode::Number(value) => Ok(*value),
        AstNode::Reference { pos, .. } => {
            if !pos.is_valid() {
                return Err(EvalError::Ref);
            }
            resolve(*pos)
        }
        AstNode::UnaryOp { op, expr } => {
            let v = eval(expr, resolve)?;
            Ok(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            })
        }
        AstNode::BinaryOp { op, left, right } => {
            let l = eval(left, resolve)?;
            let r = eval(right, resolve)?;
            let result = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
            };
            if result.is_finite() {
                Ok(result)
            } else {
                Err(EvalError::Arithmetic)
            }
        }
    }
}
