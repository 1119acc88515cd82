//! Canonical re-printing of parsed expressions.
//!
//! The printed form is not the source text: redundant parentheses are
//! dropped and numeric literals are normalized through `f64`'s `Display`.
//! A parenthesis survives only where removing it would change the parse.

use core::fmt::{self, Write};

use crate::parser::{AstNode, BinaryOp, UNARY_PRECEDENCE};

/// Minimal-parentheses rendering of an AST.
pub fn canonical(node: &AstNode) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &AstNode) -> fmt::Result {
    match node {
        AstNode::Number(value) => write!(out, "{value}"),
        AstNode::Reference { original, pos } => {
            if pos.is_valid() {
                write!(out, "{pos}")
            } else {
                out.write_str(original)
            }
        }
        AstNode::UnaryOp { op, expr } => {
            out.write_char(op.symbol())?;
            write_child(out, expr, UNARY_PRECEDENCE, false)
        }
        AstNode::BinaryOp { op, left, right } => {
            write_child(out, left, op.precedence(), false)?;
            out.write_char(op.symbol())?;
            // The right arm of '-' and '/' must keep equal-precedence
            // children parenthesized: 1-(2+3) is not 1-2+3.
            write_child(
                out,
                right,
                op.precedence(),
                matches!(op, BinaryOp::Sub | BinaryOp::Div),
            )
        }
    }
}

fn write_child(out: &mut String, child: &AstNode, parent: u8, strict: bool) -> fmt::Result {
    let prec = precedence(child);
    let parens = prec < parent || (strict && prec == parent);
    if parens {
        out.write_char('(')?;
    }
    write_node(out, child)?;
    if parens {
        out.write_char(')')?;
    }
    Ok(())
}

fn precedence(node: &AstNode) -> u8 {
    match node {
        AstNode::Number(_) | AstNode::Reference { .. } => u8::MAX,
        AstNode::UnaryOp { .. } => UNARY_PRECEDENCE,
        AstNode::BinaryOp { op, .. } => op.precedence(),
    }
}
