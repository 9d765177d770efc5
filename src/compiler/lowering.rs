//! Expression lowering into target operand syntax
//!
//! The target has exactly two storage classes. Packet fields are read and
//! written through `p("<name>")`, state through `s("<name>")`; both accessors
//! are call-operator overloads in the target runtime.

use crate::ast::{Expression, Statement};
use crate::{Error, Result};

/// Accessor for packet fields in generated code
pub const PACKET_ACCESSOR: &str = "p";
/// Accessor for state variables in generated code
pub const STATE_ACCESSOR: &str = "s";

/// Lower a control-flow-free expression
pub fn lower_expr(expr: &Expression) -> Result<String> {
    match expr {
        Expression::FieldAccess(name) => Ok(format!("{}(\"{}\")", PACKET_ACCESSOR, name)),
        Expression::StateAccess(name) => Ok(format!("{}(\"{}\")", STATE_ACCESSOR, name)),
        Expression::IntegerLiteral(text) => Ok(text.clone()),
        Expression::Paren(inner) | Expression::Cast(inner) => lower_expr(inner),
        Expression::BinaryOp { op, lhs, rhs } => {
            Ok(format!("{}{}{}", lower_expr(lhs)?, op, lower_expr(rhs)?))
        }
        Expression::Ternary {
            cond,
            then_expr,
            else_expr,
        } => Ok(format!(
            "{} ? {} : {} ;",
            lower_expr(cond)?,
            lower_expr(then_expr)?,
            lower_expr(else_expr)?
        )),
        Expression::Unary { .. } | Expression::Call { .. } => {
            Err(Error::unsupported(expr.kind_name()))
        }
    }
}

/// Lower a statement directly, keeping its conditionals as `if` blocks
///
/// Used when the target accepts branches inside an atom body and
/// if-conversion is switched off.
pub fn lower_stmt(stmt: &Statement) -> Result<String> {
    match stmt {
        Statement::Compound(children) => {
            let mut out = String::new();
            for child in children {
                out.push_str(&lower_stmt(child)?);
                out.push(';');
            }
            Ok(out)
        }
        Statement::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            let mut out = format!(
                "if ({}) {{ {} }}",
                lower_expr(cond)?,
                lower_stmt(then_branch)?
            );
            if let Some(else_branch) = else_branch {
                out.push_str(&format!(" else {{ {} }}", lower_stmt(else_branch)?));
            }
            Ok(out)
        }
        Statement::Assignment { lhs, rhs } => {
            Ok(format!("{}={}", lower_expr(lhs)?, lower_expr(rhs)?))
        }
        Statement::Expr(expr) => lower_expr(expr),
        Statement::CompoundAssignment { op, .. } => Err(Error::unsupported(format!(
            "compound assignment `{}`",
            op
        ))),
        Statement::Declaration { .. } => Err(Error::unsupported(stmt.kind_name())),
    }
}
