//! Field and state usage collection
//!
//! Computes which packet fields (or state variables) a subtree references.
//! Results are sets: traversal order and repeated references do not matter.

use crate::ast::{Expression, Statement};
use crate::{Error, Result};
use std::collections::BTreeSet;

/// Storage class of a named value in an atom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Transient per-packet field
    Packet,
    /// Persistent per-flow state
    State,
}

/// Packet fields referenced anywhere in `stmt`
pub fn fields(stmt: &Statement) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    collect_stmt(stmt, Storage::Packet, &mut out)?;
    Ok(out)
}

/// State variables referenced anywhere in `stmt`
pub fn states(stmt: &Statement) -> Result<BTreeSet<String>> {
    let mut out = BTreeSet::new();
    collect_stmt(stmt, Storage::State, &mut out)?;
    Ok(out)
}

fn collect_stmt(stmt: &Statement, storage: Storage, out: &mut BTreeSet<String>) -> Result<()> {
    match stmt {
        Statement::Compound(children) => {
            for child in children {
                collect_stmt(child, storage, out)?;
            }
            Ok(())
        }
        Statement::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            collect_expr(cond, storage, out)?;
            collect_stmt(then_branch, storage, out)?;
            if let Some(else_branch) = else_branch {
                collect_stmt(else_branch, storage, out)?;
            }
            Ok(())
        }
        Statement::Assignment { lhs, rhs } => {
            collect_expr(lhs, storage, out)?;
            collect_expr(rhs, storage, out)
        }
        Statement::Expr(expr) => collect_expr(expr, storage, out),
        // Locals are neither packet fields nor state
        Statement::Declaration { .. } => Ok(()),
        Statement::CompoundAssignment { op, .. } => Err(Error::unsupported(format!(
            "compound assignment `{}`",
            op
        ))),
    }
}

fn collect_expr(expr: &Expression, storage: Storage, out: &mut BTreeSet<String>) -> Result<()> {
    match expr {
        Expression::FieldAccess(name) => {
            if storage == Storage::Packet {
                out.insert(name.clone());
            }
            Ok(())
        }
        Expression::StateAccess(name) => {
            if storage == Storage::State {
                out.insert(name.clone());
            }
            Ok(())
        }
        Expression::IntegerLiteral(_) => Ok(()),
        Expression::BinaryOp { lhs, rhs, .. } => {
            collect_expr(lhs, storage, out)?;
            collect_expr(rhs, storage, out)
        }
        Expression::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            collect_expr(cond, storage, out)?;
            collect_expr(then_expr, storage, out)?;
            collect_expr(else_expr, storage, out)
        }
        Expression::Paren(inner) | Expression::Cast(inner) => collect_expr(inner, storage, out),
        Expression::Unary { .. } | Expression::Call { .. } => {
            Err(Error::unsupported(expr.kind_name()))
        }
    }
}
