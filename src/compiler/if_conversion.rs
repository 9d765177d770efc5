//! # If-Conversion
//!
//! Linearizes nested conditionals into straight-line, predicate-guarded
//! assignments. The target has no branch instructions, so every write is
//! issued unconditionally and committed through a ternary self-assignment:
//!
//! ```text
//! if (p.proto == 6) { s.count = s.count + 1; }
//! ```
//!
//! becomes
//!
//! ```text
//! bool tmp0;
//! tmp0 = (1 ? (p("proto")==6) : tmp0);
//! s("count") = (( 1 && tmp0 ) ? (s("count")+1) : s("count"));
//! ```
//!
//! Each conditional gets its own temporary holding the value of its condition.
//! The temporary itself is only updated while the enclosing predicate holds, so
//! a branch that is not taken never overwrites it with a value computed on a
//! dead path. Statements are emitted in source order, which keeps the order of
//! writes to any one location identical to the original program.

use super::lowering::lower_expr;
use super::names::NameAllocator;
use crate::ast::Statement;
use crate::{Error, Result};
use std::fmt;

/// Guard under which a linearized statement takes effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Top level: always taken
    Always,
    /// Conjunction of enclosing condition temporaries
    Guarded(String),
}

impl Predicate {
    /// Predicate for the then-branch of a conditional whose value is in `temp`
    pub fn and(&self, temp: &str) -> Predicate {
        Predicate::Guarded(format!("( {} && {} )", self, temp))
    }

    /// Predicate for the else-branch of a conditional whose value is in `temp`
    pub fn and_not(&self, temp: &str) -> Predicate {
        Predicate::Guarded(format!("( {} && !{} )", self, temp))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => write!(f, "1"),
            Predicate::Guarded(text) => write!(f, "{}", text),
        }
    }
}

/// Output of if-conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IfConverted {
    /// One declaration per conditional, in the order conditionals were met
    pub declarations: Vec<String>,
    /// Straight-line statements in source order
    pub statements: Vec<String>,
}

impl IfConverted {
    /// Declarations followed by statements, one per line
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.declarations.iter().chain(self.statements.iter())
    }

    /// Temporaries introduced by the conversion, in allocation order
    pub fn temporaries(&self) -> Vec<&str> {
        self.declarations
            .iter()
            .filter_map(|decl| decl.trim_end_matches(';').rsplit(' ').next())
            .collect()
    }
}

/// Recursive if-converter
///
/// Borrows the compilation's name allocator so temporaries stay unique across
/// every function in the translation unit.
pub struct IfConverter<'a> {
    names: &'a mut NameAllocator,
    temp_prefix: &'a str,
    out: IfConverted,
}

impl<'a> IfConverter<'a> {
    /// Creates a converter drawing temporaries named `<temp_prefix><n>`
    pub fn new(names: &'a mut NameAllocator, temp_prefix: &'a str) -> Self {
        Self {
            names,
            temp_prefix,
            out: IfConverted::default(),
        }
    }

    /// Convert a function body under the always-true predicate
    pub fn convert(mut self, body: &Statement) -> Result<IfConverted> {
        self.visit(body, &Predicate::Always)?;
        Ok(self.out)
    }

    fn visit(&mut self, stmt: &Statement, pred: &Predicate) -> Result<()> {
        match stmt {
            Statement::Compound(children) => {
                for child in children {
                    self.visit(child, pred)?;
                }
                Ok(())
            }

            Statement::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond_text = lower_expr(cond)?;
                let temp = self.names.fresh(self.temp_prefix)?;
                tracing::debug!(temp = %temp, "if-converting conditional");

                self.out
                    .declarations
                    .push(format!("{} {};", cond.static_type(), temp));
                self.out.statements.push(format!(
                    "{} = ({} ? ({}) : {});",
                    temp, pred, cond_text, temp
                ));

                self.visit(then_branch, &pred.and(&temp))?;
                if let Some(else_branch) = else_branch {
                    self.visit(else_branch, &pred.and_not(&temp))?;
                }
                Ok(())
            }

            Statement::Assignment { lhs, rhs } => {
                let lhs = lower_expr(lhs)?;
                let rhs = lower_expr(rhs)?;
                self.out
                    .statements
                    .push(format!("{} = ({} ? ({}) : {});", lhs, pred, rhs, lhs));
                Ok(())
            }

            Statement::CompoundAssignment { op, .. } => Err(Error::unsupported(format!(
                "compound assignment `{}`",
                op
            ))),

            Statement::Declaration { type_name, name } => match pred {
                Predicate::Always => {
                    self.out.statements.push(format!("{} {};", type_name, name));
                    Ok(())
                }
                Predicate::Guarded(_) => Err(Error::unsupported(format!(
                    "declaration of `{}` inside a conditional branch",
                    name
                ))),
            },

            Statement::Expr(expr) => Err(Error::unsupported(format!(
                "expression statement ({})",
                expr.kind_name()
            ))),
        }
    }
}

/// Convenience wrapper: if-convert `body` with a fresh allocator
pub fn if_convert(body: &Statement, temp_prefix: &str) -> Result<IfConverted> {
    let mut names = NameAllocator::new();
    for name in body.declared_names() {
        names.reserve(name);
    }
    IfConverter::new(&mut names, temp_prefix).convert(body)
}
