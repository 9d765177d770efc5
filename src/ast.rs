//! Front-end boundary types
//!
//! The front end lexes, parses and type-checks the source language and hands
//! over a finite, acyclic tree built from these types. The tree is consumed
//! once by the compiler and never mutated. Everything derives serde so a front
//! end written in another process can hand the tree over as JSON.

use crate::Result;
use serde::{Deserialize, Serialize};

/// Control-flow-free expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expression {
    /// Transient per-packet value: `pkt.proto`
    FieldAccess(String),
    /// Persistent per-flow value: `count`
    StateAccess(String),
    /// Integer literal, kept as source text
    IntegerLiteral(String),
    /// Binary operator, symbol passed through verbatim
    BinaryOp {
        /// Operator symbol (`+`, `==`, `&&`, ...)
        op: String,
        /// Left operand
        lhs: Box<Expression>,
        /// Right operand
        rhs: Box<Expression>,
    },
    /// Conditional operator: `cond ? then_expr : else_expr`
    Ternary {
        /// Condition
        cond: Box<Expression>,
        /// Value when the condition holds
        then_expr: Box<Expression>,
        /// Value otherwise
        else_expr: Box<Expression>,
    },
    /// Parenthesized expression
    Paren(Box<Expression>),
    /// Implicit or explicit conversion; transparent for code generation
    Cast(Box<Expression>),
    /// Unary operator. Not expressible in target atoms.
    Unary {
        /// Operator symbol
        op: String,
        /// Operand
        operand: Box<Expression>,
    },
    /// Function call. Calls are resolved upstream; one reaching the
    /// compiler is not expressible in target atoms.
    Call {
        /// Called function name
        callee: String,
        /// Arguments
        args: Vec<Expression>,
    },
}

impl Expression {
    /// Packet field access
    pub fn field(name: impl Into<String>) -> Self {
        Expression::FieldAccess(name.into())
    }

    /// State variable access
    pub fn state(name: impl Into<String>) -> Self {
        Expression::StateAccess(name.into())
    }

    /// Integer literal from its source text
    pub fn int(text: impl Into<String>) -> Self {
        Expression::IntegerLiteral(text.into())
    }

    /// Binary operation
    pub fn binary(op: impl Into<String>, lhs: Expression, rhs: Expression) -> Self {
        Expression::BinaryOp {
            op: op.into(),
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Conditional operator
    pub fn ternary(cond: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Expression::Ternary {
            cond: Box::new(cond),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    /// Parenthesized expression
    pub fn paren(inner: Expression) -> Self {
        Expression::Paren(Box::new(inner))
    }

    /// Transparent conversion
    pub fn cast(inner: Expression) -> Self {
        Expression::Cast(Box::new(inner))
    }

    /// Node kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::FieldAccess(_) => "MemberExpr",
            Expression::StateAccess(_) => "DeclRefExpr",
            Expression::IntegerLiteral(_) => "IntegerLiteral",
            Expression::BinaryOp { .. } => "BinaryOperator",
            Expression::Ternary { .. } => "ConditionalOperator",
            Expression::Paren(_) => "ParenExpr",
            Expression::Cast(_) => "ImplicitCastExpr",
            Expression::Unary { .. } => "UnaryOperator",
            Expression::Call { .. } => "CallExpr",
        }
    }

    /// Static type of the expression as the type checker saw it.
    ///
    /// Comparisons and logical connectives are `bool`, wrappers take their
    /// inner type, a ternary takes the type of its then-arm and everything
    /// else is `int`.
    pub fn static_type(&self) -> &'static str {
        match self {
            Expression::BinaryOp { op, .. } => match op.as_str() {
                "==" | "!=" | "<" | "<=" | ">" | ">=" | "&&" | "||" => "bool",
                _ => "int",
            },
            Expression::Unary { op, operand } => {
                if op == "!" {
                    "bool"
                } else {
                    operand.static_type()
                }
            }
            Expression::Paren(inner) | Expression::Cast(inner) => inner.static_type(),
            Expression::Ternary { then_expr, .. } => then_expr.static_type(),
            Expression::FieldAccess(_)
            | Expression::StateAccess(_)
            | Expression::IntegerLiteral(_)
            | Expression::Call { .. } => "int",
        }
    }
}

/// Statement inside a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// Braced block, children in source order
    Compound(Vec<Statement>),
    /// `if (cond) then_branch else else_branch`
    Conditional {
        /// Branch condition
        cond: Expression,
        /// Taken when the condition holds
        then_branch: Box<Statement>,
        /// Taken otherwise
        else_branch: Option<Box<Statement>>,
    },
    /// Simple assignment: `lhs = rhs`
    Assignment {
        /// Assigned location
        lhs: Expression,
        /// Assigned value
        rhs: Expression,
    },
    /// Compound assignment (`+=`, `-=`, ...). Not expressible in target atoms.
    CompoundAssignment {
        /// Operator symbol, e.g. `+=`
        op: String,
        /// Assigned location
        lhs: Expression,
        /// Operand
        rhs: Expression,
    },
    /// Local variable declaration: `int tmp;`
    Declaration {
        /// Declared type, printed verbatim
        type_name: String,
        /// Declared name
        name: String,
    },
    /// Expression evaluated for its own sake
    Expr(Expression),
}

impl Statement {
    /// Braced block
    pub fn block(stmts: Vec<Statement>) -> Self {
        Statement::Compound(stmts)
    }

    /// Simple assignment
    pub fn assign(lhs: Expression, rhs: Expression) -> Self {
        Statement::Assignment { lhs, rhs }
    }

    /// `if` without `else`
    pub fn if_then(cond: Expression, then_branch: Statement) -> Self {
        Statement::Conditional {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: None,
        }
    }

    /// `if` with `else`
    pub fn if_else(cond: Expression, then_branch: Statement, else_branch: Statement) -> Self {
        Statement::Conditional {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        }
    }

    /// Local declaration
    pub fn declare(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Statement::Declaration {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    /// Node kind name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Compound(_) => "CompoundStmt",
            Statement::Conditional { .. } => "IfStmt",
            Statement::Assignment { .. } => "BinaryOperator",
            Statement::CompoundAssignment { .. } => "CompoundAssignOperator",
            Statement::Declaration { .. } => "DeclStmt",
            Statement::Expr(expr) => expr.kind_name(),
        }
    }

    /// Names introduced by `Declaration` statements anywhere in the subtree
    pub fn declared_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_declared(&mut names);
        names
    }

    fn collect_declared<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Statement::Compound(children) => {
                for child in children {
                    child.collect_declared(out);
                }
            }
            Statement::Conditional {
                then_branch,
                else_branch,
                ..
            } => {
                then_branch.collect_declared(out);
                if let Some(else_branch) = else_branch {
                    else_branch.collect_declared(out);
                }
            }
            Statement::Declaration { name, .. } => out.push(name),
            Statement::Assignment { .. }
            | Statement::CompoundAssignment { .. }
            | Statement::Expr(_) => {}
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter type as spelled in the source
    pub type_name: String,
    /// Parameter name
    pub name: String,
}

impl Param {
    /// Creates a parameter
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

/// Function definition at file scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Function name
    pub name: String,
    /// Return type as spelled in the source
    pub return_type: String,
    /// Parameters in declaration order
    pub params: Vec<Param>,
    /// Function body
    pub body: Statement,
}

/// File-scope declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopLevelDecl {
    /// Global variable; becomes persistent per-flow state
    Variable {
        /// Declared type
        type_name: String,
        /// Variable name
        name: String,
        /// Initializer, if any
        init: Option<Expression>,
    },
    /// Function definition
    Function(FunctionDecl),
    /// `struct` definition
    Record {
        /// Record name
        name: String,
        /// Member fields
        fields: Vec<Param>,
    },
    /// `typedef`
    TypeAlias {
        /// Alias name
        name: String,
        /// Aliased type
        target: String,
    },
    /// Any other declaration kind the front end let through
    Unrecognized {
        /// Front-end kind name
        kind: String,
    },
}

impl TopLevelDecl {
    /// Declared name, if the kind has one
    pub fn name(&self) -> Option<&str> {
        match self {
            TopLevelDecl::Variable { name, .. }
            | TopLevelDecl::Record { name, .. }
            | TopLevelDecl::TypeAlias { name, .. } => Some(name),
            TopLevelDecl::Function(func) => Some(&func.name),
            TopLevelDecl::Unrecognized { .. } => None,
        }
    }
}

/// A whole translation unit as handed over by the front end
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// File-scope declarations in source order
    pub decls: Vec<TopLevelDecl>,
}

impl TranslationUnit {
    /// Creates a translation unit from declarations in source order
    pub fn new(decls: Vec<TopLevelDecl>) -> Self {
        Self { decls }
    }

    /// Decode a front end's JSON hand-off
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
