//! # Domino - Atom Code Generation for Packet Pipelines
//!
//! Domino compiles packet-processing functions written in a restricted C-like
//! language into *atoms* for programmable packet-processing pipelines. Pipeline
//! targets have no branch instructions: an atom is a predicated, straight-line
//! function over a packet context and a persistent state context.
//!
//! This crate is the core of the compiler. It takes an already-parsed,
//! already-type-checked syntax tree from a front end and produces target code.
//!
//! ## Quick Start
//!
//! ```rust
//! use domino::ast::{Expression, FunctionDecl, Param, Statement, TopLevelDecl, TranslationUnit};
//! use domino::{CompileOptions, Compiler};
//!
//! # fn main() -> domino::Result<()> {
//! // if (pkt.proto == 6) { count = count + 1; }
//! let body = Statement::block(vec![Statement::if_then(
//!     Expression::binary("==", Expression::field("proto"), Expression::int("6")),
//!     Statement::block(vec![Statement::assign(
//!         Expression::state("count"),
//!         Expression::binary("+", Expression::state("count"), Expression::int("1")),
//!     )]),
//! )]);
//!
//! let unit = TranslationUnit::new(vec![
//!     TopLevelDecl::Variable {
//!         type_name: "int".to_string(),
//!         name: "count".to_string(),
//!         init: Some(Expression::int("0")),
//!     },
//!     TopLevelDecl::Function(FunctionDecl {
//!         name: "func".to_string(),
//!         return_type: "void".to_string(),
//!         params: vec![Param::new("struct Packet", "pkt")],
//!         body,
//!     }),
//! ]);
//!
//! let result = Compiler::new(CompileOptions::default()).compile(&unit)?;
//! assert!(result.code.contains("bool tmp0;"));
//! assert!(result.code.contains("PacketFieldSet test_fields({\"proto\"});"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Front end → TranslationUnit → Scheduler → If-conversion → Lowering → Atoms
//!                                        ↘ State table      ↘ Field sets
//! ```
//!
//! ### Main Components
//!
//! - [`compiler::scheduler`] - Classifies file-scope declarations, orders them and builds the state table
//! - [`compiler::if_conversion`] - Linearizes nested conditionals into predicated assignments
//! - [`compiler::lowering`] - Rewrites expressions into the target's `p("..")`/`s("..")` operands
//! - [`compiler::usage`] - Collects the packet fields an atom depends on
//! - [`compiler::emitter`] - Renders atoms and pipeline declarations
//! - [`Compiler`] - Drives a whole translation unit
//!
//! ## Error Handling
//!
//! Every error is fatal for the translation unit; there is no partial output.
//!
//! ```rust
//! use domino::ast::{Expression, TopLevelDecl, TranslationUnit};
//! use domino::{CompileOptions, Compiler, Error};
//!
//! let unit = TranslationUnit::new(vec![TopLevelDecl::Variable {
//!     type_name: "int".to_string(),
//!     name: "x".to_string(),
//!     init: Some(Expression::state("y")),
//! }]);
//!
//! match Compiler::new(CompileOptions::default()).compile(&unit) {
//!     Err(Error::NonConstantInitializer { name, .. }) => assert_eq!(name, "x"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

/// Version of the Domino code generator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod ast;
pub mod compiler;
pub mod error;

// Re-export main types
pub use ast::{Expression, FunctionDecl, Statement, TopLevelDecl, TranslationUnit};
pub use compiler::{CompileOptions, CompileResult, Compiler, LoweringMode};
pub use error::{Error, Result};
