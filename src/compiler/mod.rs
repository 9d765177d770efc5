//! # Domino Compiler - Packet Functions to Pipeline Atoms
//!
//! This module turns a type-checked translation unit into atoms for a
//! programmable packet-processing pipeline. Targets have no branch
//! instructions, so conditionals are if-converted into predicated
//! straight-line code before lowering.
//!
//! ## Architecture
//!
//! ```text
//! TranslationUnit → Schedule → State table
//!                           ↘ Packet functions → If-convert → Lower → Atoms → Program text
//! ```
//!
//! ## Usage
//!
//! ```
//! use domino::ast::{Expression, FunctionDecl, Param, Statement, TopLevelDecl, TranslationUnit};
//! use domino::compiler::{CompileOptions, Compiler};
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
//!         body: Statement::block(vec![Statement::assign(
//!             Expression::state("count"),
//!             Expression::binary("+", Expression::state("count"), Expression::int("1")),
//!         )]),
//!     }),
//! ]);
//!
//! let result = Compiler::new(CompileOptions::default()).compile(&unit).unwrap();
//! assert_eq!(result.state_table["count"], 0);
//! assert!(result.code.contains("void atom0(Packet & packet, State & state)"));
//! ```

pub mod emitter;
pub mod if_conversion;
pub mod lowering;
pub mod names;
pub mod scheduler;
pub mod usage;

pub use emitter::{AtomEmitter, AtomProgram};
pub use if_conversion::{if_convert, IfConverted, IfConverter, Predicate};
pub use lowering::{lower_expr, lower_stmt};
pub use names::NameAllocator;
pub use scheduler::{
    DeclKind, PacketFunctionPredicate, ScheduledDecl, SignatureMatcher, StateTable,
};

use crate::ast::{TopLevelDecl, TranslationUnit};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Target headers prepended when `emit_includes` is set
pub const TARGET_INCLUDES: [&str; 3] = ["packet.h", "atom.h", "pipeline.h"];

/// How packet function bodies are lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoweringMode {
    /// If-convert first, then lower the straight-line result
    #[default]
    IfConversion,
    /// Lower directly, keeping `if` blocks in the atom body
    Direct,
}

/// Compilation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Body lowering strategy
    pub lowering_mode: LoweringMode,
    /// Prepend the target runtime `#include`s
    pub emit_includes: bool,
    /// Parameter type identifying packet functions (used by the default predicate)
    pub packet_type: String,
    /// Prefix of if-conversion temporaries
    pub temp_prefix: String,
    /// Prefix of atom names
    pub atom_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            lowering_mode: LoweringMode::IfConversion,
            emit_includes: false,
            packet_type: "struct Packet".to_string(),
            temp_prefix: "tmp".to_string(),
            atom_prefix: "atom".to_string(),
        }
    }
}

impl CompileOptions {
    /// Load options from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check that generated names will be valid identifiers
    pub fn validate(&self) -> Result<()> {
        let prefixes = [
            ("temp_prefix", &self.temp_prefix),
            ("atom_prefix", &self.atom_prefix),
        ];
        for (what, prefix) in prefixes {
            if !names::is_identifier(prefix) {
                return Err(Error::InvalidInput(format!(
                    "{} `{}` is not a valid identifier",
                    what, prefix
                )));
            }
        }
        Ok(())
    }
}

/// Compilation result with metadata
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    /// Complete program text
    pub code: String,
    /// Generated atoms, in emission order
    pub atoms: Vec<AtomProgram>,
    /// Initial value of every state variable
    pub state_table: StateTable,
    /// Declarations in the order they were processed
    pub schedule: Vec<ScheduledDecl>,
    /// Warnings generated during compilation
    pub warnings: Vec<String>,
}

/// Translation unit to pipeline atoms compiler
pub struct Compiler {
    options: CompileOptions,
    predicate: Box<dyn PacketFunctionPredicate>,
}

impl Compiler {
    /// Create a compiler recognizing packet functions by signature
    pub fn new(options: CompileOptions) -> Self {
        let predicate = Box::new(SignatureMatcher::new(options.packet_type.clone()));
        Self { options, predicate }
    }

    /// Create a compiler with a front-end supplied packet-function predicate
    pub fn with_predicate(
        options: CompileOptions,
        predicate: impl PacketFunctionPredicate + 'static,
    ) -> Self {
        Self {
            options,
            predicate: Box::new(predicate),
        }
    }

    /// Compile a JSON-encoded translation unit
    pub fn compile_json(&self, json: &str) -> Result<CompileResult> {
        let unit = TranslationUnit::from_json(json)?;
        self.compile(&unit)
    }

    /// Compile a translation unit
    ///
    /// Either the whole unit compiles or an error is returned; no partial
    /// output survives a failure.
    pub fn compile(&self, unit: &TranslationUnit) -> Result<CompileResult> {
        self.options.validate()?;

        // Phase 1: Classify and order declarations
        let scheduled = scheduler::schedule(&unit.decls, self.predicate.as_ref())?;

        // Phase 2: State initial values
        let state_table = scheduler::build_state_table(&scheduled)?;

        // Phase 3: Fresh names must not shadow anything the program declares
        let mut names = NameAllocator::new();
        for decl in &unit.decls {
            if let Some(name) = decl.name() {
                names.reserve(name);
            }
            if let TopLevelDecl::Function(func) = decl {
                for param in &func.params {
                    names.reserve(param.name.clone());
                }
                for local in func.body.declared_names() {
                    names.reserve(local);
                }
            }
        }

        // Phase 4: One atom per packet function, in scheduled order
        let mut atoms = Vec::new();
        {
            let mut emitter = AtomEmitter::new(&mut names, &self.options);
            for entry in &scheduled {
                if let (DeclKind::PacketFunction, TopLevelDecl::Function(func)) =
                    (entry.kind, entry.decl)
                {
                    atoms.push(emitter.emit(func)?);
                }
            }
        }

        // Phase 5: Assemble
        let mut code = String::new();
        if self.options.emit_includes && !atoms.is_empty() {
            for header in TARGET_INCLUDES {
                code.push_str(&format!("#include \"{}\"\n", header));
            }
        }
        for atom in &atoms {
            code.push_str(&atom.render());
        }

        let warnings = collect_warnings(&atoms, &state_table);

        Ok(CompileResult {
            code,
            atoms,
            state_table,
            schedule: scheduled.iter().map(|entry| entry.summary()).collect(),
            warnings,
        })
    }
}

fn collect_warnings(atoms: &[AtomProgram], state_table: &StateTable) -> Vec<String> {
    let mut warnings = Vec::new();

    if atoms.is_empty() {
        let msg = "translation unit has no packet-processing function".to_string();
        tracing::warn!("{}", msg);
        warnings.push(msg);
        return warnings;
    }

    let referenced: BTreeSet<&String> = atoms.iter().flat_map(|atom| &atom.states).collect();
    for name in state_table.keys() {
        if !referenced.contains(name) {
            let msg = format!("state variable {} is never referenced by any atom", name);
            tracing::warn!("{}", msg);
            warnings.push(msg);
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_json_defaults() {
        let options = CompileOptions::from_json(r#"{ "lowering_mode": "Direct" }"#).unwrap();
        assert_eq!(options.lowering_mode, LoweringMode::Direct);
        assert_eq!(options.temp_prefix, "tmp");
        assert!(!options.emit_includes);
    }

    #[test]
    fn test_options_reject_bad_prefix() {
        let err = CompileOptions::from_json(r#"{ "atom_prefix": "not an ident" }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_unit_warns() {
        let result = Compiler::new(CompileOptions::default())
            .compile(&TranslationUnit::default())
            .unwrap();
        assert!(result.code.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }
}
