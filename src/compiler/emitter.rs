//! Atom emission
//!
//! Turns one packet function into a target atom: the atom definition, the
//! packet fields it depends on, and a single-stage pipeline declaration.

use super::if_conversion::IfConverter;
use super::lowering::lower_stmt;
use super::names::NameAllocator;
use super::usage;
use super::{CompileOptions, LoweringMode};
use crate::ast::FunctionDecl;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeSet;

/// Name of the packet context parameter of every atom
pub const PACKET_IDENTIFIER: &str = "packet";
/// Name of the state context parameter of every atom
pub const STATE_IDENTIFIER: &str = "state";

/// One generated atom
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomProgram {
    /// Allocated atom name
    pub name: String,
    /// Lowered body, one statement per line
    pub body: String,
    /// Packet fields the atom reads or writes
    pub fields: BTreeSet<String>,
    /// State variables the atom reads or writes
    pub states: BTreeSet<String>,
}

impl AtomProgram {
    /// Whether the body reads or writes any state variable
    pub fn uses_state(&self) -> bool {
        !self.states.is_empty()
    }

    /// `void <name>(Packet & packet, State & state) { ... }`
    pub fn definition(&self) -> String {
        let unused = if self.uses_state() {
            ""
        } else {
            " __attribute__((unused))"
        };
        format!(
            "void {}(Packet & {}, State & {}{}) {{\n{}\n}}\n",
            self.name, PACKET_IDENTIFIER, STATE_IDENTIFIER, unused, self.body
        )
    }

    /// `PacketFieldSet test_fields({"a","b"});`
    pub fn field_set_decl(&self) -> String {
        let quoted: Vec<String> = self.fields.iter().map(|f| format!("\"{}\"", f)).collect();
        format!("PacketFieldSet test_fields({{{}}});\n", quoted.join(","))
    }

    /// `Pipeline test_pipeline{{Atom(<name>, FieldContainer())}};`
    pub fn pipeline_decl(&self) -> String {
        format!(
            "Pipeline test_pipeline{{{{Atom({}, FieldContainer())}}}};\n",
            self.name
        )
    }

    /// Full emission wrapped in `extern "C"` to keep symbol names undecorated
    pub fn render(&self) -> String {
        let mut out = String::from("extern \"C\" {\n");
        out.push_str(&self.definition());
        out.push_str(&self.field_set_decl());
        out.push_str(&self.pipeline_decl());
        out.push_str("}\n");
        out
    }
}

/// Emits atoms for packet functions, sharing the compilation's allocator
pub struct AtomEmitter<'a> {
    names: &'a mut NameAllocator,
    options: &'a CompileOptions,
}

impl<'a> AtomEmitter<'a> {
    /// Creates an emitter
    pub fn new(names: &'a mut NameAllocator, options: &'a CompileOptions) -> Self {
        Self { names, options }
    }

    /// Lower one packet function into an atom
    pub fn emit(&mut self, func: &FunctionDecl) -> Result<AtomProgram> {
        let name = self.names.fresh(&self.options.atom_prefix)?;

        let (body, temporaries) = match self.options.lowering_mode {
            LoweringMode::IfConversion => {
                let converted = IfConverter::new(&mut *self.names, &self.options.temp_prefix)
                    .convert(&func.body)?;
                let body = converted
                    .lines()
                    .map(|line| format!("  {}", line))
                    .collect::<Vec<_>>()
                    .join("\n");
                (body, converted.temporaries().len())
            }
            LoweringMode::Direct => (format!("  {}", lower_stmt(&func.body)?), 0),
        };

        // If-conversion only adds temporaries, so the original body has the
        // same field set as the converted one
        let fields = usage::fields(&func.body)?;
        let states = usage::states(&func.body)?;

        tracing::debug!(
            function = %func.name,
            atom = %name,
            fields = fields.len(),
            temporaries,
            "emitted atom"
        );

        Ok(AtomProgram {
            name,
            body,
            fields,
            states,
        })
    }
}
