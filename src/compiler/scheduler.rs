//! Declaration classification and scheduling
//!
//! File-scope declarations are ranked and stably sorted so that state
//! variables are processed first, then functions, then type declarations:
//!
//! | Rank | Kind | Treatment |
//! |------|------|-----------|
//! | 1 | State variable | validated, recorded in the state table |
//! | 2 | Ordinary function | recognized, never emitted (inlined upstream) |
//! | 3 | Packet function | emitted as an atom |
//! | 4 | Record type | discarded |
//! | 5 | Type alias | discarded |

use crate::ast::{Expression, FunctionDecl, TopLevelDecl};
use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::{IntErrorKind, ParseIntError};

lazy_static! {
    static ref INTEGER_LITERAL: Regex =
        Regex::new(r"^(?:0[xX](?P<hex>[0-9a-fA-F]+)|(?P<dec>[0-9]+))(?:[uU]?[lL]{0,2}|[lL]{1,2}[uU])$")
            .unwrap();
}

/// Initial values of every state variable, by name
pub type StateTable = BTreeMap<String, u32>;

/// Decides whether a function is a packet-processing entry point
///
/// This is a front-end contract. The scheduler calls it exactly once per
/// function declaration.
pub trait PacketFunctionPredicate {
    /// True when `func` processes packets
    fn is_packet_function(&self, func: &FunctionDecl) -> bool;
}

impl<F> PacketFunctionPredicate for F
where
    F: Fn(&FunctionDecl) -> bool,
{
    fn is_packet_function(&self, func: &FunctionDecl) -> bool {
        self(func)
    }
}

/// Default predicate: `void f(<packet type> pkt)`
#[derive(Debug, Clone)]
pub struct SignatureMatcher {
    packet_type: String,
}

impl SignatureMatcher {
    /// Match functions taking a single parameter of type `packet_type`
    pub fn new(packet_type: impl Into<String>) -> Self {
        Self {
            packet_type: packet_type.into(),
        }
    }
}

impl Default for SignatureMatcher {
    fn default() -> Self {
        Self::new("struct Packet")
    }
}

impl PacketFunctionPredicate for SignatureMatcher {
    fn is_packet_function(&self, func: &FunctionDecl) -> bool {
        func.return_type.trim() == "void"
            && func.params.len() == 1
            && func.params[0].type_name.trim() == self.packet_type
    }
}

/// Classification of a file-scope declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    /// Global variable holding per-flow state
    StateVariable,
    /// Helper function, already inlined upstream
    OrdinaryFunction,
    /// Packet-processing entry point
    PacketFunction,
    /// `struct` definition
    RecordType,
    /// `typedef`
    TypeAlias,
}

impl DeclKind {
    /// Emission rank; lower ranks are processed first
    pub fn rank(self) -> u8 {
        match self {
            DeclKind::StateVariable => 1,
            DeclKind::OrdinaryFunction => 2,
            DeclKind::PacketFunction => 3,
            DeclKind::RecordType => 4,
            DeclKind::TypeAlias => 5,
        }
    }
}

/// Entry of the scheduled order, kept in the compile result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDecl {
    /// Classification
    pub kind: DeclKind,
    /// Declared name
    pub name: String,
}

/// A declaration together with its classification
#[derive(Debug, Clone, Copy)]
pub struct Classified<'a> {
    /// Classification
    pub kind: DeclKind,
    /// The declaration itself
    pub decl: &'a TopLevelDecl,
}

impl Classified<'_> {
    /// Summary for the compile result
    pub fn summary(&self) -> ScheduledDecl {
        ScheduledDecl {
            kind: self.kind,
            name: self.decl.name().unwrap_or_default().to_string(),
        }
    }
}

/// Classify one declaration
pub fn classify(decl: &TopLevelDecl, predicate: &dyn PacketFunctionPredicate) -> Result<DeclKind> {
    match decl {
        TopLevelDecl::Variable { .. } => Ok(DeclKind::StateVariable),
        TopLevelDecl::Function(func) => {
            if predicate.is_packet_function(func) {
                Ok(DeclKind::PacketFunction)
            } else {
                Ok(DeclKind::OrdinaryFunction)
            }
        }
        TopLevelDecl::Record { .. } => Ok(DeclKind::RecordType),
        TopLevelDecl::TypeAlias { .. } => Ok(DeclKind::TypeAlias),
        TopLevelDecl::Unrecognized { kind } => Err(Error::invariant(format!(
            "unexpected file-scope declaration kind {}",
            kind
        ))),
    }
}

/// Classify every declaration and stably sort by rank
pub fn schedule<'a>(
    decls: &'a [TopLevelDecl],
    predicate: &dyn PacketFunctionPredicate,
) -> Result<Vec<Classified<'a>>> {
    let mut scheduled = decls
        .iter()
        .map(|decl| {
            let kind = classify(decl, predicate)?;
            Ok(Classified { kind, decl })
        })
        .collect::<Result<Vec<_>>>()?;

    // `sort_by_key` is stable: equal ranks keep their source order
    scheduled.sort_by_key(|entry| entry.kind.rank());

    for entry in &scheduled {
        tracing::debug!(kind = ?entry.kind, name = ?entry.decl.name(), "scheduled declaration");
    }
    Ok(scheduled)
}

/// Validate state variables in scheduled order and collect their initial values
pub fn build_state_table(scheduled: &[Classified<'_>]) -> Result<StateTable> {
    let mut table = StateTable::new();
    for entry in scheduled {
        if let TopLevelDecl::Variable { name, init, .. } = entry.decl {
            let init = init.as_ref().ok_or_else(|| Error::InvalidStateDecl {
                name: name.clone(),
            })?;
            if table.contains_key(name) {
                return Err(Error::DuplicateStateDecl { name: name.clone() });
            }
            table.insert(name.clone(), initial_value(name, init)?);
        }
    }
    Ok(table)
}

fn initial_value(name: &str, init: &Expression) -> Result<u32> {
    // Implicit conversions around the literal are transparent
    let mut expr = init;
    while let Expression::Cast(inner) = expr {
        expr = inner.as_ref();
    }

    match expr {
        Expression::IntegerLiteral(text) => parse_u32_literal(text).map_err(|err| match err {
            LiteralError::Overflow => Error::InitializerOutOfRange {
                name: name.to_string(),
                literal: text.clone(),
            },
            LiteralError::Malformed => Error::NonConstantInitializer {
                name: name.to_string(),
                initializer: text.clone(),
            },
        }),
        other => Err(Error::NonConstantInitializer {
            name: name.to_string(),
            initializer: other.kind_name().to_string(),
        }),
    }
}

/// Why an integer literal could not become a `u32`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralError {
    /// Not a C integer literal at all
    Malformed,
    /// Well-formed but larger than `u32::MAX`
    Overflow,
}

impl From<ParseIntError> for LiteralError {
    fn from(err: ParseIntError) -> Self {
        match err.kind() {
            IntErrorKind::PosOverflow => LiteralError::Overflow,
            _ => LiteralError::Malformed,
        }
    }
}

/// Parse a C integer literal into a `u32`
///
/// Accepts decimal, `0x` hexadecimal and leading-zero octal forms with an
/// optional `u`/`l` suffix.
pub fn parse_u32_literal(text: &str) -> std::result::Result<u32, LiteralError> {
    let caps = INTEGER_LITERAL
        .captures(text.trim())
        .ok_or(LiteralError::Malformed)?;
    if let Some(hex) = caps.name("hex") {
        return Ok(u32::from_str_radix(hex.as_str(), 16)?);
    }
    let digits = caps.name("dec").ok_or(LiteralError::Malformed)?.as_str();
    if digits.len() > 1 && digits.starts_with('0') {
        Ok(u32::from_str_radix(&digits[1..], 8)?)
    } else {
        Ok(digits.parse()?)
    }
}
