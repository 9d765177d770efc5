//! Error types for the Domino code generator

use thiserror::Error;

/// Code generation errors
///
/// Every error is fatal for the translation unit being compiled: the compiler
/// never emits partial output. Source locations are attached by the caller,
/// which still owns the front end's location metadata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // State variable errors
    /// State variable declared without an initializer
    ///
    /// **Triggered by:** `int count;` at file scope
    /// **Prevention:** Give every state variable an integer initializer: `int count = 0;`
    #[error("All state variables must have an initializer: {name} doesn't")]
    InvalidStateDecl {
        /// State variable name
        name: String,
    },

    /// State variable declared more than once
    ///
    /// **Triggered by:** Two file-scope declarations of `count`
    #[error("Reinitializing state variable {name} not permitted")]
    DuplicateStateDecl {
        /// State variable name
        name: String,
    },

    /// State variable initializer is not an integer literal
    ///
    /// **Triggered by:** `int x = y;`, `int x = 1 + 2;`, or literal text that is
    /// not a C integer (`abc`)
    /// **Prevention:** State is loaded once at program load, so only literals are allowed
    #[error("Only integers can be used to initialize state variables: {name} uses {initializer}")]
    NonConstantInitializer {
        /// State variable name
        name: String,
        /// Description of the offending initializer
        initializer: String,
    },

    /// Integer literal initializer does not fit in 32 bits
    #[error("Initializer {literal} of state variable {name} does not fit in a u32")]
    InitializerOutOfRange {
        /// State variable name
        name: String,
        /// Literal text
        literal: String,
    },

    // Transform errors
    /// A statement or expression form the transform cannot handle
    ///
    /// **Triggered by:** compound assignment (`x += 1`), declarations inside
    /// conditional branches, function calls left behind by the front end
    #[error("Unsupported construct: {kind}")]
    UnsupportedConstruct {
        /// Offending node kind, with context where useful
        kind: String,
    },

    /// Classification reached a case a conforming front end never produces
    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),

    // Boundary errors
    /// Front-end hand-off or compile options could not be decoded
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create an unsupported-construct error naming the offending kind
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Error::UnsupportedConstruct { kind: kind.into() }
    }

    /// Create an internal invariant violation with a message
    pub fn invariant(msg: impl Into<String>) -> Self {
        Error::InternalInvariantViolation(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}

/// Result type for Domino operations
pub type Result<T> = std::result::Result<T, Error>;
