//! Unique name allocation
//!
//! One allocator lives for one compilation. Counters are kept per prefix and
//! never reset, so every name handed out within a compilation is distinct.

use crate::{Error, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Check that `name` can be spelled as an identifier in generated code
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Monotonic `<prefix><n>` generator
#[derive(Debug, Default)]
pub struct NameAllocator {
    /// Next counter value per prefix
    counters: HashMap<String, u32>,
    /// Names owned by the program being compiled; never handed out
    reserved: HashSet<String>,
}

impl NameAllocator {
    /// Creates an allocator with no reserved names
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user-declared name so that `fresh` never returns it
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    /// Allocate the next name for `prefix`
    ///
    /// Candidates that collide with a reserved name are skipped; the counter
    /// still advances past them.
    pub fn fresh(&mut self, prefix: &str) -> Result<String> {
        if !is_identifier(prefix) {
            return Err(Error::InvalidInput(format!(
                "name prefix `{}` is not a valid identifier",
                prefix
            )));
        }

        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let candidate = format!("{}{}", prefix, counter);
            *counter += 1;
            if self.reserved.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
    }

    /// Number of names allocated for `prefix` so far, skipped ones included
    #[cfg(test)]
    pub(crate) fn allocated(&self, prefix: &str) -> u32 {
        self.counters.get(prefix).copied().unwrap_or(0)
    }
}
