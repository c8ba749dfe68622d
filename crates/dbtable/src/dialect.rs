//! Identifier formatting strategies.
//!
//! Identifiers (table and column names) are always written into SQL as
//! literal text, never bound. The formatter decides how they are spelled.
//!
//! [`Backticks`] quotes *every* identifier, not just reserved words. A
//! reserved-word-aware formatter can be plugged in through
//! [`crate::TableOptions::formatter`].

use std::fmt;

/// Formats identifiers for interpolation into SQL text.
pub trait IdentFormatter: fmt::Debug + Send + Sync {
    /// Format a single identifier.
    fn format(&self, ident: &str) -> String;

    /// Whether this formatter quotes identifiers.
    ///
    /// The table name is only passed through [`IdentFormatter::format`]
    /// when this returns `true`.
    fn quotes(&self) -> bool;
}

/// Leaves identifiers unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbatim;

impl IdentFormatter for Verbatim {
    fn format(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn quotes(&self) -> bool {
        false
    }
}

/// Wraps identifiers in backticks, MySQL style.
///
/// An embedded backtick is doubled, so the identifier stays a single token.
#[derive(Debug, Clone, Copy, Default)]
pub struct Backticks;

impl IdentFormatter for Backticks {
    fn format(&self, ident: &str) -> String {
        let mut out = String::with_capacity(ident.len() + 2);
        out.push('`');
        for c in ident.chars() {
            if c == '`' {
                out.push('`');
            }
            out.push(c);
        }
        out.push('`');
        out
    }

    fn quotes(&self) -> bool {
        true
    }
}
