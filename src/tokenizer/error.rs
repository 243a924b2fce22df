// this_file: src/tokenizer/error.rs

//! The tokenizer's non-throwing error type.
//!
//! The tokenizer never panics and never returns a `Result` from `feed` —
//! failure is observable status, matched by [`super::Tokenizer::is_failed`]
//! and retrieved with [`super::Tokenizer::error`]. This mirrors the split
//! this crate draws between status components (tokenizer, parser) and
//! throwing components (value accessors, generator).

use std::fmt;

/// Describes why the tokenizer stopped accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerError {
    /// Code-unit offset of the unit that could not be consumed, or of the
    /// end of input if `failed_unit` is `None`.
    pub position: usize,
    /// The code unit that triggered the failure. `None` means the failure
    /// was an unexpected end of input rather than an unexpected character.
    pub failed_unit: Option<u16>,
    /// The code unit fed immediately before the failing one, if any.
    pub last_unit: Option<u16>,
    /// A short, human-readable description of what was expected.
    pub reason: &'static str,
}

fn describe_unit(unit: Option<u16>) -> String {
    match unit {
        None => "end of input".to_string(),
        Some(u) => match char::from_u32(u as u32) {
            Some(c) if !c.is_control() => format!("'{c}'"),
            _ => format!("code unit 0x{u:04X}"),
        },
    }
}

impl fmt::Display for TokenizerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at offset {}: found {} (previous was {})",
            self.reason,
            self.position,
            describe_unit(self.failed_unit),
            describe_unit(self.last_unit)
        )
    }
}

impl std::error::Error for TokenizerError {}
