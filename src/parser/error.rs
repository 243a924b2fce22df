// this_file: src/parser/error.rs

//! The parser's non-throwing error type, mirroring
//! [`crate::tokenizer::TokenizerError`].

use crate::token::TokenKind;
use std::fmt;

/// Describes why the parser stopped accepting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserError {
    /// Index, within the token stream fed to the parser, of the token that
    /// could not be accepted.
    pub token_index: usize,
    /// What the parser was expecting instead.
    pub expected: &'static str,
    /// The kind of token actually found.
    pub found: TokenKind,
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "expected {} at token {}, found {:?}",
            self.expected, self.token_index, self.found
        )
    }
}

impl std::error::Error for ParserError {}
