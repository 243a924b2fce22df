// this_file: src/error/mod.rs

//! The crate's throwing error surface.
//!
//! [`crate::tokenizer::TokenizerError`] and [`crate::parser::ParserError`]
//! are plain, non-throwing status structs: a failed [`crate::tokenizer::Tokenizer`]
//! or [`crate::parser::Parser`] just sits in its `Error` state until asked.
//! Everything in this module, by contrast, is returned from a fallible
//! call and meant to be propagated with `?` — [`ValueError`] from the
//! throwing half of [`crate::value::Value`]'s accessors, [`GeneratorError`]
//! from [`crate::generator::Generator`], and [`Error`] from the crate's
//! top-level [`crate::parse`] convenience function.

use crate::value::ValueKind;
use thiserror::Error;

/// Error from a throwing [`crate::value::Value`] accessor (the `expect_*`
/// family), used when a caller wants a hard error on a type mismatch
/// instead of an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValueError {
    #[error("expected a {expected:?} value, found {found:?}")]
    WrongKind { expected: ValueKind, found: ValueKind },

    #[error("string value is not valid UTF-16: {0}")]
    InvalidText(#[from] crate::slice::UnpairedSurrogate),

    /// Positional access ([`crate::value::Value::expect_get`]) with an
    /// `index` at or past the container's `len`.
    #[error("index {index} out of bounds for a container of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Error from [`crate::generator::Generator`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeneratorError {
    #[error("a value was not expected here; an object key was expected")]
    UnexpectedValue,

    #[error("a key was not expected here; a value was expected")]
    UnexpectedKey,

    #[error("end_array/end_object does not match the currently open container")]
    MismatchedEnd,

    #[error("the generator has already produced a complete top-level value")]
    AlreadyComplete,

    #[error("{0} cannot be represented in JSON, which has no NaN or infinity")]
    NonFiniteNumber(f64),

    #[error("the generator is in an error state from a previous call")]
    Poisoned,
}

/// The crate's top-level error type, returned by [`crate::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Error {
    #[error("tokenizing failed: {0}")]
    Tokenizer(#[from] crate::tokenizer::TokenizerError),

    #[error("parsing failed: {0}")]
    Parser(#[from] crate::parser::ParserError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Convenience alias for this crate's fallible top-level operations.
pub type Result<T> = std::result::Result<T, Error>;
