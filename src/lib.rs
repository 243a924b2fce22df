// this_file: src/lib.rs

//! A streaming, push-driven JSON tokenizer, parser, and generator over a
//! flat-arena value tree.
//!
//! Most JSON crates pull: you hand them a complete `&str` or `&[u8]` and
//! they read through it at their own pace. This one pushes: a
//! [`tokenizer::Tokenizer`] and a [`parser::Parser`] are fed one character
//! (or token) at a time through repeated [`tokenizer::Tokenizer::feed`] /
//! [`parser::Parser::feed`] calls, so a caller can stream a document in
//! from a socket or a file in whatever chunk sizes happen to arrive,
//! without ever needing the whole input in memory at once.
//!
//! The parsed tree is flat rather than recursive: every array and object
//! is a range into a shared index arena rather than a `Vec` of owned
//! children (see [`value`] for why). [`parse`] wires the tokenizer and
//! parser together for the common case where a complete document is
//! already in hand as a `&str`.
//!
//! ```
//! let doc = flatjson::parse(r#"{"name": "ada", "langs": ["rust"]}"#).unwrap();
//! assert_eq!(doc.root().get_key("name").unwrap().as_str().unwrap(), "ada");
//! ```

#![warn(missing_docs)]
#![allow(clippy::needless_range_loop)]

pub mod error;
pub mod generator;
pub mod parser;
pub mod slice;
pub mod token;
pub mod tokenizer;
pub mod value;

pub use error::{Error, Result};
pub use generator::{Generator, ToJson};
pub use parser::Parser;
pub use slice::StringSlice;
pub use token::{RawToken, Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use value::{RawValue, Value, ValueKind, ValueStr};

/// A thin owner of a completed [`Parser`], returned by [`parse`].
///
/// Exists mainly so a caller doesn't have to think about the
/// tokenizer/parser pair at all for the one-shot case: [`Document::root`]
/// hands back the parsed tree directly.
pub struct Document {
    parser: Parser,
}

impl Document {
    /// The parsed document's root value.
    pub fn root(&self) -> Value<'_> {
        self.parser
            .last_parsed_root()
            .expect("parse() only returns a Document once the parser has completed")
    }

    /// The underlying [`Parser`], for callers who want direct access to its
    /// arenas (e.g. to call [`Parser::copy_strings`]).
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// The underlying [`Parser`], consuming the document.
    pub fn into_parser(self) -> Parser {
        self.parser
    }
}

/// Tokenizes and parses a complete document in one call.
///
/// Equivalent to feeding `input` to a [`tokenizer::Tokenizer`] and then
/// feeding its tokens to a [`parser::Parser`], surfacing whichever stage
/// fails first and wrapping the completed parser in a [`Document`].
pub fn parse(input: &str) -> Result<Document> {
    let mut tokenizer = Tokenizer::new();
    tokenizer.feed_str(input);
    tokenizer.finish();
    if let Some(err) = tokenizer.error() {
        return Err(Error::Tokenizer(*err));
    }

    let mut parser = Parser::new();
    for token in tokenizer.tokens() {
        parser.feed(&token);
    }
    if let Some(err) = parser.error() {
        return Err(Error::Parser(*err));
    }

    Ok(Document { parser })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_document() {
        let doc = parse(r#"{"a": [1, 2.5, null, true], "b": "text"}"#).unwrap();
        let root = doc.root();
        assert_eq!(root.get_key("a").unwrap().len(), 4);
        assert_eq!(root.get_key("b").unwrap().as_str().unwrap(), "text");
    }

    #[test]
    fn surfaces_tokenizer_failure() {
        let err = parse("{not json}").unwrap_err();
        assert!(matches!(err, Error::Tokenizer(_)));
    }

    #[test]
    fn surfaces_parser_failure() {
        let err = parse("]").unwrap_err();
        assert!(matches!(err, Error::Tokenizer(_) | Error::Parser(_)));
    }

    #[test]
    fn round_trips_through_the_generator() {
        let doc = parse(r#"{"k": [1, "two", false]}"#).unwrap();
        let mut gen = Generator::new();
        doc.root().to_json(&mut gen).unwrap();
        assert_eq!(gen.as_str(), r#"{"k":[1,"two",false]}"#);
    }

    #[test]
    fn document_exposes_its_parser_for_copy_strings() {
        let mut doc = parse(r#""hi""#).unwrap();
        doc.parser.copy_strings();
        assert_eq!(doc.root().as_str().unwrap(), "hi");
    }
}
