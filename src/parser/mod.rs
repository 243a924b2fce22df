// this_file: src/parser/mod.rs

//! A push-fed parser that assembles a stream of [`Token`]s into a flat
//! value tree.
//!
//! Like the [`crate::tokenizer::Tokenizer`] it typically sits downstream
//! of, the parser is driven by repeated calls to [`Parser::feed`] rather
//! than pulling from a token slice it holds in full. It never builds a
//! recursive `enum Value` tree; every array and object is a `(offset,
//! length)` range into a shared `indexes` arena, and every value (scalar or
//! container) lives in a shared `values` arena. String values and object
//! keys live in a separate string table that starts out borrowing from
//! whatever buffer produced them and only copies itself into
//! parser-owned storage when [`Parser::copy_strings`] is called. See
//! [`crate::value`] for the [`Value`] handle used to read the tree back
//! out.

mod error;
mod pool;
mod state;

pub use error::ParserError;
pub use state::ParserState;

use crate::slice::StringSlice;
use crate::token::{Token, TokenKind};
use crate::value::{RawValue, Value, ValueStr};
use pool::TempIndexPool;

enum FrameKind {
    Array,
    Object,
}

/// One entry in the parser's string table.
///
/// New entries start `Borrowed`, aliasing whichever buffer produced the
/// token (normally the tokenizer's). [`Parser::copy_strings`] walks the
/// table and turns every `Borrowed` entry into `Owned`, copying its units
/// into the parser's own buffer.
enum StringEntry {
    Borrowed(StringSlice),
    Owned { offset: u32, length: u32 },
}

struct Frame {
    kind: FrameKind,
    indices: Vec<u32>,
    pending_key: Option<u32>,
    /// State to resume once this container closes, mirroring the
    /// tokenizer's return stack — but kept per-frame here since each
    /// container only ever needs its own single resumption point.
    follow_up: ParserState,
}

/// Assembles a token stream into a flat value arena.
///
/// Construct with [`Parser::new`], feed tokens with [`Parser::feed`], then
/// read the result with [`Parser::last_parsed_root`]. The parser can keep
/// accepting further top-level values after one completes — call
/// [`Parser::reset`] between them to return to [`ParserState::Start`]
/// without losing previously parsed data.
pub struct Parser {
    strings: Vec<StringEntry>,
    owned_strings: Vec<u16>,
    values: Vec<RawValue>,
    indexes: Vec<u32>,
    frames: Vec<Frame>,
    state: ParserState,
    pool: TempIndexPool,
    error: Option<ParserError>,
    token_index: usize,
    root: Option<u32>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            strings: Vec::new(),
            owned_strings: Vec::new(),
            values: Vec::new(),
            indexes: Vec::new(),
            frames: Vec::new(),
            state: ParserState::Start,
            pool: TempIndexPool::new(),
            error: None,
            token_index: 0,
            root: None,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn is_failed(&self) -> bool {
        self.state == ParserState::Error
    }

    pub fn is_parsing(&self) -> bool {
        !self.state.is_terminal()
    }

    pub fn error(&self) -> Option<&ParserError> {
        self.error.as_ref()
    }

    pub fn error_string(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// The most recently completed top-level value, if any has been
    /// parsed yet.
    pub fn last_parsed_root(&self) -> Option<Value<'_>> {
        self.root.map(|idx| self.value_at(idx))
    }

    /// Feeds one token.
    ///
    /// A no-op once the parser is done or has failed.
    pub fn feed(&mut self, token: &Token) {
        if self.state.is_terminal() {
            return;
        }
        let index = self.token_index;
        self.token_index += 1;
        match self.state {
            ParserState::Start => self.dispatch_value(token, index, ParserState::Done),
            ParserState::ArrayValue => {
                if token.kind() == TokenKind::ArrayEnd {
                    self.close_array();
                } else {
                    self.dispatch_value(token, index, ParserState::ArrayValue);
                }
            }
            ParserState::ObjectKey => {
                if token.kind() == TokenKind::ObjectEnd {
                    self.close_object();
                } else if token.kind() == TokenKind::String {
                    let key_index = self.intern_string(token);
                    self.frames.last_mut().expect("open object frame").pending_key = Some(key_index);
                    self.state = ParserState::ObjectValue;
                } else {
                    self.fail(index, "a string key or '}'", token.kind());
                }
            }
            ParserState::ObjectValue => self.dispatch_value(token, index, ParserState::ObjectKey),
            ParserState::Done | ParserState::Error => {}
        }
    }

    /// Returns to [`ParserState::Start`], releasing any in-flight
    /// containers' scratch index buffers back to the pool. Previously
    /// accumulated arena data (and [`Parser::last_parsed_root`]) is kept,
    /// so a sequence of top-level values can be parsed one after another
    /// into the same arena.
    pub fn reset(&mut self) {
        while let Some(frame) = self.frames.pop() {
            self.pool.release(frame.indices);
        }
        self.state = ParserState::Start;
        self.error = None;
    }

    /// Wipes the parser back to a freshly constructed state, discarding
    /// all previously parsed data.
    pub fn clear(&mut self) {
        self.reset();
        self.strings.clear();
        self.owned_strings.clear();
        self.values.clear();
        self.indexes.clear();
        self.token_index = 0;
        self.root = None;
    }

    /// Copies every still-borrowed string appended since the last call into
    /// a buffer owned by the parser, severing its dependency on whichever
    /// tokenizer buffer produced those strings.
    ///
    /// Cheap to call repeatedly: an entry already copied by a previous call
    /// is left alone, so only strings appended in between get copied again.
    pub fn copy_strings(&mut self) {
        for entry in &mut self.strings {
            if let StringEntry::Borrowed(slice) = entry {
                let offset = self.owned_strings.len() as u32;
                self.owned_strings.extend(slice.units());
                let length = (self.owned_strings.len() as u32) - offset;
                *entry = StringEntry::Owned { offset, length };
            }
        }
    }

    pub(crate) fn string_at(&self, string_index: u32) -> ValueStr<'_> {
        match &self.strings[string_index as usize] {
            StringEntry::Owned { offset, length } => {
                let start = *offset as usize;
                let end = start + *length as usize;
                ValueStr::owned(&self.owned_strings[start..end])
            }
            StringEntry::Borrowed(slice) => ValueStr::borrowed(slice.clone()),
        }
    }

    pub(crate) fn index_at(&self, i: u32) -> u32 {
        self.indexes[i as usize]
    }

    /// Number of cells in the `values[]` arena. Exposed for tests that
    /// check the arena isn't wasting slots (e.g. object keys, which live
    /// only in the string table).
    #[cfg(test)]
    pub(crate) fn values_len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn value_at(&self, i: u32) -> Value<'_> {
        Value::new(self.values[i as usize], self)
    }

    fn fail(&mut self, token_index: usize, expected: &'static str, found: TokenKind) {
        self.error = Some(ParserError { token_index, expected, found });
        self.state = ParserState::Error;
    }

    fn dispatch_value(&mut self, token: &Token, token_index: usize, follow_up: ParserState) {
        match token.kind() {
            TokenKind::ArrayBegin => {
                let indices = self.pool.acquire();
                self.frames.push(Frame { kind: FrameKind::Array, indices, pending_key: None, follow_up });
                self.state = ParserState::ArrayValue;
            }
            TokenKind::ObjectBegin => {
                let indices = self.pool.acquire();
                self.frames.push(Frame { kind: FrameKind::Object, indices, pending_key: None, follow_up });
                self.state = ParserState::ObjectKey;
            }
            TokenKind::Null => {
                let idx = self.push_value(RawValue::Null);
                self.attach_and_continue(idx, follow_up);
            }
            TokenKind::Bool => {
                let idx = self.push_value(RawValue::Bool(token.as_bool().expect("bool token")));
                self.attach_and_continue(idx, follow_up);
            }
            TokenKind::Long => {
                let idx = self.push_value(RawValue::Long(token.as_long().expect("long token")));
                self.attach_and_continue(idx, follow_up);
            }
            TokenKind::Double => {
                let idx = self.push_value(RawValue::Double(token.as_double().expect("double token")));
                self.attach_and_continue(idx, follow_up);
            }
            TokenKind::String => {
                let idx = self.push_string_value(token);
                self.attach_and_continue(idx, follow_up);
            }
            TokenKind::ArrayEnd | TokenKind::ObjectEnd => {
                self.fail(token_index, "a value", token.kind());
            }
        }
    }

    fn attach_and_continue(&mut self, value_index: u32, follow_up: ParserState) {
        self.attach_to_parent(value_index);
        self.state = follow_up;
    }

    fn attach_to_parent(&mut self, value_index: u32) {
        match self.frames.last_mut() {
            Some(frame) => match frame.kind {
                FrameKind::Array => frame.indices.push(value_index),
                FrameKind::Object => {
                    let key_index = frame.pending_key.take().expect("value attached without a pending key");
                    frame.indices.push(key_index);
                    frame.indices.push(value_index);
                }
            },
            None => self.root = Some(value_index),
        }
    }

    fn close_array(&mut self) {
        let frame = self.frames.pop().expect("open array frame");
        let offset = self.indexes.len() as u32;
        let count = frame.indices.len() as u32;
        self.indexes.extend_from_slice(&frame.indices);
        let follow_up = frame.follow_up;
        self.pool.release(frame.indices);
        let idx = self.push_value(RawValue::Array { index_offset: offset, count });
        self.attach_to_parent(idx);
        self.state = follow_up;
    }

    fn close_object(&mut self) {
        let frame = self.frames.pop().expect("open object frame");
        let offset = self.indexes.len() as u32;
        let count = (frame.indices.len() / 2) as u32;
        self.indexes.extend_from_slice(&frame.indices);
        let follow_up = frame.follow_up;
        self.pool.release(frame.indices);
        let idx = self.push_value(RawValue::Object { index_offset: offset, count });
        self.attach_to_parent(idx);
        self.state = follow_up;
    }

    fn push_value(&mut self, raw: RawValue) -> u32 {
        let idx = self.values.len() as u32;
        self.values.push(raw);
        idx
    }

    /// Appends a string token as a new `values[]` cell, for use wherever a
    /// string appears as a value (an array element, an object value, or the
    /// root). Returns the new cell's `values[]` index.
    fn push_string_value(&mut self, token: &Token) -> u32 {
        let string_index = self.intern_string(token);
        self.push_value(RawValue::String { string_index })
    }

    /// Appends a string token as a new, still-borrowed entry in the
    /// parser's string table, without allocating a `values[]` cell for it.
    /// Used for object keys, which `indexes[]` references directly by
    /// `strings[]` index rather than through a value cell. The entry
    /// aliases the tokenizer's buffer until [`Parser::copy_strings`] is
    /// called.
    fn intern_string(&mut self, token: &Token) -> u32 {
        let slice = token.as_string_slice().expect("string token");
        let string_index = self.strings.len() as u32;
        self.strings.push(StringEntry::Borrowed(slice));
        string_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::RawToken;

    fn feed_raw(parser: &mut Parser, raw: RawToken) {
        parser.feed(&Token::new(raw, None));
    }

    #[test]
    fn scalar_root_value() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::Long(7));
        assert!(p.is_done());
        assert_eq!(p.last_parsed_root().unwrap().as_long(), Some(7));
    }

    #[test]
    fn rejects_unexpected_container_closer_at_start() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ArrayEnd);
        assert!(p.is_failed());
        assert_eq!(p.error().unwrap().found, crate::token::TokenKind::ArrayEnd);
    }

    #[test]
    fn reset_allows_parsing_another_top_level_value() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::Long(1));
        assert!(p.is_done());
        p.reset();
        assert_eq!(p.state(), ParserState::Start);
        feed_raw(&mut p, RawToken::Long(2));
        assert!(p.is_done());
        assert_eq!(p.last_parsed_root().unwrap().as_long(), Some(2));
    }

    #[test]
    fn clear_wipes_previously_parsed_data() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::Long(1));
        p.clear();
        assert!(p.last_parsed_root().is_none());
        feed_raw(&mut p, RawToken::Long(9));
        assert_eq!(p.last_parsed_root().unwrap().as_long(), Some(9));
    }

    #[test]
    fn pooled_index_buffers_are_reused_across_containers() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::Long(1));
        feed_raw(&mut p, RawToken::ArrayEnd);
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::Long(2));
        feed_raw(&mut p, RawToken::ArrayEnd);
        feed_raw(&mut p, RawToken::ArrayEnd);
        assert!(p.is_done());
        assert_eq!(p.last_parsed_root().unwrap().len(), 2);
    }

    #[test]
    fn copy_strings_severs_dependency_on_source_buffer() {
        use crate::token::RawToken;
        use std::cell::RefCell;
        use std::rc::Rc;

        let buffer = Rc::new(RefCell::new("hello".encode_utf16().collect::<Vec<_>>()));
        let mut p = Parser::new();
        p.feed(&Token::new(RawToken::String { offset: 0, length: 5 }, Some(buffer.clone())));
        assert!(p.is_done());

        p.copy_strings();
        buffer.borrow_mut().clear();

        assert_eq!(p.last_parsed_root().unwrap().as_str().unwrap(), "hello");
    }

    #[test]
    fn copy_strings_only_copies_each_entry_once() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::Long(1));
        p.copy_strings();
        p.copy_strings();
        assert!(p.is_done());
    }
}
