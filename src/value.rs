// this_file: src/value.rs

//! The parsed value tree: a flat arena of [`RawValue`] cells plus the
//! [`Value`] handle used to walk it.
//!
//! There is no recursive `enum Value { Array(Vec<Value>), ... }` here.
//! Containers don't own their children; they hold a `(offset, length)`
//! range into the parser's `indexes` array, which in turn holds indexes
//! into the parser's flat `values` array. Walking the tree means following
//! index ranges, not dereferencing owned pointers — see
//! [`crate::parser::Parser`] for the arena itself.

use crate::parser::Parser;
use crate::slice::StringSlice;
use std::fmt;

/// The kind of a parsed value, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Long,
    Double,
    String,
    Array,
    Object,
}

/// A value cell in the parser's flat arena.
///
/// As with [`crate::token::RawToken`], this is a plain Rust `enum`: the
/// discriminant-plus-payload layout it compiles to is exactly the compact
/// representation a hand-rolled tagged union would be reaching for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Long(i64),
    Double(f64),
    /// Index into the parser's string table ([`Parser::string_at`]).
    String { string_index: u32 },
    /// `index_offset`/`count` describe a range of `count` child value
    /// indexes starting at `index_offset` in the parser's index arena.
    Array { index_offset: u32, count: u32 },
    /// `index_offset`/`count` describe a range of `count` key/value pairs
    /// in the parser's index arena: `2 * count` entries, alternating a key
    /// value index (always a `String`) and its paired value index.
    Object { index_offset: u32, count: u32 },
}

impl RawValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            RawValue::Null => ValueKind::Null,
            RawValue::Bool(_) => ValueKind::Bool,
            RawValue::Long(_) => ValueKind::Long,
            RawValue::Double(_) => ValueKind::Double,
            RawValue::String { .. } => ValueKind::String,
            RawValue::Array { .. } => ValueKind::Array,
            RawValue::Object { .. } => ValueKind::Object,
        }
    }
}

/// A borrowed view of one value in a [`Parser`]'s tree.
///
/// `Value` never owns or shares ownership of anything: it is a `RawValue`
/// plus a borrow of the [`Parser`] that owns the arena, so the borrow
/// checker — not a reference count — enforces that the tree cannot be
/// mutated (by feeding the parser more tokens) while a `Value` from it is
/// still alive.
#[derive(Clone, Copy)]
pub struct Value<'p> {
    raw: RawValue,
    parser: &'p Parser,
}

/// A string payload, either an object key or a string value.
///
/// A string entry in a [`Parser`]'s string table starts out [`Borrowed`]
/// (aliasing the tokenizer's character buffer through a cloned
/// [`StringSlice`]) and becomes [`Owned`] once
/// [`Parser::copy_strings`] has copied it into the parser's own buffer —
/// the "tagged slice with an owner discriminator" the borrowing-vs-owning
/// split calls for, rather than eagerly copying every string up front.
///
/// [`Borrowed`]: ValueStr::Borrowed
/// [`Owned`]: ValueStr::Owned
#[derive(Clone)]
pub enum ValueStr<'p> {
    /// Borrows directly from the parser's own owned string buffer.
    Owned(&'p [u16]),
    /// Still aliases whatever buffer produced it (typically the
    /// tokenizer's), via a cloned [`StringSlice`].
    Borrowed(StringSlice),
}

impl<'p> ValueStr<'p> {
    pub(crate) fn owned(units: &'p [u16]) -> Self {
        ValueStr::Owned(units)
    }

    pub(crate) fn borrowed(slice: StringSlice) -> Self {
        ValueStr::Borrowed(slice)
    }

    pub fn len(&self) -> usize {
        match self {
            ValueStr::Owned(units) => units.len(),
            ValueStr::Borrowed(slice) => slice.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_string_lossy(&self) -> String {
        match self {
            ValueStr::Owned(units) => String::from_utf16_lossy(units),
            ValueStr::Borrowed(slice) => slice.to_string_lossy(),
        }
    }

    pub fn try_to_string(&self) -> Result<String, crate::slice::UnpairedSurrogate> {
        match self {
            ValueStr::Owned(units) => {
                String::from_utf16(units).map_err(|_| crate::slice::UnpairedSurrogate)
            }
            ValueStr::Borrowed(slice) => slice.try_to_string(),
        }
    }

    pub fn eq_str(&self, other: &str) -> bool {
        match self {
            ValueStr::Owned(units) => {
                let mut theirs = other.encode_utf16();
                for &unit in units.iter() {
                    match theirs.next() {
                        Some(u) if u == unit => {}
                        _ => return false,
                    }
                }
                theirs.next().is_none()
            }
            ValueStr::Borrowed(slice) => slice.eq_str(other),
        }
    }
}

impl PartialEq for ValueStr<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.to_string_lossy() == other.to_string_lossy()
    }
}
impl Eq for ValueStr<'_> {}

impl PartialEq<str> for ValueStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}
impl PartialEq<&str> for ValueStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(other)
    }
}

impl fmt::Debug for ValueStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueStr({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for ValueStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

impl<'p> Value<'p> {
    pub(crate) fn new(raw: RawValue, parser: &'p Parser) -> Self {
        Value { raw, parser }
    }

    /// The raw, arena-independent payload of this value.
    pub fn raw(&self) -> RawValue {
        self.raw
    }

    pub fn kind(&self) -> ValueKind {
        self.raw.kind()
    }

    pub fn as_null(&self) -> Option<()> {
        matches!(self.raw, RawValue::Null).then_some(())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.raw {
            RawValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self.raw {
            RawValue::Long(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.raw {
            RawValue::Double(n) => Some(n),
            _ => None,
        }
    }

    /// This value's string payload, or `None` if it is not a string.
    pub fn as_str(&self) -> Option<ValueStr<'p>> {
        match self.raw {
            RawValue::String { string_index } => Some(self.parser.string_at(string_index)),
            _ => None,
        }
    }

    /// True if this value is an array or an object.
    pub fn is_container(&self) -> bool {
        matches!(self.raw, RawValue::Array { .. } | RawValue::Object { .. })
    }

    /// Number of elements (array) or key/value pairs (object). `0` for any
    /// scalar value.
    pub fn len(&self) -> usize {
        match self.raw {
            RawValue::Array { count, .. } | RawValue::Object { count, .. } => count as usize,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th element: for an array, the element itself; for an
    /// object, the `index`-th pair's *value* (not its key). `None` if this
    /// is not a container or `index` is out of bounds.
    pub fn get(&self, index: usize) -> Option<Value<'p>> {
        match self.raw {
            RawValue::Array { index_offset, count } if (index as u32) < count => {
                let value_index = self.parser.index_at(index_offset + index as u32);
                Some(self.parser.value_at(value_index))
            }
            RawValue::Object { index_offset, count } if (index as u32) < count => {
                let value_index = self.parser.index_at(index_offset + 2 * index as u32 + 1);
                Some(self.parser.value_at(value_index))
            }
            _ => None,
        }
    }

    /// Like [`Value::get`], but returns a [`crate::error::ValueError`]
    /// naming the mismatch instead of `None`: [`crate::error::ValueError::WrongKind`]
    /// if this is not a container, [`crate::error::ValueError::IndexOutOfBounds`]
    /// if `index` is out of range.
    pub fn expect_get(&self, index: usize) -> Result<Value<'p>, crate::error::ValueError> {
        match self.raw {
            RawValue::Array { count, .. } | RawValue::Object { count, .. } => {
                self.get(index).ok_or(crate::error::ValueError::IndexOutOfBounds {
                    index,
                    len: count as usize,
                })
            }
            _ => Err(crate::error::ValueError::WrongKind {
                expected: ValueKind::Array,
                found: self.kind(),
            }),
        }
    }

    /// Iterates over an array's elements, in order. Empty for anything that
    /// is not an array.
    pub fn iter(&self) -> ValueIter<'p> {
        let (index_offset, count) = match self.raw {
            RawValue::Array { index_offset, count } => (index_offset, count),
            _ => (0, 0),
        };
        ValueIter {
            parser: self.parser,
            index_offset,
            remaining: count,
            next: 0,
        }
    }

    /// Iterates over an object's keys, in insertion order (duplicate keys
    /// are not deduplicated). Empty for anything that is not an object.
    pub fn keys(&self) -> KeyIter<'p> {
        let (index_offset, count) = match self.raw {
            RawValue::Object { index_offset, count } => (index_offset, count),
            _ => (0, 0),
        };
        KeyIter {
            parser: self.parser,
            index_offset,
            remaining: count,
            next: 0,
        }
    }

    /// Iterates over an object's key/value pairs, in insertion order. Empty
    /// for anything that is not an object.
    pub fn entries(&self) -> EntryIter<'p> {
        let (index_offset, count) = match self.raw {
            RawValue::Object { index_offset, count } => (index_offset, count),
            _ => (0, 0),
        };
        EntryIter {
            parser: self.parser,
            index_offset,
            remaining: count,
            next: 0,
        }
    }

    /// The value of the first key/value pair whose key equals `key`. `None`
    /// if this is not an object or no pair matches. When an object carries
    /// a duplicate key (JSON permits it; this engine does not deduplicate),
    /// this returns the first occurrence.
    pub fn get_key(&self, key: &str) -> Option<Value<'p>> {
        self.entries().find(|(k, _)| k.eq_str(key)).map(|(_, v)| v)
    }

    /// Like [`Value::as_bool`], but returns a [`crate::error::ValueError`]
    /// naming the mismatch instead of `None`.
    pub fn expect_bool(&self) -> Result<bool, crate::error::ValueError> {
        self.as_bool().ok_or(crate::error::ValueError::WrongKind {
            expected: ValueKind::Bool,
            found: self.kind(),
        })
    }

    /// Like [`Value::as_long`], but returns a [`crate::error::ValueError`]
    /// naming the mismatch instead of `None`.
    pub fn expect_long(&self) -> Result<i64, crate::error::ValueError> {
        self.as_long().ok_or(crate::error::ValueError::WrongKind {
            expected: ValueKind::Long,
            found: self.kind(),
        })
    }

    /// Like [`Value::as_double`], but returns a [`crate::error::ValueError`]
    /// naming the mismatch instead of `None`.
    pub fn expect_double(&self) -> Result<f64, crate::error::ValueError> {
        self.as_double().ok_or(crate::error::ValueError::WrongKind {
            expected: ValueKind::Double,
            found: self.kind(),
        })
    }

    /// Like [`Value::as_str`], but returns a [`crate::error::ValueError`]
    /// naming the mismatch instead of `None`.
    pub fn expect_str(&self) -> Result<ValueStr<'p>, crate::error::ValueError> {
        self.as_str().ok_or(crate::error::ValueError::WrongKind {
            expected: ValueKind::String,
            found: self.kind(),
        })
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.raw {
            RawValue::Null => write!(f, "Null"),
            RawValue::Bool(b) => write!(f, "Bool({b})"),
            RawValue::Long(n) => write!(f, "Long({n})"),
            RawValue::Double(n) => write!(f, "Double({n})"),
            RawValue::String { .. } => write!(f, "String({:?})", self.as_str().unwrap().to_string_lossy()),
            RawValue::Array { count, .. } => write!(f, "Array[{count}]"),
            RawValue::Object { count, .. } => write!(f, "Object[{count}]"),
        }
    }
}

/// Iterator over an array's elements, returned by [`Value::iter`].
pub struct ValueIter<'p> {
    parser: &'p Parser,
    index_offset: u32,
    remaining: u32,
    next: u32,
}

impl<'p> Iterator for ValueIter<'p> {
    type Item = Value<'p>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.remaining {
            return None;
        }
        let value_index = self.parser.index_at(self.index_offset + self.next);
        self.next += 1;
        Some(self.parser.value_at(value_index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.remaining - self.next) as usize;
        (left, Some(left))
    }
}

/// Iterator over an object's keys, returned by [`Value::keys`].
pub struct KeyIter<'p> {
    parser: &'p Parser,
    index_offset: u32,
    remaining: u32,
    next: u32,
}

impl<'p> Iterator for KeyIter<'p> {
    type Item = ValueStr<'p>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.remaining {
            return None;
        }
        let key_index = self.parser.index_at(self.index_offset + self.next * 2);
        self.next += 1;
        Some(self.parser.string_at(key_index))
    }
}

/// Iterator over an object's key/value pairs, returned by [`Value::entries`].
pub struct EntryIter<'p> {
    parser: &'p Parser,
    index_offset: u32,
    remaining: u32,
    next: u32,
}

impl<'p> Iterator for EntryIter<'p> {
    type Item = (ValueStr<'p>, Value<'p>);
    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.remaining {
            return None;
        }
        let base = self.index_offset + self.next * 2;
        let key_index = self.parser.index_at(base);
        let value_index = self.parser.index_at(base + 1);
        self.next += 1;
        let key = self.parser.string_at(key_index);
        Some((key, self.parser.value_at(value_index)))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::token::{RawToken, Token};

    fn feed_raw(parser: &mut Parser, raw: RawToken) {
        parser.feed(&Token::new(raw, None));
    }

    fn string_token(s: &str) -> Token {
        use std::cell::RefCell;
        use std::rc::Rc;
        let buf = Rc::new(RefCell::new(s.encode_utf16().collect::<Vec<_>>()));
        let len = buf.borrow().len() as u32;
        Token::new(RawToken::String { offset: 0, length: len }, Some(buf))
    }

    #[test]
    fn array_of_scalars() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::Long(1));
        feed_raw(&mut p, RawToken::Long(2));
        feed_raw(&mut p, RawToken::Bool(true));
        feed_raw(&mut p, RawToken::ArrayEnd);
        assert!(p.is_done());

        let root = p.last_parsed_root().unwrap();
        assert_eq!(root.len(), 3);
        assert_eq!(root.get(0).unwrap().as_long(), Some(1));
        assert_eq!(root.get(2).unwrap().as_bool(), Some(true));
        assert!(root.get(3).is_none());

        let collected: Vec<_> = root.iter().map(|v| v.kind()).collect();
        use crate::value::ValueKind::*;
        assert_eq!(collected, vec![Long, Long, Bool]);
    }

    #[test]
    fn object_with_string_key() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ObjectBegin);
        p.feed(&string_token("name"));
        p.feed(&string_token("ada"));
        feed_raw(&mut p, RawToken::ObjectEnd);
        assert!(p.is_done());

        let root = p.last_parsed_root().unwrap();
        assert_eq!(root.len(), 1);
        let value = root.get_key("name").unwrap();
        assert_eq!(value.as_str().unwrap(), "ada");
        assert!(root.get_key("missing").is_none());
    }

    #[test]
    fn nested_array_in_object() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ObjectBegin);
        p.feed(&string_token("values"));
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::Long(1));
        feed_raw(&mut p, RawToken::Long(2));
        feed_raw(&mut p, RawToken::ArrayEnd);
        feed_raw(&mut p, RawToken::ObjectEnd);

        let root = p.last_parsed_root().unwrap();
        let values = root.get_key("values").unwrap();
        assert_eq!(values.kind(), crate::value::ValueKind::Array);
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn duplicate_keys_preserved_in_order() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ObjectBegin);
        p.feed(&string_token("k"));
        feed_raw(&mut p, RawToken::Long(1));
        p.feed(&string_token("k"));
        feed_raw(&mut p, RawToken::Long(2));
        feed_raw(&mut p, RawToken::ObjectEnd);

        let root = p.last_parsed_root().unwrap();
        let entries: Vec<_> = root.entries().map(|(_, v)| v.as_long().unwrap()).collect();
        assert_eq!(entries, vec![1, 2]);
        assert_eq!(root.get_key("k").unwrap().as_long(), Some(1));
    }

    #[test]
    fn positional_get_on_object_returns_ith_value() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ObjectBegin);
        p.feed(&string_token("a"));
        feed_raw(&mut p, RawToken::Long(1));
        p.feed(&string_token("b"));
        feed_raw(&mut p, RawToken::Bool(true));
        feed_raw(&mut p, RawToken::ObjectEnd);

        let root = p.last_parsed_root().unwrap();
        assert_eq!(root.get(0).unwrap().as_long(), Some(1));
        assert_eq!(root.get(1).unwrap().as_bool(), Some(true));
        assert!(root.get(2).is_none());
    }

    #[test]
    fn object_keys_do_not_consume_a_values_arena_slot() {
        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ObjectBegin);
        p.feed(&string_token("k"));
        feed_raw(&mut p, RawToken::Long(1));
        feed_raw(&mut p, RawToken::ObjectEnd);

        // One cell for the object itself, one for its value; the key lives
        // only in the string table, not in `values[]`.
        assert_eq!(p.values_len(), 2);
    }

    #[test]
    fn expect_get_distinguishes_bounds_from_wrong_kind() {
        use crate::error::ValueError;

        let mut p = Parser::new();
        feed_raw(&mut p, RawToken::ArrayBegin);
        feed_raw(&mut p, RawToken::Long(1));
        feed_raw(&mut p, RawToken::ArrayEnd);
        let root = p.last_parsed_root().unwrap();

        assert_eq!(root.expect_get(0).unwrap().as_long(), Some(1));
        assert_eq!(
            root.expect_get(1).unwrap_err(),
            ValueError::IndexOutOfBounds { index: 1, len: 1 }
        );

        let mut scalar = Parser::new();
        feed_raw(&mut scalar, RawToken::Long(7));
        let err = scalar.last_parsed_root().unwrap().expect_get(0).unwrap_err();
        assert!(matches!(err, ValueError::WrongKind { .. }));
    }
}
