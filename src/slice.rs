// this_file: src/slice.rs

//! A view into a shared, ref-counted UTF-16 character buffer.
//!
//! [`StringSlice`] is the currency the [`crate::tokenizer::Tokenizer`] and
//! [`crate::parser::Parser`] pass around instead of allocating a `String` for
//! every key and string value they see. It never owns its characters
//! outright; it borrows a range of a [`CharBuffer`] that something else
//! keeps alive.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// A growable buffer of UTF-16 code units shared between a [`StringSlice`]
/// and whatever owns its storage (a [`crate::tokenizer::Tokenizer`], or a
/// [`crate::parser::Parser`] after
/// [`Parser::copy_strings`](crate::parser::Parser::copy_strings)).
///
/// The engine is single-threaded and non-suspending (there is no internal
/// scheduler and no I/O anywhere in it), so `Rc<RefCell<_>>` — rather than
/// `Arc<Mutex<_>>` — is the right tool here: what needs managing is aliasing
/// between a handful of owners, not concurrent access.
pub type CharBuffer = Rc<RefCell<Vec<u16>>>;

/// A `{buffer, start, length}` view into a [`CharBuffer`].
///
/// Two slices (or a slice and a `&str`) compare equal by code unit, not by
/// identity of the underlying buffer, so slices from different buffers (or
/// from the same buffer at different points in time) still compare
/// correctly.
#[derive(Clone)]
pub struct StringSlice {
    buffer: CharBuffer,
    start: usize,
    length: usize,
}

/// Error returned when a [`StringSlice`] cannot be losslessly converted to a
/// Rust `String`.
///
/// This only happens when the slice contains an unpaired UTF-16 surrogate —
/// the one case where this engine's native `u16` text representation, kept
/// to preserve the source's non-combining surrogate-pair behavior, cannot be
/// expressed as valid UTF-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("string slice contains an unpaired UTF-16 surrogate and cannot be converted losslessly")]
pub struct UnpairedSurrogate;

impl StringSlice {
    /// Creates a slice over `[start, start + length)` of `buffer`.
    pub fn new(buffer: CharBuffer, start: usize, length: usize) -> Self {
        StringSlice {
            buffer,
            start,
            length,
        }
    }

    /// Number of UTF-16 code units covered by this slice.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.length
    }

    /// True if the slice covers zero code units.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Copies out the code units this slice covers.
    pub fn units(&self) -> Vec<u16> {
        let buf = self.buffer.borrow();
        buf[self.start..self.start + self.length].to_vec()
    }

    /// Converts the slice to an owned `String`, replacing any UTF-16
    /// sequence that is not valid text (an unpaired surrogate) with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.units())
    }

    /// Converts the slice to an owned `String`, failing rather than
    /// silently substituting if it contains an unpaired surrogate.
    pub fn try_to_string(&self) -> Result<String, UnpairedSurrogate> {
        String::from_utf16(&self.units()).map_err(|_| UnpairedSurrogate)
    }

    /// Compares this slice's code units against another slice's, without
    /// allocating.
    pub fn eq_slice(&self, other: &StringSlice) -> bool {
        if self.length != other.length {
            return false;
        }
        let a = self.buffer.borrow();
        let b = other.buffer.borrow();
        a[self.start..self.start + self.length] == b[other.start..other.start + other.length]
    }

    /// Compares this slice's code units against a native `&str`'s UTF-16
    /// encoding, without allocating a `String` for either side.
    pub fn eq_str(&self, other: &str) -> bool {
        let buf = self.buffer.borrow();
        let mine = &buf[self.start..self.start + self.length];
        let mut theirs = other.encode_utf16();
        for &unit in mine {
            match theirs.next() {
                Some(u) if u == unit => {}
                _ => return false,
            }
        }
        theirs.next().is_none()
    }
}

impl PartialEq for StringSlice {
    fn eq(&self, other: &StringSlice) -> bool {
        self.eq_slice(other)
    }
}
impl Eq for StringSlice {}

impl PartialEq<str> for StringSlice {
    fn eq(&self, other: &str) -> bool {
        self.eq_str(other)
    }
}

impl PartialEq<&str> for StringSlice {
    fn eq(&self, other: &&str) -> bool {
        self.eq_str(other)
    }
}

impl Hash for StringSlice {
    /// Hashes the slice's materialized code units, not its buffer identity
    /// or position, so that two equal slices always hash equally even when
    /// backed by different buffers. Callers that mutate the backing buffer
    /// out from under a live `StringSlice` (e.g. via
    /// [`crate::tokenizer::Tokenizer::reset`]) should not expect a stable
    /// hash across that mutation.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let buf = self.buffer.borrow();
        buf[self.start..self.start + self.length].hash(state);
    }
}

impl fmt::Debug for StringSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringSlice({:?})", self.to_string_lossy())
    }
}

impl fmt::Display for StringSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_from(s: &str) -> CharBuffer {
        Rc::new(RefCell::new(s.encode_utf16().collect()))
    }

    #[test]
    fn slice_equals_native_str() {
        let buf = buffer_from("hello world");
        let slice = StringSlice::new(buf, 0, 5);
        assert_eq!(slice, "hello");
        assert_ne!(slice, "hellx");
    }

    #[test]
    fn slice_equals_slice_from_different_buffer() {
        let a = StringSlice::new(buffer_from("abcdef"), 1, 3);
        let b = StringSlice::new(buffer_from("xbcdy"), 1, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn lossy_conversion_substitutes_unpaired_surrogate() {
        let buf: CharBuffer = Rc::new(RefCell::new(vec![0xD800]));
        let slice = StringSlice::new(buf, 0, 1);
        assert_eq!(slice.to_string_lossy(), "\u{FFFD}");
        assert!(slice.try_to_string().is_err());
    }

    #[test]
    fn round_trips_well_formed_text() {
        let buf = buffer_from("caf\u{e9}");
        let slice = StringSlice::new(buf, 0, 4);
        assert_eq!(slice.try_to_string().unwrap(), "caf\u{e9}");
    }

    #[test]
    fn hash_matches_for_equal_slices_in_different_buffers() {
        use std::collections::hash_map::DefaultHasher;
        let a = StringSlice::new(buffer_from("key"), 0, 3);
        let b = StringSlice::new(buffer_from("key"), 0, 3);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn empty_slice() {
        let slice = StringSlice::new(buffer_from(""), 0, 0);
        assert!(slice.is_empty());
        assert_eq!(slice.to_string_lossy(), "");
    }
}
