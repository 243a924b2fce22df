// this_file: src/tokenizer/mod.rs

//! A push-fed, character-by-character JSON tokenizer.
//!
//! Unlike a conventional lexer that pulls its next character from a slice it
//! already holds in full, this one is driven from the outside: callers feed
//! it one UTF-16 code unit (or a whole string) at a time with [`feed`], and
//! it accumulates [`RawToken`]s as it goes. This lets a caller stream input
//! from a socket or a file in arbitrarily small chunks without the
//! tokenizer ever needing to see the whole document at once.
//!
//! [`feed`]: Tokenizer::feed

mod error;
mod state;

pub use error::TokenizerError;
pub use state::State;

use crate::slice::CharBuffer;
use crate::token::{RawToken, Token};
use std::cell::RefCell;
use std::rc::Rc;

const SPACE: u16 = 0x20;
const TAB: u16 = 0x09;
const LF: u16 = 0x0A;
const VT: u16 = 0x0B;
const FF: u16 = 0x0C;
const CR: u16 = 0x0D;

const LBRACKET: u16 = b'[' as u16;
const RBRACKET: u16 = b']' as u16;
const LBRACE: u16 = b'{' as u16;
const RBRACE: u16 = b'}' as u16;
const COMMA: u16 = b',' as u16;
const COLON: u16 = b':' as u16;
const DQUOTE: u16 = b'"' as u16;
const BACKSLASH: u16 = b'\\' as u16;
const SLASH: u16 = b'/' as u16;
const MINUS: u16 = b'-' as u16;
const PLUS: u16 = b'+' as u16;
const DOT: u16 = b'.' as u16;
const ZERO: u16 = b'0' as u16;
const LOWER_A: u16 = b'a' as u16;
const LOWER_B: u16 = b'b' as u16;
const LOWER_E: u16 = b'e' as u16;
const UPPER_E: u16 = b'E' as u16;
const LOWER_F: u16 = b'f' as u16;
const LOWER_L: u16 = b'l' as u16;
const LOWER_N: u16 = b'n' as u16;
const LOWER_R: u16 = b'r' as u16;
const LOWER_S: u16 = b's' as u16;
const LOWER_T: u16 = b't' as u16;
const LOWER_U: u16 = b'u' as u16;

#[inline(always)]
fn is_ws(u: u16) -> bool {
    matches!(u, SPACE | TAB | LF | VT | FF | CR)
}

#[inline(always)]
fn is_digit(u: u16) -> bool {
    (ZERO..=(b'9' as u16)).contains(&u)
}

#[inline(always)]
fn digit_value(u: u16) -> i64 {
    (u - ZERO) as i64
}

#[inline(always)]
fn hex_value(u: u16) -> Option<u16> {
    match u {
        0x30..=0x39 => Some(u - 0x30),
        0x41..=0x46 => Some(u - 0x41 + 10),
        0x61..=0x66 => Some(u - 0x61 + 10),
        _ => None,
    }
}

/// A push-fed JSON tokenizer producing a growable stream of [`RawToken`]s.
///
/// Construct with [`Tokenizer::new`], feed text with [`Tokenizer::feed`] /
/// [`Tokenizer::feed_str`], call [`Tokenizer::finish`] once the input is
/// exhausted, then read tokens with [`Tokenizer::token`] or
/// [`Tokenizer::tokens`].
pub struct Tokenizer {
    buffer: CharBuffer,
    string_start: usize,
    tokens: Vec<RawToken>,
    state: State,
    return_stack: Vec<State>,
    position: usize,
    last_unit: Option<u16>,
    error: Option<TokenizerError>,

    num_sign: i64,
    num_whole: i64,
    has_frac: bool,
    num_frac: i64,
    num_frac_divisor: f64,
    has_exp: bool,
    num_exp_sign: i64,
    num_exp_sign_consumed: bool,
    num_exp: i64,

    hex_value: u16,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Creates a tokenizer in the initial [`State::Start`] state with an
    /// empty buffer.
    pub fn new() -> Self {
        Tokenizer {
            buffer: Rc::new(RefCell::new(Vec::new())),
            string_start: 0,
            tokens: Vec::new(),
            state: State::Start,
            return_stack: Vec::new(),
            position: 0,
            last_unit: None,
            error: None,
            num_sign: 1,
            num_whole: 0,
            has_frac: false,
            num_frac: 0,
            num_frac_divisor: 1.0,
            has_exp: false,
            num_exp_sign: 1,
            num_exp_sign_consumed: false,
            num_exp: 0,
            hex_value: 0,
        }
    }

    /// The tokenizer's current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// True once a complete top-level value has been tokenized.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// True once the tokenizer has rejected the input.
    pub fn is_failed(&self) -> bool {
        self.state == State::Error
    }

    /// True while still accepting input (neither done nor failed).
    pub fn is_tokenizing(&self) -> bool {
        !self.state.is_terminal()
    }

    /// The failure, if any. Only meaningful once [`Tokenizer::is_failed`]
    /// is true.
    pub fn error(&self) -> Option<&TokenizerError> {
        self.error.as_ref()
    }

    /// [`Tokenizer::error`] rendered as a human-readable message.
    pub fn error_string(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Number of tokens emitted so far.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if no tokens have been emitted yet.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The token at `index`, resolving any string payload against the
    /// tokenizer's buffer.
    pub fn token(&self, index: usize) -> Token {
        let raw = self.tokens[index];
        let buffer = matches!(raw, RawToken::String { .. }).then(|| self.buffer.clone());
        Token::new(raw, buffer)
    }

    /// Iterates over every token emitted so far, in order.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        (0..self.len()).map(move |i| self.token(i))
    }

    /// Feeds a single UTF-16 code unit.
    ///
    /// A no-op once the tokenizer is done or has failed.
    pub fn feed(&mut self, unit: u16) {
        if self.state.is_terminal() {
            return;
        }
        let pos = self.position;
        self.position += 1;
        let mut current = Some(unit);
        while let Some(u) = current {
            current = self.step(u, pos);
        }
        self.last_unit = Some(unit);
    }

    /// Feeds every UTF-16 code unit of `s`, stopping early if the tokenizer
    /// becomes done or failed partway through.
    pub fn feed_str(&mut self, s: &str) {
        for unit in s.encode_utf16() {
            if self.state.is_terminal() {
                break;
            }
            self.feed(unit);
        }
    }

    /// Feeds a single Rust `char`, encoding it to one or two UTF-16 code
    /// units first.
    pub fn feed_char(&mut self, c: char) {
        let mut buf = [0u16; 2];
        for &unit in c.encode_utf16(&mut buf).iter() {
            if self.state.is_terminal() {
                break;
            }
            self.feed(unit);
        }
    }

    /// Signals end of input.
    ///
    /// A top-level number has no following terminator character to force
    /// its emission (e.g. feeding just `"123"` leaves the tokenizer
    /// mid-number), so `finish` treats genuine end of input as the final
    /// terminator. Called while the tokenizer is waiting on more input
    /// (an unclosed string, container, or incomplete literal), it fails
    /// with an unexpected-end-of-input error.
    pub fn finish(&mut self) {
        let pos = self.position;
        match self.state {
            State::Done | State::Error => {}
            State::NumZero | State::NumWhole | State::NumFrac | State::NumExp => {
                self.emit_number();
                self.state = self.pop_return();
                // A trailing top-level number resolves straight to `Done`.
                // One still inside an unclosed array/object only resolves
                // to that container's comma state, which is itself an
                // unexpected end of input.
                if self.state != State::Done {
                    self.fail(pos, None, "unexpected end of input");
                }
            }
            _ => self.fail(pos, None, "unexpected end of input"),
        }
    }

    /// Clears emitted tokens, preserving the in-progress parse position. If
    /// a string is mid-flight, its already-accumulated prefix is compacted
    /// to the head of the buffer so it continues to resolve correctly;
    /// [`Token`]s and [`crate::slice::StringSlice`]s obtained before this
    /// call must not be used afterwards.
    pub fn reset(&mut self) {
        self.tokens.clear();
        let mut buf = self.buffer.borrow_mut();
        if self.state.is_in_string() {
            let len = buf.len();
            buf.copy_within(self.string_start..len, 0);
            buf.truncate(len - self.string_start);
        } else {
            buf.clear();
        }
        self.string_start = 0;
    }

    /// Returns the tokenizer to its freshly constructed state.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.buffer.borrow_mut().clear();
        self.string_start = 0;
        self.state = State::Start;
        self.return_stack.clear();
        self.position = 0;
        self.last_unit = None;
        self.error = None;
        self.reset_number(1);
    }

    fn reset_number(&mut self, sign: i64) {
        self.num_sign = sign;
        self.num_whole = 0;
        self.has_frac = false;
        self.num_frac = 0;
        self.num_frac_divisor = 1.0;
        self.has_exp = false;
        self.num_exp_sign = 1;
        self.num_exp_sign_consumed = false;
        self.num_exp = 0;
    }

    fn emit(&mut self, raw: RawToken) {
        self.tokens.push(raw);
    }

    fn pop_return(&mut self) -> State {
        self.return_stack.pop().unwrap_or(State::Done)
    }

    fn fail(&mut self, pos: usize, failed: Option<u16>, reason: &'static str) {
        self.error = Some(TokenizerError {
            position: pos,
            failed_unit: failed,
            last_unit: self.last_unit,
            reason,
        });
        self.state = State::Error;
    }

    fn begin_string(&mut self) {
        self.string_start = self.buffer.borrow().len();
        self.state = State::StringChar;
    }

    fn finish_string(&mut self) {
        let start = self.string_start;
        let len = self.buffer.borrow().len() - start;
        self.emit(RawToken::String {
            offset: start as u32,
            length: len as u32,
        });
        self.string_start += len;
        self.state = self.pop_return();
    }

    fn emit_number(&mut self) {
        let raw = if !self.has_frac && !self.has_exp {
            RawToken::Long(self.num_sign * self.num_whole)
        } else {
            let frac = if self.has_frac {
                self.num_frac as f64 / self.num_frac_divisor
            } else {
                0.0
            };
            let mantissa = self.num_sign as f64 * (self.num_whole as f64 + frac);
            let exp = if self.has_exp {
                self.num_exp_sign * self.num_exp
            } else {
                0
            };
            RawToken::Double(mantissa * 10f64.powi(exp as i32))
        };
        self.emit(raw);
    }

    /// Advances one state transition for `unit`, originally fed at `pos`.
    /// Returns `Some(unit)` when the same unit must be re-dispatched into a
    /// newly entered state (used only when a number's terminator character
    /// belongs to the enclosing context).
    fn step(&mut self, unit: u16, pos: usize) -> Option<u16> {
        match self.state {
            State::Done | State::Error => None,

            State::Start => self.dispatch_value(unit, pos, State::Done),
            State::ArrayValue => {
                if unit == RBRACKET {
                    self.emit(RawToken::ArrayEnd);
                    self.state = self.pop_return();
                    None
                } else {
                    self.dispatch_value(unit, pos, State::ArrayComma)
                }
            }
            State::ArrayComma => {
                if is_ws(unit) {
                    None
                } else if unit == RBRACKET {
                    self.emit(RawToken::ArrayEnd);
                    self.state = self.pop_return();
                    None
                } else if unit == COMMA {
                    self.state = State::ArrayValue;
                    None
                } else {
                    self.fail(pos, Some(unit), "expected ',' or ']'");
                    None
                }
            }
            State::ObjectKey => {
                if is_ws(unit) {
                    None
                } else if unit == RBRACE {
                    self.emit(RawToken::ObjectEnd);
                    self.state = self.pop_return();
                    None
                } else if unit == DQUOTE {
                    self.return_stack.push(State::ObjectColon);
                    self.begin_string();
                    None
                } else {
                    self.fail(pos, Some(unit), "expected '\"' or '}'");
                    None
                }
            }
            State::ObjectColon => {
                if is_ws(unit) {
                    None
                } else if unit == COLON {
                    self.state = State::ObjectValue;
                    None
                } else {
                    self.fail(pos, Some(unit), "expected ':'");
                    None
                }
            }
            State::ObjectValue => self.dispatch_value(unit, pos, State::ObjectComma),
            State::ObjectComma => {
                if is_ws(unit) {
                    None
                } else if unit == RBRACE {
                    self.emit(RawToken::ObjectEnd);
                    self.state = self.pop_return();
                    None
                } else if unit == COMMA {
                    self.state = State::ObjectKey;
                    None
                } else {
                    self.fail(pos, Some(unit), "expected ',' or '}'");
                    None
                }
            }

            State::StringChar => {
                if unit == DQUOTE {
                    self.finish_string();
                } else if unit == BACKSLASH {
                    self.state = State::StringEscape;
                } else if unit < SPACE {
                    self.fail(pos, Some(unit), "control character in string");
                } else {
                    self.buffer.borrow_mut().push(unit);
                }
                None
            }
            State::StringEscape => {
                let mapped = match unit {
                    DQUOTE => Some(0x22),
                    BACKSLASH => Some(0x5C),
                    SLASH => Some(0x2F),
                    LOWER_B => Some(0x08),
                    LOWER_F => Some(0x0C),
                    LOWER_N => Some(0x0A),
                    LOWER_R => Some(0x0D),
                    LOWER_T => Some(0x09),
                    _ => None,
                };
                if let Some(replacement) = mapped {
                    self.buffer.borrow_mut().push(replacement);
                    self.state = State::StringChar;
                } else if unit == LOWER_U {
                    self.hex_value = 0;
                    self.state = State::StringU1;
                } else {
                    self.fail(pos, Some(unit), "invalid escape sequence");
                }
                None
            }
            State::StringU1 | State::StringU2 | State::StringU3 | State::StringU4 => {
                match hex_value(unit) {
                    Some(v) => {
                        self.hex_value = self.hex_value * 16 + v;
                        self.state = match self.state {
                            State::StringU1 => State::StringU2,
                            State::StringU2 => State::StringU3,
                            State::StringU3 => State::StringU4,
                            State::StringU4 => {
                                self.buffer.borrow_mut().push(self.hex_value);
                                State::StringChar
                            }
                            _ => unreachable!(),
                        };
                    }
                    None => self.fail(pos, Some(unit), "invalid unicode escape"),
                }
                None
            }

            State::NumMinus => {
                if unit == ZERO {
                    self.state = State::NumZero;
                } else if is_digit(unit) {
                    self.num_whole = digit_value(unit);
                    self.state = State::NumWhole;
                } else {
                    self.fail(pos, Some(unit), "invalid number");
                }
                None
            }
            State::NumZero => {
                if unit == DOT {
                    self.has_frac = true;
                    self.state = State::NumFrac0;
                    None
                } else if unit == LOWER_E || unit == UPPER_E {
                    self.has_exp = true;
                    self.num_exp_sign_consumed = false;
                    self.state = State::NumExp0;
                    None
                } else if is_digit(unit) {
                    self.fail(pos, Some(unit), "leading zeros are not allowed");
                    None
                } else {
                    self.emit_number();
                    self.state = self.pop_return();
                    Some(unit)
                }
            }
            State::NumWhole => {
                if is_digit(unit) {
                    self.num_whole = self.num_whole * 10 + digit_value(unit);
                    None
                } else if unit == DOT {
                    self.has_frac = true;
                    self.state = State::NumFrac0;
                    None
                } else if unit == LOWER_E || unit == UPPER_E {
                    self.has_exp = true;
                    self.num_exp_sign_consumed = false;
                    self.state = State::NumExp0;
                    None
                } else {
                    self.emit_number();
                    self.state = self.pop_return();
                    Some(unit)
                }
            }
            State::NumFrac0 => {
                if is_digit(unit) {
                    self.num_frac = digit_value(unit);
                    self.num_frac_divisor = 10.0;
                    self.state = State::NumFrac;
                } else {
                    self.fail(pos, Some(unit), "invalid number: expected a digit after '.'");
                }
                None
            }
            State::NumFrac => {
                if is_digit(unit) {
                    self.num_frac = self.num_frac * 10 + digit_value(unit);
                    self.num_frac_divisor *= 10.0;
                    None
                } else if unit == LOWER_E || unit == UPPER_E {
                    self.has_exp = true;
                    self.num_exp_sign_consumed = false;
                    self.state = State::NumExp0;
                    None
                } else {
                    self.emit_number();
                    self.state = self.pop_return();
                    Some(unit)
                }
            }
            State::NumExp0 => {
                if (unit == PLUS || unit == MINUS) && !self.num_exp_sign_consumed {
                    self.num_exp_sign = if unit == MINUS { -1 } else { 1 };
                    self.num_exp_sign_consumed = true;
                } else if is_digit(unit) {
                    self.num_exp = digit_value(unit);
                    self.state = State::NumExp;
                } else {
                    self.fail(pos, Some(unit), "invalid number: expected an exponent digit");
                }
                None
            }
            State::NumExp => {
                if is_digit(unit) {
                    self.num_exp = self.num_exp * 10 + digit_value(unit);
                    None
                } else {
                    self.emit_number();
                    self.state = self.pop_return();
                    Some(unit)
                }
            }

            State::N => self.advance_literal(unit, pos, LOWER_U, State::Nu),
            State::Nu => self.advance_literal(unit, pos, LOWER_L, State::Nul),
            State::Nul => {
                if unit == LOWER_L {
                    self.emit(RawToken::Null);
                    self.state = self.pop_return();
                } else {
                    self.fail(pos, Some(unit), "invalid literal, expected 'null'");
                }
                None
            }
            State::T => self.advance_literal(unit, pos, LOWER_R, State::Tr),
            State::Tr => self.advance_literal(unit, pos, LOWER_U, State::Tru),
            State::Tru => {
                if unit == LOWER_E {
                    self.emit(RawToken::Bool(true));
                    self.state = self.pop_return();
                } else {
                    self.fail(pos, Some(unit), "invalid literal, expected 'true'");
                }
                None
            }
            State::F => self.advance_literal(unit, pos, LOWER_A, State::Fa),
            State::Fa => self.advance_literal(unit, pos, LOWER_L, State::Fal),
            State::Fal => self.advance_literal(unit, pos, LOWER_S, State::Fals),
            State::Fals => {
                if unit == LOWER_E {
                    self.emit(RawToken::Bool(false));
                    self.state = self.pop_return();
                } else {
                    self.fail(pos, Some(unit), "invalid literal, expected 'false'");
                }
                None
            }
        }
    }

    fn advance_literal(&mut self, unit: u16, pos: usize, expect: u16, next: State) -> Option<u16> {
        if unit == expect {
            self.state = next;
        } else {
            self.fail(pos, Some(unit), "invalid literal");
        }
        None
    }

    /// Handles whitespace and the start of every value kind; used wherever
    /// a value is expected (`Start`, `ArrayValue`, `ObjectValue`).
    fn dispatch_value(&mut self, unit: u16, pos: usize, follow_up: State) -> Option<u16> {
        if is_ws(unit) {
            return None;
        }
        match unit {
            LBRACKET => {
                self.return_stack.push(follow_up);
                self.emit(RawToken::ArrayBegin);
                self.state = State::ArrayValue;
            }
            LBRACE => {
                self.return_stack.push(follow_up);
                self.emit(RawToken::ObjectBegin);
                self.state = State::ObjectKey;
            }
            DQUOTE => {
                self.return_stack.push(follow_up);
                self.begin_string();
            }
            LOWER_N => {
                self.return_stack.push(follow_up);
                self.state = State::N;
            }
            LOWER_T => {
                self.return_stack.push(follow_up);
                self.state = State::T;
            }
            LOWER_F => {
                self.return_stack.push(follow_up);
                self.state = State::F;
            }
            MINUS => {
                self.return_stack.push(follow_up);
                self.reset_number(-1);
                self.state = State::NumMinus;
            }
            d if is_digit(d) => {
                self.return_stack.push(follow_up);
                self.reset_number(1);
                if d == ZERO {
                    self.state = State::NumZero;
                } else {
                    self.num_whole = digit_value(d);
                    self.state = State::NumWhole;
                }
            }
            _ => self.fail(pos, Some(unit), "expected a JSON value"),
        }
        None
    }
}
