// this_file: src/generator.rs

//! Serializes values back to JSON text.
//!
//! The generator mirrors the parser's call-and-response shape: instead of
//! being fed tokens, it is driven by a sequence of typed `emit_*` /
//! `begin_*` / `end_*` calls, and it is the caller's job (or
//! [`ToJson`]'s) to make those calls in a structurally valid order — the
//! generator validates that order and reports a [`GeneratorError`] if it's
//! violated, rather than ever producing malformed JSON.

use crate::error::GeneratorError;
use crate::value::{Value, ValueKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum GenState {
    Start,
    Done,
    ArrayValue,
    ObjectKey,
    ObjectValue,
}

enum FrameKind {
    Array,
    Object,
}

struct Context {
    kind: FrameKind,
    need_comma: bool,
}

/// Serializes a value tree to JSON text, either compactly or with
/// indentation.
pub struct Generator {
    out: String,
    state: GenState,
    stack: Vec<Context>,
    indent: Option<usize>,
    poisoned: bool,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// A generator that produces compact JSON with no extra whitespace.
    pub fn new() -> Self {
        Generator {
            out: String::new(),
            state: GenState::Start,
            stack: Vec::new(),
            indent: None,
            poisoned: false,
        }
    }

    /// A generator that pretty-prints with `width` spaces per indent level.
    pub fn pretty(width: usize) -> Self {
        Generator {
            indent: Some(width),
            ..Self::new()
        }
    }

    /// True once a complete top-level value has been written.
    pub fn is_done(&self) -> bool {
        self.state == GenState::Done
    }

    /// The text written so far. Valid JSON only once [`Generator::is_done`]
    /// is true.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consumes the generator, returning the text written so far.
    pub fn into_string(self) -> String {
        self.out
    }

    pub fn emit_null(&mut self) -> Result<(), GeneratorError> {
        self.begin_value()?;
        self.out.push_str("null");
        self.complete_value();
        Ok(())
    }

    pub fn emit_bool(&mut self, value: bool) -> Result<(), GeneratorError> {
        self.begin_value()?;
        self.out.push_str(if value { "true" } else { "false" });
        self.complete_value();
        Ok(())
    }

    pub fn emit_long(&mut self, value: i64) -> Result<(), GeneratorError> {
        self.begin_value()?;
        self.out.push_str(&value.to_string());
        self.complete_value();
        Ok(())
    }

    pub fn emit_double(&mut self, value: f64) -> Result<(), GeneratorError> {
        if !value.is_finite() {
            return self.poison(GeneratorError::NonFiniteNumber(value));
        }
        self.begin_value()?;
        self.write_double(value);
        self.complete_value();
        Ok(())
    }

    pub fn emit_string(&mut self, value: &str) -> Result<(), GeneratorError> {
        self.begin_value()?;
        write_string_literal(&mut self.out, value);
        self.complete_value();
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<(), GeneratorError> {
        self.begin_value()?;
        self.out.push('[');
        self.stack.push(Context {
            kind: FrameKind::Array,
            need_comma: false,
        });
        self.state = GenState::ArrayValue;
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), GeneratorError> {
        if self.poisoned {
            return Err(GeneratorError::Poisoned);
        }
        match self.stack.last() {
            Some(ctx) if matches!(ctx.kind, FrameKind::Array) && self.state == GenState::ArrayValue => {}
            _ => return self.poison(GeneratorError::MismatchedEnd),
        }
        let ctx = self.stack.pop().expect("array context");
        self.write_close(']', ctx.need_comma);
        self.complete_value();
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<(), GeneratorError> {
        self.begin_value()?;
        self.out.push('{');
        self.stack.push(Context {
            kind: FrameKind::Object,
            need_comma: false,
        });
        self.state = GenState::ObjectKey;
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), GeneratorError> {
        if self.poisoned {
            return Err(GeneratorError::Poisoned);
        }
        match self.stack.last() {
            Some(ctx) if matches!(ctx.kind, FrameKind::Object) && self.state == GenState::ObjectKey => {}
            _ => return self.poison(GeneratorError::MismatchedEnd),
        }
        let ctx = self.stack.pop().expect("object context");
        self.write_close('}', ctx.need_comma);
        self.complete_value();
        Ok(())
    }

    pub fn emit_key(&mut self, key: &str) -> Result<(), GeneratorError> {
        if self.poisoned {
            return Err(GeneratorError::Poisoned);
        }
        if self.state != GenState::ObjectKey {
            return self.poison(GeneratorError::UnexpectedKey);
        }
        let need_comma = self.stack.last().expect("object context").need_comma;
        let depth = self.stack.len();
        self.write_separator(need_comma, depth);
        write_string_literal(&mut self.out, key);
        self.out.push(':');
        if self.indent.is_some() {
            self.out.push(' ');
        }
        self.state = GenState::ObjectValue;
        Ok(())
    }

    fn begin_value(&mut self) -> Result<(), GeneratorError> {
        if self.poisoned {
            return Err(GeneratorError::Poisoned);
        }
        match self.state {
            GenState::Start => Ok(()),
            GenState::ArrayValue => {
                let need_comma = self.stack.last().map(|c| c.need_comma).unwrap_or(false);
                let depth = self.stack.len();
                self.write_separator(need_comma, depth);
                Ok(())
            }
            // Follows "key: " directly; no comma or indentation of its own.
            GenState::ObjectValue => Ok(()),
            GenState::ObjectKey => self.poison(GeneratorError::UnexpectedValue),
            GenState::Done => self.poison(GeneratorError::AlreadyComplete),
        }
    }

    fn complete_value(&mut self) {
        if let Some(ctx) = self.stack.last_mut() {
            ctx.need_comma = true;
        }
        self.state = match self.stack.last() {
            None => GenState::Done,
            Some(ctx) => match ctx.kind {
                FrameKind::Array => GenState::ArrayValue,
                FrameKind::Object => GenState::ObjectKey,
            },
        };
    }

    fn write_separator(&mut self, need_comma: bool, depth: usize) {
        if need_comma {
            self.out.push(',');
        }
        if depth > 0 {
            if let Some(width) = self.indent {
                self.out.push('\n');
                for _ in 0..(width * depth) {
                    self.out.push(' ');
                }
            }
        }
    }

    fn write_close(&mut self, bracket: char, had_elements: bool) {
        if had_elements {
            if let Some(width) = self.indent {
                self.out.push('\n');
                for _ in 0..(width * self.stack.len()) {
                    self.out.push(' ');
                }
            }
        }
        self.out.push(bracket);
    }

    fn write_double(&mut self, value: f64) {
        if value == value.trunc() && value.abs() < 1e17 {
            self.out.push_str(&format!("{value:.1}"));
        } else {
            self.out.push_str(&format!("{value}"));
        }
    }

    fn poison(&mut self, err: GeneratorError) -> Result<(), GeneratorError> {
        self.poisoned = true;
        Err(err)
    }
}

fn write_string_literal(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Types that know how to render themselves as JSON.
///
/// Rather than a sniff-the-runtime-type emit dispatcher, this is a plain
/// trait: implement it once per type and call [`Generator`]'s typed
/// `emit_*` methods from inside.
pub trait ToJson {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError>;
}

impl ToJson for bool {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        gen.emit_bool(*self)
    }
}

impl ToJson for i64 {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        gen.emit_long(*self)
    }
}

impl ToJson for f64 {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        gen.emit_double(*self)
    }
}

impl ToJson for str {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        gen.emit_string(self)
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        match self {
            Some(v) => v.to_json(gen),
            None => gen.emit_null(),
        }
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        gen.begin_array()?;
        for item in self {
            item.to_json(gen)?;
        }
        gen.end_array()
    }
}

impl ToJson for Value<'_> {
    fn to_json(&self, gen: &mut Generator) -> Result<(), GeneratorError> {
        match self.kind() {
            ValueKind::Null => gen.emit_null(),
            ValueKind::Bool => gen.emit_bool(self.as_bool().unwrap()),
            ValueKind::Long => gen.emit_long(self.as_long().unwrap()),
            ValueKind::Double => gen.emit_double(self.as_double().unwrap()),
            ValueKind::String => gen.emit_string(&self.as_str().unwrap().to_string_lossy()),
            ValueKind::Array => {
                gen.begin_array()?;
                for item in self.iter() {
                    item.to_json(gen)?;
                }
                gen.end_array()
            }
            ValueKind::Object => {
                gen.begin_object()?;
                for (key, value) in self.entries() {
                    gen.emit_key(&key.to_string_lossy())?;
                    value.to_json(gen)?;
                }
                gen.end_object()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_object_and_array() {
        let mut gen = Generator::new();
        gen.begin_object().unwrap();
        gen.emit_key("a").unwrap();
        gen.emit_long(1).unwrap();
        gen.emit_key("b").unwrap();
        gen.begin_array().unwrap();
        gen.emit_bool(true).unwrap();
        gen.emit_null().unwrap();
        gen.end_array().unwrap();
        gen.end_object().unwrap();
        assert!(gen.is_done());
        assert_eq!(gen.as_str(), r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn pretty_printed_object() {
        let mut gen = Generator::pretty(2);
        gen.begin_object().unwrap();
        gen.emit_key("x").unwrap();
        gen.emit_long(1).unwrap();
        gen.end_object().unwrap();
        assert_eq!(gen.as_str(), "{\n  \"x\": 1\n}");
    }

    #[test]
    fn empty_containers_have_no_inner_whitespace() {
        let mut gen = Generator::pretty(2);
        gen.begin_array().unwrap();
        gen.end_array().unwrap();
        assert_eq!(gen.as_str(), "[]");
    }

    #[test]
    fn string_escaping() {
        let mut gen = Generator::new();
        gen.emit_string("line\nbreak \"quote\" \u{01}").unwrap();
        assert_eq!(gen.as_str(), r#""line\nbreak \"quote\" ""#);
    }

    #[test]
    fn rejects_non_finite_double() {
        let mut gen = Generator::new();
        let err = gen.emit_double(f64::NAN).unwrap_err();
        assert!(matches!(err, GeneratorError::NonFiniteNumber(_)));
    }

    #[test]
    fn rejects_key_outside_object() {
        let mut gen = Generator::new();
        gen.begin_array().unwrap();
        let err = gen.emit_key("x").unwrap_err();
        assert!(matches!(err, GeneratorError::UnexpectedKey));
    }

    #[test]
    fn rejects_second_top_level_value() {
        let mut gen = Generator::new();
        gen.emit_long(1).unwrap();
        let err = gen.emit_long(2).unwrap_err();
        assert!(matches!(err, GeneratorError::AlreadyComplete));
    }

    #[test]
    fn integer_valued_double_keeps_decimal_point() {
        let mut gen = Generator::new();
        gen.emit_double(3.0).unwrap();
        assert_eq!(gen.as_str(), "3.0");
    }

    #[test]
    fn value_to_json_round_trips_through_generator() {
        use crate::parser::Parser;
        use crate::token::{RawToken, Token};

        let mut p = Parser::new();
        p.feed(&Token::new(RawToken::ArrayBegin, None));
        p.feed(&Token::new(RawToken::Long(1), None));
        p.feed(&Token::new(RawToken::Bool(false), None));
        p.feed(&Token::new(RawToken::ArrayEnd, None));

        let root = p.last_parsed_root().unwrap();
        let mut gen = Generator::new();
        root.to_json(&mut gen).unwrap();
        assert_eq!(gen.as_str(), "[1,false]");
    }
}
