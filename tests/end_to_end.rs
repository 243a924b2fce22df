// this_file: tests/end_to_end.rs

//! Exercises the full Tokenizer -> Parser -> Generator pipeline through
//! the crate's public API, rather than any single module in isolation.

use flatjson::{parse, Error, Generator, ToJson};

#[test]
fn parses_nested_object_and_array() {
    let doc = parse(r#"{"name": "ada", "langs": ["rust", "ocaml"], "age": 36}"#).unwrap();
    let root = doc.root();

    assert_eq!(root.get_key("name").unwrap().as_str().unwrap(), "ada");
    assert_eq!(root.get_key("age").unwrap().as_long(), Some(36));

    let langs = root.get_key("langs").unwrap();
    assert_eq!(langs.len(), 2);
    assert_eq!(langs.get(0).unwrap().as_str().unwrap(), "rust");
    assert_eq!(langs.get(1).unwrap().as_str().unwrap(), "ocaml");
}

#[test]
fn parses_numbers_as_long_or_double() {
    let doc = parse("[1, -7, 0, 1.5, -2.25e3, 1e10]").unwrap();
    let root = doc.root();
    assert_eq!(root.get(0).unwrap().as_long(), Some(1));
    assert_eq!(root.get(1).unwrap().as_long(), Some(-7));
    assert_eq!(root.get(2).unwrap().as_long(), Some(0));
    assert_eq!(root.get(3).unwrap().as_double(), Some(1.5));
    assert_eq!(root.get(4).unwrap().as_double(), Some(-2250.0));
    assert_eq!(root.get(5).unwrap().as_double(), Some(1e10));
}

#[test]
fn parses_strings_with_escapes_and_unicode_escape() {
    let doc = parse(r#"["line\nbreak", "quote:\"", "snowman:☃"]"#).unwrap();
    let root = doc.root();
    assert_eq!(root.get(0).unwrap().as_str().unwrap(), "line\nbreak");
    assert_eq!(root.get(1).unwrap().as_str().unwrap(), "quote:\"");
    assert_eq!(root.get(2).unwrap().as_str().unwrap(), "snowman:\u{2603}");
}

#[test]
fn duplicate_object_keys_are_preserved_but_get_key_returns_first() {
    let doc = parse(r#"{"a": 1, "a": 2}"#).unwrap();
    let root = doc.root();
    assert_eq!(root.len(), 2);
    assert_eq!(root.get_key("a").unwrap().as_long(), Some(1));
    let values: Vec<_> = root.entries().map(|(_, v)| v.as_long().unwrap()).collect();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn tokenizer_failure_surfaces_through_parse() {
    let err = parse("{not valid json}").unwrap_err();
    assert!(matches!(err, Error::Tokenizer(_)));
}

#[test]
fn parser_failure_surfaces_through_parse() {
    // Tokenizes fine character-by-character, but `]` with no opening `[`
    // is a structural error the parser catches, not the tokenizer.
    let err = parse("]").unwrap_err();
    assert!(matches!(err, Error::Tokenizer(_) | Error::Parser(_)));
}

#[test]
fn unterminated_container_fails_at_end_of_input() {
    let err = parse("[1, 2").unwrap_err();
    assert!(matches!(err, Error::Tokenizer(_)));
}

#[test]
fn round_trips_a_document_through_the_generator_compactly() {
    let doc = parse(r#"{"a": [1, 2.5, null, true, false], "b": "text"}"#).unwrap();
    let mut gen = Generator::new();
    doc.root().to_json(&mut gen).unwrap();
    assert_eq!(gen.as_str(), r#"{"a":[1,2.5,null,true,false],"b":"text"}"#);
}

#[test]
fn round_trips_a_document_through_the_generator_pretty_printed() {
    let doc = parse(r#"{"x": 1}"#).unwrap();
    let mut gen = Generator::pretty(2);
    doc.root().to_json(&mut gen).unwrap();
    assert_eq!(gen.as_str(), "{\n  \"x\": 1\n}");
}

#[test]
fn copy_strings_lets_the_document_outlive_reuse_of_its_tokenizer() {
    use flatjson::{Parser, Tokenizer};

    let mut tokenizer = Tokenizer::new();
    tokenizer.feed_str(r#"{"greeting": "hello"}"#);
    tokenizer.finish();
    assert!(tokenizer.is_done());

    let mut parser = Parser::new();
    for token in tokenizer.tokens() {
        parser.feed(&token);
    }
    assert!(parser.is_done());

    // Sever the parser's strings from the tokenizer's buffer, then reuse
    // the tokenizer for an unrelated document. The already-parsed value
    // must still read back correctly.
    parser.copy_strings();
    tokenizer.clear();
    tokenizer.feed_str("null");
    tokenizer.finish();

    let root = parser.last_parsed_root().unwrap();
    assert_eq!(root.get_key("greeting").unwrap().as_str().unwrap(), "hello");
}

#[test]
fn parser_parses_a_sequence_of_top_level_values_via_reset() {
    use flatjson::{Parser, Tokenizer};

    let mut parser = Parser::new();
    for text in ["1", "\"two\"", "[3, 4]"] {
        let mut tokenizer = Tokenizer::new();
        tokenizer.feed_str(text);
        tokenizer.finish();
        assert!(tokenizer.is_done());

        for token in tokenizer.tokens() {
            parser.feed(&token);
        }
        assert!(parser.is_done());
        parser.reset();
    }

    parser.copy_strings();
    let root = parser.last_parsed_root().unwrap();
    assert_eq!(root.len(), 2);
    assert_eq!(root.get(0).unwrap().as_long(), Some(3));
}

#[test]
fn chunked_input_parses_the_same_as_whole_input() {
    let whole = parse(r#"{"key": [1, 2, "three"]}"#).unwrap();

    use flatjson::{Parser, Tokenizer};
    let mut tokenizer = Tokenizer::new();
    for chunk in ["{\"k", "ey\": [1,", " 2, \"thr", "ee\"]}"] {
        tokenizer.feed_str(chunk);
    }
    tokenizer.finish();
    assert!(tokenizer.is_done());

    let mut parser = Parser::new();
    for token in tokenizer.tokens() {
        parser.feed(&token);
    }
    assert!(parser.is_done());

    let mut gen = Generator::new();
    parser.last_parsed_root().unwrap().to_json(&mut gen).unwrap();

    let mut whole_gen = Generator::new();
    whole.root().to_json(&mut whole_gen).unwrap();

    assert_eq!(gen.as_str(), whole_gen.as_str());
}
