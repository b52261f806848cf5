use std::{path::Path, sync::Arc};

use kirigami::{
    base::{source_file::SourceFile, Error, MemoryProvider, VoidHandler},
    lexical::{
        token::{CommentKind, KeywordKind, SymbolKind, Token, TokenizeError},
        token_stream::TokenStream,
        Error as LexicalError,
    },
};

fn lex(source: &str) -> TokenStream {
    kirigami::tokenize_str(&VoidHandler, "test.kiri", source).expect("Failed to tokenize")
}

fn lex_err(source: &str) -> TokenizeError {
    let error =
        kirigami::tokenize_str(&VoidHandler, "test.kiri", source).expect_err("Expected failure");
    match error {
        Error::LexicalError(LexicalError::TokenizeError(error)) => error,
        other => panic!("Expected a tokenize error, got: {other:?}"),
    }
}

fn lexemes(stream: &TokenStream) -> Vec<&str> {
    stream.iter().map(|token| token.span().str()).collect()
}

#[test]
fn sample_is_fully_covered() {
    let source = include_str!("./sample.kiri");
    let source_file = SourceFile::from_string("sample.kiri".to_string(), source);

    let stream =
        TokenStream::tokenize(&source_file, &VoidHandler).expect("Failed to tokenize sample");

    stream
        .verify_coverage(&source_file)
        .expect("Sample should be fully covered");

    let rebuilt = lexemes(&stream).concat();
    assert_eq!(rebuilt, source);
}

#[test]
fn tokenization_is_deterministic() {
    let source_file = SourceFile::from_string(
        "test.kiri".to_string(),
        "let x = 1.5; # note\n'str' ##block##",
    );

    let first = TokenStream::tokenize(&source_file, &VoidHandler).expect("Failed to tokenize");
    let second = TokenStream::tokenize(&source_file, &VoidHandler).expect("Failed to tokenize");

    assert_eq!(first, second);
}

#[test]
fn end_to_end_example() {
    let stream = lex("let x = 0x1F + 2.5e1;");

    assert_eq!(
        lexemes(&stream),
        vec!["let", " ", "x", " ", "=", " ", "0x1F", " ", "+", " ", "2.5e1", ";"]
    );

    let tokens: Vec<&Token> = stream.iter().collect();

    let word = tokens[0].as_word().expect("Expected word");
    assert_eq!(word.keyword, Some(KeywordKind::Let));

    let word = tokens[2].as_word().expect("Expected word");
    assert_eq!(word.keyword, None);

    assert_eq!(
        tokens[4].as_symbol().expect("Expected symbol").kind,
        SymbolKind::Equal
    );
    assert_eq!(tokens[6].as_numeric().expect("Expected numeric").value, 31.0);
    assert_eq!(
        tokens[8].as_symbol().expect("Expected symbol").kind,
        SymbolKind::Add
    );
    assert_eq!(
        tokens[10].as_numeric().expect("Expected numeric").value,
        25.0
    );
    assert_eq!(
        tokens[11].as_symbol().expect("Expected symbol").kind,
        SymbolKind::Semicolon
    );
}

#[test]
fn symbols_match_greedily() {
    let stream = lex("===");

    assert_eq!(lexemes(&stream), vec!["==", "="]);
    assert_eq!(
        stream[0].as_symbol().expect("Expected symbol").kind,
        SymbolKind::EqualEqual
    );
    assert_eq!(
        stream[1].as_symbol().expect("Expected symbol").kind,
        SymbolKind::Equal
    );

    let stream = lex("a <<= b >>= c");
    let kinds: Vec<SymbolKind> = stream
        .iter()
        .filter_map(|token| token.as_symbol())
        .map(|symbol| symbol.kind)
        .collect();
    assert_eq!(kinds, vec![SymbolKind::ShiftLeftEqual, SymbolKind::ShiftRightEqual]);
}

#[test]
fn numeric_base_modifiers() {
    let cases = [
        ("0x1A", 26.0),
        ("0X1a", 26.0),
        ("0b101", 5.0),
        ("0B11", 3.0),
        ("0q123", 27.0),
        ("0o17", 15.0),
    ];

    for (source, expected) in cases {
        let stream = lex(source);
        assert_eq!(stream.len(), 1, "{source}");
        let numeric = stream[0].as_numeric().expect("Expected numeric");
        assert_eq!(numeric.value, expected, "{source}");
        assert_eq!(numeric.span.str(), source);
    }
}

#[test]
fn base_modifier_requires_a_zero_prefix() {
    assert!(matches!(
        lex_err("12x3"),
        TokenizeError::InvalidBasePrefix(_)
    ));
}

#[test]
fn base_modifier_requires_digits() {
    assert!(matches!(lex_err("0x"), TokenizeError::MissingBaseDigits(_)));
}

#[test]
fn decimal_fractions_and_exponents() {
    let stream = lex("1.5");
    assert_eq!(stream.len(), 1);
    assert_eq!(stream[0].as_numeric().expect("Expected numeric").value, 1.5);

    let stream = lex("1.");
    assert_eq!(stream.len(), 1);
    assert_eq!(stream[0].as_numeric().expect("Expected numeric").value, 1.0);

    let stream = lex("1e-2");
    assert_eq!(stream.len(), 1);
    let value = stream[0].as_numeric().expect("Expected numeric").value;
    assert!((value - 0.01).abs() < 1e-12);
}

#[test]
fn dot_prefixed_fraction_retracts_the_dot() {
    let stream = lex(".5");
    assert_eq!(lexemes(&stream), vec![".5"]);
    assert_eq!(stream[0].as_numeric().expect("Expected numeric").value, 0.5);

    let stream = lex("x.5");
    assert_eq!(lexemes(&stream), vec!["x", ".5"]);
    assert_eq!(stream[1].as_numeric().expect("Expected numeric").value, 0.5);

    // A dot separated from the digits by whitespace stays a symbol.
    let stream = lex(". 5");
    assert_eq!(lexemes(&stream), vec![".", " ", "5"]);
    assert_eq!(
        stream[0].as_symbol().expect("Expected symbol").kind,
        SymbolKind::Dot
    );
}

#[test]
fn retraction_preserves_coverage() {
    let source_file = SourceFile::from_string("test.kiri".to_string(), "x.5 + 1..2");
    let stream = TokenStream::tokenize(&source_file, &VoidHandler).expect("Failed to tokenize");

    stream
        .verify_coverage(&source_file)
        .expect("Retraction should not break coverage");
    assert_eq!(
        lexemes(&stream),
        vec!["x", ".5", " ", "+", " ", "1.", ".2"]
    );
}

#[test]
fn string_escaping() {
    let stream = lex(r#""a\"b""#);
    assert_eq!(stream.len(), 1);

    let string = stream[0].as_string_literal().expect("Expected string");
    assert_eq!(string.str_content(), r#"a\"b"#);

    // An escaped backslash does not escape the closing delimiter.
    let stream = lex(r#""a\\" b"#);
    let string = stream[0].as_string_literal().expect("Expected string");
    assert_eq!(string.str_content(), r"a\\");

    // Single quoted strings close on a single quote only.
    let stream = lex(r#"'say "hi"'"#);
    assert_eq!(stream.len(), 1);
    let string = stream[0].as_string_literal().expect("Expected string");
    assert_eq!(string.str_content(), r#"say "hi""#);
}

#[test]
fn unterminated_string_fails() {
    assert!(matches!(
        lex_err("\"abc"),
        TokenizeError::UnexpectedEndOfInput(_)
    ));
}

#[test]
fn line_comments_stop_before_the_line_feed() {
    let stream = lex("# note\nx");

    assert_eq!(lexemes(&stream), vec!["# note", "\n", "x"]);
    assert_eq!(
        stream[0].as_comment().expect("Expected comment").kind,
        CommentKind::Line
    );
}

#[test]
fn line_comment_without_a_line_feed_fails() {
    assert!(matches!(
        lex_err("# note"),
        TokenizeError::UnexpectedEndOfInput(_)
    ));
}

#[test]
fn block_comments() {
    let stream = lex("##a##");
    assert_eq!(lexemes(&stream), vec!["##a##"]);
    assert_eq!(
        stream[0].as_comment().expect("Expected comment").kind,
        CommentKind::Block
    );

    // A backslash before the terminator escapes it.
    let stream = lex("##a\\##b##");
    assert_eq!(lexemes(&stream), vec!["##a\\##b##"]);

    let stream = lex("####");
    assert_eq!(lexemes(&stream), vec!["####"]);
}

#[test]
fn unterminated_block_comment_fails() {
    assert!(matches!(
        lex_err("## still open"),
        TokenizeError::UnexpectedEndOfInput(_)
    ));
}

#[test]
fn keywords_are_exact_matches_only() {
    let stream = lex("let letter");

    let first = stream[0].as_word().expect("Expected word");
    assert_eq!(first.keyword, Some(KeywordKind::Let));

    let second = stream[2].as_word().expect("Expected word");
    assert_eq!(second.keyword, None);
    assert_eq!(second.span.str(), "letter");
}

#[test]
fn ampersand_continues_a_word() {
    let stream = lex("a&b");
    assert_eq!(lexemes(&stream), vec!["a&b"]);
    assert!(stream[0].as_word().is_some());

    // At token start the same byte is a symbol.
    let stream = lex("& b");
    assert_eq!(
        stream[0].as_symbol().expect("Expected symbol").kind,
        SymbolKind::BitAnd
    );
}

#[test]
fn whitespace_runs_are_maximal() {
    let stream = lex("a \t\r\n b");

    assert_eq!(lexemes(&stream), vec!["a", " \t\r\n ", "b"]);
}

#[test]
fn positions_track_lines_and_columns() {
    let stream = lex("a\nbb\n ccc");

    let word = |index: usize| -> &kirigami::lexical::token::Word {
        stream[index].as_word().expect("Expected word")
    };

    let first = word(0).span.start();
    assert_eq!((first.line, first.column), (1, 1));

    let second = word(2).span.start();
    assert_eq!((second.line, second.column), (2, 1));

    let third = word(4).span.start();
    assert_eq!((third.line, third.column), (3, 2));
    let third_end = word(4).span.end();
    assert_eq!((third_end.line, third_end.column), (3, 5));
}

#[test]
fn tokenizing_through_a_file_provider() {
    let source = include_str!("./sample.kiri");
    let mut provider = MemoryProvider::new();
    provider.add_file("sample.kiri", source);

    let stream = kirigami::tokenize(&VoidHandler, &provider, Path::new("sample.kiri"))
        .expect("Failed to tokenize");
    assert!(!stream.is_empty());

    let debug_stream = kirigami::tokenize_debug(&VoidHandler, &provider, Path::new("sample.kiri"))
        .expect("Debug tokenization should pass its coverage check");
    assert_eq!(stream.len(), debug_stream.len());

    kirigami::tokenize(&VoidHandler, &provider, Path::new("missing.kiri"))
        .expect_err("Expected a missing file error");
}

#[test]
fn tokens_borrow_the_source_file() {
    let source_file = SourceFile::from_string("test.kiri".to_string(), "let x");
    let stream = TokenStream::tokenize(&source_file, &VoidHandler).expect("Failed to tokenize");

    for token in stream.iter() {
        assert!(Arc::ptr_eq(token.span().source_file(), &source_file));
    }
}
