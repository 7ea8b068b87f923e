use yaml_stream::{Mark, ScalarStyle, Scanner, TokenType};

/// Token kinds with scalars reduced to their value, so key flags do not get in the way.
fn kinds(s: &str) -> Vec<String> {
    Scanner::new(s.chars())
        .map(|token| match token.1 {
            TokenType::Scalar { value, .. } => format!("Scalar({value})"),
            other => format!("{other:?}"),
        })
        .collect()
}

#[test]
fn test_key_with_block_sequence() {
    assert_eq!(
        kinds("key:\n  - item 1\n  - item 2\n"),
        [
            "StreamStart",
            "BlockMappingStart",
            "Key",
            "Scalar(key)",
            "Value",
            "BlockSequenceStart",
            "BlockEntry",
            "Scalar(item 1)",
            "BlockEntry",
            "Scalar(item 2)",
            "BlockEnd",
            "BlockEnd",
            "StreamEnd",
        ]
    );
}

#[test]
fn test_unroll_two_levels_at_once() {
    let tokens = kinds("a:\n  b:\n    c: 1\nd: 2\n");
    let one = tokens.iter().position(|t| t == "Scalar(1)").unwrap();
    assert_eq!(tokens[one + 1..one + 4], ["BlockEnd", "BlockEnd", "Key"]);
    assert_eq!(tokens[one + 4], "Scalar(d)");
    assert_eq!(tokens.iter().filter(|t| *t == "BlockEnd").count(), 3);
}

#[test]
fn test_marks_are_monotonic() {
    let s = "a: [b, {c: d}]\n# comment\ne:\n  - &x f\n  - *x\n  - |\n    text\n";
    let mut previous = Mark::default();
    for token in Scanner::new(s.chars()).retain_comments(true) {
        assert!(token.0.end.index() >= token.0.start.index(), "{token:?}");
        assert!(token.0.start >= previous, "{token:?} before {previous}");
        previous = token.0.start;
    }
}

#[test]
fn test_mark_positions() {
    let tokens: Vec<_> = Scanner::new("a: b\nc: d".chars()).collect();
    let b = tokens
        .iter()
        .find(|t| matches!(&t.1, TokenType::Scalar { value, .. } if value == "b"))
        .unwrap();
    assert_eq!(b.0.start.line(), 1);
    assert_eq!(b.0.start.col(), 4);
    assert_eq!(b.0.start.index(), 3);
    assert_eq!(b.0.end.index(), 4);
}

#[test]
fn test_directives() {
    let s = "%YAML 1.2\n%TAG !e! tag:example.com,2000:\n--- !e!foo x\n";
    let tokens: Vec<TokenType> = Scanner::new(s.chars()).map(|t| t.1).collect();
    assert_eq!(tokens[1], TokenType::VersionDirective(1, 2));
    assert_eq!(
        tokens[2],
        TokenType::TagDirective("!e!".into(), "tag:example.com,2000:".into())
    );
    assert_eq!(tokens[3], TokenType::DocumentStart);
    assert_eq!(tokens[4], TokenType::Tag("!e!".into(), "foo".into()));
}

#[test]
fn test_properties() {
    let tokens: Vec<TokenType> = Scanner::new("- !!str &a x\n- *a\n".chars())
        .map(|t| t.1)
        .collect();
    assert!(tokens.contains(&TokenType::Tag("!!".into(), "str".into())));
    assert!(tokens.contains(&TokenType::Anchor("a".into())));
    assert!(tokens.contains(&TokenType::Alias("a".into())));
}

#[test]
fn test_scalar_styles() {
    let s = "- plain\n  text\n- 'it''s'\n- \"tab\\there \\u263A\"\n- |\n  a\n  b\n- >\n  a\n  b\n\n  c\n";
    let scalars: Vec<(ScalarStyle, String)> = Scanner::new(s.chars())
        .filter_map(|t| match t.1 {
            TokenType::Scalar { style, value, .. } => Some((style, value)),
            _ => None,
        })
        .collect();
    assert_eq!(
        scalars,
        [
            (ScalarStyle::Plain, "plain text".to_owned()),
            (ScalarStyle::SingleQuoted, "it's".to_owned()),
            (ScalarStyle::DoubleQuoted, "tab\there \u{263A}".to_owned()),
            (ScalarStyle::Literal, "a\nb\n".to_owned()),
            (ScalarStyle::Folded, "a b\nc\n".to_owned()),
        ]
    );
}

#[test]
fn test_unterminated_quote() {
    let mut scanner = Scanner::new("key: \"abc".chars());
    for _ in scanner.by_ref() {}
    let error = scanner.get_error().unwrap();
    assert!(error.marker().is_some());
}

#[test]
fn test_comments_skipped_by_default() {
    assert!(!kinds("a: b # c\n# d\n").iter().any(|t| t.starts_with("Comment")));
    let comments: Vec<TokenType> = Scanner::new("a: b # c\n# d\n".chars())
        .retain_comments(true)
        .map(|t| t.1)
        .filter(|t| matches!(t, TokenType::Comment { .. }))
        .collect();
    assert_eq!(
        comments,
        [
            TokenType::Comment {
                text: "c".into(),
                is_inline: true
            },
            TokenType::Comment {
                text: "d".into(),
                is_inline: false
            },
        ]
    );
}
