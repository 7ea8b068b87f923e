use indoc::indoc;
use yaml_stream::{Event, EventKind, Mark, Parser};

type R<A> = Result<A, Box<dyn std::error::Error>>;

fn load(s: &str) -> R<Vec<Event>> {
    Ok(Parser::new_from_str(s).collect::<Result<_, _>>()?)
}

fn scalar_start(events: &[Event], value: &str) -> Option<Mark> {
    events.iter().find_map(|ev| match &ev.kind {
        EventKind::Scalar(scalar) if scalar.value == value => Some(ev.start()),
        _ => None,
    })
}

#[test]
fn test_top_level_location() -> R<()> {
    let events = load(indoc!(
        r#"
            - a
            - b
        "#
    ))?;
    let start = events
        .iter()
        .find(|ev| matches!(ev.kind, EventKind::SequenceStart(_)))
        .map(Event::start)
        .ok_or("no sequence")?;
    assert_eq!(start.line(), 1, "line");
    assert_eq!(start.col(), 1, "col");
    Ok(())
}

#[test]
fn test_top_level_location_in_non_initial_document() -> R<()> {
    let events = load(indoc!(
        r#"
            - a
            - b
            ---
            foo: 1
            bar: 2
        "#
    ))?;
    let foo = scalar_start(&events, "foo").ok_or("no key")?;
    assert_eq!(foo.line(), 4, "line");
    assert_eq!(foo.col(), 1, "col");
    Ok(())
}

#[test]
fn test_array_location() -> R<()> {
    let events = load(indoc!(
        r#"
            items:
                - a
                - b
        "#
    ))?;
    let start = events
        .iter()
        .find(|ev| matches!(ev.kind, EventKind::SequenceStart(_)))
        .map(Event::start)
        .ok_or("no sequence")?;
    assert_eq!((start.line(), start.col()), (2, 5));

    let b = scalar_start(&events, "b").ok_or("no b")?;
    assert_eq!((b.line(), b.col()), (3, 7));
    Ok(())
}

#[test]
fn test_alias_location() -> R<()> {
    let events = load(indoc!(
        r#"
            base: &base
              x: 1
            copy:
              ref: *base
        "#
    ))?;
    let alias = events
        .iter()
        .find(|ev| matches!(ev.kind, EventKind::Alias(_)))
        .ok_or("no alias")?;
    assert_eq!((alias.start().line(), alias.start().col()), (4, 8));
    assert_eq!(alias.end().col(), 13);
    Ok(())
}

#[test]
fn test_explicit_document_locations() -> R<()> {
    let events = load("---\nfoo: bar")?;
    let document = events
        .iter()
        .find(|ev| matches!(ev.kind, EventKind::DocumentStart(_)))
        .ok_or("no document")?;
    assert_eq!((document.start().line(), document.start().col()), (1, 1));

    let key = scalar_start(&events, "foo").ok_or("no key")?;
    assert_eq!((key.line(), key.col()), (2, 1));
    let value = scalar_start(&events, "bar").ok_or("no value")?;
    assert_eq!((value.line(), value.col()), (2, 6));
    Ok(())
}

#[test]
fn test_flow_locations() -> R<()> {
    let events = load("[a, {b: c}]")?;
    let mapping = events
        .iter()
        .find(|ev| matches!(ev.kind, EventKind::MappingStart(_)))
        .ok_or("no mapping")?;
    assert_eq!(mapping.start().col(), 5);
    assert_eq!(mapping.start().index(), 4);
    let c = scalar_start(&events, "c").ok_or("no c")?;
    assert_eq!((c.line(), c.col(), c.index()), (1, 9, 8));
    Ok(())
}

#[test]
fn test_block_scalar_location() -> R<()> {
    let events = load(indoc!(
        r#"
            text: |
              one
              two
            after: x
        "#
    ))?;
    let text = scalar_start(&events, "one\ntwo\n").ok_or("no literal")?;
    assert_eq!((text.line(), text.col()), (1, 7));
    let after = scalar_start(&events, "after").ok_or("no key")?;
    assert_eq!(after.line(), 4);
    Ok(())
}

#[test]
fn test_error_location() {
    let err = Parser::new_from_str("a: [b,\n  c\nd")
        .collect::<Result<Vec<_>, _>>()
        .unwrap_err();
    let mark = err.marker().copied().unwrap();
    assert!(mark.line() >= 2, "{err}");
}
