use yaml_stream::{Event, EventKind, EventReceiver, Parser, ScalarStyle};

#[derive(Clone, PartialEq, PartialOrd, Debug)]
enum TestEvent {
    OnDocumentStart,
    OnDocumentEnd,
    OnSequenceStart,
    OnSequenceEnd,
    OnMapStart,
    OnMapEnd,
    OnScalar,
    OnAlias,
    OnNull,
}

struct YamlChecker {
    pub evs: Vec<TestEvent>,
}

impl EventReceiver for YamlChecker {
    fn on_event(&mut self, ev: Event) {
        let tev = match ev.kind {
            EventKind::DocumentStart(_) => TestEvent::OnDocumentStart,
            EventKind::DocumentEnd { .. } => TestEvent::OnDocumentEnd,
            EventKind::SequenceStart(_) => TestEvent::OnSequenceStart,
            EventKind::SequenceEnd => TestEvent::OnSequenceEnd,
            EventKind::MappingStart(_) => TestEvent::OnMapStart,
            EventKind::MappingEnd => TestEvent::OnMapEnd,
            EventKind::Scalar(scalar) => {
                if scalar.value == "~" && scalar.style == ScalarStyle::Plain {
                    TestEvent::OnNull
                } else {
                    TestEvent::OnScalar
                }
            }
            EventKind::Alias(_) => TestEvent::OnAlias,
            _ => return, // ignore other events
        };
        self.evs.push(tev);
    }
}

fn str_to_test_events(docs: &str) -> Vec<TestEvent> {
    let mut p = YamlChecker { evs: Vec::new() };
    let mut parser = Parser::new_from_str(docs);
    parser.load(&mut p, true).unwrap();
    p.evs
}

macro_rules! assert_next {
    ($v:expr, $p:pat) => {
        match $v.next().unwrap() {
            $p => {}
            e => {
                panic!("unexpected event: {:?}", e);
            }
        }
    };
}

use TestEvent::*;

const EX2_1: &str = "- Mark McGwire\n- Sammy Sosa\n- Ken Griffey";

const EX2_2: &str = "hr:  65    # Home runs\navg: 0.278 # Batting average\nrbi: 147   # Runs Batted In";

const EX2_4: &str = "-\n  name: Mark McGwire\n  hr:   65\n  avg:  0.278\n-\n  name: Sammy Sosa\n  hr:   63\n  avg:  0.288";

const EX2_5: &str = "- [name        , hr, avg  ]\n- [Mark McGwire, 65, 0.278]\n- [Sammy Sosa  , 63, 0.288]";

const EX2_7: &str = "# Ranking of 1998 home runs\n---\n- Mark McGwire\n- Sammy Sosa\n- Ken Griffey\n\n# Team ranking\n---\n- Chicago Cubs\n- St Louis Cardinals";

const EX2_10: &str = "---\nhr:\n  - Mark McGwire\n  # Following node labeled SS\n  - &SS Sammy Sosa\nrbi:\n  - *SS # Subsequent occurrence\n  - Ken Griffey";

const EX2_11: &str = "? - Detroit Tigers\n  - Chicago cubs\n:\n  - 2001-07-23\n\n? [ New York Yankees,\n    Atlanta Braves ]\n: [ 2001-07-02, 2001-08-12,\n    2001-08-14 ]";

const EX2_13: &str = "# ASCII Art\n--- |\n  \\//||\\/||\n  // ||  ||__";

const EX2_18: &str = "plain:\n  This unquoted scalar\n  spans many lines.\n\nquoted: \"So does this\n  quoted scalar.\\n\"";

const EX5_8: &str = "single: 'text'\ndouble: \"text\"";

const EX7_1: &str = "First occurrence: &anchor Foo\nSecond occurrence: *anchor\nOverride anchor: &anchor Bar\nReuse anchor: *anchor";

const EX8_14: &str = "block sequence:\n  - one\n  - two : three\n";

const EX_NULLS: &str = "a: ~\nb: [~, x]";

#[test]
fn test_ex2_1_seq_scalars() {
    let mut v = str_to_test_events(EX2_1).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_2_mapping_scalars_to_scalars() {
    let mut v = str_to_test_events(EX2_2).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    for _ in 0..6 {
        assert_next!(v, OnScalar);
    }
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_4_sequence_of_mappings() {
    let mut v = str_to_test_events(EX2_4).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnSequenceStart);
    for _ in 0..2 {
        assert_next!(v, OnMapStart);
        for _ in 0..6 {
            assert_next!(v, OnScalar);
        }
        assert_next!(v, OnMapEnd);
    }
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_5_sequence_of_sequences() {
    let mut v = str_to_test_events(EX2_5).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnSequenceStart);
    for _ in 0..3 {
        assert_next!(v, OnSequenceStart);
        for _ in 0..3 {
            assert_next!(v, OnScalar);
        }
        assert_next!(v, OnSequenceEnd);
    }
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_7_two_documents_in_a_stream() {
    let mut v = str_to_test_events(EX2_7).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnDocumentEnd);
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_10_node_appears_twice_in_this_document() {
    let mut v = str_to_test_events(EX2_10).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnAlias);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_11_mapping_between_sequences() {
    let mut v = str_to_test_events(EX2_11).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex2_13_in_literals_newlines_are_preserved() {
    let mut v = str_to_test_events(EX2_13).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());

    let scalar = Parser::new_from_str(EX2_13)
        .filter_map(Result::ok)
        .find_map(|ev| match ev.kind {
            EventKind::Scalar(scalar) => Some(scalar),
            _ => None,
        })
        .unwrap();
    assert_eq!(scalar.style, ScalarStyle::Literal);
    assert_eq!(scalar.value, "\\//||\\/||\n// ||  ||__");
}

#[test]
fn test_ex2_18_multi_line_flow_scalars() {
    let values: Vec<String> = Parser::new_from_str(EX2_18)
        .filter_map(Result::ok)
        .filter_map(|ev| match ev.kind {
            EventKind::Scalar(scalar) => Some(scalar.value),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        [
            "plain",
            "This unquoted scalar spans many lines.",
            "quoted",
            "So does this quoted scalar.\n"
        ]
    );
}

#[test]
fn test_ex5_8_quoted_scalar_indicators() {
    let mut v = str_to_test_events(EX5_8).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    for _ in 0..4 {
        assert_next!(v, OnScalar);
    }
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex7_1_alias_nodes() {
    let mut v = str_to_test_events(EX7_1).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnAlias);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnAlias);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_ex8_14_block_sequence() {
    let mut v = str_to_test_events(EX8_14).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnScalar);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}

#[test]
fn test_nulls() {
    let mut v = str_to_test_events(EX_NULLS).into_iter();
    assert_next!(v, OnDocumentStart);
    assert_next!(v, OnMapStart);
    assert_next!(v, OnScalar);
    assert_next!(v, OnNull);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceStart);
    assert_next!(v, OnNull);
    assert_next!(v, OnScalar);
    assert_next!(v, OnSequenceEnd);
    assert_next!(v, OnMapEnd);
    assert_next!(v, OnDocumentEnd);
    assert!(v.next().is_none());
}
