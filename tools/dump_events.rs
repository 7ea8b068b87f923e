use std::env;
use std::fs::File;

use yaml_stream::{
    decoder::YamlDecoder,
    event::{CollectionStyle, EventVisitor, ScalarEvent},
    names::{AnchorName, TagName},
    Parser, ScalarStyle, Span,
};

/// Prints events in the notation of the yaml-test-suite, one per line.
struct EventPrinter {
    depth: usize,
}

impl EventPrinter {
    fn print(&self, line: &str) {
        println!("{:indent$}{line}", "", indent = self.depth);
    }
}

fn properties(anchor: &AnchorName, tag: &TagName) -> String {
    let mut out = String::new();
    if let Some(anchor) = anchor.as_str() {
        out.push_str(" &");
        out.push_str(anchor);
    }
    if let Some(tag) = tag.as_str() {
        out.push_str(" <");
        out.push_str(tag);
        out.push('>');
    }
    out
}

fn escape(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('\n', r"\n")
        .replace('\r', r"\r")
        .replace('\t', r"\t")
        .replace('\x08', r"\b")
}

impl EventVisitor for EventPrinter {
    fn on_stream_start(&mut self, _span: Span) {
        self.print("+STR");
        self.depth += 1;
    }

    fn on_stream_end(&mut self, _span: Span) {
        self.depth -= 1;
        self.print("-STR");
    }

    fn on_document_start(&mut self, document: yaml_stream::event::DocumentStart, _span: Span) {
        self.print(if document.is_implicit { "+DOC" } else { "+DOC ---" });
        self.depth += 1;
    }

    fn on_document_end(&mut self, is_implicit: bool, _span: Span) {
        self.depth -= 1;
        self.print(if is_implicit { "-DOC" } else { "-DOC ..." });
    }

    fn on_sequence_start(&mut self, start: yaml_stream::event::CollectionStart, _span: Span) {
        let flow = if start.style == CollectionStyle::Flow { " []" } else { "" };
        self.print(&format!("+SEQ{flow}{}", properties(&start.anchor, &start.tag)));
        self.depth += 1;
    }

    fn on_sequence_end(&mut self, _span: Span) {
        self.depth -= 1;
        self.print("-SEQ");
    }

    fn on_mapping_start(&mut self, start: yaml_stream::event::CollectionStart, _span: Span) {
        let flow = if start.style == CollectionStyle::Flow { " {}" } else { "" };
        self.print(&format!("+MAP{flow}{}", properties(&start.anchor, &start.tag)));
        self.depth += 1;
    }

    fn on_mapping_end(&mut self, _span: Span) {
        self.depth -= 1;
        self.print("-MAP");
    }

    fn on_scalar(&mut self, scalar: ScalarEvent, _span: Span) {
        let style = match scalar.style {
            ScalarStyle::Any | ScalarStyle::Plain => ':',
            ScalarStyle::SingleQuoted => '\'',
            ScalarStyle::DoubleQuoted => '"',
            ScalarStyle::Literal => '|',
            ScalarStyle::Folded => '>',
        };
        self.print(&format!(
            "=VAL{} {style}{}",
            properties(&scalar.anchor, &scalar.tag),
            escape(&scalar.value)
        ));
    }

    fn on_alias(&mut self, name: AnchorName, _span: Span) {
        self.print(&format!("=ALI *{name}"));
    }

    fn on_comment(&mut self, text: String, _is_inline: bool, _span: Span) {
        self.print(&format!("#{text}"));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut comments = false;
    let mut path = None;
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--comments" => comments = true,
            _ => path = Some(arg),
        }
    }
    let path = path.ok_or("usage: dump_events [--comments] <file>")?;
    let source = YamlDecoder::read(File::open(path)?).decode()?;

    let mut printer = EventPrinter { depth: 0 };
    Parser::new_from_str(&source)
        .retain_comments(comments)
        .parse_with(&mut printer)?;
    Ok(())
}
