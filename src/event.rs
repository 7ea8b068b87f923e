//! Parsing events and the interfaces that consume them.
//!
//! Events are what the [`crate::parser::Parser`] produces and what the
//! [`crate::emitter::Emitter`] consumes. They can either be materialized as [`Event`] values or
//! delivered one callback at a time to an [`EventVisitor`].

use std::collections::VecDeque;

use crate::mark::{Mark, Span};
use crate::names::{AnchorName, TagDirectiveCollection, TagName, VersionDirective};
use crate::scanner::ScalarStyle;

/// How a collection was (or should be) written.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub enum CollectionStyle {
    /// Let the emitter decide.
    #[default]
    Any,
    /// Indentation-based.
    Block,
    /// Bracket-delimited (`[]`, `{}`).
    Flow,
}

/// The contents of a document start event.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct DocumentStart {
    /// The `%YAML` directive, if any.
    pub version: Option<VersionDirective>,
    /// The tag directives in force for the document, defaults included.
    pub tags: TagDirectiveCollection,
    /// Whether the document had no `---` marker.
    pub is_implicit: bool,
}

impl DocumentStart {
    /// An implicit document start without directives.
    #[must_use]
    pub fn implicit() -> Self {
        DocumentStart {
            version: None,
            tags: TagDirectiveCollection::new(),
            is_implicit: true,
        }
    }

    /// An explicit (`---`) document start without directives.
    #[must_use]
    pub fn explicit() -> Self {
        DocumentStart {
            is_implicit: false,
            ..Self::implicit()
        }
    }
}

/// The contents of a scalar event.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ScalarEvent {
    /// Anchor of the node.
    pub anchor: AnchorName,
    /// Tag of the node, resolved against the document's tag directives.
    pub tag: TagName,
    /// Contents, escapes and folding resolved.
    pub value: String,
    /// How the scalar was written.
    pub style: ScalarStyle,
    /// Whether the tag may be omitted when the scalar is written plain.
    pub is_plain_implicit: bool,
    /// Whether the tag may be omitted when the scalar is written in any other style.
    pub is_quoted_implicit: bool,
    /// Whether the scalar is a mapping key.
    pub is_key: bool,
}

impl ScalarEvent {
    /// An untagged, unanchored scalar whose style is left to the emitter.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        ScalarEvent {
            anchor: AnchorName::empty(),
            tag: TagName::empty(),
            value: value.into(),
            style: ScalarStyle::Any,
            is_plain_implicit: true,
            is_quoted_implicit: true,
            is_key: false,
        }
    }

    /// The same scalar with a given style.
    #[must_use]
    pub fn with_style(mut self, style: ScalarStyle) -> Self {
        self.style = style;
        self
    }

    /// The same scalar with a given anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<AnchorName>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// The same scalar with an explicit tag. The tag is not implicit any more.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<TagName>) -> Self {
        self.tag = tag.into();
        self.is_plain_implicit = false;
        self.is_quoted_implicit = false;
        self
    }

    /// The empty scalar standing for a missing node.
    pub(crate) fn empty(anchor: AnchorName, tag: TagName) -> Self {
        let is_plain_implicit = tag.is_empty() || tag.as_str() == Some("!");
        ScalarEvent {
            anchor,
            tag,
            value: String::new(),
            style: ScalarStyle::Plain,
            is_plain_implicit,
            is_quoted_implicit: false,
            is_key: false,
        }
    }
}

/// The contents of a sequence or mapping start event.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CollectionStart {
    /// Anchor of the node.
    pub anchor: AnchorName,
    /// Tag of the node.
    pub tag: TagName,
    /// Whether the tag may be omitted.
    pub is_implicit: bool,
    /// How the collection was written.
    pub style: CollectionStyle,
}

impl CollectionStart {
    /// An untagged, unanchored collection of the given style.
    #[must_use]
    pub fn new(style: CollectionStyle) -> Self {
        CollectionStart {
            anchor: AnchorName::empty(),
            tag: TagName::empty(),
            is_implicit: true,
            style,
        }
    }

    /// The same collection with a given anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<AnchorName>) -> Self {
        self.anchor = anchor.into();
        self
    }

    /// The same collection with an explicit tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<TagName>) -> Self {
        self.tag = tag.into();
        self.is_implicit = false;
        self
    }
}

/// What happened in the stream.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EventKind {
    /// Start of the stream. Always the first event.
    StreamStart,
    /// End of the stream. Always the last event.
    StreamEnd,
    /// Start of a document.
    DocumentStart(DocumentStart),
    /// End of a document.
    DocumentEnd {
        /// Whether the document had no `...` marker.
        is_implicit: bool,
    },
    /// Reference to an anchored node.
    Alias(AnchorName),
    /// A scalar node.
    Scalar(ScalarEvent),
    /// Start of a sequence node.
    SequenceStart(CollectionStart),
    /// End of a sequence node.
    SequenceEnd,
    /// Start of a mapping node.
    MappingStart(CollectionStart),
    /// End of a mapping node.
    MappingEnd,
    /// A comment. Carries no structure.
    Comment {
        /// The comment text, without `#`.
        text: String,
        /// Whether the comment followed content on its line.
        is_inline: bool,
    },
}

/// A parsing event along with the range of input it was built from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Where it happened. Events built by hand for the emitter use an empty span.
    pub span: Span,
}

impl Event {
    /// Create an event.
    #[must_use]
    pub fn new(kind: EventKind, span: Span) -> Event {
        Event { kind, span }
    }

    /// Where the event starts.
    #[must_use]
    pub fn start(&self) -> Mark {
        self.span.start
    }

    /// Where the event ends.
    #[must_use]
    pub fn end(&self) -> Mark {
        self.span.end
    }

    /// How this event changes the structural depth: +1 for starts, -1 for ends, 0 otherwise.
    #[must_use]
    pub fn nesting_increase(&self) -> i32 {
        match self.kind {
            EventKind::StreamStart
            | EventKind::DocumentStart(_)
            | EventKind::SequenceStart(_)
            | EventKind::MappingStart(_) => 1,
            EventKind::StreamEnd
            | EventKind::DocumentEnd { .. }
            | EventKind::SequenceEnd
            | EventKind::MappingEnd => -1,
            EventKind::Alias(_) | EventKind::Scalar(_) | EventKind::Comment { .. } => 0,
        }
    }

    /// Whether the event is a comment.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, EventKind::Comment { .. })
    }

    /// Hand the event to a visitor.
    pub fn accept<V: EventVisitor + ?Sized>(self, visitor: &mut V) {
        let span = self.span;
        match self.kind {
            EventKind::StreamStart => visitor.on_stream_start(span),
            EventKind::StreamEnd => visitor.on_stream_end(span),
            EventKind::DocumentStart(doc) => visitor.on_document_start(doc, span),
            EventKind::DocumentEnd { is_implicit } => visitor.on_document_end(is_implicit, span),
            EventKind::Alias(anchor) => visitor.on_alias(anchor, span),
            EventKind::Scalar(scalar) => visitor.on_scalar(scalar, span),
            EventKind::SequenceStart(start) => visitor.on_sequence_start(start, span),
            EventKind::SequenceEnd => visitor.on_sequence_end(span),
            EventKind::MappingStart(start) => visitor.on_mapping_start(start, span),
            EventKind::MappingEnd => visitor.on_mapping_end(span),
            EventKind::Comment { text, is_inline } => visitor.on_comment(text, is_inline, span),
        }
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Event::new(kind, Span::default())
    }
}

/// Callback interface driven by the parser, one call per event.
///
/// Every method has an empty default so implementors only handle what they care about.
pub trait EventVisitor {
    /// The stream started.
    fn on_stream_start(&mut self, _span: Span) {}
    /// The stream ended.
    fn on_stream_end(&mut self, _span: Span) {}
    /// A document started.
    fn on_document_start(&mut self, _document: DocumentStart, _span: Span) {}
    /// A document ended.
    fn on_document_end(&mut self, _is_implicit: bool, _span: Span) {}
    /// An alias was found.
    fn on_alias(&mut self, _anchor: AnchorName, _span: Span) {}
    /// A scalar was found.
    fn on_scalar(&mut self, _scalar: ScalarEvent, _span: Span) {}
    /// A sequence started.
    fn on_sequence_start(&mut self, _start: CollectionStart, _span: Span) {}
    /// A sequence ended.
    fn on_sequence_end(&mut self, _span: Span) {}
    /// A mapping started.
    fn on_mapping_start(&mut self, _start: CollectionStart, _span: Span) {}
    /// A mapping ended.
    fn on_mapping_end(&mut self, _span: Span) {}
    /// A comment was found.
    fn on_comment(&mut self, _text: String, _is_inline: bool, _span: Span) {}
}

/// Materializes every callback into an [`Event`].
impl EventVisitor for VecDeque<Event> {
    fn on_stream_start(&mut self, span: Span) {
        self.push_back(Event::new(EventKind::StreamStart, span));
    }

    fn on_stream_end(&mut self, span: Span) {
        self.push_back(Event::new(EventKind::StreamEnd, span));
    }

    fn on_document_start(&mut self, document: DocumentStart, span: Span) {
        self.push_back(Event::new(EventKind::DocumentStart(document), span));
    }

    fn on_document_end(&mut self, is_implicit: bool, span: Span) {
        self.push_back(Event::new(EventKind::DocumentEnd { is_implicit }, span));
    }

    fn on_alias(&mut self, anchor: AnchorName, span: Span) {
        self.push_back(Event::new(EventKind::Alias(anchor), span));
    }

    fn on_scalar(&mut self, scalar: ScalarEvent, span: Span) {
        self.push_back(Event::new(EventKind::Scalar(scalar), span));
    }

    fn on_sequence_start(&mut self, start: CollectionStart, span: Span) {
        self.push_back(Event::new(EventKind::SequenceStart(start), span));
    }

    fn on_sequence_end(&mut self, span: Span) {
        self.push_back(Event::new(EventKind::SequenceEnd, span));
    }

    fn on_mapping_start(&mut self, start: CollectionStart, span: Span) {
        self.push_back(Event::new(EventKind::MappingStart(start), span));
    }

    fn on_mapping_end(&mut self, span: Span) {
        self.push_back(Event::new(EventKind::MappingEnd, span));
    }

    fn on_comment(&mut self, text: String, is_inline: bool, span: Span) {
        self.push_back(Event::new(EventKind::Comment { text, is_inline }, span));
    }
}

/// Trait to be implemented in order to use the event-based loading API.
///
/// See [`crate::parser::Parser::load`].
pub trait EventReceiver {
    /// Handler called for each YAML event that is emitted by the parser.
    fn on_event(&mut self, ev: Event);
}

impl EventReceiver for Vec<Event> {
    fn on_event(&mut self, ev: Event) {
        self.push(ev);
    }
}
