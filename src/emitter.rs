//! YAML serialization of event streams.
//!
//! The [`Emitter`] is the counterpart of the [`crate::parser::Parser`]: it accepts events one at a
//! time and writes YAML text. It keeps a short window of upcoming events so it can tell an empty
//! collection from a non-empty one before committing to a style.

use std::collections::VecDeque;
use std::fmt;
use std::mem;

use thiserror::Error;

use crate::char_traits::{is_alpha, is_blank, is_bom, is_printable, is_space, is_unicode_break};
use crate::event::{CollectionStyle, Event, EventKind, ScalarEvent};
use crate::names::{TagDirectiveCollection, TagName};
use crate::scanner::ScalarStyle;
use crate::schema::{AncestorPath, EventDecorator};

/// An error when emitting YAML.
#[derive(Error, Debug)]
pub enum EmitError {
    /// A formatting error from the underlying writer.
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
    /// An event arrived where the stream structure does not allow it.
    #[error("expected {expected}, found {found}")]
    UnexpectedEvent {
        /// What the emitter was waiting for.
        expected: &'static str,
        /// What it got.
        found: &'static str,
    },
    /// The emitter settings are out of range.
    #[error("invalid emitter settings: {0}")]
    InvalidSettings(String),
    /// A tag cannot be written.
    #[error("invalid tag: {0}")]
    InvalidTag(String),
    /// An anchor or alias cannot be written.
    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),
    /// A `%TAG` directive cannot be written.
    #[error("invalid directive: {0}")]
    InvalidDirective(String),
    /// The `%YAML` directive is not 1.x.
    #[error("incompatible %YAML directive")]
    IncompatibleVersion,
}

/// A convenience alias for emitter functions that may fail without returning a value.
pub type EmitResult = Result<(), EmitError>;

/// How the emitter lays out its output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitterSettings {
    /// Indentation step, between 2 and 9.
    pub best_indent: usize,
    /// Preferred line width. Must exceed twice the indentation.
    pub best_width: usize,
    /// Write the canonical form: explicit tags, flow collections, double quotes.
    pub canonical: bool,
    /// Write non-ASCII characters as-is. When off they are escaped in double quotes.
    pub unicode: bool,
    /// Longest key written without the `?` indicator.
    pub max_simple_key_length: usize,
    /// Write the comment events.
    pub emit_comments: bool,
    /// Write anchors. When off, anchors are dropped and aliases are refused.
    pub emit_anchor_names: bool,
    /// Line terminator: `"\n"`, `"\r\n"` or `"\r"`.
    pub newline: String,
    /// Indent block sequences nested in mappings.
    pub indent_sequences: bool,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        EmitterSettings {
            best_indent: 2,
            best_width: 80,
            canonical: false,
            unicode: true,
            max_simple_key_length: 1024,
            emit_comments: false,
            emit_anchor_names: true,
            newline: "\n".to_owned(),
            indent_sequences: false,
        }
    }
}

impl EmitterSettings {
    /// Set the indentation step.
    #[must_use]
    pub fn with_best_indent(mut self, best_indent: usize) -> Self {
        self.best_indent = best_indent;
        self
    }

    /// Set the preferred line width.
    #[must_use]
    pub fn with_best_width(mut self, best_width: usize) -> Self {
        self.best_width = best_width;
        self
    }

    /// Turn the canonical form on or off.
    #[must_use]
    pub fn with_canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Allow or escape non-ASCII characters.
    #[must_use]
    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    /// Set the longest simple key.
    #[must_use]
    pub fn with_max_simple_key_length(mut self, length: usize) -> Self {
        self.max_simple_key_length = length;
        self
    }

    /// Write or drop comment events.
    #[must_use]
    pub fn with_emit_comments(mut self, emit_comments: bool) -> Self {
        self.emit_comments = emit_comments;
        self
    }

    /// Write or drop anchors.
    #[must_use]
    pub fn with_emit_anchor_names(mut self, emit_anchor_names: bool) -> Self {
        self.emit_anchor_names = emit_anchor_names;
        self
    }

    /// Set the line terminator.
    #[must_use]
    pub fn with_newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// Indent block sequences nested in mappings.
    #[must_use]
    pub fn with_indent_sequences(mut self, indent_sequences: bool) -> Self {
        self.indent_sequences = indent_sequences;
        self
    }

    /// Check the settings are consistent.
    ///
    /// # Errors
    /// Returns [`EmitError::InvalidSettings`] describing the first offending setting.
    pub fn validate(&self) -> EmitResult {
        if !(2..=9).contains(&self.best_indent) {
            return Err(EmitError::InvalidSettings(format!(
                "best_indent must be between 2 and 9, got {}",
                self.best_indent
            )));
        }
        if self.best_width <= self.best_indent * 2 {
            return Err(EmitError::InvalidSettings(format!(
                "best_width must be greater than {}, got {}",
                self.best_indent * 2,
                self.best_width
            )));
        }
        if self.max_simple_key_length == 0 {
            return Err(EmitError::InvalidSettings(
                "max_simple_key_length must not be 0".to_owned(),
            ));
        }
        if !matches!(self.newline.as_str(), "\n" | "\r\n" | "\r") {
            return Err(EmitError::InvalidSettings(format!(
                "newline must be a line break, got {:?}",
                self.newline
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum EmitterState {
    StreamStart,
    FirstDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    FlowSequenceFirstItem,
    FlowSequenceItem,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    BlockSequenceFirstItem,
    BlockSequenceItem,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
    End,
}

#[derive(Debug)]
struct AnchorAnalysis {
    name: String,
    alias: bool,
}

#[derive(Debug)]
struct TagAnalysis {
    handle: Option<String>,
    suffix: String,
}

/// What a scalar's content allows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
struct ScalarAnalysis {
    length: usize,
    multiline: bool,
    flow_plain_allowed: bool,
    block_plain_allowed: bool,
    single_quoted_allowed: bool,
    block_allowed: bool,
}

/// The YAML serializer.
///
/// ```
/// # use yaml_stream::emitter::Emitter;
/// # use yaml_stream::event::{CollectionStart, CollectionStyle, DocumentStart, Event, EventKind, ScalarEvent};
/// let mut out = String::new();
/// {
///     let mut emitter = Emitter::new(&mut out);
///     for kind in [
///         EventKind::StreamStart,
///         EventKind::DocumentStart(DocumentStart::implicit()),
///         EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
///         EventKind::Scalar(ScalarEvent::new("key")),
///         EventKind::Scalar(ScalarEvent::new("value")),
///         EventKind::MappingEnd,
///         EventKind::DocumentEnd { is_implicit: true },
///         EventKind::StreamEnd,
///     ] {
///         emitter.emit(Event::from(kind)).unwrap();
///     }
/// }
/// assert_eq!(out, "key: value\n");
/// ```
#[allow(clippy::struct_excessive_bools)]
pub struct Emitter<'a> {
    writer: &'a mut dyn fmt::Write,
    settings: EmitterSettings,
    decorator: Option<Box<dyn EventDecorator + 'a>>,
    path: AncestorPath,

    events: VecDeque<Event>,
    states: Vec<EmitterState>,
    state: EmitterState,
    indents: Vec<Option<usize>>,
    indent: Option<usize>,
    tag_directives: TagDirectiveCollection,
    flow_level: usize,

    root_context: bool,
    sequence_context: bool,
    mapping_context: bool,
    simple_key_context: bool,

    line: usize,
    column: usize,
    whitespace: bool,
    indention: bool,
    /// 1 after an implicit document end, 2 after a block scalar keeping trailing lines.
    open_ended: u8,

    anchor: Option<AnchorAnalysis>,
    tag: Option<TagAnalysis>,
    scalar: ScalarAnalysis,
    pending_comments: Vec<(String, bool)>,
}

impl fmt::Debug for Emitter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("line", &self.line)
            .field("column", &self.column)
            .finish_non_exhaustive()
    }
}

impl<'a> Emitter<'a> {
    /// Create a new emitter serializing into `writer`, with the default settings.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Emitter<'a> {
        Emitter {
            writer,
            settings: EmitterSettings::default(),
            decorator: None,
            path: AncestorPath::new(),
            events: VecDeque::new(),
            states: Vec::new(),
            state: EmitterState::StreamStart,
            indents: Vec::new(),
            indent: None,
            tag_directives: TagDirectiveCollection::with_defaults(),
            flow_level: 0,
            root_context: false,
            sequence_context: false,
            mapping_context: false,
            simple_key_context: false,
            line: 0,
            column: 0,
            whitespace: true,
            indention: true,
            open_ended: 0,
            anchor: None,
            tag: None,
            scalar: ScalarAnalysis::default(),
            pending_comments: Vec::new(),
        }
    }

    /// Create a new emitter with the given settings.
    ///
    /// # Errors
    /// Returns [`EmitError::InvalidSettings`] if the settings do not validate.
    pub fn with_settings(
        writer: &'a mut dyn fmt::Write,
        settings: EmitterSettings,
    ) -> Result<Emitter<'a>, EmitError> {
        settings.validate()?;
        let mut emitter = Emitter::new(writer);
        emitter.settings = settings;
        Ok(emitter)
    }

    /// The settings in use.
    #[must_use]
    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    /// Turn the canonical form on or off.
    pub fn canonical(&mut self, canonical: bool) {
        self.settings.canonical = canonical;
    }

    /// Determine if this emitter writes the canonical form.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.settings.canonical
    }

    /// Write comment events or drop them.
    pub fn emit_comments(&mut self, emit_comments: bool) {
        self.settings.emit_comments = emit_comments;
    }

    /// Pass every event through `decorator` before writing it.
    pub fn set_decorator(&mut self, decorator: impl EventDecorator + 'a) {
        self.decorator = Some(Box::new(decorator));
    }

    /// Emit one event.
    ///
    /// Output may lag behind: the emitter holds back up to three events to choose collection
    /// styles.
    ///
    /// # Errors
    /// Returns an error when the event is misplaced or carries something that cannot be written,
    /// and when the writer fails.
    pub fn emit(&mut self, event: Event) -> EmitResult {
        let event = match self.decorator.as_mut() {
            Some(decorator) => decorator.decorate(event, &self.path),
            None => event,
        };
        self.path.advance(&event);
        self.events.push_back(event);
        while !self.need_more_events() {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            if let EventKind::Comment { text, is_inline } = event.kind {
                if self.settings.emit_comments && self.flow_level == 0 {
                    self.pending_comments.push((text, is_inline));
                }
                continue;
            }
            self.analyze_event(&event)?;
            self.state_machine(&event)?;
        }
        Ok(())
    }

    /// Whether the head of the queue can only be processed with more events behind it.
    fn need_more_events(&self) -> bool {
        let Some(head) = self.events.front() else {
            return true;
        };
        let accumulate = match head.kind {
            EventKind::DocumentStart(_) => 1,
            EventKind::SequenceStart(_) => 2,
            EventKind::MappingStart(_) => 3,
            _ => return false,
        };
        let structural = self.events.iter().filter(|ev| !ev.is_comment()).count();
        if structural > accumulate {
            return false;
        }
        let mut level = 0;
        for event in self.events.iter().filter(|ev| !ev.is_comment()) {
            level += event.nesting_increase();
            if level == 0 {
                return false;
            }
        }
        true
    }

    /// The next event in the window, comments aside.
    fn next_structural(&self) -> Option<&EventKind> {
        self.events
            .iter()
            .find(|ev| !ev.is_comment())
            .map(|ev| &ev.kind)
    }

    fn state_machine(&mut self, event: &Event) -> EmitResult {
        debug_print!(
            "\n\x1B[;35mEmitter state: {:?} <- {}\x1B[;0m",
            self.state,
            event_name(&event.kind)
        );
        match self.state {
            EmitterState::StreamStart => self.emit_stream_start(event),
            EmitterState::FirstDocumentStart => self.emit_document_start(event, true),
            EmitterState::DocumentStart => self.emit_document_start(event, false),
            EmitterState::DocumentContent => self.emit_document_content(event),
            EmitterState::DocumentEnd => self.emit_document_end(event),
            EmitterState::FlowSequenceFirstItem => self.emit_flow_sequence_item(event, true),
            EmitterState::FlowSequenceItem => self.emit_flow_sequence_item(event, false),
            EmitterState::FlowMappingFirstKey => self.emit_flow_mapping_key(event, true),
            EmitterState::FlowMappingKey => self.emit_flow_mapping_key(event, false),
            EmitterState::FlowMappingSimpleValue => self.emit_flow_mapping_value(event, true),
            EmitterState::FlowMappingValue => self.emit_flow_mapping_value(event, false),
            EmitterState::BlockSequenceFirstItem => self.emit_block_sequence_item(event, true),
            EmitterState::BlockSequenceItem => self.emit_block_sequence_item(event, false),
            EmitterState::BlockMappingFirstKey => self.emit_block_mapping_key(event, true),
            EmitterState::BlockMappingKey => self.emit_block_mapping_key(event, false),
            EmitterState::BlockMappingSimpleValue => self.emit_block_mapping_value(event, true),
            EmitterState::BlockMappingValue => self.emit_block_mapping_value(event, false),
            EmitterState::End => Err(unexpected("nothing after STREAM-END", event)),
        }
    }

    fn pop_state(&mut self) {
        self.state = self.states.pop().unwrap_or(EmitterState::End);
    }

    fn pop_indent(&mut self) {
        self.indent = self.indents.pop().flatten();
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        self.indent = Some(match self.indent {
            None if flow => self.settings.best_indent,
            None => 0,
            Some(indent) if indentless => indent,
            Some(indent) => indent + self.settings.best_indent,
        });
    }

    fn emit_stream_start(&mut self, event: &Event) -> EmitResult {
        if !matches!(event.kind, EventKind::StreamStart) {
            return Err(unexpected("STREAM-START", event));
        }
        self.indent = None;
        self.line = 0;
        self.column = 0;
        self.whitespace = true;
        self.indention = true;
        self.state = EmitterState::FirstDocumentStart;
        Ok(())
    }

    fn emit_document_start(&mut self, event: &Event, first: bool) -> EmitResult {
        match &event.kind {
            EventKind::DocumentStart(document) => {
                if let Some(version) = document.version {
                    if version.major != 1 {
                        return Err(EmitError::IncompatibleVersion);
                    }
                }
                for (handle, prefix) in document.tags.explicit() {
                    analyze_tag_directive(handle, prefix)?;
                }
                self.tag_directives = document.tags.clone();
                self.tag_directives.add_defaults();

                let has_directives =
                    document.version.is_some() || document.tags.explicit().next().is_some();
                let mut implicit = document.is_implicit && first && !self.settings.canonical;

                self.write_comments()?;
                if has_directives && self.open_ended != 0 {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }
                self.open_ended = 0;

                if let Some(version) = document.version {
                    implicit = false;
                    self.write_indicator("%YAML", true, false, false)?;
                    self.write_indicator(&version.to_string(), true, false, false)?;
                    self.write_indent()?;
                }
                let explicit: Vec<(String, String)> = document
                    .tags
                    .explicit()
                    .map(|(handle, prefix)| (handle.to_owned(), prefix.to_owned()))
                    .collect();
                for (handle, prefix) in explicit {
                    implicit = false;
                    self.write_indicator("%TAG", true, false, false)?;
                    self.write_tag_handle(&handle)?;
                    self.write_tag_content(&prefix, true, true)?;
                    self.write_indent()?;
                }

                if !implicit {
                    self.write_indent()?;
                    self.write_indicator("---", true, false, false)?;
                    if self.settings.canonical {
                        self.write_indent()?;
                    }
                }
                self.state = EmitterState::DocumentContent;
                self.open_ended = 0;
                Ok(())
            }
            EventKind::StreamEnd => {
                self.write_comments()?;
                // A kept trailing line break needs a marker to end the stream cleanly.
                if self.open_ended == 2 {
                    self.write_indicator("...", true, false, false)?;
                    self.open_ended = 0;
                    self.write_indent()?;
                }
                self.state = EmitterState::End;
                Ok(())
            }
            _ => Err(unexpected("DOCUMENT-START or STREAM-END", event)),
        }
    }

    fn emit_document_content(&mut self, event: &Event) -> EmitResult {
        self.states.push(EmitterState::DocumentEnd);
        self.emit_node(event, true, false, false, false)
    }

    fn emit_document_end(&mut self, event: &Event) -> EmitResult {
        let EventKind::DocumentEnd { is_implicit } = event.kind else {
            return Err(unexpected("DOCUMENT-END", event));
        };
        self.write_indent()?;
        self.write_comments()?;
        if is_implicit {
            if self.open_ended == 0 {
                self.open_ended = 1;
            }
        } else {
            self.write_indent()?;
            self.write_indicator("...", true, false, false)?;
            self.open_ended = 0;
            self.write_indent()?;
        }
        self.state = EmitterState::DocumentStart;
        self.tag_directives = TagDirectiveCollection::with_defaults();
        Ok(())
    }

    fn emit_flow_sequence_item(&mut self, event: &Event, first: bool) -> EmitResult {
        if first {
            self.write_indicator("[", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.kind, EventKind::SequenceEnd) {
            self.flow_level -= 1;
            self.pop_indent();
            if self.settings.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("]", false, false, false)?;
            self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.settings.canonical || self.column > self.settings.best_width {
            self.write_indent()?;
        }
        self.states.push(EmitterState::FlowSequenceItem);
        self.emit_node(event, false, true, false, false)
    }

    fn emit_flow_mapping_key(&mut self, event: &Event, first: bool) -> EmitResult {
        if first {
            self.write_indicator("{", true, true, false)?;
            self.increase_indent(true, false);
            self.flow_level += 1;
        }
        if matches!(event.kind, EventKind::MappingEnd) {
            self.flow_level -= 1;
            self.pop_indent();
            if self.settings.canonical && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("}", false, false, false)?;
            self.pop_state();
            return Ok(());
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.settings.canonical || self.column > self.settings.best_width {
            self.write_indent()?;
        }
        if !self.settings.canonical && self.check_simple_key(event) {
            self.states.push(EmitterState::FlowMappingSimpleValue);
            self.emit_node(event, false, false, true, true)
        } else {
            self.write_indicator("?", true, false, false)?;
            self.states.push(EmitterState::FlowMappingValue);
            self.emit_node(event, false, false, true, false)
        }
    }

    fn emit_flow_mapping_value(&mut self, event: &Event, simple: bool) -> EmitResult {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            if self.settings.canonical || self.column > self.settings.best_width {
                self.write_indent()?;
            }
            self.write_indicator(":", true, false, false)?;
        }
        self.states.push(EmitterState::FlowMappingKey);
        self.emit_node(event, false, false, true, false)
    }

    fn emit_block_sequence_item(&mut self, event: &Event, first: bool) -> EmitResult {
        if first {
            let indentless =
                self.mapping_context && !self.indention && !self.settings.indent_sequences;
            self.increase_indent(false, indentless);
        }
        if matches!(event.kind, EventKind::SequenceEnd) {
            self.pop_indent();
            self.pop_state();
            return Ok(());
        }
        self.write_comments()?;
        self.write_indent()?;
        self.write_indicator("-", true, false, true)?;
        self.states.push(EmitterState::BlockSequenceItem);
        self.emit_node(event, false, true, false, false)
    }

    fn emit_block_mapping_key(&mut self, event: &Event, first: bool) -> EmitResult {
        if first {
            self.increase_indent(false, false);
        }
        if matches!(event.kind, EventKind::MappingEnd) {
            self.pop_indent();
            self.pop_state();
            return Ok(());
        }
        self.write_comments()?;
        self.write_indent()?;
        if self.check_simple_key(event) {
            self.states.push(EmitterState::BlockMappingSimpleValue);
            self.emit_node(event, false, false, true, true)
        } else {
            self.write_indicator("?", true, false, true)?;
            self.states.push(EmitterState::BlockMappingValue);
            self.emit_node(event, false, false, true, false)
        }
    }

    fn emit_block_mapping_value(&mut self, event: &Event, simple: bool) -> EmitResult {
        if simple {
            self.write_indicator(":", false, false, false)?;
        } else {
            self.write_indent()?;
            self.write_indicator(":", true, false, true)?;
        }
        self.states.push(EmitterState::BlockMappingKey);
        self.emit_node(event, false, false, true, false)
    }

    fn emit_node(
        &mut self,
        event: &Event,
        root: bool,
        sequence: bool,
        mapping: bool,
        simple_key: bool,
    ) -> EmitResult {
        self.root_context = root;
        self.sequence_context = sequence;
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;

        match &event.kind {
            EventKind::Alias(_) => self.emit_alias(),
            EventKind::Scalar(scalar) => self.emit_scalar(scalar),
            EventKind::SequenceStart(start) => {
                self.process_anchor()?;
                self.process_tag()?;
                let empty = matches!(self.next_structural(), Some(EventKind::SequenceEnd));
                self.state = if self.flow_level > 0
                    || self.settings.canonical
                    || start.style == CollectionStyle::Flow
                    || empty
                {
                    EmitterState::FlowSequenceFirstItem
                } else {
                    EmitterState::BlockSequenceFirstItem
                };
                Ok(())
            }
            EventKind::MappingStart(start) => {
                self.process_anchor()?;
                self.process_tag()?;
                let empty = matches!(self.next_structural(), Some(EventKind::MappingEnd));
                self.state = if self.flow_level > 0
                    || self.settings.canonical
                    || start.style == CollectionStyle::Flow
                    || empty
                {
                    EmitterState::FlowMappingFirstKey
                } else {
                    EmitterState::BlockMappingFirstKey
                };
                Ok(())
            }
            _ => Err(unexpected(
                "SCALAR, SEQUENCE-START, MAPPING-START, or ALIAS",
                event,
            )),
        }
    }

    fn emit_alias(&mut self) -> EmitResult {
        self.process_anchor()?;
        if self.simple_key_context {
            // `*a:` would read as an alias named `a:`.
            self.put(' ')?;
        }
        self.pop_state();
        Ok(())
    }

    fn emit_scalar(&mut self, scalar: &ScalarEvent) -> EmitResult {
        let style = self.select_scalar_style(scalar)?;
        self.process_anchor()?;
        self.process_tag()?;
        self.increase_indent(true, false);
        self.process_scalar(&scalar.value, style)?;
        self.pop_indent();
        self.pop_state();
        Ok(())
    }

    fn check_simple_key(&self, event: &Event) -> bool {
        let properties = self.anchor.as_ref().map_or(0, |a| a.name.chars().count())
            + self.tag.as_ref().map_or(0, |t| {
                t.handle.as_ref().map_or(0, |h| h.chars().count()) + t.suffix.chars().count()
            });
        let length = match &event.kind {
            EventKind::Alias(_) => properties,
            EventKind::Scalar(_) => {
                if self.scalar.multiline {
                    return false;
                }
                properties + self.scalar.length
            }
            EventKind::SequenceStart(_) => {
                if !matches!(self.next_structural(), Some(EventKind::SequenceEnd)) {
                    return false;
                }
                properties
            }
            EventKind::MappingStart(_) => {
                if !matches!(self.next_structural(), Some(EventKind::MappingEnd)) {
                    return false;
                }
                properties
            }
            _ => return false,
        };
        length <= self.settings.max_simple_key_length
    }

    fn select_scalar_style(&mut self, scalar: &ScalarEvent) -> Result<ScalarStyle, EmitError> {
        let no_tag = self.tag.is_none();
        if no_tag && !scalar.is_plain_implicit && !scalar.is_quoted_implicit {
            return Err(EmitError::InvalidTag(
                "neither tag nor implicit flags are specified".to_owned(),
            ));
        }

        let analysis = self.scalar;
        let mut style = scalar.style;
        if style == ScalarStyle::Any {
            style = if analysis.multiline
                && analysis.block_allowed
                && self.flow_level == 0
                && !self.simple_key_context
            {
                ScalarStyle::Literal
            } else {
                ScalarStyle::Plain
            };
        }
        if self.settings.canonical {
            style = ScalarStyle::DoubleQuoted;
        }
        if self.simple_key_context && analysis.multiline {
            style = ScalarStyle::DoubleQuoted;
        }

        if style == ScalarStyle::Plain {
            if (self.flow_level > 0 && !analysis.flow_plain_allowed)
                || (self.flow_level == 0 && !analysis.block_plain_allowed)
            {
                style = ScalarStyle::SingleQuoted;
            }
            if analysis.length == 0 && (self.flow_level > 0 || self.simple_key_context) {
                style = ScalarStyle::SingleQuoted;
            }
            if no_tag && !scalar.is_plain_implicit {
                style = ScalarStyle::SingleQuoted;
            }
        }
        if style == ScalarStyle::SingleQuoted && !analysis.single_quoted_allowed {
            style = ScalarStyle::DoubleQuoted;
        }
        if matches!(style, ScalarStyle::Literal | ScalarStyle::Folded)
            && (!analysis.block_allowed || self.flow_level > 0 || self.simple_key_context)
        {
            style = ScalarStyle::DoubleQuoted;
        }

        if no_tag && !scalar.is_quoted_implicit && style != ScalarStyle::Plain {
            self.tag = Some(TagAnalysis {
                handle: Some("!".to_owned()),
                suffix: String::new(),
            });
        }
        Ok(style)
    }

    fn process_anchor(&mut self) -> EmitResult {
        let Some(anchor) = self.anchor.take() else {
            return Ok(());
        };
        let indicator = if anchor.alias { "*" } else { "&" };
        self.write_indicator(indicator, true, false, false)?;
        self.write_str(&anchor.name)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn process_tag(&mut self) -> EmitResult {
        let Some(tag) = self.tag.take() else {
            return Ok(());
        };
        if let Some(handle) = tag.handle {
            self.write_tag_handle(&handle)?;
            if !tag.suffix.is_empty() {
                self.write_tag_content(&tag.suffix, false, false)?;
            }
        } else {
            self.write_indicator("!<", true, false, false)?;
            self.write_tag_content(&tag.suffix, false, true)?;
            self.write_indicator(">", false, false, false)?;
        }
        Ok(())
    }

    fn process_scalar(&mut self, value: &str, style: ScalarStyle) -> EmitResult {
        match style {
            ScalarStyle::Any | ScalarStyle::Plain => {
                self.write_plain_scalar(value, !self.simple_key_context)
            }
            ScalarStyle::SingleQuoted => {
                self.write_single_quoted_scalar(value, !self.simple_key_context)
            }
            ScalarStyle::DoubleQuoted => {
                self.write_double_quoted_scalar(value, !self.simple_key_context)
            }
            ScalarStyle::Literal => self.write_literal_scalar(value),
            ScalarStyle::Folded => self.write_folded_scalar(value),
        }
    }

    fn analyze_event(&mut self, event: &Event) -> EmitResult {
        self.anchor = None;
        self.tag = None;
        self.scalar = ScalarAnalysis::default();

        match &event.kind {
            EventKind::Alias(anchor) => {
                if !self.settings.emit_anchor_names {
                    return Err(EmitError::InvalidAnchor(
                        "aliases cannot be written when anchor names are disabled".to_owned(),
                    ));
                }
                self.analyze_anchor(anchor.as_str(), true)
            }
            EventKind::Scalar(scalar) => {
                if !scalar.anchor.is_empty() {
                    self.analyze_anchor(scalar.anchor.as_str(), false)?;
                }
                if !scalar.tag.is_empty()
                    && (self.settings.canonical
                        || (!scalar.is_plain_implicit && !scalar.is_quoted_implicit))
                {
                    self.analyze_tag(&scalar.tag)?;
                }
                self.scalar = analyze_scalar(&scalar.value, self.settings.unicode);
                Ok(())
            }
            EventKind::SequenceStart(start) | EventKind::MappingStart(start) => {
                if !start.anchor.is_empty() {
                    self.analyze_anchor(start.anchor.as_str(), false)?;
                }
                if !start.tag.is_empty() && (self.settings.canonical || !start.is_implicit) {
                    self.analyze_tag(&start.tag)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn analyze_anchor(&mut self, name: Option<&str>, alias: bool) -> EmitResult {
        if !self.settings.emit_anchor_names {
            return Ok(());
        }
        let name = name.unwrap_or_default();
        if name.is_empty() || !crate::names::AnchorName::new(name).is_valid() {
            return Err(EmitError::InvalidAnchor(format!(
                "{} `{name}` cannot be written",
                if alias { "alias" } else { "anchor" }
            )));
        }
        self.anchor = Some(AnchorAnalysis {
            name: name.to_owned(),
            alias,
        });
        Ok(())
    }

    /// Split `tag` into the handle with the longest matching prefix and the rest.
    fn analyze_tag(&mut self, tag: &TagName) -> EmitResult {
        let tag = tag.as_str().unwrap_or_default();
        if tag.is_empty() {
            return Err(EmitError::InvalidTag("tag value must not be empty".to_owned()));
        }
        let shorthand = self
            .tag_directives
            .iter()
            .filter(|(_, prefix)| !prefix.is_empty() && prefix.len() < tag.len())
            .filter(|(_, prefix)| tag.starts_with(prefix))
            .max_by_key(|(_, prefix)| prefix.len());
        self.tag = Some(match shorthand {
            Some((handle, prefix)) => TagAnalysis {
                handle: Some(handle.to_owned()),
                suffix: tag[prefix.len()..].to_owned(),
            },
            None => TagAnalysis {
                handle: None,
                suffix: tag.to_owned(),
            },
        });
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> EmitResult {
        self.writer.write_str(s)?;
        self.column += s.chars().count();
        Ok(())
    }

    fn put(&mut self, c: char) -> EmitResult {
        self.writer.write_char(c)?;
        self.column += 1;
        Ok(())
    }

    fn put_break(&mut self) -> EmitResult {
        self.writer.write_str(&self.settings.newline)?;
        self.column = 0;
        self.line += 1;
        Ok(())
    }

    fn write_indent(&mut self) -> EmitResult {
        let indent = self.indent.unwrap_or(0);
        if !self.indention || self.column > indent || (self.column == indent && !self.whitespace)
        {
            self.put_break()?;
        }
        while self.column < indent {
            self.put(' ')?;
        }
        self.whitespace = true;
        self.indention = true;
        Ok(())
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        is_whitespace: bool,
        is_indention: bool,
    ) -> EmitResult {
        if need_whitespace && !self.whitespace {
            self.put(' ')?;
        }
        self.write_str(indicator)?;
        self.whitespace = is_whitespace;
        self.indention = self.indention && is_indention;
        self.open_ended = 0;
        Ok(())
    }

    fn write_tag_handle(&mut self, handle: &str) -> EmitResult {
        if !self.whitespace {
            self.put(' ')?;
        }
        self.write_str(handle)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    /// Write a tag suffix or prefix, percent-encoding what a tag cannot hold.
    ///
    /// Flow indicators are only left as-is inside `!<...>`.
    fn write_tag_content(&mut self, value: &str, need_whitespace: bool, verbatim: bool) -> EmitResult {
        if need_whitespace && !self.whitespace {
            self.put(' ')?;
        }
        for c in value.chars() {
            let plain = is_alpha(c)
                || matches!(
                    c,
                    ';' | '/' | '?' | ':' | '@' | '&' | '=' | '+' | '$' | '.' | '~' | '*' | '\''
                        | '(' | ')' | '!' | '#'
                )
                || (verbatim && matches!(c, ',' | '[' | ']'));
            if plain {
                self.put(c)?;
            } else {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    self.write_str(&format!("%{byte:02X}"))?;
                }
            }
        }
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    /// Write the pending comments, each on its own line.
    fn write_comments(&mut self) -> EmitResult {
        if self.pending_comments.is_empty() {
            return Ok(());
        }
        for (text, is_inline) in mem::take(&mut self.pending_comments) {
            if !(is_inline && self.column > 0 && !self.indention) {
                self.write_indent()?;
            }
            let comment = if text.is_empty() {
                "#".to_owned()
            } else {
                format!("# {text}")
            };
            self.write_indicator(&comment, true, false, false)?;
            self.put_break()?;
            self.whitespace = true;
            self.indention = true;
        }
        Ok(())
    }

    fn write_plain_scalar(&mut self, value: &str, allow_breaks: bool) -> EmitResult {
        // Avoid trailing spaces for empty values in block mode.
        if !self.whitespace && (!value.is_empty() || self.flow_level > 0) {
            self.put(' ')?;
        }
        let chars: Vec<char> = value.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        for (i, &c) in chars.iter().enumerate() {
            if is_space(c) {
                let next_is_space = chars.get(i + 1).copied().is_some_and(is_space);
                if allow_breaks && !spaces && self.column > self.settings.best_width && !next_is_space
                {
                    self.write_indent()?;
                } else {
                    self.put(c)?;
                }
                spaces = true;
            } else if c == '\n' {
                if !breaks {
                    self.put_break()?;
                }
                self.put_break()?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.put(c)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        self.whitespace = false;
        self.indention = false;
        if self.root_context {
            self.open_ended = 1;
        }
        Ok(())
    }

    fn write_single_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> EmitResult {
        self.write_indicator("'", true, false, false)?;
        let chars: Vec<char> = value.chars().collect();
        let last = chars.len().saturating_sub(1);
        let mut spaces = false;
        let mut breaks = false;
        for (i, &c) in chars.iter().enumerate() {
            if is_space(c) {
                let next_is_space = chars.get(i + 1).copied().is_some_and(is_space);
                if allow_breaks
                    && !spaces
                    && self.column > self.settings.best_width
                    && i != 0
                    && i != last
                    && !next_is_space
                {
                    self.write_indent()?;
                } else {
                    self.put(c)?;
                }
                spaces = true;
            } else if c == '\n' {
                if !breaks {
                    self.put_break()?;
                }
                self.put_break()?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                if c == '\'' {
                    self.put('\'')?;
                }
                self.put(c)?;
                self.indention = false;
                spaces = false;
                breaks = false;
            }
        }
        if breaks {
            self.write_indent()?;
        }
        self.write_indicator("'", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_double_quoted_scalar(&mut self, value: &str, allow_breaks: bool) -> EmitResult {
        self.write_indicator("\"", true, false, false)?;
        let chars: Vec<char> = value.chars().collect();
        let last = chars.len().saturating_sub(1);
        let mut spaces = false;
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if needs_escape(c, self.settings.unicode) {
                self.put('\\')?;
                match c {
                    '\0' => self.put('0')?,
                    '\x07' => self.put('a')?,
                    '\x08' => self.put('b')?,
                    '\t' => self.put('t')?,
                    '\n' => self.put('n')?,
                    '\x0b' => self.put('v')?,
                    '\x0c' => self.put('f')?,
                    '\r' => self.put('r')?,
                    '\x1b' => self.put('e')?,
                    '"' => self.put('"')?,
                    '\\' => self.put('\\')?,
                    '\u{85}' => self.put('N')?,
                    '\u{a0}' => self.put('_')?,
                    '\u{2028}' => self.put('L')?,
                    '\u{2029}' => self.put('P')?,
                    _ => {
                        let code = u32::from(c);
                        let escaped = if code <= 0xFF {
                            format!("x{code:02X}")
                        } else if code <= 0xFFFF {
                            format!("u{code:04X}")
                        } else {
                            format!("U{code:08X}")
                        };
                        self.write_str(&escaped)?;
                    }
                }
                spaces = false;
            } else if is_space(c) {
                if allow_breaks
                    && !spaces
                    && self.column > self.settings.best_width
                    && i != 0
                    && i != last
                {
                    self.write_indent()?;
                    if chars.get(i + 1).copied().is_some_and(is_space) {
                        self.put('\\')?;
                    }
                } else {
                    self.put(c)?;
                }
                spaces = true;
            } else {
                self.put(c)?;
                spaces = false;
            }
            i += 1;
        }
        self.write_indicator("\"", false, false, false)?;
        self.whitespace = false;
        self.indention = false;
        Ok(())
    }

    fn write_block_scalar_hints(&mut self, value: &str) -> EmitResult {
        let mut chars = value.chars();
        if let Some(first) = chars.clone().next() {
            if is_space(first) || first == '\n' {
                let hint = self.settings.best_indent.to_string();
                self.write_indicator(&hint, false, false, false)?;
            }
        }
        self.open_ended = 0;

        let last = chars.next_back();
        let before_last = chars.next_back();
        let chomp = match (last, before_last) {
            (None, _) => Some("-"),
            (Some(last), _) if last != '\n' => Some("-"),
            (Some(_), None) | (Some(_), Some('\n')) => {
                self.open_ended = 2;
                Some("+")
            }
            _ => None,
        };
        if let Some(chomp) = chomp {
            self.write_indicator(chomp, false, false, false)?;
        }
        Ok(())
    }

    fn write_literal_scalar(&mut self, value: &str) -> EmitResult {
        self.write_indicator("|", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;
        let mut breaks = true;
        for c in value.chars() {
            if c == '\n' {
                self.put_break()?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                }
                self.put(c)?;
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }

    fn write_folded_scalar(&mut self, value: &str) -> EmitResult {
        self.write_indicator(">", true, false, false)?;
        self.write_block_scalar_hints(value)?;
        self.put_break()?;
        self.indention = true;
        self.whitespace = true;

        let chars: Vec<char> = value.chars().collect();
        let mut breaks = true;
        let mut leading_spaces = true;
        for (i, &c) in chars.iter().enumerate() {
            if c == '\n' {
                if !breaks && !leading_spaces {
                    // A single break would fold into a space; double it unless the next text
                    // line is more indented or there is none.
                    let after = chars[i..].iter().find(|&&c| c != '\n');
                    if after.is_some_and(|&c| !is_blank(c)) {
                        self.put_break()?;
                    }
                }
                self.put_break()?;
                self.indention = true;
                breaks = true;
            } else {
                if breaks {
                    self.write_indent()?;
                    leading_spaces = is_blank(c);
                }
                let next_is_space = chars.get(i + 1).copied().is_some_and(is_space);
                if !breaks
                    && is_space(c)
                    && !next_is_space
                    && self.column > self.settings.best_width
                {
                    self.write_indent()?;
                } else {
                    self.put(c)?;
                }
                self.indention = false;
                breaks = false;
            }
        }
        Ok(())
    }
}

fn unexpected(expected: &'static str, event: &Event) -> EmitError {
    EmitError::UnexpectedEvent {
        expected,
        found: event_name(&event.kind),
    }
}

fn event_name(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::StreamStart => "STREAM-START",
        EventKind::StreamEnd => "STREAM-END",
        EventKind::DocumentStart(_) => "DOCUMENT-START",
        EventKind::DocumentEnd { .. } => "DOCUMENT-END",
        EventKind::Alias(_) => "ALIAS",
        EventKind::Scalar(_) => "SCALAR",
        EventKind::SequenceStart(_) => "SEQUENCE-START",
        EventKind::SequenceEnd => "SEQUENCE-END",
        EventKind::MappingStart(_) => "MAPPING-START",
        EventKind::MappingEnd => "MAPPING-END",
        EventKind::Comment { .. } => "COMMENT",
    }
}

fn analyze_tag_directive(handle: &str, prefix: &str) -> EmitResult {
    if handle.is_empty() {
        return Err(EmitError::InvalidDirective(
            "tag handle must not be empty".to_owned(),
        ));
    }
    if !handle.starts_with('!') || !handle.ends_with('!') {
        return Err(EmitError::InvalidDirective(format!(
            "tag handle `{handle}` must start and end with '!'"
        )));
    }
    if handle.len() > 2 && !handle[1..handle.len() - 1].chars().all(is_alpha) {
        return Err(EmitError::InvalidDirective(format!(
            "tag handle `{handle}` must contain alphanumerical characters only"
        )));
    }
    if prefix.is_empty() {
        return Err(EmitError::InvalidDirective(
            "tag prefix must not be empty".to_owned(),
        ));
    }
    Ok(())
}

/// Whether `c` must be written as an escape sequence in a double-quoted scalar.
fn needs_escape(c: char, unicode: bool) -> bool {
    !is_printable(c)
        || (!unicode && !c.is_ascii())
        || is_bom(c)
        || matches!(c, '\t' | '\n' | '\r' | '"' | '\\')
        || is_unicode_break(c)
}

/// Find out which styles can hold `value` without loss.
fn analyze_scalar(value: &str, unicode: bool) -> ScalarAnalysis {
    let chars: Vec<char> = value.chars().collect();
    if chars.is_empty() {
        return ScalarAnalysis {
            length: 0,
            multiline: false,
            flow_plain_allowed: false,
            block_plain_allowed: true,
            single_quoted_allowed: true,
            block_allowed: false,
        };
    }

    let mut block_indicators = false;
    let mut flow_indicators = false;
    let mut line_breaks = false;
    let mut special_characters = false;

    let mut leading_space = false;
    let mut leading_break = false;
    let mut trailing_space = false;
    let mut trailing_break = false;
    let mut break_space = false;
    let mut space_break = false;

    let mut previous_space = false;
    let mut previous_break = false;

    if value.starts_with("---") || value.starts_with("...") {
        block_indicators = true;
        flow_indicators = true;
    }

    let blank_or_end = |i: usize| chars.get(i).map_or(true, |&c| is_blank(c) || c == '\n');
    let mut preceded_by_whitespace = true;
    let last = chars.len() - 1;

    for (i, &c) in chars.iter().enumerate() {
        let followed_by_whitespace = blank_or_end(i + 1);
        if i == 0 {
            match c {
                '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"'
                | '%' | '@' | '`' => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                '?' | ':' => {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                '-' if followed_by_whitespace => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                _ => {}
            }
        } else {
            match c {
                ',' | '?' | '[' | ']' | '{' | '}' => flow_indicators = true,
                ':' => {
                    flow_indicators = true;
                    if followed_by_whitespace {
                        block_indicators = true;
                    }
                }
                '#' if preceded_by_whitespace => {
                    flow_indicators = true;
                    block_indicators = true;
                }
                _ => {}
            }
        }

        // Breaks other than `\n` do not survive line folding; only double quotes keep them.
        if !is_printable(c)
            || (!unicode && !c.is_ascii())
            || is_bom(c)
            || (is_unicode_break(c) && c != '\n')
        {
            special_characters = true;
        }
        if c == '\n' {
            line_breaks = true;
        }

        if is_blank(c) {
            if i == 0 {
                leading_space = true;
            }
            if i == last {
                trailing_space = true;
            }
            if previous_break {
                break_space = true;
            }
            previous_space = true;
            previous_break = false;
        } else if c == '\n' {
            if i == 0 {
                leading_break = true;
            }
            if i == last {
                trailing_break = true;
            }
            if previous_space {
                space_break = true;
            }
            previous_break = true;
            previous_space = false;
        } else {
            previous_space = false;
            previous_break = false;
        }

        preceded_by_whitespace = is_blank(c) || c == '\n';
    }

    let mut analysis = ScalarAnalysis {
        length: chars.len(),
        multiline: line_breaks,
        flow_plain_allowed: true,
        block_plain_allowed: true,
        single_quoted_allowed: true,
        block_allowed: true,
    };
    if leading_space || leading_break || trailing_space || trailing_break {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
    }
    if leading_space || trailing_space {
        analysis.block_allowed = false;
    }
    if break_space {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
        analysis.single_quoted_allowed = false;
    }
    if space_break || special_characters {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
        analysis.single_quoted_allowed = false;
        analysis.block_allowed = false;
    }
    if line_breaks {
        analysis.flow_plain_allowed = false;
        analysis.block_plain_allowed = false;
    }
    if flow_indicators {
        analysis.flow_plain_allowed = false;
    }
    if block_indicators {
        analysis.block_plain_allowed = false;
    }
    analysis
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{CollectionStart, DocumentStart};
    use crate::parser::Parser;

    fn emit_kinds(kinds: Vec<EventKind>) -> Result<String, EmitError> {
        let mut out = String::new();
        {
            let mut emitter = Emitter::new(&mut out);
            for kind in kinds {
                emitter.emit(Event::from(kind))?;
            }
        }
        Ok(out)
    }

    fn document(body: Vec<EventKind>) -> Vec<EventKind> {
        let mut kinds = vec![
            EventKind::StreamStart,
            EventKind::DocumentStart(DocumentStart::implicit()),
        ];
        kinds.extend(body);
        kinds.push(EventKind::DocumentEnd { is_implicit: true });
        kinds.push(EventKind::StreamEnd);
        kinds
    }

    fn block_sequence(items: Vec<EventKind>) -> Vec<EventKind> {
        let mut kinds = vec![EventKind::SequenceStart(CollectionStart::new(
            CollectionStyle::Block,
        ))];
        kinds.extend(items);
        kinds.push(EventKind::SequenceEnd);
        kinds
    }

    fn scalar(value: &str) -> EventKind {
        EventKind::Scalar(ScalarEvent::new(value))
    }

    fn parse_kinds(s: &str) -> Vec<EventKind> {
        Parser::new_from_str(s)
            .map(|ev| ev.map(|ev| ev.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_emit_simple() {
        let s = "
# comment
a0 bb: val
a1:
    b1: 4
    b2: d
a2: 4 # i'm comment
a3: [1, 2, 3]
a4:
    - - a1
      - a2
    - 2
    - []
    - {}
a5: 'single_quoted'
a6: \"double_quoted\"
a7: 你好
";
        let mut writer = String::new();
        {
            let mut emitter = Emitter::new(&mut writer);
            for event in Parser::new_from_str(s) {
                emitter.emit(event.unwrap()).unwrap();
            }
        }
        println!("original:\n{s}");
        println!("emitted:\n{writer}");
        assert_eq!(parse_kinds(s), parse_kinds(&writer));
    }

    #[test]
    fn test_plain_and_quoted() {
        let out = emit_kinds(document(block_sequence(vec![
            scalar("a"),
            scalar("- x"),
            scalar("key: value"),
            scalar(" leading"),
            scalar("it's"),
            scalar(""),
            scalar("tab\x07bell"),
        ])))
        .unwrap();
        assert_eq!(
            out,
            "- a\n- '- x'\n- 'key: value'\n- ' leading'\n- it's\n-\n- \"tab\\abell\"\n"
        );
    }

    #[test]
    fn test_multiline_any_is_literal() {
        let out = emit_kinds(document(vec![
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
            scalar("text"),
            scalar("multi\nline"),
            scalar("kept"),
            scalar("end\n\n"),
            EventKind::MappingEnd,
        ]))
        .unwrap();
        assert_eq!(out, "text: |-\n  multi\n  line\nkept: |+\n  end\n\n...\n");
        let reparsed = parse_kinds(&out);
        assert!(reparsed.iter().any(|kind| matches!(
            kind,
            EventKind::Scalar(s) if s.value == "multi\nline" && s.style == ScalarStyle::Literal
        )));
        assert!(reparsed
            .iter()
            .any(|kind| matches!(kind, EventKind::Scalar(s) if s.value == "end\n\n")));
    }

    #[test]
    fn test_block_sequence_in_mapping() {
        let mut body = vec![
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
            scalar("key"),
        ];
        body.extend(block_sequence(vec![scalar("item 1"), scalar("item 2")]));
        body.push(EventKind::MappingEnd);
        let out = emit_kinds(document(body.clone())).unwrap();
        assert_eq!(out, "key:\n- item 1\n- item 2\n");

        let mut out = String::new();
        {
            let settings = EmitterSettings::default().with_indent_sequences(true);
            let mut emitter = Emitter::with_settings(&mut out, settings).unwrap();
            for kind in document(body) {
                emitter.emit(Event::from(kind)).unwrap();
            }
        }
        assert_eq!(out, "key:\n  - item 1\n  - item 2\n");
    }

    #[test]
    fn test_flow_and_empty_collections() {
        let out = emit_kinds(document(block_sequence(vec![
            EventKind::SequenceStart(CollectionStart::new(CollectionStyle::Flow)),
            scalar("a"),
            scalar("b, c"),
            EventKind::SequenceEnd,
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Flow)),
            scalar("k"),
            scalar("v"),
            EventKind::MappingEnd,
            EventKind::SequenceStart(CollectionStart::new(CollectionStyle::Block)),
            EventKind::SequenceEnd,
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Any)),
            EventKind::MappingEnd,
        ])))
        .unwrap();
        assert_eq!(out, "- [a, 'b, c']\n- {k: v}\n- []\n- {}\n");
    }

    #[test]
    fn test_anchors_and_tags() {
        let out = emit_kinds(document(block_sequence(vec![
            EventKind::Scalar(ScalarEvent::new("x").with_anchor("a")),
            EventKind::Alias("a".into()),
            EventKind::Scalar(ScalarEvent::new("12").with_tag(crate::names::tags::STR)),
            EventKind::Scalar(ScalarEvent::new("y").with_tag("tag:example.com,2000:app/foo")),
            EventKind::Scalar(ScalarEvent::new("z").with_tag("!local")),
        ])))
        .unwrap();
        assert_eq!(
            out,
            "- &a x\n- *a\n- !!str 12\n- !<tag:example.com,2000:app/foo> y\n- !local z\n"
        );
    }

    #[test]
    fn test_anchor_names_disabled() {
        let settings = EmitterSettings::default().with_emit_anchor_names(false);
        let mut out = String::new();
        let mut emitter = Emitter::with_settings(&mut out, settings).unwrap();
        let mut result = Ok(());
        for kind in document(block_sequence(vec![
            EventKind::Scalar(ScalarEvent::new("x").with_anchor("a")),
            EventKind::Alias("a".into()),
        ])) {
            result = emitter.emit(Event::from(kind));
            if result.is_err() {
                break;
            }
        }
        assert!(matches!(result, Err(EmitError::InvalidAnchor(_))));
        drop(emitter);
        assert_eq!(out, "- x");
    }

    #[test]
    fn test_explicit_document_with_directives() {
        let mut start = DocumentStart::explicit();
        start.version = Some(crate::names::VersionDirective { major: 1, minor: 2 });
        start
            .tags
            .add(crate::names::TagDirective::new("!e!", "tag:example.com,2000:"))
            .unwrap();
        let out = emit_kinds(vec![
            EventKind::StreamStart,
            EventKind::DocumentStart(start),
            EventKind::Scalar(ScalarEvent::new("v").with_tag("tag:example.com,2000:foo")),
            EventKind::DocumentEnd { is_implicit: false },
            EventKind::StreamEnd,
        ])
        .unwrap();
        assert_eq!(out, "%YAML 1.2\n%TAG !e! tag:example.com,2000:\n--- !e!foo v\n...\n");
    }

    #[test]
    fn test_unexpected_event() {
        let err = emit_kinds(vec![scalar("a")]).unwrap_err();
        assert!(matches!(
            err,
            EmitError::UnexpectedEvent {
                expected: "STREAM-START",
                found: "SCALAR"
            }
        ));
    }

    #[test]
    fn test_settings_validation() {
        assert!(EmitterSettings::default().validate().is_ok());
        assert!(EmitterSettings::default().with_best_indent(1).validate().is_err());
        assert!(EmitterSettings::default().with_best_width(4).validate().is_err());
        assert!(EmitterSettings::default().with_newline("x").validate().is_err());
        let mut out = String::new();
        assert!(Emitter::with_settings(&mut out, EmitterSettings::default().with_best_indent(10))
            .is_err());
    }

    #[test]
    fn test_comments() {
        let s = "# head\na: 1 # one\nb: 2\n";
        let mut out = String::new();
        {
            let mut emitter = Emitter::new(&mut out);
            emitter.emit_comments(true);
            for event in Parser::new_from_str(s).retain_comments(true) {
                emitter.emit(event.unwrap()).unwrap();
            }
        }
        assert_eq!(out, "# head\na: 1 # one\nb: 2\n");
    }

    #[test]
    fn test_scalar_analysis() {
        let a = analyze_scalar("plain text", true);
        assert!(a.flow_plain_allowed && a.block_plain_allowed && !a.multiline);
        let a = analyze_scalar("a, b", true);
        assert!(!a.flow_plain_allowed && a.block_plain_allowed);
        let a = analyze_scalar("trailing ", true);
        assert!(!a.block_plain_allowed && !a.block_allowed && a.single_quoted_allowed);
        let a = analyze_scalar("a \nb", true);
        assert!(!a.single_quoted_allowed && !a.block_allowed);
        let a = analyze_scalar("é", false);
        assert!(!a.single_quoted_allowed);
    }

    #[test]
    fn test_line_breaks_allow_block_styles() {
        let a = analyze_scalar("a\nb", true);
        assert!(a.multiline && a.block_allowed && a.single_quoted_allowed);
        assert!(!a.flow_plain_allowed && !a.block_plain_allowed);
        let a = analyze_scalar("ends\n", true);
        assert!(a.block_allowed);
        for special in ["a\rb", "a\u{85}b", "a\u{2028}b", "a\u{2029}b"] {
            let a = analyze_scalar(special, true);
            assert!(!a.block_allowed && !a.single_quoted_allowed, "{special:?}");
        }
    }

    #[test]
    fn test_surrounding_space_disallows_block() {
        assert!(!analyze_scalar(" lead", true).block_allowed);
        assert!(!analyze_scalar(" lead\nmore", true).block_allowed);
        assert!(!analyze_scalar("trail ", true).block_allowed);

        let out = emit_kinds(document(vec![
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
            scalar("k"),
            EventKind::Scalar(ScalarEvent::new(" lead").with_style(ScalarStyle::Literal)),
            EventKind::MappingEnd,
        ]))
        .unwrap();
        assert_eq!(out, "k: \" lead\"\n");
    }

    #[test]
    fn test_requested_literal_is_kept() {
        let out = emit_kinds(document(vec![
            EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
            scalar("k"),
            EventKind::Scalar(ScalarEvent::new("a\nb").with_style(ScalarStyle::Literal)),
            EventKind::MappingEnd,
        ]))
        .unwrap();
        assert_eq!(out, "k: |-\n  a\n  b\n");
    }

    #[test]
    fn test_lookahead_window() {
        let mut out = String::new();
        {
            let mut emitter = Emitter::new(&mut out);
            for kind in [
                EventKind::StreamStart,
                EventKind::DocumentStart(DocumentStart::implicit()),
                EventKind::MappingStart(CollectionStart::new(CollectionStyle::Block)),
                scalar("a"),
                scalar("b"),
            ] {
                emitter.emit(Event::from(kind)).unwrap();
            }
            // Two events behind a mapping start are not enough to pick its style.
            assert_eq!(emitter.events.len(), 3);
            emitter.emit(Event::from(scalar("c"))).unwrap();
            assert!(emitter.events.is_empty());
        }
        assert_eq!(out, "a: b\nc");

        let mut out = String::new();
        {
            let mut emitter = Emitter::new(&mut out);
            for kind in [
                EventKind::StreamStart,
                EventKind::DocumentStart(DocumentStart::implicit()),
                EventKind::SequenceStart(CollectionStart::new(CollectionStyle::Block)),
                scalar("x"),
            ] {
                emitter.emit(Event::from(kind)).unwrap();
            }
            assert_eq!(emitter.events.len(), 2);
            emitter.emit(Event::from(scalar("y"))).unwrap();
            assert!(emitter.events.is_empty());
        }
        assert_eq!(out, "- x\n- y");
    }
}
