//! Home to the YAML Parser.
//!
//! The parser takes input from the [`crate::scanner::Scanner`], performs final checks for YAML
//! compliance, and emits a stream of YAML events. This stream can for instance be fed to the
//! [`crate::emitter::Emitter`] or handed to a loader that builds native structures.
//!
//! The grammar is implemented once, as a state machine driving an [`EventVisitor`]. The
//! [`Iterator`] and [`Parser::move_next`] forms materialize events into a small queue; the
//! [`Parser::parse_with`] form hands them to the caller's visitor as they are produced.

use std::collections::VecDeque;
use std::mem;

use crate::error::{Error, Result};
use crate::event::{
    CollectionStart, CollectionStyle, DocumentStart, Event, EventKind, EventReceiver,
    EventVisitor, ScalarEvent,
};
use crate::mark::{Mark, Span};
use crate::names::{AnchorName, TagDirective, TagDirectiveCollection, TagName, VersionDirective};
use crate::recursion::RecursionLevel;
use crate::scanner::{ScalarStyle, Scanner, Token, TokenType};

#[derive(Clone, Copy, PartialEq, Debug, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// A YAML parser.
#[derive(Debug)]
pub struct Parser<T> {
    /// The underlying scanner from which we pull tokens.
    scanner: Scanner<T>,
    /// The stack of _previous_ states we were in.
    ///
    /// States are pushed in the context of subobjects to this stack. The top-most element is the
    /// state in which to come back to when exiting the current state.
    states: Vec<State>,
    /// The state in which we currently are.
    state: State,
    /// The tag directives of the current document, defaults included.
    tags: TagDirectiveCollection,
    /// Collection nesting guard.
    depth: RecursionLevel,
    /// Events produced by the state machine and not handed out yet.
    pending: VecDeque<Event>,
    /// The event made current by [`Parser::move_next`].
    current: Option<Event>,
    /// Set once an error was returned; the parser yields nothing afterwards.
    failed: bool,
}

impl<'a> Parser<std::str::Chars<'a>> {
    /// Create a new instance of a parser from a &str.
    #[must_use]
    pub fn new_from_str(value: &'a str) -> Self {
        Parser::new(value.chars())
    }
}

impl<T: Iterator<Item = char>> Parser<T> {
    /// Create a new instance of a parser from the given input of characters.
    pub fn new(src: T) -> Parser<T> {
        Parser {
            scanner: Scanner::new(src),
            states: Vec::new(),
            state: State::StreamStart,
            tags: TagDirectiveCollection::with_defaults(),
            depth: RecursionLevel::default(),
            pending: VecDeque::new(),
            current: None,
            failed: false,
        }
    }

    /// Whether to produce [`EventKind::Comment`] events.
    #[must_use]
    pub fn retain_comments(mut self, retain: bool) -> Self {
        self.scanner.set_retain_comments(retain);
        self
    }

    /// The maximum number of nested collections.
    #[must_use]
    pub fn max_depth(mut self, maximum: usize) -> Self {
        self.depth = RecursionLevel::new(maximum);
        self
    }

    /// The event made current by the last call to [`Parser::move_next`].
    #[must_use]
    pub fn current(&self) -> Option<&Event> {
        self.current.as_ref()
    }

    /// Advance to the next event, making it [`Parser::current`].
    ///
    /// Returns `false` once the stream has ended.
    ///
    /// # Errors
    /// Returns the first syntax or semantic error met. The parser must not be used afterwards.
    pub fn move_next(&mut self) -> Result<bool> {
        self.current = None;
        if !self.fill_pending()? {
            return Ok(false);
        }
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    /// Try to load the next event and return it, but do not consume it.
    ///
    /// Returns `Ok(None)` once the stream has ended.
    ///
    /// # Errors
    /// Returns `ScanError` when loading the next event fails.
    pub fn peek(&mut self) -> Result<Option<&Event>> {
        if self.fill_pending()? {
            Ok(self.pending.front())
        } else {
            Ok(None)
        }
    }

    /// Consume and return the next event.
    ///
    /// Returns `Ok(None)` once the stream has ended.
    ///
    /// # Errors
    /// Returns the first syntax or semantic error met.
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        self.move_next()?;
        Ok(self.current.take())
    }

    /// Run the state machine until at least one event is queued or the stream ends.
    fn fill_pending(&mut self) -> Result<bool> {
        while self.pending.is_empty() {
            if self.state == State::End || self.failed {
                return Ok(false);
            }
            let mut sink = mem::take(&mut self.pending);
            let result = self.state_machine(&mut sink);
            self.pending = sink;
            if let Err(e) = result {
                self.failed = true;
                return Err(e);
            }
        }
        Ok(true)
    }

    /// Drive the whole stream into `visitor`.
    ///
    /// # Errors
    /// Returns the first syntax or semantic error met. Events before the error have been
    /// delivered.
    pub fn parse_with<V: EventVisitor>(&mut self, visitor: &mut V) -> Result<()> {
        while let Some(event) = self.pending.pop_front() {
            event.accept(visitor);
        }
        while self.state != State::End && !self.failed {
            if let Err(e) = self.state_machine(visitor) {
                self.failed = true;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Load the YAML from the stream in `self`, pushing events into `recv`.
    ///
    /// If `multi` is set to `true`, the parser will allow parsing of multiple YAML documents
    /// inside the stream.
    ///
    /// # Errors
    /// Returns the first syntax or semantic error met.
    pub fn load<R: EventReceiver>(&mut self, recv: &mut R, multi: bool) -> Result<()> {
        while let Some(event) = self.next_event()? {
            let last = !multi && matches!(event.kind, EventKind::DocumentEnd { .. });
            recv.on_event(event);
            if last {
                break;
            }
        }
        Ok(())
    }

    /// Make the next structural token current and return it.
    ///
    /// Comment tokens met on the way are reported to `v`; deferred scanner errors are raised.
    fn peek_token<V: EventVisitor>(&mut self, v: &mut V) -> Result<&mut Token> {
        loop {
            if !self.scanner.move_next_without_consuming()? {
                return Err(Error::semantic(
                    Span::empty(self.scanner.mark()),
                    "unexpected end of stream",
                ));
            }
            match self.scanner.current() {
                Some(Token(_, TokenType::Comment { .. })) => {
                    if let Some(Token(span, TokenType::Comment { text, is_inline })) =
                        self.scanner.take_current()
                    {
                        v.on_comment(text, is_inline, span);
                    }
                }
                Some(Token(span, TokenType::Error(message))) => {
                    return Err(Error::syntax(*span, message));
                }
                _ => break,
            }
        }
        let mark = self.scanner.mark();
        self.scanner
            .current_mut()
            .ok_or_else(|| Error::semantic(Span::empty(mark), "unexpected end of stream"))
    }

    fn skip_token(&mut self) {
        self.scanner.consume_current();
    }

    fn pop_state(&mut self) {
        self.state = self.states.pop().unwrap_or(State::End);
    }

    fn push_state(&mut self, state: State) {
        self.states.push(state);
    }

    fn state_machine<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        debug_print!("\n\x1B[;33mParser state: {:?} \x1B[;0m", self.state);

        match self.state {
            State::StreamStart => self.stream_start(v),

            State::ImplicitDocumentStart => self.document_start(v, true),
            State::DocumentStart => self.document_start(v, false),
            State::DocumentContent => self.document_content(v),
            State::DocumentEnd => self.document_end(v),

            State::BlockNode => self.parse_node(v, true, false),

            State::BlockMappingFirstKey => self.block_mapping_key(v, true),
            State::BlockMappingKey => self.block_mapping_key(v, false),
            State::BlockMappingValue => self.block_mapping_value(v),

            State::BlockSequenceFirstEntry => self.block_sequence_entry(v, true),
            State::BlockSequenceEntry => self.block_sequence_entry(v, false),

            State::FlowSequenceFirstEntry => self.flow_sequence_entry(v, true),
            State::FlowSequenceEntry => self.flow_sequence_entry(v, false),

            State::FlowMappingFirstKey => self.flow_mapping_key(v, true),
            State::FlowMappingKey => self.flow_mapping_key(v, false),
            State::FlowMappingValue => self.flow_mapping_value(v, false),

            State::IndentlessSequenceEntry => self.indentless_sequence_entry(v),

            State::FlowSequenceEntryMappingKey => self.flow_sequence_entry_mapping_key(v),
            State::FlowSequenceEntryMappingValue => self.flow_sequence_entry_mapping_value(v),
            State::FlowSequenceEntryMappingEnd => self.flow_sequence_entry_mapping_end(v),
            State::FlowMappingEmptyValue => self.flow_mapping_value(v, true),

            State::End => Ok(()),
        }
    }

    fn stream_start<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        match self.peek_token(v)? {
            Token(span, TokenType::StreamStart) => {
                let span = *span;
                self.state = State::ImplicitDocumentStart;
                self.skip_token();
                v.on_stream_start(span);
                Ok(())
            }
            Token(span, _) => Err(Error::semantic(
                *span,
                "did not find expected <stream-start>",
            )),
        }
    }

    fn document_start<V: EventVisitor>(&mut self, v: &mut V, implicit: bool) -> Result<()> {
        while matches!(self.peek_token(v)?.1, TokenType::DocumentEnd) {
            self.skip_token();
        }

        match self.peek_token(v)? {
            Token(span, TokenType::StreamEnd) => {
                let span = *span;
                self.state = State::End;
                self.skip_token();
                v.on_stream_end(span);
                Ok(())
            }
            Token(
                _,
                TokenType::VersionDirective(..)
                | TokenType::TagDirective(..)
                | TokenType::DocumentStart,
            ) => {
                // explicit document
                self.explicit_document_start(v)
            }
            Token(span, _) if implicit => {
                let span = Span::empty(span.start);
                self.process_directives(v)?;
                self.push_state(State::DocumentEnd);
                self.state = State::BlockNode;
                v.on_document_start(
                    DocumentStart {
                        version: None,
                        tags: self.tags.clone(),
                        is_implicit: true,
                    },
                    span,
                );
                Ok(())
            }
            _ => {
                // explicit document
                self.explicit_document_start(v)
            }
        }
    }

    /// Collect the `%YAML` and `%TAG` directives preceding a document.
    ///
    /// The tag directives replace those of the previous document; the defaults are added to
    /// those the document does not override.
    fn process_directives<V: EventVisitor>(
        &mut self,
        v: &mut V,
    ) -> Result<Option<VersionDirective>> {
        let mut version = None;
        let mut tags = TagDirectiveCollection::new();
        loop {
            match self.peek_token(v)? {
                Token(span, TokenType::VersionDirective(major, minor)) => {
                    let (span, major, minor) = (*span, *major, *minor);
                    if version.is_some() {
                        return Err(Error::semantic(span, "found duplicate %YAML directive"));
                    }
                    if major != 1 {
                        return Err(Error::semantic(span, "found incompatible YAML document"));
                    }
                    if minor > 2 {
                        tracing::warn!(
                            "%YAML {major}.{minor} at {} is newer than 1.2, reading it as 1.2",
                            span.start
                        );
                    }
                    version = Some(VersionDirective { major, minor });
                }
                Token(span, TokenType::TagDirective(handle, prefix)) => {
                    let span = *span;
                    let directive = TagDirective::new(mem::take(handle), mem::take(prefix));
                    if tags.add(directive).is_err() {
                        return Err(Error::semantic(span, "found duplicate %TAG directive"));
                    }
                }
                _ => break,
            }
            self.skip_token();
        }
        tags.add_defaults();
        self.tags = tags;
        Ok(version)
    }

    fn explicit_document_start<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        let version = self.process_directives(v)?;
        match self.peek_token(v)? {
            Token(span, TokenType::DocumentStart) => {
                let span = *span;
                self.push_state(State::DocumentEnd);
                self.state = State::DocumentContent;
                self.skip_token();
                v.on_document_start(
                    DocumentStart {
                        version,
                        tags: self.tags.clone(),
                        is_implicit: false,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, _) => Err(Error::semantic(
                *span,
                "did not find expected <document start>",
            )),
        }
    }

    fn document_content<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        match self.peek_token(v)? {
            Token(
                span,
                TokenType::VersionDirective(..)
                | TokenType::TagDirective(..)
                | TokenType::DocumentStart
                | TokenType::DocumentEnd
                | TokenType::StreamEnd,
            ) => {
                let span = Span::empty(span.start);
                self.pop_state();
                // empty scalar
                v.on_scalar(ScalarEvent::empty(AnchorName::empty(), TagName::empty()), span);
                Ok(())
            }
            _ => self.parse_node(v, true, false),
        }
    }

    fn document_end<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        let (span, is_implicit) = match self.peek_token(v)? {
            Token(span, TokenType::DocumentEnd) => {
                let span = *span;
                self.skip_token();
                (span, false)
            }
            Token(span, _) => (Span::empty(span.start), true),
        };

        if is_implicit {
            // A directive needs a `...` to close the document before it.
            if let Token(span, TokenType::VersionDirective(..) | TokenType::TagDirective(..)) =
                self.peek_token(v)?
            {
                return Err(Error::semantic(
                    *span,
                    "missing explicit document end marker before directive",
                ));
            }
            self.state = State::DocumentStart;
        } else {
            // After `...`, a bare document may follow.
            self.state = State::ImplicitDocumentStart;
        }

        v.on_document_end(is_implicit, span);
        Ok(())
    }

    /// Expand a tag token against the active tag directives.
    fn resolve_tag(&self, handle: &str, suffix: String, span: Span) -> Result<TagName> {
        if handle.is_empty() {
            // Verbatim tags and the lone `!`.
            return Ok(TagName::new(suffix));
        }
        match self.tags.get(handle) {
            Some(prefix) => Ok(TagName::new(format!("{prefix}{suffix}"))),
            None => Err(Error::semantic(
                span,
                "while parsing a node, found undefined tag handle",
            )),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn parse_node<V: EventVisitor>(
        &mut self,
        v: &mut V,
        block: bool,
        indentless_sequence: bool,
    ) -> Result<()> {
        let mut anchor = AnchorName::empty();
        let mut tag = TagName::empty();
        let mut properties_start: Option<Mark> = None;

        // Node properties, in any order.
        loop {
            match self.peek_token(v)? {
                Token(span, TokenType::Alias(name)) => {
                    let span = *span;
                    let name = mem::take(name);
                    if properties_start.is_some() {
                        return Err(Error::semantic(
                            span,
                            "while parsing a node, found an alias with properties",
                        ));
                    }
                    self.pop_state();
                    self.skip_token();
                    v.on_alias(AnchorName::new(name), span);
                    return Ok(());
                }
                Token(span, TokenType::Anchor(name)) => {
                    let span = *span;
                    if !anchor.is_empty() {
                        return Err(Error::semantic(
                            span,
                            "while parsing a node, found more than one anchor",
                        ));
                    }
                    anchor = AnchorName::new(mem::take(name));
                    properties_start.get_or_insert(span.start);
                    self.skip_token();
                }
                Token(span, TokenType::Tag(handle, suffix)) => {
                    let span = *span;
                    if !tag.is_empty() {
                        return Err(Error::semantic(
                            span,
                            "while parsing a node, found more than one tag",
                        ));
                    }
                    let handle = mem::take(handle);
                    let suffix = mem::take(suffix);
                    tag = self.resolve_tag(&handle, suffix, span)?;
                    properties_start.get_or_insert(span.start);
                    self.skip_token();
                }
                _ => break,
            }
        }

        let is_implicit = tag.is_empty() || tag.as_str() == Some("!");
        match self.peek_token(v)? {
            Token(span, TokenType::BlockEntry) if indentless_sequence => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                self.depth.increment(span.start)?;
                self.state = State::IndentlessSequenceEntry;
                v.on_sequence_start(
                    CollectionStart {
                        anchor,
                        tag,
                        is_implicit,
                        style: CollectionStyle::Block,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, TokenType::Scalar { style, value, is_key }) => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                let (style, is_key) = (*style, *is_key);
                let value = mem::take(value);
                self.pop_state();
                self.skip_token();
                let is_plain_implicit =
                    (style == ScalarStyle::Plain && tag.is_empty()) || tag.as_str() == Some("!");
                let is_quoted_implicit = !is_plain_implicit && tag.is_empty();
                v.on_scalar(
                    ScalarEvent {
                        anchor,
                        tag,
                        value,
                        style,
                        is_plain_implicit,
                        is_quoted_implicit,
                        is_key,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, TokenType::FlowSequenceStart) => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                self.depth.increment(span.start)?;
                self.state = State::FlowSequenceFirstEntry;
                v.on_sequence_start(
                    CollectionStart {
                        anchor,
                        tag,
                        is_implicit,
                        style: CollectionStyle::Flow,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, TokenType::FlowMappingStart) => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                self.depth.increment(span.start)?;
                self.state = State::FlowMappingFirstKey;
                v.on_mapping_start(
                    CollectionStart {
                        anchor,
                        tag,
                        is_implicit,
                        style: CollectionStyle::Flow,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, TokenType::BlockSequenceStart) if block => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                self.depth.increment(span.start)?;
                self.state = State::BlockSequenceFirstEntry;
                v.on_sequence_start(
                    CollectionStart {
                        anchor,
                        tag,
                        is_implicit,
                        style: CollectionStyle::Block,
                    },
                    span,
                );
                Ok(())
            }
            Token(span, TokenType::BlockMappingStart) if block => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.end);
                self.depth.increment(span.start)?;
                self.state = State::BlockMappingFirstKey;
                v.on_mapping_start(
                    CollectionStart {
                        anchor,
                        tag,
                        is_implicit,
                        style: CollectionStyle::Block,
                    },
                    span,
                );
                Ok(())
            }
            // ex 7.2, an empty scalar can follow a secondary tag
            Token(span, _) if properties_start.is_some() => {
                let span = Span::new(properties_start.unwrap_or(span.start), span.start);
                self.pop_state();
                v.on_scalar(ScalarEvent::empty(anchor, tag), span);
                Ok(())
            }
            Token(span, _) => Err(Error::semantic(
                *span,
                "while parsing a node, did not find expected node content",
            )),
        }
    }

    /// Report an empty scalar standing for a missing key or value, at the next token.
    fn empty_scalar<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        let span = Span::empty(self.peek_token(v)?.0.start);
        v.on_scalar(ScalarEvent::empty(AnchorName::empty(), TagName::empty()), span);
        Ok(())
    }

    fn block_mapping_key<V: EventVisitor>(&mut self, v: &mut V, first: bool) -> Result<()> {
        // skip BlockMappingStart
        if first {
            let _ = self.peek_token(v)?;
            self.skip_token();
        }
        match self.peek_token(v)? {
            Token(_, TokenType::Key) => {
                self.skip_token();
                if let Token(_, TokenType::Key | TokenType::Value | TokenType::BlockEnd) =
                    self.peek_token(v)?
                {
                    self.state = State::BlockMappingValue;
                    // empty scalar
                    self.empty_scalar(v)
                } else {
                    self.push_state(State::BlockMappingValue);
                    self.parse_node(v, true, true)
                }
            }
            // XXX(chenyh): libyaml failed to parse spec 1.2, ex8.18
            Token(_, TokenType::Value) => {
                self.state = State::BlockMappingValue;
                self.empty_scalar(v)
            }
            Token(span, TokenType::BlockEnd) => {
                let span = *span;
                self.pop_state();
                self.skip_token();
                self.depth.decrement();
                v.on_mapping_end(span);
                Ok(())
            }
            Token(span, _) => Err(Error::semantic(
                *span,
                "while parsing a block mapping, did not find expected key",
            )),
        }
    }

    fn block_mapping_value<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        if let Token(_, TokenType::Value) = self.peek_token(v)? {
            self.skip_token();
            if let Token(_, TokenType::Key | TokenType::Value | TokenType::BlockEnd) =
                self.peek_token(v)?
            {
                self.state = State::BlockMappingKey;
                // empty scalar
                self.empty_scalar(v)
            } else {
                self.push_state(State::BlockMappingKey);
                self.parse_node(v, true, true)
            }
        } else {
            self.state = State::BlockMappingKey;
            // empty scalar
            self.empty_scalar(v)
        }
    }

    fn flow_mapping_key<V: EventVisitor>(&mut self, v: &mut V, first: bool) -> Result<()> {
        if first {
            let _ = self.peek_token(v)?;
            self.skip_token();
        }

        if !matches!(self.peek_token(v)?.1, TokenType::FlowMappingEnd) {
            if !first {
                match self.peek_token(v)? {
                    Token(_, TokenType::FlowEntry) => self.skip_token(),
                    Token(span, _) => {
                        return Err(Error::semantic(
                            *span,
                            "while parsing a flow mapping, did not find expected ',' or '}'",
                        ));
                    }
                }
            }

            match self.peek_token(v)? {
                Token(_, TokenType::Key) => {
                    self.skip_token();
                    return if let Token(
                        _,
                        TokenType::Value | TokenType::FlowEntry | TokenType::FlowMappingEnd,
                    ) = self.peek_token(v)?
                    {
                        self.state = State::FlowMappingValue;
                        self.empty_scalar(v)
                    } else {
                        self.push_state(State::FlowMappingValue);
                        self.parse_node(v, false, false)
                    };
                }
                // XXX libyaml fail ex 7.3, empty key
                Token(_, TokenType::Value) => {
                    self.state = State::FlowMappingValue;
                    return self.empty_scalar(v);
                }
                // trailing `,`
                Token(_, TokenType::FlowMappingEnd) => {}
                _ => {
                    self.push_state(State::FlowMappingEmptyValue);
                    return self.parse_node(v, false, false);
                }
            }
        }

        let span = self.peek_token(v)?.0;
        self.pop_state();
        self.skip_token();
        self.depth.decrement();
        v.on_mapping_end(span);
        Ok(())
    }

    fn flow_mapping_value<V: EventVisitor>(&mut self, v: &mut V, empty: bool) -> Result<()> {
        if empty {
            self.state = State::FlowMappingKey;
            return self.empty_scalar(v);
        }

        if let Token(_, TokenType::Value) = self.peek_token(v)? {
            self.skip_token();
            if !matches!(
                self.peek_token(v)?.1,
                TokenType::FlowEntry | TokenType::FlowMappingEnd
            ) {
                self.push_state(State::FlowMappingKey);
                return self.parse_node(v, false, false);
            }
        }

        self.state = State::FlowMappingKey;
        self.empty_scalar(v)
    }

    fn flow_sequence_entry<V: EventVisitor>(&mut self, v: &mut V, first: bool) -> Result<()> {
        // skip FlowSequenceStart
        if first {
            let _ = self.peek_token(v)?;
            self.skip_token();
        }
        match self.peek_token(v)? {
            Token(_, TokenType::FlowSequenceEnd) => {}
            Token(_, TokenType::FlowEntry) if !first => {
                self.skip_token();
            }
            Token(span, _) if !first => {
                return Err(Error::semantic(
                    *span,
                    "while parsing a flow sequence, expected ',' or ']'",
                ));
            }
            _ => { /* next */ }
        }
        match self.peek_token(v)? {
            Token(span, TokenType::FlowSequenceEnd) => {
                let span = *span;
                self.pop_state();
                self.skip_token();
                self.depth.decrement();
                v.on_sequence_end(span);
                Ok(())
            }
            Token(span, TokenType::Key) => {
                let span = *span;
                self.state = State::FlowSequenceEntryMappingKey;
                self.skip_token();
                self.depth.increment(span.start)?;
                v.on_mapping_start(CollectionStart::new(CollectionStyle::Flow), span);
                Ok(())
            }
            _ => {
                self.push_state(State::FlowSequenceEntry);
                self.parse_node(v, false, false)
            }
        }
    }

    fn indentless_sequence_entry<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        match self.peek_token(v)? {
            Token(_, TokenType::BlockEntry) => {}
            Token(span, _) => {
                let span = Span::empty(span.start);
                self.pop_state();
                self.depth.decrement();
                v.on_sequence_end(span);
                return Ok(());
            }
        }

        self.skip_token();
        if let Token(
            _,
            TokenType::BlockEntry | TokenType::Key | TokenType::Value | TokenType::BlockEnd,
        ) = self.peek_token(v)?
        {
            self.state = State::IndentlessSequenceEntry;
            self.empty_scalar(v)
        } else {
            self.push_state(State::IndentlessSequenceEntry);
            self.parse_node(v, true, false)
        }
    }

    fn block_sequence_entry<V: EventVisitor>(&mut self, v: &mut V, first: bool) -> Result<()> {
        // BLOCK-SEQUENCE-START
        if first {
            let _ = self.peek_token(v)?;
            self.skip_token();
        }
        match self.peek_token(v)? {
            Token(span, TokenType::BlockEnd) => {
                let span = *span;
                self.pop_state();
                self.skip_token();
                self.depth.decrement();
                v.on_sequence_end(span);
                Ok(())
            }
            Token(_, TokenType::BlockEntry) => {
                self.skip_token();
                if let Token(_, TokenType::BlockEntry | TokenType::BlockEnd) =
                    self.peek_token(v)?
                {
                    self.state = State::BlockSequenceEntry;
                    self.empty_scalar(v)
                } else {
                    self.push_state(State::BlockSequenceEntry);
                    self.parse_node(v, true, false)
                }
            }
            Token(span, _) => Err(Error::semantic(
                *span,
                "while parsing a block collection, did not find expected '-' indicator",
            )),
        }
    }

    fn flow_sequence_entry_mapping_key<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        if let Token(
            _,
            TokenType::Value | TokenType::FlowEntry | TokenType::FlowSequenceEnd,
        ) = self.peek_token(v)?
        {
            self.state = State::FlowSequenceEntryMappingValue;
            self.empty_scalar(v)
        } else {
            self.push_state(State::FlowSequenceEntryMappingValue);
            self.parse_node(v, false, false)
        }
    }

    fn flow_sequence_entry_mapping_value<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        if let Token(_, TokenType::Value) = self.peek_token(v)? {
            self.skip_token();
            if let Token(_, TokenType::FlowEntry | TokenType::FlowSequenceEnd) =
                self.peek_token(v)?
            {
                self.state = State::FlowSequenceEntryMappingEnd;
                self.empty_scalar(v)
            } else {
                self.push_state(State::FlowSequenceEntryMappingEnd);
                self.parse_node(v, false, false)
            }
        } else {
            self.state = State::FlowSequenceEntryMappingEnd;
            self.empty_scalar(v)
        }
    }

    fn flow_sequence_entry_mapping_end<V: EventVisitor>(&mut self, v: &mut V) -> Result<()> {
        let span = Span::empty(self.peek_token(v)?.0.start);
        self.state = State::FlowSequenceEntry;
        self.depth.decrement();
        v.on_mapping_end(span);
        Ok(())
    }
}

impl<T: Iterator<Item = char>> Iterator for Parser<T> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

#[cfg(test)]
mod test {
    use super::{Event, EventKind, Parser};
    use crate::event::CollectionStyle;
    use crate::error::Error;

    fn kinds(src: &str) -> Vec<EventKind> {
        Parser::new_from_str(src)
            .map(|ev| ev.map(|ev| ev.kind))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_peek_eq_parse() {
        let s = "
a0 bb: val
a1: &x
    b1: 4
    b2: d
a2: 4
a3: [1, 2, 3]
a4:
    - [a1, a2]
    - 2
a5: *x
";
        let mut p = Parser::new_from_str(s);
        while {
            let event_peek = p.peek().unwrap().cloned();
            let event = p.next_event().unwrap();
            assert_eq!(event, event_peek);
            event.is_some()
        } {}
    }

    #[test]
    fn test_event_sequence() {
        let events = kinds("key:\n  - item 1\n  - item 2\n");
        let summary: Vec<String> = events
            .iter()
            .map(|kind| match kind {
                EventKind::StreamStart => "+STR".to_owned(),
                EventKind::StreamEnd => "-STR".to_owned(),
                EventKind::DocumentStart(doc) => {
                    assert!(doc.is_implicit);
                    "+DOC".to_owned()
                }
                EventKind::DocumentEnd { is_implicit } => {
                    assert!(*is_implicit);
                    "-DOC".to_owned()
                }
                EventKind::MappingStart(start) => {
                    assert_eq!(start.style, CollectionStyle::Block);
                    "+MAP".to_owned()
                }
                EventKind::MappingEnd => "-MAP".to_owned(),
                EventKind::SequenceStart(start) => {
                    assert_eq!(start.style, CollectionStyle::Block);
                    "+SEQ".to_owned()
                }
                EventKind::SequenceEnd => "-SEQ".to_owned(),
                EventKind::Scalar(scalar) => format!("={}", scalar.value),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                "+STR", "+DOC", "+MAP", "=key", "+SEQ", "=item 1", "=item 2", "-SEQ", "-MAP",
                "-DOC", "-STR"
            ]
        );
    }

    #[test]
    fn test_is_key_reaches_events() {
        let keys: Vec<(String, bool)> = kinds("{a: b, c: d}")
            .into_iter()
            .filter_map(|kind| match kind {
                EventKind::Scalar(scalar) => Some((scalar.value, scalar.is_key)),
                _ => None,
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a".to_owned(), true),
                ("b".to_owned(), false),
                ("c".to_owned(), true),
                ("d".to_owned(), false)
            ]
        );
    }

    #[test]
    fn test_recursion_limit() {
        let mut p = Parser::new_from_str("[[[[1]]]]").max_depth(3);
        let err = loop {
            match p.next_event() {
                Ok(Some(_)) => {}
                Ok(None) => panic!("expected an error"),
                Err(e) => break e,
            }
        };
        assert!(matches!(err, Error::RecursionLimit { limit: 3, .. }));
        // The parser is done after an error.
        assert!(p.next().is_none());
    }

    #[test]
    fn test_move_next() {
        let mut p = Parser::new_from_str("a");
        let mut count = 0;
        while p.move_next().unwrap() {
            assert!(p.current().is_some());
            count += 1;
        }
        assert_eq!(count, 5);
        assert!(p.current().is_none());
        assert!(!p.move_next().unwrap());
    }

    #[test]
    fn test_tagged_empty_node() {
        let events: Vec<Event> = Parser::new_from_str("- !!str\n- &a\n")
            .collect::<Result<_, _>>()
            .unwrap();
        let scalars: Vec<_> = events
            .into_iter()
            .filter_map(|ev| match ev.kind {
                EventKind::Scalar(scalar) => Some(scalar),
                _ => None,
            })
            .collect();
        assert_eq!(scalars.len(), 2);
        assert_eq!(scalars[0].tag.as_str(), Some("tag:yaml.org,2002:str"));
        assert!(!scalars[0].is_plain_implicit);
        assert_eq!(scalars[1].anchor.as_str(), Some("a"));
        assert_eq!(scalars[1].value, "");
    }
}
