//! Home to the YAML Scanner.
//!
//! The scanner is the lowest-level parsing utility. It is the lexer / tokenizer, reading input a
//! character at a time and emitting tokens that can later be interpreted by the [`crate::parser`]
//! to check for more context and validity.
//!
//! Due to the grammar of YAML, the scanner has to have some context and is not error-free.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use crate::buffer::LookAheadBuffer;
use crate::char_traits::{
    as_hex, is_alpha, is_anchor_char, is_blank, is_blank_or_breakz, is_bom, is_break, is_breakz,
    is_digit, is_flow, is_hex, is_tag_char, is_uri_char, is_z,
};
use crate::error::{Error, Result};
use crate::mark::{Cursor, Mark, Span};
use crate::queue::InsertionQueue;

/// The style as which the scalar was written in the YAML document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash)]
pub enum ScalarStyle {
    /// No style requested. Only meaningful when emitting: the emitter picks one.
    Any,
    /// A YAML plain scalar.
    Plain,
    /// A YAML single quoted scalar.
    SingleQuoted,
    /// A YAML double quoted scalar.
    DoubleQuoted,
    /// A YAML literal block (`|` block).
    Literal,
    /// A YAML folded block (`>` block).
    Folded,
}

/// The contents of a scanner token.
#[derive(Clone, PartialEq, Debug, Eq)]
pub enum TokenType {
    /// The start of the stream. Sent first, before even [`TokenType::DocumentStart`].
    StreamStart,
    /// The end of the stream, EOF.
    StreamEnd,
    /// A YAML version directive.
    VersionDirective(
        /// Major
        u32,
        /// Minor
        u32,
    ),
    /// A YAML tag directive (e.g.: `%TAG !e! tag:example.com,2000:`).
    TagDirective(
        /// Handle
        String,
        /// Prefix
        String,
    ),
    /// The start of a YAML document (`---`).
    DocumentStart,
    /// The end of a YAML document (`...`).
    DocumentEnd,
    /// The start of a sequence block.
    ///
    /// Sequence blocks are arrays starting with a `-`.
    BlockSequenceStart,
    /// The start of a sequence mapping.
    ///
    /// Sequence mappings are "dictionaries" with "key: value" entries.
    BlockMappingStart,
    /// End of the corresponding `BlockSequenceStart` or `BlockMappingStart`.
    BlockEnd,
    /// Start of an inline array (`[ a, b ]`).
    FlowSequenceStart,
    /// End of an inline array.
    FlowSequenceEnd,
    /// Start of an inline mapping (`{ a: b, c: d }`).
    FlowMappingStart,
    /// End of an inline mapping.
    FlowMappingEnd,
    /// An entry in a block sequence (c.f.: [`TokenType::BlockSequenceStart`]).
    BlockEntry,
    /// An entry in a flow sequence (c.f.: [`TokenType::FlowSequenceStart`]).
    FlowEntry,
    /// A key in a mapping.
    Key,
    /// A value in a mapping.
    Value,
    /// A reference to an anchor.
    Alias(String),
    /// A YAML anchor (`&`/`*`).
    Anchor(String),
    /// A YAML tag (starting with bangs `!`).
    Tag(
        /// The handle of the tag.
        String,
        /// The suffix of the tag.
        String,
    ),
    /// A regular YAML scalar.
    Scalar {
        /// How the scalar was written.
        style: ScalarStyle,
        /// The scalar contents, escapes and folding resolved.
        value: String,
        /// Whether the scalar turned out to be an implicit mapping key.
        is_key: bool,
    },
    /// A comment. Only produced when the scanner retains comments.
    Comment {
        /// The text after `#`, trimmed.
        text: String,
        /// Whether the comment shares its line with preceding content.
        is_inline: bool,
    },
    /// A problem found while scanning ahead, reported once the parser reaches it.
    Error(String),
}

/// A scanner token.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Token(pub Span, pub TokenType);

impl Token {
    /// Where the token starts.
    #[must_use]
    pub fn start(&self) -> Mark {
        self.0.start
    }

    /// Where the token ends.
    #[must_use]
    pub fn end(&self) -> Mark {
        self.0.end
    }
}

/// A scalar that was parsed and may correspond to a simple key.
///
/// Upon scanning `a: b`, we do not know that `a` is a key for a map until we have reached the
/// following `:`. The scalar token for `a` is queued but kept in the scanner until more context is
/// fetched. Reaching the `:` turns it into a key by inserting a [`TokenType::Key`] before it;
/// reaching the end of the line first stales the candidate and no key is produced.
#[derive(Clone, PartialEq, Debug, Eq, Default)]
struct SimpleKey {
    /// Whether the token this [`SimpleKey`] refers to may still be a key.
    possible: bool,
    /// Whether the token this [`SimpleKey`] refers to is required to be a key.
    ///
    /// A key sitting exactly at the indentation of a block mapping must be followed by `:`.
    required: bool,
    /// The index of the token referred to by the [`SimpleKey`].
    ///
    /// This counts both the tokens already handed out and those still queued.
    token_number: usize,
    /// The position at which the token the [`SimpleKey`] refers to is.
    mark: Mark,
}

/// An indentation level on the stack of indentations.
#[derive(Clone, Debug, Default)]
struct Indent {
    /// The former indentation level.
    indent: isize,
    /// Whether, upon closing, this indents generates a `BlockEnd` token.
    ///
    /// The level opened by a `-` only covers a single entry of the sequence; closing it must not
    /// end the sequence.
    needs_block_end: bool,
}

/// The size of the lookahead window.
///
/// Most lookaheads are 4 characters at most (document indicators). The longest are the 8 hex
/// digits of a `\U` escape, right after the 2 characters of the escape itself.
const BUFFER_LEN: usize = 16;

/// Implicit keys may not span more characters than this.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// The YAML scanner.
///
/// This corresponds to the low-level interface when reading YAML. The scanner emits token as they
/// are read (akin to a lexer), but it also holds sufficient context to be able to disambiguate
/// some of the constructs. It has understanding of indentation and whitespace and is able to
/// generate error messages for some invalid YAML constructs.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct Scanner<T> {
    input: LookAheadBuffer<T, BUFFER_LEN>,
    cursor: Cursor,
    /// Tokens scanned but not handed out yet.
    ///
    /// A scalar may stay here until the scanner knows whether it is a key.
    tokens: InsertionQueue<Token>,
    /// The token handed to the caller but not consumed yet.
    current: Option<Token>,
    /// Comments found while scanning a token, queued right after it.
    pending_comments: Vec<Token>,
    /// The last error that happened.
    error: Option<Error>,
    skip_comments: bool,

    stream_start_produced: bool,
    stream_end_produced: bool,
    /// In some flow contexts, the value of a mapping is allowed to be adjacent to the `:`. When it
    /// is, the index at which the `:` may be must be stored in `adjacent_value_allowed_at`.
    adjacent_value_allowed_at: usize,
    /// Whether a simple key could potentially start at the current position.
    simple_key_allowed: bool,
    /// A stack of potential simple keys, one per flow level.
    simple_keys: Vec<SimpleKey>,
    /// The current indentation level.
    indent: isize,
    /// List of all block indentation levels we are in (except the current one).
    indents: Vec<Indent>,
    /// Level of nesting of flow collections.
    flow_level: usize,
    /// The number of tokens that have been consumed from the scanner.
    tokens_parsed: usize,
    /// Whether a token is ready to be taken from [`Self::tokens`].
    token_available: bool,
    /// Whether all characters encountered since the last newline were whitespace.
    leading_whitespace: bool,
}

impl<T: Iterator<Item = char>> Iterator for Scanner<T> {
    type Item = Token;
    fn next(&mut self) -> Option<Token> {
        if self.error.is_some() {
            return None;
        }
        match self.next_token() {
            Ok(Some(tok)) => {
                debug_print!("    \u{21B3} {:?} {:?}", tok.1, tok.0);
                Some(tok)
            }
            Ok(tok) => tok,
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }
}

/// A convenience alias for scanner functions that may fail without returning a value.
pub type ScanResult = Result<()>;

impl<T: Iterator<Item = char>> Scanner<T> {
    /// Creates the YAML tokenizer. Comments are skipped.
    pub fn new(input: T) -> Scanner<T> {
        Scanner {
            input: LookAheadBuffer::new(input),
            cursor: Cursor::new(),
            tokens: InsertionQueue::new(),
            current: None,
            pending_comments: Vec::new(),
            error: None,
            skip_comments: true,

            stream_start_produced: false,
            stream_end_produced: false,
            adjacent_value_allowed_at: 0,
            simple_key_allowed: true,
            simple_keys: Vec::new(),
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            tokens_parsed: 0,
            token_available: false,
            leading_whitespace: true,
        }
    }

    /// Whether to produce [`TokenType::Comment`] tokens.
    #[must_use]
    pub fn retain_comments(mut self, retain: bool) -> Self {
        self.set_retain_comments(retain);
        self
    }

    /// Whether to produce [`TokenType::Comment`] tokens.
    pub fn set_retain_comments(&mut self, retain: bool) {
        self.skip_comments = !retain;
    }

    /// Get the last error that was encountered while iterating, if any.
    #[inline]
    pub fn get_error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Return whether the [`TokenType::StreamStart`] token has been emitted.
    #[inline]
    pub fn stream_started(&self) -> bool {
        self.stream_start_produced
    }

    /// Return whether the [`TokenType::StreamEnd`] token has been emitted.
    #[inline]
    pub fn stream_ended(&self) -> bool {
        self.stream_end_produced
    }

    /// Get the current position in the input stream.
    #[inline]
    pub fn mark(&self) -> Mark {
        self.cursor.mark()
    }

    /// The token made current by the last move, if not consumed yet.
    #[inline]
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Mutable access to the current token, for consumers that take its contents.
    #[inline]
    pub(crate) fn current_mut(&mut self) -> Option<&mut Token> {
        self.current.as_mut()
    }

    /// Consume the current token and advance to the next one.
    ///
    /// Returns `false` once the stream is over.
    ///
    /// # Errors
    /// Returns an error if the input is malformed.
    pub fn move_next(&mut self) -> Result<bool> {
        self.consume_current();
        self.move_next_without_consuming()
    }

    /// Make the next token current without consuming the previous one.
    ///
    /// Does nothing if a token is already current. The token stays current until
    /// [`Self::consume_current`] or [`Self::take_current`] is called.
    ///
    /// # Errors
    /// Returns an error if the input is malformed.
    pub fn move_next_without_consuming(&mut self) -> Result<bool> {
        if self.current.is_some() {
            return Ok(true);
        }
        if self.stream_end_produced {
            return Ok(false);
        }
        if !self.token_available {
            self.fetch_more_tokens()?;
        }
        match self.tokens.dequeue() {
            Ok(tok) => {
                self.token_available = false;
                if tok.1 == TokenType::StreamEnd {
                    self.stream_end_produced = true;
                }
                self.current = Some(tok);
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    /// Mark the current token as consumed.
    pub fn consume_current(&mut self) {
        if self.current.take().is_some() {
            self.tokens_parsed += 1;
        }
    }

    /// Consume the current token and hand it over.
    pub fn take_current(&mut self) -> Option<Token> {
        let tok = self.current.take();
        if tok.is_some() {
            self.tokens_parsed += 1;
        }
        tok
    }

    /// Return the next token in the stream.
    /// # Errors
    /// Returns an error when scanning fails to find an expected next token.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if self.move_next_without_consuming()? {
            Ok(self.take_current())
        } else {
            Ok(None)
        }
    }

    #[inline]
    fn ch(&mut self) -> char {
        self.input.peek(0)
    }

    #[inline]
    fn peek(&mut self, offset: usize) -> char {
        self.input.peek(offset)
    }

    /// The 0-based column of the next character.
    #[inline]
    fn col(&self) -> usize {
        self.cursor.line_offset()
    }

    /// Consume the next character. It is assumed the next character is a blank.
    #[inline]
    fn skip_blank(&mut self) {
        self.input.skip(1);
        self.cursor.skip();
    }

    /// Consume the next character. It is assumed the next character is not a blank.
    #[inline]
    fn skip_non_blank(&mut self) {
        self.skip_blank();
        self.leading_whitespace = false;
    }

    /// Consume the next characters. It is assumed none of the next characters are blanks.
    #[inline]
    fn skip_n_non_blank(&mut self, n: usize) {
        for _ in 0..n {
            self.skip_blank();
        }
        self.leading_whitespace = false;
    }

    /// Consume a linebreak (either CR, LF or CRLF), if any. Do nothing if there's none.
    #[inline]
    fn skip_linebreak(&mut self) {
        let width = match (self.ch(), self.peek(1)) {
            ('\r', '\n') => 2,
            (c, _) if is_break(c) => 1,
            _ => return,
        };
        self.input.skip(width);
        self.cursor.skip_line_break(width);
        self.leading_whitespace = true;
    }

    /// Read and consume a line break (either `\r`, `\n` or `\r\n`).
    ///
    /// A `\n` is pushed into `s`.
    #[inline]
    fn read_break(&mut self, s: &mut String) {
        debug_assert!(is_break(self.ch()));
        self.skip_linebreak();
        s.push('\n');
    }

    /// Whether the next 3 characters are `c` and the 4th one ends the indicator.
    fn next_is_three(&mut self, c: char) -> bool {
        self.ch() == c && self.peek(1) == c && self.peek(2) == c && is_blank_or_breakz(self.peek(3))
    }

    /// Check whether the next characters correspond to a document indicator.
    #[inline]
    fn next_is_document_indicator(&mut self) -> bool {
        self.col() == 0 && (self.next_is_three('-') || self.next_is_three('.'))
    }

    /// Whether we are sitting on the end of the input rather than on a literal NUL.
    fn at_end(&mut self) -> bool {
        is_z(self.ch()) && self.input.end_of_input()
    }

    fn allow_simple_key(&mut self) {
        self.simple_key_allowed = true;
    }

    fn disallow_simple_key(&mut self) {
        self.simple_key_allowed = false;
    }

    fn push_error(&mut self, start: Mark, message: &str) {
        let span = Span::new(start, self.mark());
        self.tokens
            .enqueue(Token(span, TokenType::Error(message.to_owned())));
    }

    /// Fetch the next token in the stream.
    /// # Errors
    /// Returns an error when the scanner does not find the next expected token.
    pub fn fetch_next_token(&mut self) -> ScanResult {
        let result = self.fetch_next_token_inner();
        for comment in self.pending_comments.drain(..) {
            self.tokens.enqueue(comment);
        }
        result
    }

    fn fetch_next_token_inner(&mut self) -> ScanResult {
        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.skip_to_next_token()?;

        debug_print!(
            "  \u{2192} fetch_next_token after whitespace {:?} {:?}",
            self.mark(),
            self.ch()
        );

        self.stale_simple_keys()?;

        let mark = self.mark();
        self.unroll_indent(self.col() as isize);

        if self.at_end() {
            return self.fetch_stream_end();
        }

        // Is it a directive?
        if self.col() == 0 && self.ch() == '%' {
            return self.fetch_directive();
        }

        if self.col() == 0 && self.next_is_three('-') {
            return self.fetch_document_indicator(TokenType::DocumentStart);
        }

        if self.col() == 0 && self.next_is_three('.') {
            self.fetch_document_indicator(TokenType::DocumentEnd)?;
            self.skip_ws_to_eol(SkipTabs::Yes)?;
            if !is_breakz(self.ch()) {
                return Err(Error::syntax(
                    Span::empty(self.mark()),
                    "invalid content after document end marker",
                ));
            }
            return Ok(());
        }

        if (self.col() as isize) < self.indent {
            return Err(Error::syntax(Span::empty(mark), "invalid indentation"));
        }

        let c = self.ch();
        let nc = self.peek(1);
        match c {
            '[' => self.fetch_flow_collection_start(TokenType::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenType::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenType::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenType::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blank_or_breakz(nc) => self.fetch_block_entry(),
            '?' if is_blank_or_breakz(nc) => self.fetch_key(),
            ':' if is_blank_or_breakz(nc)
                || (self.flow_level > 0
                    && (is_flow(nc) || mark.index == self.adjacent_value_allowed_at)) =>
            {
                self.fetch_value()
            }
            // Is it an alias?
            '*' => self.fetch_anchor(true),
            // Is it an anchor?
            '&' => self.fetch_anchor(false),
            '!' => self.fetch_tag(),
            // Is it a literal scalar?
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            // Is it a folded scalar?
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            // plain scalar
            '-' if !is_blank_or_breakz(nc) => self.fetch_plain_scalar(),
            ':' | '?' if !is_blank_or_breakz(nc) && self.flow_level == 0 => {
                self.fetch_plain_scalar()
            }
            '%' | '@' | '`' => Err(Error::syntax(
                Span::empty(mark),
                &format!("unexpected character: `{c}'"),
            )),
            '\0' => Err(Error::syntax(
                Span::empty(mark),
                "unexpected NUL character in the input",
            )),
            _ => self.fetch_plain_scalar(),
        }
    }

    /// Fetch tokens until the one at the front of the queue can be handed out.
    ///
    /// The front token cannot leave while it may still turn out to be a simple key.
    /// # Errors
    /// Returns an error when scanning fails.
    pub fn fetch_more_tokens(&mut self) -> ScanResult {
        let mut need_more;
        loop {
            if self.tokens.is_empty() {
                need_more = true;
            } else {
                need_more = false;
                // Stale potential keys that we know won't be keys.
                self.stale_simple_keys()?;
                // If our next token to be emitted may be a key, fetch more context.
                for sk in &self.simple_keys {
                    if sk.possible && sk.token_number == self.tokens_parsed {
                        need_more = true;
                        break;
                    }
                }
            }

            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;

        Ok(())
    }

    /// Mark simple keys that can no longer be keys as such.
    ///
    /// A simple key must stay on a single line and be shorter than 1024 characters.
    ///
    /// # Errors
    /// This function returns an error if one of the key we would stale was required to be a key.
    fn stale_simple_keys(&mut self) -> ScanResult {
        let mark = self.mark();
        for sk in &mut self.simple_keys {
            if sk.possible
                && (sk.mark.line < mark.line || sk.mark.index + MAX_SIMPLE_KEY_LENGTH < mark.index)
            {
                if sk.required {
                    return Err(Error::syntax(Span::new(sk.mark, mark), "simple key expect ':'"));
                }
                sk.possible = false;
            }
        }
        Ok(())
    }

    /// Skip over all whitespace and comments until the next token.
    ///
    /// Tabs are fine as separators but not as block indentation. A line indented with tabs only
    /// matters if there is content on it, and even then only once the parser reaches that
    /// content, so the violation is queued as an error token rather than raised here.
    fn skip_to_next_token(&mut self) -> ScanResult {
        loop {
            match self.ch() {
                '\t' if self.is_within_block()
                    && self.leading_whitespace
                    && (self.col() as isize) < self.indent =>
                {
                    let start = self.mark();
                    self.skip_ws_to_eol(SkipTabs::Yes)?;
                    if !is_breakz(self.ch()) {
                        self.push_error(
                            start,
                            "tabs disallowed within this context (block indentation)",
                        );
                        break;
                    }
                }
                '\t' | ' ' => self.skip_blank(),
                '\n' | '\r' => {
                    self.skip_linebreak();
                    if self.flow_level == 0 {
                        self.allow_simple_key();
                    }
                }
                '#' => {
                    if let Some(comment) = self.scan_comment() {
                        self.tokens.enqueue(comment);
                    }
                }
                c if is_bom(c) => self.skip_blank(),
                _ => break,
            }
        }
        Ok(())
    }

    /// Consume a comment up to (not including) the end of the line.
    ///
    /// Returns the comment token if comments are retained.
    fn scan_comment(&mut self) -> Option<Token> {
        let start = self.mark();
        let is_inline = !self.leading_whitespace;
        self.skip_non_blank();
        let mut text = String::new();
        while !is_breakz(self.ch()) {
            text.push(self.ch());
            self.skip_non_blank();
        }
        if self.skip_comments {
            return None;
        }
        Some(Token(
            Span::new(start, self.mark()),
            TokenType::Comment {
                text: text.trim().to_owned(),
                is_inline,
            },
        ))
    }

    /// Consume a comment found in the middle of a token's trailing whitespace.
    ///
    /// It is queued after the token being fetched.
    fn defer_comment(&mut self) {
        if let Some(comment) = self.scan_comment() {
            self.pending_comments.push(comment);
        }
    }

    /// Skip over YAML whitespace (` `, `\n`, `\r`).
    ///
    /// # Errors
    /// This function returns an error if no whitespace was found.
    fn skip_yaml_whitespace(&mut self) -> ScanResult {
        let mut need_whitespace = true;
        loop {
            match self.ch() {
                ' ' => {
                    self.skip_blank();
                    need_whitespace = false;
                }
                '\n' | '\r' => {
                    self.skip_linebreak();
                    if self.flow_level == 0 {
                        self.allow_simple_key();
                    }
                    need_whitespace = false;
                }
                '#' => self.defer_comment(),
                _ => break,
            }
        }

        if need_whitespace && !self.at_end() {
            Err(Error::syntax(Span::empty(self.mark()), "expected whitespace"))
        } else {
            Ok(())
        }
    }

    /// Skip yaml whitespace at most up to eol. Also skips comments.
    fn skip_ws_to_eol(&mut self, skip_tabs: SkipTabs) -> Result<SkipTabs> {
        let mut encountered_tab = false;
        let mut has_yaml_ws = false;
        loop {
            match self.ch() {
                ' ' => {
                    has_yaml_ws = true;
                    self.skip_blank();
                }
                '\t' if skip_tabs != SkipTabs::No => {
                    encountered_tab = true;
                    self.skip_blank();
                }
                // YAML comments must be preceded by whitespace.
                '#' if !encountered_tab && !has_yaml_ws => {
                    return Err(Error::syntax(
                        Span::empty(self.mark()),
                        "comments must be separated from other tokens by whitespace",
                    ));
                }
                '#' => self.defer_comment(),
                _ => break,
            }
        }

        Ok(SkipTabs::Result(encountered_tab, has_yaml_ws))
    }

    fn fetch_stream_start(&mut self) {
        let mark = self.mark();
        self.indent = -1;
        self.stream_start_produced = true;
        self.allow_simple_key();
        self.tokens
            .enqueue(Token(Span::empty(mark), TokenType::StreamStart));
        self.simple_keys.push(SimpleKey::default());
    }

    fn fetch_stream_end(&mut self) -> ScanResult {
        self.cursor.force_new_line();
        let mark = self.mark();

        // If the stream ended, we won't have more context. We can stall all the simple keys we
        // had. If one was required, however, that was an error and we must propagate it.
        for sk in &mut self.simple_keys {
            if sk.required && sk.possible {
                return Err(Error::syntax(Span::empty(mark), "simple key expected"));
            }
            sk.possible = false;
        }

        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.disallow_simple_key();

        self.tokens
            .enqueue(Token(Span::empty(mark), TokenType::StreamEnd));
        Ok(())
    }

    fn fetch_directive(&mut self) -> ScanResult {
        self.unroll_indent(-1);
        self.remove_simple_key()?;

        self.disallow_simple_key();

        if let Some(tok) = self.scan_directive()? {
            self.tokens.enqueue(tok);
        }

        Ok(())
    }

    /// Scan a `%` directive line. Unknown directives are skipped and yield no token.
    fn scan_directive(&mut self) -> Result<Option<Token>> {
        let start_mark = self.mark();
        self.skip_non_blank();

        let name = self.scan_directive_name()?;
        let tok = match name.as_ref() {
            "YAML" => Some(self.scan_version_directive_value(start_mark)?),
            "TAG" => Some(self.scan_tag_directive_value(start_mark)?),
            _ => {
                tracing::warn!("skipping unknown directive `%{name}' at {start_mark}");
                while !is_breakz(self.ch()) {
                    self.skip_non_blank();
                }
                None
            }
        };

        self.skip_ws_to_eol(SkipTabs::Yes)?;

        if is_breakz(self.ch()) {
            self.skip_linebreak();
            Ok(tok)
        } else {
            Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "while scanning a directive, did not find expected comment or line break",
            ))
        }
    }

    fn scan_version_directive_value(&mut self, mark: Mark) -> Result<Token> {
        while is_blank(self.ch()) {
            self.skip_blank();
        }

        let major = self.scan_version_directive_number(mark)?;

        if self.ch() != '.' {
            return Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while scanning a YAML directive, did not find expected digit or '.' character",
            ));
        }
        self.skip_non_blank();

        let minor = self.scan_version_directive_number(mark)?;

        Ok(Token(
            Span::new(mark, self.mark()),
            TokenType::VersionDirective(major, minor),
        ))
    }

    fn scan_directive_name(&mut self) -> Result<String> {
        let start_mark = self.mark();
        let mut string = String::new();
        while is_alpha(self.ch()) {
            string.push(self.ch());
            self.skip_non_blank();
        }

        if string.is_empty() {
            return Err(Error::syntax(
                Span::empty(start_mark),
                "while scanning a directive, could not find expected directive name",
            ));
        }

        if !is_blank_or_breakz(self.ch()) {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "while scanning a directive, found unexpected non-alphabetical character",
            ));
        }

        Ok(string)
    }

    fn scan_version_directive_number(&mut self, mark: Mark) -> Result<u32> {
        let mut val = 0u32;
        let mut length = 0usize;
        while let Some(digit) = self.ch().to_digit(10) {
            if length + 1 > 9 {
                return Err(Error::syntax(
                    Span::new(mark, self.mark()),
                    "while scanning a YAML directive, found extremely long version number",
                ));
            }
            length += 1;
            val = val * 10 + digit;
            self.skip_non_blank();
        }

        if length == 0 {
            return Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while scanning a YAML directive, did not find expected version number",
            ));
        }

        Ok(val)
    }

    fn scan_tag_directive_value(&mut self, mark: Mark) -> Result<Token> {
        while is_blank(self.ch()) {
            self.skip_blank();
        }
        let handle = self.scan_tag_handle(true, mark)?;

        while is_blank(self.ch()) {
            self.skip_blank();
        }

        let prefix = self.scan_tag_prefix(mark)?;

        if is_blank_or_breakz(self.ch()) {
            Ok(Token(
                Span::new(mark, self.mark()),
                TokenType::TagDirective(handle, prefix),
            ))
        } else {
            Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while scanning TAG, did not find expected whitespace or line break",
            ))
        }
    }

    fn fetch_tag(&mut self) -> ScanResult {
        self.save_simple_key();
        self.disallow_simple_key();

        let tok = self.scan_tag()?;
        self.tokens.enqueue(tok);
        Ok(())
    }

    fn scan_tag(&mut self) -> Result<Token> {
        let start_mark = self.mark();
        let mut handle = String::new();
        let mut suffix;

        // Check if the tag is in the canonical form (verbatim).
        if self.peek(1) == '<' {
            suffix = self.scan_verbatim_tag(start_mark)?;
        } else {
            // The tag has either the '!suffix' or the '!handle!suffix'
            handle = self.scan_tag_handle(false, start_mark)?;
            // Check if it is, indeed, handle.
            if handle.len() >= 2 && handle.starts_with('!') && handle.ends_with('!') {
                suffix = self.scan_tag_shorthand_suffix("", start_mark)?;
            } else {
                suffix = self.scan_tag_shorthand_suffix(&handle, start_mark)?;
                handle = "!".to_owned();
                // A special case: the '!' tag. Set the handle to '' and the suffix to '!'.
                if suffix.is_empty() {
                    handle.clear();
                    suffix = "!".to_owned();
                }
            }
        }

        let end_mark = self.mark();
        if is_blank_or_breakz(self.ch()) || (self.flow_level > 0 && is_flow(self.ch())) {
            Ok(Token(
                Span::new(start_mark, end_mark),
                TokenType::Tag(handle, suffix),
            ))
        } else {
            Err(Error::syntax(
                Span::new(start_mark, end_mark),
                "while scanning a tag, did not find expected whitespace or line break",
            ))
        }
    }

    fn scan_tag_handle(&mut self, directive: bool, mark: Mark) -> Result<String> {
        let mut string = String::new();
        if self.ch() != '!' {
            return Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while scanning a tag, did not find expected '!'",
            ));
        }

        string.push(self.ch());
        self.skip_non_blank();

        while is_alpha(self.ch()) {
            string.push(self.ch());
            self.skip_non_blank();
        }

        // Check if the trailing character is '!' and copy it.
        if self.ch() == '!' {
            string.push(self.ch());
            self.skip_non_blank();
        } else if directive && string != "!" {
            // It's either the '!' tag or not really a tag handle. If it's a %TAG directive, it's
            // an error. If it's a tag token, it must be a part of the URI.
            return Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while parsing a tag directive, did not find expected '!'",
            ));
        }
        Ok(string)
    }

    /// Scan for a tag prefix.
    ///
    /// There are 2 kinds of tag prefixes:
    ///   - Local: Starts with a `!`, contains only URI chars (`!foo`)
    ///   - Global: Starts with a tag char, contains then URI chars (`!foo,2000:app/`)
    fn scan_tag_prefix(&mut self, start_mark: Mark) -> Result<String> {
        let mut string = String::new();

        if self.ch() == '!' {
            string.push(self.ch());
            self.skip_non_blank();
        } else if !is_tag_char(self.ch()) {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "invalid global tag character",
            ));
        } else if self.ch() == '%' {
            string.push(self.scan_uri_escapes(start_mark)?);
        } else {
            string.push(self.ch());
            self.skip_non_blank();
        }

        while is_uri_char(self.ch()) {
            if self.ch() == '%' {
                string.push(self.scan_uri_escapes(start_mark)?);
            } else {
                string.push(self.ch());
                self.skip_non_blank();
            }
        }

        Ok(string)
    }

    /// Scan for a verbatim tag.
    ///
    /// The prefixing `!<` must _not_ have been skipped.
    fn scan_verbatim_tag(&mut self, start_mark: Mark) -> Result<String> {
        self.skip_n_non_blank(2);

        let mut string = String::new();
        while is_uri_char(self.ch()) {
            if self.ch() == '%' {
                string.push(self.scan_uri_escapes(start_mark)?);
            } else {
                string.push(self.ch());
                self.skip_non_blank();
            }
        }

        if self.ch() != '>' {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "while scanning a verbatim tag, did not find the expected '>'",
            ));
        }
        self.skip_non_blank();

        Ok(string)
    }

    fn scan_tag_shorthand_suffix(&mut self, head: &str, mark: Mark) -> Result<String> {
        let mut length = head.len();
        let mut string = String::new();

        // Copy the head if needed.
        // Note that we don't copy the leading '!' character.
        if length > 1 {
            string.extend(head.chars().skip(1));
        }

        while is_tag_char(self.ch()) {
            // Check if it is a URI-escape sequence.
            if self.ch() == '%' {
                string.push(self.scan_uri_escapes(mark)?);
            } else {
                string.push(self.ch());
                self.skip_non_blank();
            }

            length += 1;
        }

        if length == 0 {
            return Err(Error::syntax(
                Span::new(mark, self.mark()),
                "while parsing a tag, did not find expected tag URI",
            ));
        }

        Ok(string)
    }

    /// Decode a run of `%XX` escapes forming one UTF-8 encoded character.
    fn scan_uri_escapes(&mut self, mark: Mark) -> Result<char> {
        let mut width = 0usize;
        let mut code = 0u32;
        loop {
            if !(self.ch() == '%' && is_hex(self.peek(1)) && is_hex(self.peek(2))) {
                return Err(Error::syntax(
                    Span::new(mark, self.mark()),
                    "while parsing a tag, did not find URI escaped octet",
                ));
            }

            let octet = (as_hex(self.peek(1)) << 4) + as_hex(self.peek(2));
            if width == 0 {
                width = match octet {
                    _ if octet & 0x80 == 0x00 => 1,
                    _ if octet & 0xE0 == 0xC0 => 2,
                    _ if octet & 0xF0 == 0xE0 => 3,
                    _ if octet & 0xF8 == 0xF0 => 4,
                    _ => {
                        return Err(Error::syntax(
                            Span::new(mark, self.mark()),
                            "while parsing a tag, found an incorrect leading UTF-8 octet",
                        ));
                    }
                };
                code = match width {
                    1 => octet,
                    2 => octet & 0x1F,
                    3 => octet & 0x0F,
                    _ => octet & 0x07,
                };
            } else {
                if octet & 0xc0 != 0x80 {
                    return Err(Error::syntax(
                        Span::new(mark, self.mark()),
                        "while parsing a tag, found an incorrect trailing UTF-8 octet",
                    ));
                }
                code = (code << 6) + (octet & 0x3F);
            }

            self.skip_n_non_blank(3);

            width -= 1;
            if width == 0 {
                break;
            }
        }

        char::from_u32(code).ok_or_else(|| {
            Error::syntax(
                Span::new(mark, self.mark()),
                "while parsing a tag, found an invalid UTF-8 codepoint",
            )
        })
    }

    fn fetch_anchor(&mut self, alias: bool) -> ScanResult {
        self.save_simple_key();
        self.disallow_simple_key();

        let tok = self.scan_anchor(alias)?;

        self.tokens.enqueue(tok);

        Ok(())
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token> {
        let mut string = String::new();
        let start_mark = self.mark();

        self.skip_non_blank();
        while is_anchor_char(self.ch()) {
            string.push(self.ch());
            self.skip_non_blank();
        }

        let span = Span::new(start_mark, self.mark());
        if string.is_empty() {
            return Err(Error::syntax(span, "while scanning an anchor or alias, did not find expected alphabetic or numeric character"));
        }

        if alias {
            Ok(Token(span, TokenType::Alias(string)))
        } else {
            Ok(Token(span, TokenType::Anchor(string)))
        }
    }

    fn fetch_flow_collection_start(&mut self, tok: TokenType) -> ScanResult {
        // The indicators '[' and '{' may start a simple key.
        self.save_simple_key();

        self.roll_one_col_indent();
        self.increase_flow_level()?;

        self.allow_simple_key();

        let start_mark = self.mark();
        self.skip_non_blank();
        self.tokens
            .enqueue(Token(Span::new(start_mark, self.mark()), tok));

        self.skip_ws_to_eol(SkipTabs::Yes)?;
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, tok: TokenType) -> ScanResult {
        self.remove_simple_key()?;
        self.decrease_flow_level();

        self.disallow_simple_key();

        let start_mark = self.mark();
        self.skip_non_blank();
        self.tokens
            .enqueue(Token(Span::new(start_mark, self.mark()), tok));
        self.skip_ws_to_eol(SkipTabs::Yes)?;

        // A flow collection within a flow mapping can be a key. In that case, the value may be
        // adjacent to the `:`.
        // ```yaml
        // - [ {a: b}:value ]
        // ```
        if self.flow_level > 0 {
            self.adjacent_value_allowed_at = self.mark().index;
        }

        Ok(())
    }

    /// Push the `FlowEntry` token and skip over the `,`.
    fn fetch_flow_entry(&mut self) -> ScanResult {
        self.remove_simple_key()?;
        self.allow_simple_key();

        let start_mark = self.mark();
        self.skip_non_blank();
        self.tokens
            .enqueue(Token(Span::new(start_mark, self.mark()), TokenType::FlowEntry));
        self.skip_ws_to_eol(SkipTabs::Yes)?;
        Ok(())
    }

    fn increase_flow_level(&mut self) -> ScanResult {
        self.simple_keys.push(SimpleKey::default());
        self.flow_level = self.flow_level.checked_add(1).ok_or_else(|| {
            Error::syntax(Span::empty(self.cursor.mark()), "recursion limit exceeded")
        })?;
        Ok(())
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Push the `Block*` token(s) and skip over the `-`.
    ///
    /// Add an indentation level and push a `BlockSequenceStart` token if needed, then push a
    /// `BlockEntry` token.
    /// This function only skips over the `-` and does not fetch the entry value.
    fn fetch_block_entry(&mut self) -> ScanResult {
        if self.flow_level > 0 {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                r#""-" is only valid inside a block"#,
            ));
        }
        // Check if we are allowed to start a new entry.
        if !self.simple_key_allowed {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                "block sequence entries are not allowed in this context",
            ));
        }

        // An anchor or tag alone at column 0 cannot introduce an indented sequence.
        if let Some(Token(span, TokenType::Anchor(..) | TokenType::Tag(..))) = self.tokens.back() {
            if self.col() == 0 && span.start.line_offset() == 0 && self.indent > -1 {
                return Err(Error::syntax(*span, "invalid indentation for anchor"));
            }
        }

        // Skip over the `-`.
        let mark = self.mark();
        self.skip_non_blank();
        let end_mark = self.mark();

        // generate BLOCK-SEQUENCE-START if indented
        self.roll_indent(
            mark.line_offset(),
            None,
            TokenType::BlockSequenceStart,
            mark,
        );
        let found_tabs = self.skip_ws_to_eol(SkipTabs::Yes)?.found_tabs();
        if found_tabs && self.ch() == '-' && is_blank_or_breakz(self.peek(1)) {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                "'-' must be followed by a valid YAML whitespace",
            ));
        }

        self.skip_ws_to_eol(SkipTabs::No)?;
        if is_break(self.ch()) || is_flow(self.ch()) {
            self.roll_one_col_indent();
        }

        self.remove_simple_key()?;
        self.allow_simple_key();

        self.tokens
            .enqueue(Token(Span::new(mark, end_mark), TokenType::BlockEntry));

        Ok(())
    }

    fn fetch_document_indicator(&mut self, t: TokenType) -> ScanResult {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.disallow_simple_key();

        let mark = self.mark();

        self.skip_n_non_blank(3);

        self.tokens.enqueue(Token(Span::new(mark, self.mark()), t));
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> ScanResult {
        self.remove_simple_key()?;
        self.allow_simple_key();
        let tok = self.scan_block_scalar(literal)?;

        self.tokens.enqueue(tok);
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token> {
        let start_mark = self.mark();
        let mut chomping = Chomping::Clip;
        let mut increment: usize = 0;
        let mut indent: usize = 0;
        let mut trailing_blank: bool;
        let mut leading_blank: bool = false;
        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut chomping_break = String::new();

        // skip '|' or '>'
        self.skip_non_blank();
        self.unroll_non_block_indents();

        if self.ch() == '+' || self.ch() == '-' {
            chomping = if self.ch() == '+' {
                Chomping::Keep
            } else {
                Chomping::Strip
            };
            self.skip_non_blank();
            if is_digit(self.ch()) {
                increment = self.scan_indentation_indicator(start_mark)?;
            }
        } else if is_digit(self.ch()) {
            increment = self.scan_indentation_indicator(start_mark)?;
            if self.ch() == '+' || self.ch() == '-' {
                chomping = if self.ch() == '+' {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                self.skip_non_blank();
            }
        }

        self.skip_ws_to_eol(SkipTabs::Yes)?;

        // Check if we are at the end of the line.
        if !is_breakz(self.ch()) {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "while scanning a block scalar, did not find expected comment or line break",
            ));
        }

        if is_break(self.ch()) {
            self.read_break(&mut chomping_break);
        }

        if self.ch() == '\t' {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "a block scalar content cannot start with a tab",
            ));
        }

        if increment > 0 {
            indent = if self.indent >= 0 {
                (self.indent + increment as isize) as usize
            } else {
                increment
            }
        }

        // Scan the leading line breaks and determine the indentation level if needed.
        if indent == 0 {
            self.skip_block_scalar_first_line_indent(&mut indent, &mut trailing_breaks);
        } else {
            self.skip_block_scalar_indent(indent, &mut trailing_breaks);
        }

        // We have an end-of-stream with no content, e.g.:
        // ```yaml
        // - |+
        // ```
        if is_z(self.ch()) {
            let contents = match chomping {
                // We strip trailing linebreaks. Nothing remain.
                Chomping::Strip => String::new(),
                // There was no newline after the chomping indicator.
                _ if self.mark().line == start_mark.line => String::new(),
                // We clip lines, and there was a newline after the chomping indicator.
                // All other breaks are ignored.
                Chomping::Clip => chomping_break,
                // We keep lines. There was a newline after the chomping indicator but nothing
                // else.
                Chomping::Keep if trailing_breaks.is_empty() => chomping_break,
                // Otherwise, the newline after chomping is ignored.
                Chomping::Keep => trailing_breaks,
            };
            return Ok(Token(
                Span::new(start_mark, self.mark()),
                TokenType::Scalar {
                    style,
                    value: contents,
                    is_key: false,
                },
            ));
        }

        if self.col() < indent && (self.col() as isize) > self.indent {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                "wrongly indented line in block scalar",
            ));
        }

        while self.col() == indent && !is_z(self.ch()) {
            if indent == 0 && self.next_is_three('.') {
                break;
            }

            // We are at the first content character of a content line.
            trailing_blank = is_blank(self.ch());
            if !literal && !leading_break.is_empty() && !leading_blank && !trailing_blank {
                string.push_str(&trailing_breaks);
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
            } else {
                string.push_str(&leading_break);
                string.push_str(&trailing_breaks);
            }

            leading_break.clear();
            trailing_breaks.clear();

            leading_blank = is_blank(self.ch());

            while !is_breakz(self.ch()) {
                string.push(self.ch());
                self.skip_blank();
            }

            // break on EOF
            if is_z(self.ch()) {
                break;
            }

            self.read_break(&mut leading_break);

            // Eat the following indentation spaces and line breaks.
            self.skip_block_scalar_indent(indent, &mut trailing_breaks);
        }

        // Chomp the tail.
        // Only breaks actually read are kept; a last line cut off by the end of input has none.
        if chomping != Chomping::Strip {
            string.push_str(&leading_break);
        }

        if chomping == Chomping::Keep {
            string.push_str(&trailing_breaks);
        }

        Ok(Token(
            Span::new(start_mark, self.mark()),
            TokenType::Scalar {
                style,
                value: string,
                is_key: false,
            },
        ))
    }

    fn scan_indentation_indicator(&mut self, start_mark: Mark) -> Result<usize> {
        if self.ch() == '0' {
            return Err(Error::syntax(
                Span::new(start_mark, self.mark()),
                "while scanning a block scalar, found an indentation indicator equal to 0",
            ));
        }
        let increment = self.ch().to_digit(10).unwrap_or(0) as usize;
        self.skip_non_blank();
        Ok(increment)
    }

    /// Skip the block scalar indentation and empty lines.
    fn skip_block_scalar_indent(&mut self, indent: usize, breaks: &mut String) {
        loop {
            // Consume all spaces. Tabs cannot be used as indentation.
            while self.col() < indent && self.ch() == ' ' {
                self.skip_blank();
            }

            // If our current line is empty, skip over the break and continue looping.
            if is_break(self.ch()) {
                self.read_break(breaks);
            } else {
                // Otherwise, we have a content line. Return control.
                break;
            }
        }
    }

    /// Determine the indentation level for a block scalar from the first line of its contents.
    ///
    /// The function skips over whitespace-only lines and sets `indent` to the the longest
    /// whitespace line that was encountered.
    fn skip_block_scalar_first_line_indent(&mut self, indent: &mut usize, breaks: &mut String) {
        let mut max_indent = 0;
        loop {
            // Consume all spaces. Tabs cannot be used as indentation.
            while self.ch() == ' ' {
                self.skip_blank();
            }

            if self.col() > max_indent {
                max_indent = self.col();
            }

            if is_break(self.ch()) {
                // If our current line is empty, skip over the break and continue looping.
                self.read_break(breaks);
            } else {
                // Otherwise, we have a content line. Return control.
                break;
            }
        }

        // A block scalar at the root may sit at column 0; anywhere else its content must be
        // indented by at least one column.
        *indent = max_indent.max((self.indent + 1) as usize);
        if self.indent > 0 {
            *indent = (*indent).max(1);
        }
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> ScanResult {
        self.save_simple_key();
        self.disallow_simple_key();

        let tok = self.scan_flow_scalar(single)?;

        // To ensure JSON compatibility, if a key inside a flow mapping is JSON-like, YAML allows
        // the following value to be specified adjacent to the `:`.
        self.adjacent_value_allowed_at = self.mark().index;

        self.tokens.enqueue(tok);
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token> {
        let start_mark = self.mark();

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks;

        // Eat the left quote.
        self.skip_non_blank();

        loop {
            if self.next_is_document_indicator() {
                return Err(Error::syntax(
                    Span::new(start_mark, self.mark()),
                    "while scanning a quoted scalar, found unexpected document indicator",
                ));
            }

            if is_z(self.ch()) {
                return Err(Error::syntax(
                    Span::new(start_mark, self.mark()),
                    "while scanning a quoted scalar, found unexpected end of stream",
                ));
            }

            if (self.col() as isize) < self.indent {
                return Err(Error::syntax(
                    Span::new(start_mark, self.mark()),
                    "invalid indentation in quoted scalar",
                ));
            }

            leading_blanks = false;
            self.consume_flow_scalar_non_whitespace_chars(
                single,
                &mut string,
                &mut leading_blanks,
                start_mark,
            )?;

            match self.ch() {
                '\'' if single => break,
                '"' if !single => break,
                _ => {}
            }

            // Consume blank characters.
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    // Consume a space or a tab character.
                    if leading_blanks {
                        if self.ch() == '\t' && (self.col() as isize) < self.indent {
                            return Err(Error::syntax(
                                Span::empty(self.mark()),
                                "tab cannot be used as indentation",
                            ));
                        }
                        self.skip_blank();
                    } else {
                        whitespaces.push(self.ch());
                        self.skip_blank();
                    }
                } else if leading_blanks {
                    // Check if it is a first line break.
                    self.read_break(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break(&mut leading_break);
                    leading_blanks = true;
                }
            }

            // Join the whitespaces or fold line breaks.
            if leading_blanks {
                if leading_break.is_empty() {
                    string.push_str(&leading_break);
                    string.push_str(&trailing_breaks);
                    trailing_breaks.clear();
                    leading_break.clear();
                } else {
                    if trailing_breaks.is_empty() {
                        string.push(' ');
                    } else {
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                    }
                    leading_break.clear();
                }
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        }

        // Eat the right quote.
        self.skip_non_blank();
        let end_mark = self.mark();
        // Ensure there is no invalid trailing content.
        self.skip_ws_to_eol(SkipTabs::Yes)?;
        match self.ch() {
            // These can be encountered in flow sequences or mappings.
            ',' | '}' | ']' if self.flow_level > 0 => {}
            // An end-of-line / end-of-stream is fine. No trailing content.
            c if is_breakz(c) => {}
            // ':' can be encountered if our scalar is a key.
            // Outside of flow contexts, keys cannot span multiple lines
            ':' if self.flow_level == 0 && start_mark.line == self.mark().line => {}
            // Inside a flow context, this is allowed.
            ':' if self.flow_level > 0 => {}
            _ => {
                return Err(Error::syntax(
                    Span::empty(self.mark()),
                    "invalid trailing content after double-quoted scalar",
                ));
            }
        }

        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token(
            Span::new(start_mark, end_mark),
            TokenType::Scalar {
                style,
                value: string,
                is_key: false,
            },
        ))
    }

    /// Consume successive non-whitespace characters from a flow scalar.
    ///
    /// This function resolves escape sequences and stops upon encountering a whitespace, the end
    /// of the stream or the closing character for the scalar (`'` for single quoted scalars, `"`
    /// for double quoted scalars).
    ///
    /// # Errors
    /// Return an error if an invalid escape sequence is found.
    fn consume_flow_scalar_non_whitespace_chars(
        &mut self,
        single: bool,
        string: &mut String,
        leading_blanks: &mut bool,
        start_mark: Mark,
    ) -> ScanResult {
        while !is_blank_or_breakz(self.ch()) {
            match self.ch() {
                // Check for an escaped single quote.
                '\'' if self.peek(1) == '\'' && single => {
                    string.push('\'');
                    self.skip_n_non_blank(2);
                }
                // Check for the right quote.
                '\'' if single => break,
                '"' if !single => break,
                // Check for an escaped line break.
                '\\' if !single && is_break(self.peek(1)) => {
                    self.skip_non_blank();
                    self.skip_linebreak();
                    *leading_blanks = true;
                    break;
                }
                // Check for an escape sequence.
                '\\' if !single => {
                    string.push(self.resolve_flow_scalar_escape_sequence(start_mark)?);
                }
                c => {
                    string.push(c);
                    self.skip_non_blank();
                }
            }
        }
        Ok(())
    }

    /// Escape the sequence we encounter in a flow scalar.
    ///
    /// `self.ch()` must point to the `\` starting the escape sequence.
    ///
    /// # Errors
    /// Return an error if an invalid escape sequence is found.
    fn resolve_flow_scalar_escape_sequence(&mut self, start_mark: Mark) -> Result<char> {
        let mut code_length = 0usize;
        let mut ret = '\0';

        match self.peek(1) {
            '0' => ret = '\0',
            'a' => ret = '\x07',
            'b' => ret = '\x08',
            't' | '\t' => ret = '\t',
            'n' => ret = '\n',
            'v' => ret = '\x0b',
            'f' => ret = '\x0c',
            'r' => ret = '\x0d',
            'e' => ret = '\x1b',
            ' ' => ret = '\x20',
            '"' => ret = '"',
            '/' => ret = '/',
            '\\' => ret = '\\',
            // Unicode next line (#x85)
            'N' => ret = '\u{85}',
            // Unicode non-breaking space (#xA0)
            '_' => ret = '\u{A0}',
            // Unicode line separator (#x2028)
            'L' => ret = '\u{2028}',
            // Unicode paragraph separator (#x2029)
            'P' => ret = '\u{2029}',
            'x' => code_length = 2,
            'u' => code_length = 4,
            'U' => code_length = 8,
            _ => {
                return Err(Error::syntax(
                    Span::new(start_mark, self.mark()),
                    "while parsing a quoted scalar, found unknown escape character",
                ))
            }
        }
        self.skip_n_non_blank(2);

        // Consume an arbitrary escape code.
        if code_length > 0 {
            let mut value = 0u32;
            for i in 0..code_length {
                let c = self.peek(i);
                if !is_hex(c) {
                    return Err(Error::syntax(
                        Span::new(start_mark, self.mark()),
                        "while parsing a quoted scalar, did not find expected hexadecimal number",
                    ));
                }
                value = (value << 4) + as_hex(c);
            }

            let Some(ch) = char::from_u32(value) else {
                return Err(Error::syntax(
                    Span::new(start_mark, self.mark()),
                    "while parsing a quoted scalar, found invalid Unicode character escape code",
                ));
            };
            ret = ch;

            self.skip_n_non_blank(code_length);
        }
        Ok(ret)
    }

    fn fetch_plain_scalar(&mut self) -> ScanResult {
        self.save_simple_key();
        self.disallow_simple_key();

        let tok = self.scan_plain_scalar()?;

        self.tokens.enqueue(tok);
        Ok(())
    }

    /// Scan for a plain scalar.
    ///
    /// Plain scalars are the most readable but restricted style. They may span multiple lines in
    /// some contexts.
    #[allow(clippy::too_many_lines)]
    fn scan_plain_scalar(&mut self) -> Result<Token> {
        self.unroll_non_block_indents();
        let indent = self.indent + 1;
        let start_mark = self.mark();
        let mut end_mark = start_mark;

        if self.flow_level > 0 && (start_mark.line_offset() as isize) < indent {
            return Err(Error::syntax(
                Span::empty(start_mark),
                "invalid indentation in flow construct",
            ));
        }

        let mut string = String::with_capacity(32);
        let mut leading_break = String::with_capacity(32);
        let mut trailing_breaks = String::with_capacity(32);
        let mut whitespaces = String::with_capacity(32);

        loop {
            if self.next_is_document_indicator() || self.ch() == '#' {
                break;
            }

            if self.flow_level > 0 && self.ch() == '-' && is_flow(self.peek(1)) {
                return Err(Error::syntax(
                    Span::empty(self.mark()),
                    "plain scalar cannot start with '-' followed by ,[]{}",
                ));
            }

            if !is_blank_or_breakz(self.ch()) && self.next_can_be_plain_scalar() {
                if self.leading_whitespace {
                    if leading_break.is_empty() {
                        string.push_str(&leading_break);
                        string.push_str(&trailing_breaks);
                        trailing_breaks.clear();
                        leading_break.clear();
                    } else {
                        if trailing_breaks.is_empty() {
                            string.push(' ');
                        } else {
                            string.push_str(&trailing_breaks);
                            trailing_breaks.clear();
                        }
                        leading_break.clear();
                    }
                    self.leading_whitespace = false;
                } else if !whitespaces.is_empty() {
                    string.push_str(&whitespaces);
                    whitespaces.clear();
                }

                // We can unroll the first iteration of the loop.
                string.push(self.ch());
                self.skip_non_blank();

                // Add content non-blank characters to the scalar.
                while !is_blank_or_breakz(self.ch()) {
                    if !self.next_can_be_plain_scalar() {
                        break;
                    }

                    string.push(self.ch());
                    self.skip_non_blank();
                }
                end_mark = self.mark();
            }

            // We may reach the end of a plain scalar if:
            //  - We reach eof
            //  - We reach ": "
            //  - We find a flow character in a flow context
            if !(is_blank(self.ch()) || is_break(self.ch())) {
                break;
            }

            // Process blank characters.
            while is_blank(self.ch()) || is_break(self.ch()) {
                if is_blank(self.ch()) {
                    if !self.leading_whitespace {
                        whitespaces.push(self.ch());
                        self.skip_blank();
                    } else if (self.col() as isize) < indent && self.ch() == '\t' {
                        // Tabs in an indentation columns are allowed if and only if the line is
                        // empty. Skip to the end of the line.
                        self.skip_ws_to_eol(SkipTabs::Yes)?;
                        if !is_breakz(self.ch()) {
                            return Err(Error::syntax(
                                Span::new(start_mark, self.mark()),
                                "while scanning a plain scalar, found a tab",
                            ));
                        }
                    } else {
                        self.skip_blank();
                    }
                } else if self.leading_whitespace {
                    // Check if it is a first line break
                    self.read_break(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break(&mut leading_break);
                    self.leading_whitespace = true;
                }
            }

            // check indentation level
            if self.flow_level == 0 && (self.col() as isize) < indent {
                break;
            }
        }

        if self.leading_whitespace {
            self.allow_simple_key();
        }

        Ok(Token(
            Span::new(start_mark, end_mark),
            TokenType::Scalar {
                style: ScalarStyle::Plain,
                value: string,
                is_key: false,
            },
        ))
    }

    fn fetch_key(&mut self) -> ScanResult {
        let start_mark = self.mark();
        if self.flow_level == 0 {
            // Check if we are allowed to start a new key (not necessarily simple).
            if !self.simple_key_allowed {
                return Err(Error::syntax(
                    Span::empty(start_mark),
                    "mapping keys are not allowed in this context",
                ));
            }
            self.roll_indent(
                start_mark.line_offset(),
                None,
                TokenType::BlockMappingStart,
                start_mark,
            );
        }

        self.remove_simple_key()?;

        if self.flow_level == 0 {
            self.allow_simple_key();
        } else {
            self.disallow_simple_key();
        }

        self.skip_non_blank();
        self.tokens
            .enqueue(Token(Span::new(start_mark, self.mark()), TokenType::Key));
        self.skip_yaml_whitespace()?;
        if self.ch() == '\t' {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                "tabs disallowed in this context",
            ));
        }
        Ok(())
    }

    /// Fetch a value from a mapping (after a `:`).
    fn fetch_value(&mut self) -> ScanResult {
        let sk = self.simple_keys.last().cloned().unwrap_or_default();
        let start_mark = self.mark();

        // Skip over ':'.
        self.skip_non_blank();
        let end_mark = self.mark();
        if self.ch() == '\t'
            && !self.skip_ws_to_eol(SkipTabs::Yes)?.has_valid_yaml_ws()
            && (self.ch() == '-' || is_alpha(self.ch()))
        {
            return Err(Error::syntax(
                Span::empty(self.mark()),
                "':' must be followed by a valid YAML whitespace",
            ));
        }

        if sk.possible {
            // insert simple key
            let position = sk.token_number.saturating_sub(self.tokens_parsed);
            self.tokens
                .insert(position, Token(Span::empty(sk.mark), TokenType::Key));
            self.flag_key_scalar(position + 1);

            // Add the BLOCK-MAPPING-START token if needed.
            self.roll_indent(
                sk.mark.line_offset(),
                Some(sk.token_number),
                TokenType::BlockMappingStart,
                sk.mark,
            );
            self.roll_one_col_indent();

            if let Some(last) = self.simple_keys.last_mut() {
                last.possible = false;
            }
            self.disallow_simple_key();
        } else {
            // The ':' indicator follows a complex key.
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    self.push_error(start_mark, "mapping values are not allowed in this context");
                    return Ok(());
                }

                self.roll_indent(
                    start_mark.line_offset(),
                    None,
                    TokenType::BlockMappingStart,
                    start_mark,
                );
            }
            self.roll_one_col_indent();

            if self.flow_level == 0 {
                self.allow_simple_key();
            } else {
                self.disallow_simple_key();
            }
        }
        self.tokens
            .enqueue(Token(Span::new(start_mark, end_mark), TokenType::Value));

        Ok(())
    }

    /// Flag the scalar starting at queue position `position` as a mapping key.
    ///
    /// Node properties (anchor, tag) may sit between the `Key` token and the scalar.
    fn flag_key_scalar(&mut self, mut position: usize) {
        while let Some(Token(_, kind)) = self.tokens.get_mut(position) {
            match kind {
                TokenType::Scalar { is_key, .. } => {
                    *is_key = true;
                    break;
                }
                TokenType::Anchor(_) | TokenType::Tag(..) | TokenType::Comment { .. } => {
                    position += 1;
                }
                _ => break,
            }
        }
    }

    /// Add an indentation level to the stack with the given block token, if needed.
    ///
    /// An indentation level is added only if:
    ///   - We are not in a flow-style construct (which don't have indentation per-se).
    ///   - The current column is further indented than the last indent we have registered.
    fn roll_indent(&mut self, col: usize, number: Option<usize>, tok: TokenType, mark: Mark) {
        if self.flow_level > 0 {
            return;
        }

        // If the last indent was a non-block indent, remove it.
        // This means that we prepared an indent that we thought we wouldn't use, but realized just
        // now that it is a block indent.
        if self.indent <= col as isize {
            if let Some(indent) = self.indents.last() {
                if !indent.needs_block_end {
                    self.indent = indent.indent;
                    self.indents.pop();
                }
            }
        }

        if self.indent < col as isize {
            self.indents.push(Indent {
                indent: self.indent,
                needs_block_end: true,
            });
            self.indent = col as isize;
            let token = Token(Span::empty(mark), tok);
            match number {
                Some(n) => self
                    .tokens
                    .insert(n.saturating_sub(self.tokens_parsed), token),
                None => self.tokens.enqueue(token),
            }
        }
    }

    /// Pop indentation levels from the stack as much as needed.
    ///
    /// Indentation levels are popped from the stack while they are further indented than `col`.
    /// If we are in a flow-style construct (which don't have indentation per-se), this function
    /// does nothing.
    fn unroll_indent(&mut self, col: isize) {
        if self.flow_level > 0 {
            return;
        }
        let mark = self.mark();
        while self.indent > col {
            let Some(indent) = self.indents.pop() else {
                break;
            };
            self.indent = indent.indent;
            if indent.needs_block_end {
                self.tokens
                    .enqueue(Token(Span::empty(mark), TokenType::BlockEnd));
            }
        }
    }

    /// Add an indentation level of 1 column that does not start a block.
    ///
    /// See the documentation of [`Indent::needs_block_end`] for more details.
    /// An indentation is not added if we are inside a flow level or if the last indent is already
    /// a non-block indent.
    fn roll_one_col_indent(&mut self) {
        if self.flow_level == 0
            && self
                .indents
                .last()
                .map_or(false, |indent| indent.needs_block_end)
        {
            self.indents.push(Indent {
                indent: self.indent,
                needs_block_end: false,
            });
            self.indent += 1;
        }
    }

    /// Unroll all last indents created with [`Self::roll_one_col_indent`].
    fn unroll_non_block_indents(&mut self) {
        while let Some(indent) = self.indents.last() {
            if indent.needs_block_end {
                break;
            }
            self.indent = indent.indent;
            self.indents.pop();
        }
    }

    /// Mark the next token to be inserted as a potential simple key.
    fn save_simple_key(&mut self) {
        if self.simple_key_allowed {
            let required = self.flow_level == 0
                && self.indent == (self.col() as isize)
                && self
                    .indents
                    .last()
                    .map_or(false, |indent| indent.needs_block_end);
            let sk = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark(),
            };

            self.simple_keys.pop();
            self.simple_keys.push(sk);
        }
    }

    fn remove_simple_key(&mut self) -> ScanResult {
        let mark = self.mark();
        if let Some(last) = self.simple_keys.last_mut() {
            if last.possible && last.required {
                return Err(Error::syntax(Span::empty(mark), "simple key expected"));
            }
            last.possible = false;
        }
        Ok(())
    }

    /// Check whether the next characters may be part of a plain scalar.
    ///
    /// This function assumes we are not given a blankz character.
    fn next_can_be_plain_scalar(&mut self) -> bool {
        let nc = self.peek(1);
        match self.ch() {
            // indicators can end a plain scalar, see 7.3.3. Plain Style
            ':' if is_blank_or_breakz(nc) || (self.flow_level > 0 && is_flow(nc)) => false,
            c if self.flow_level > 0 && is_flow(c) => false,
            _ => true,
        }
    }

    /// Return whether the scanner is inside a block but outside of a flow sequence.
    fn is_within_block(&self) -> bool {
        !self.indents.is_empty()
    }
}

/// Behavior to adopt regarding treating tabs as whitespace.
///
/// Although tab is a valid yaml whitespace, it doesn't always behave the same as a space.
#[derive(Copy, Clone, Eq, PartialEq)]
enum SkipTabs {
    /// Skip all tabs as whitespace.
    Yes,
    /// Don't skip any tab. Return from the function when encountering one.
    No,
    /// Return value from the function.
    Result(
        /// Whether tabs were encountered.
        bool,
        /// Whether at least 1 valid yaml whitespace has been encountered.
        bool,
    ),
}

impl SkipTabs {
    /// Whether tabs were found while skipping whitespace.
    ///
    /// This function must be called after a call to `skip_ws_to_eol`.
    fn found_tabs(self) -> bool {
        matches!(self, SkipTabs::Result(true, _))
    }

    /// Whether a valid YAML whitespace has been found in skipped-over content.
    ///
    /// This function must be called after a call to `skip_ws_to_eol`.
    fn has_valid_yaml_ws(self) -> bool {
        matches!(self, SkipTabs::Result(_, true))
    }
}

/// Chomping, how final line breaks and trailing empty lines are interpreted.
///
/// See YAML spec 8.1.1.2.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Chomping {
    /// The final line break and any trailing empty lines are excluded.
    Strip,
    /// The final line break is preserved, but trailing empty lines are excluded.
    Clip,
    /// The final line break and trailing empty lines are included.
    Keep,
}

#[cfg(test)]
mod test {
    use super::{ScalarStyle, Scanner, Token, TokenType};

    macro_rules! next {
        ($p:ident, $tk:pat) => {{
            let tok = $p.next().unwrap();
            match tok.1 {
                $tk => {}
                _ => panic!("unexpected token: {:?}", tok),
            }
        }};
    }

    macro_rules! next_scalar {
        ($p:ident, $tk:expr, $v:expr) => {{
            let tok = $p.next().unwrap();
            match tok.1 {
                TokenType::Scalar {
                    style, ref value, ..
                } => {
                    assert_eq!(style, $tk);
                    assert_eq!(value, $v);
                }
                _ => panic!("unexpected token: {:?}", tok),
            }
        }};
    }

    macro_rules! end {
        ($p:ident) => {{
            assert_eq!($p.next(), None);
        }};
    }

    #[test]
    fn test_empty() {
        let s = "";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_scalar() {
        let s = "a scalar";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next_scalar!(p, ScalarStyle::Plain, "a scalar");
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_explicit_scalar() {
        let s = "---
'a scalar'
...
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::DocumentStart);
        next_scalar!(p, ScalarStyle::SingleQuoted, "a scalar");
        next!(p, TokenType::DocumentEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_multiple_documents() {
        let s = "
'a scalar'
---
'a scalar'
---
'a scalar'
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next_scalar!(p, ScalarStyle::SingleQuoted, "a scalar");
        next!(p, TokenType::DocumentStart);
        next_scalar!(p, ScalarStyle::SingleQuoted, "a scalar");
        next!(p, TokenType::DocumentStart);
        next_scalar!(p, ScalarStyle::SingleQuoted, "a scalar");
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_a_flow_sequence() {
        let s = "[item 1, item 2, item 3]";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::FlowSequenceStart);
        next_scalar!(p, ScalarStyle::Plain, "item 1");
        next!(p, TokenType::FlowEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 2");
        next!(p, TokenType::FlowEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 3");
        next!(p, TokenType::FlowSequenceEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_a_flow_mapping() {
        let s = "
{
    a simple key: a value, # Note that the KEY token is produced.
    ? a complex key: another value,
}
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::FlowMappingStart);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "a simple key");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "a value");
        next!(p, TokenType::FlowEntry);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "a complex key");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "another value");
        next!(p, TokenType::FlowEntry);
        next!(p, TokenType::FlowMappingEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_block_sequences() {
        let s = "
- item 1
- item 2
-
  - item 3.1
  - item 3.2
-
  key 1: value 1
  key 2: value 2
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::BlockSequenceStart);
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 1");
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 2");
        next!(p, TokenType::BlockEntry);
        next!(p, TokenType::BlockSequenceStart);
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 3.1");
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 3.2");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::BlockEntry);
        next!(p, TokenType::BlockMappingStart);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "key 1");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "value 1");
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "key 2");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "value 2");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_no_block_sequence_start() {
        let s = "
key:
- item 1
- item 2
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::BlockMappingStart);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "key");
        next!(p, TokenType::Value);
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 1");
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 2");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_collections_in_sequence() {
        let s = "
- - item 1
  - item 2
- key 1: value 1
  key 2: value 2
- ? complex key
  : complex value
";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next!(p, TokenType::BlockSequenceStart);
        next!(p, TokenType::BlockEntry);
        next!(p, TokenType::BlockSequenceStart);
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 1");
        next!(p, TokenType::BlockEntry);
        next_scalar!(p, ScalarStyle::Plain, "item 2");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::BlockEntry);
        next!(p, TokenType::BlockMappingStart);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "key 1");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "value 1");
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "key 2");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "value 2");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::BlockEntry);
        next!(p, TokenType::BlockMappingStart);
        next!(p, TokenType::Key);
        next_scalar!(p, ScalarStyle::Plain, "complex key");
        next!(p, TokenType::Value);
        next_scalar!(p, ScalarStyle::Plain, "complex value");
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::BlockEnd);
        next!(p, TokenType::StreamEnd);
        end!(p);
    }

    #[test]
    fn test_uri_escapes() {
        let s = "!<tag:example.com,2000:%C3%A9t%C3%A9> value";
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        match p.next().unwrap().1 {
            TokenType::Tag(handle, suffix) => {
                assert_eq!(handle, "");
                assert_eq!(suffix, "tag:example.com,2000:\u{e9}t\u{e9}");
            }
            tok => panic!("unexpected token: {tok:?}"),
        }
        next_scalar!(p, ScalarStyle::Plain, "value");
    }

    #[test]
    fn test_escapes() {
        let s = r#""\x41\u00e9\U0001F600\t\N\_""#;
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        next_scalar!(
            p,
            ScalarStyle::DoubleQuoted,
            "A\u{e9}\u{1F600}\t\u{85}\u{a0}"
        );
        next!(p, TokenType::StreamEnd);
    }

    #[test]
    fn test_bad_escape() {
        let s = r#""\q""#;
        let mut p = Scanner::new(s.chars());
        next!(p, TokenType::StreamStart);
        assert_eq!(p.next(), None);
        assert!(p.get_error().is_some());
    }

    #[test]
    fn test_is_key_flag() {
        let s = "&a key: value\nother: [plain]\n";
        let p = Scanner::new(s.chars());
        let scalars: Vec<(String, bool)> = p
            .filter_map(|Token(_, kind)| match kind {
                TokenType::Scalar { value, is_key, .. } => Some((value, is_key)),
                _ => None,
            })
            .collect();
        assert_eq!(
            scalars,
            vec![
                ("key".to_owned(), true),
                ("value".to_owned(), false),
                ("other".to_owned(), true),
                ("plain".to_owned(), false)
            ]
        );
    }

    #[test]
    fn test_comments_retained() {
        let s = "# head\nkey: value # trailing\n";
        let p = Scanner::new(s.chars()).retain_comments(true);
        let comments: Vec<(String, bool)> = p
            .filter_map(|Token(_, kind)| match kind {
                TokenType::Comment { text, is_inline } => Some((text, is_inline)),
                _ => None,
            })
            .collect();
        assert_eq!(
            comments,
            vec![("head".to_owned(), false), ("trailing".to_owned(), true)]
        );
    }

    #[test]
    fn test_deferred_tab_error() {
        let s = "a:\n  b: 'x'\n\tc: 2\n";
        let error = Scanner::new(s.chars())
            .find(|Token(_, kind)| matches!(kind, TokenType::Error(_)))
            .unwrap();
        assert_eq!(error.0.start.line(), 3);
    }

    #[test]
    fn test_block_scalar_at_end_of_input() {
        for (s, expected) in [
            ("--- |\n  a", "a"),
            ("--- |\n  a\n", "a\n"),
            ("--- >\n  a\n  b", "a b"),
            ("--- |+\n  a", "a"),
            ("--- |+\n  a\n\n", "a\n\n"),
            ("--- |-\n  a\n", "a"),
        ] {
            let values: Vec<String> = Scanner::new(s.chars())
                .filter_map(|Token(_, kind)| match kind {
                    TokenType::Scalar { value, .. } => Some(value),
                    _ => None,
                })
                .collect();
            assert_eq!(values, [expected], "{s:?}");
        }
    }

    #[test]
    fn test_side_channel() {
        let mut p = Scanner::new("a".chars());
        assert!(p.move_next_without_consuming().unwrap());
        assert_eq!(p.current().map(|t| &t.1), Some(&TokenType::StreamStart));
        // Not consumed yet: the same token stays current.
        assert!(p.move_next_without_consuming().unwrap());
        assert_eq!(p.current().map(|t| &t.1), Some(&TokenType::StreamStart));
        assert!(p.move_next().unwrap());
        assert!(matches!(
            p.current().map(|t| &t.1),
            Some(TokenType::Scalar { .. })
        ));
        p.consume_current();
        assert!(p.move_next().unwrap());
        assert_eq!(p.current().map(|t| &t.1), Some(&TokenType::StreamEnd));
        assert!(!p.move_next().unwrap());
        assert!(p.stream_ended());
    }
}
