//! Positions in the input stream.

use std::cmp::Ordering;
use std::fmt;

/// A location in a YAML document.
///
/// `index` counts characters from the start of the stream and starts at 0. `line` and `column`
/// both start at 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Mark {
    /// The index (in chars) in the input string.
    pub(crate) index: usize,
    /// The line (1-indexed).
    pub(crate) line: usize,
    /// The column (1-indexed).
    pub(crate) column: usize,
}

impl Mark {
    /// Create a new [`Mark`] at the given position.
    #[must_use]
    pub fn new(index: usize, line: usize, column: usize) -> Mark {
        Mark {
            index,
            line,
            column,
        }
    }

    /// Return the index (in chars) of the mark in the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the line of the mark in the source.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the column of the mark in the source.
    #[must_use]
    pub fn col(&self) -> usize {
        self.column
    }

    /// The 0-based column, as used by the scanner's indentation logic.
    #[inline]
    pub(crate) fn line_offset(&self) -> usize {
        self.column.saturating_sub(1)
    }
}

impl Default for Mark {
    fn default() -> Self {
        Mark::new(0, 1, 1)
    }
}

impl PartialOrd for Mark {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Mark {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column, self.index).cmp(&(other.line, other.column, other.index))
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// The range of the input a token or an event was built from.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Span {
    /// The first character of the range.
    pub start: Mark,
    /// The position right after the last character of the range.
    pub end: Mark,
}

impl Span {
    /// Create a span between two marks.
    #[must_use]
    pub fn new(start: Mark, end: Mark) -> Span {
        Span { start, end }
    }

    /// A zero-length span at `mark`.
    #[must_use]
    pub fn empty(mark: Mark) -> Span {
        Span {
            start: mark,
            end: mark,
        }
    }
}

/// Tracks where the reader currently stands as characters are consumed.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    index: usize,
    line: usize,
    line_offset: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            index: 0,
            line: 1,
            line_offset: 0,
        }
    }
}

impl Cursor {
    /// A cursor at the very start of a stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for a consumed character that did not end a line.
    #[inline]
    pub fn skip(&mut self) {
        self.index += 1;
        self.line_offset += 1;
    }

    /// Account for a consumed line break of `width` characters (1 for `\n`, 2 for `\r\n`).
    #[inline]
    pub fn skip_line_break(&mut self, width: usize) {
        self.index += width;
        self.line += 1;
        self.line_offset = 0;
    }

    /// Move to the start of the next line without consuming anything.
    ///
    /// Used at the end of the stream so that the final mark sits on a line of its own.
    pub fn force_new_line(&mut self) {
        if self.line_offset != 0 {
            self.line += 1;
            self.line_offset = 0;
        }
    }

    /// Absolute index of the next character.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line of the next character (1-based).
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the next character (0-based).
    #[inline]
    #[must_use]
    pub fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// Snapshot of the current position.
    #[inline]
    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark::new(self.index, self.line, self.line_offset + 1)
    }
}
