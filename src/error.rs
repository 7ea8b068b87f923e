//! Errors raised while reading YAML.

use std::fmt;

use thiserror::Error;

use crate::mark::{Mark, Span};
use crate::queue::EmptyQueue;

/// A message attached to the range of input it complains about.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MarkedError {
    start: Mark,
    end: Mark,
    info: String,
}

impl MarkedError {
    /// Create a new error covering `start..end`.
    #[must_use]
    pub fn new(start: Mark, end: Mark, info: &str) -> MarkedError {
        MarkedError {
            start,
            end,
            info: info.to_owned(),
        }
    }

    /// Where the offending input starts.
    #[must_use]
    pub fn marker(&self) -> &Mark {
        &self.start
    }

    /// Where the offending input ends.
    #[must_use]
    pub fn end(&self) -> &Mark {
        &self.end
    }

    /// Return the information string describing the error that happened.
    #[must_use]
    pub fn info(&self) -> &str {
        self.info.as_ref()
    }
}

impl fmt::Display for MarkedError {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{} at {}", self.info, self.start)
    }
}

/// An error that occurred while scanning, parsing or post-processing a YAML stream.
///
/// None of these are recoverable: the component that returned one must not be used again.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed lexical structure.
    #[error("syntax error: {0}")]
    Syntax(MarkedError),
    /// Well-formed tokens that break the grammar or reference something invalid.
    #[error("semantic error: {0}")]
    Semantic(MarkedError),
    /// Nesting went deeper than allowed.
    #[error("recursion limit of {limit} exceeded at {mark}")]
    RecursionLimit {
        /// The configured maximum depth.
        limit: usize,
        /// The node that went one level too deep.
        mark: Mark,
    },
    /// An integer does not fit the target type.
    #[error("integer overflow while converting `{value}`")]
    Overflow {
        /// The scalar that was being converted.
        value: String,
    },
    /// The byte stream could not be decoded to text.
    #[error("decoding error: {0}")]
    Decode(String),
    /// The byte stream could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A token was requested from an empty queue.
    #[error(transparent)]
    EmptyQueue(#[from] EmptyQueue),
}

impl Error {
    pub(crate) fn syntax(span: Span, info: &str) -> Error {
        Error::Syntax(MarkedError::new(span.start, span.end, info))
    }

    pub(crate) fn semantic(span: Span, info: &str) -> Error {
        Error::Semantic(MarkedError::new(span.start, span.end, info))
    }

    /// The position the error refers to, if it has one.
    #[must_use]
    pub fn marker(&self) -> Option<&Mark> {
        match self {
            Error::Syntax(e) | Error::Semantic(e) => Some(e.marker()),
            Error::RecursionLimit { mark, .. } => Some(mark),
            _ => None,
        }
    }

    /// The human readable part of a syntax or semantic error.
    #[must_use]
    pub fn info(&self) -> Option<&str> {
        match self {
            Error::Syntax(e) | Error::Semantic(e) => Some(e.info()),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
