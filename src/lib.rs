// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// See the LICENSE file at the top-level directory of this distribution.

//! Streaming YAML 1.1 / 1.2 processing in pure Rust.
//!
//! The crate is built as a pipeline of pull-based stages:
//!
//!  - the [`Scanner`] turns characters into tokens,
//!  - the [`Parser`] turns tokens into events,
//!  - the [`Emitter`] turns events back into text.
//!
//! Between parser and emitter, events may go through [`merge::MergingParser`] to expand `<<`
//! merge keys, or through a [`schema::SchemaDecorator`] to resolve tags.
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! yaml-stream = "0.1.0"
//! ```
//!
//! # Examples
//! Parse a string into events, and write them back as YAML.
//!
//! ```
//! use yaml_stream::{Emitter, EventKind, Parser};
//!
//! let events = Parser::new_from_str("[1, 2, 3]")
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//! assert!(matches!(events[2].kind, EventKind::SequenceStart(_)));
//!
//! let mut out_str = String::new();
//! {
//!     let mut emitter = Emitter::new(&mut out_str);
//!     for event in events {
//!         emitter.emit(event).unwrap();
//!     }
//! }
//! assert_eq!(out_str, "[1, 2, 3]\n");
//! ```

#![cfg_attr(feature = "cargo-clippy", warn(clippy::pedantic))]
#![cfg_attr(
    feature = "cargo-clippy",
    allow(
        clippy::match_same_arms,
        clippy::should_implement_trait,
        clippy::missing_errors_doc,
        clippy::missing_panics_doc,
        clippy::redundant_else,
    )
)]

pub(crate) mod char_traits;
#[macro_use]
pub(crate) mod debug;
pub mod buffer;
pub mod decoder;
pub mod emitter;
pub mod error;
pub mod event;
pub mod mark;
pub mod merge;
pub mod names;
pub mod parser;
pub mod queue;
pub mod recursion;
pub mod scanner;
pub mod schema;

// reexport key APIs
pub use crate::emitter::{EmitError, Emitter, EmitterSettings};
pub use crate::error::{Error, MarkedError, Result};
pub use crate::event::{Event, EventKind, EventReceiver, EventVisitor};
pub use crate::mark::{Mark, Span};
pub use crate::parser::Parser;
pub use crate::scanner::{ScalarStyle, Scanner, Token, TokenType};
