//! Nesting depth guard.

use crate::error::{Error, Result};
use crate::mark::Mark;

/// Default maximum nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Counts nesting levels and fails once a maximum is exceeded.
///
/// The scanner and parser keep their own stacks instead of recursing, but those stacks still grow
/// with the input. Anything that walks nested nodes should hold one of these.
#[derive(Debug, Clone, Copy)]
pub struct RecursionLevel {
    current: usize,
    maximum: usize,
}

impl Default for RecursionLevel {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl RecursionLevel {
    /// A guard allowing at most `maximum` nested levels.
    #[must_use]
    pub fn new(maximum: usize) -> Self {
        RecursionLevel {
            current: 0,
            maximum,
        }
    }

    /// Enter one level deeper.
    ///
    /// # Errors
    /// Returns [`Error::RecursionLimit`] if this would exceed the maximum. The level is left
    /// unchanged in that case.
    pub fn increment(&mut self, mark: Mark) -> Result<()> {
        if self.current >= self.maximum {
            return Err(Error::RecursionLimit {
                limit: self.maximum,
                mark,
            });
        }
        self.current += 1;
        Ok(())
    }

    /// Leave the current level.
    pub fn decrement(&mut self) {
        debug_assert!(self.current > 0, "unbalanced recursion level");
        self.current = self.current.saturating_sub(1);
    }

    /// The current depth.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// The configured maximum.
    #[must_use]
    pub fn maximum(&self) -> usize {
        self.maximum
    }
}
