//! A bounded lookahead window over a stream of characters.

use arraydeque::ArrayDeque;

/// Circular character buffer over an input stream.
///
/// The buffer reads from the underlying iterator only when a peek needs a character it does not
/// hold yet, so the source is never read further than the deepest peek. `N` is the size of the
/// window and must be a power of two.
#[derive(Debug)]
pub struct LookAheadBuffer<T, const N: usize> {
    input: T,
    buffer: ArrayDeque<char, N>,
    exhausted: bool,
}

impl<T: Iterator<Item = char>, const N: usize> LookAheadBuffer<T, N> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N.is_power_of_two(),
        "lookahead capacity must be a power of two"
    );

    /// Create a buffer over `input`.
    pub fn new(input: T) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        LookAheadBuffer {
            input,
            buffer: ArrayDeque::new(),
            exhausted: false,
        }
    }

    /// The size of the lookahead window.
    #[must_use]
    pub fn capacity(&self) -> usize {
        N
    }

    /// Number of characters currently held.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Make sure `count` characters are available (or the input ended).
    ///
    /// # Panics
    /// If `count` exceeds the capacity of the window.
    pub fn cache(&mut self, count: usize) {
        assert!(count <= N, "lookahead of {count} exceeds window of {N}");
        while self.buffer.len() < count && !self.exhausted {
            match self.input.next() {
                // The window has room: `len < count <= N`.
                Some(c) => {
                    let _ = self.buffer.push_back(c);
                }
                None => self.exhausted = true,
            }
        }
    }

    /// Return the character `offset` positions ahead without consuming it.
    ///
    /// Positions past the end of the input read as `\0`.
    pub fn peek(&mut self, offset: usize) -> char {
        self.cache(offset + 1);
        self.buffer.get(offset).copied().unwrap_or('\0')
    }

    /// Consume `count` characters.
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            if self.buffer.pop_front().is_none() && !self.exhausted && self.input.next().is_none() {
                self.exhausted = true;
            }
        }
    }

    /// Whether the input is exhausted and every buffered character has been consumed.
    #[must_use]
    pub fn end_of_input(&self) -> bool {
        self.exhausted && self.buffer.is_empty()
    }
}
