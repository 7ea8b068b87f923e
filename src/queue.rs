//! A FIFO queue that also supports inserting in the middle.
//!
//! The scanner queues tokens ahead of the parser and sometimes has to slide a token in before
//! ones that are already waiting (a `Key` is only known to exist once the `:` after it is seen).

use thiserror::Error;

/// Returned by [`InsertionQueue::dequeue`] when nothing is queued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("the queue is empty")]
pub struct EmptyQueue;

const INITIAL_CAPACITY: usize = 16;

/// Circular buffer queue with `insert`.
///
/// Capacity is always a power of two so that wrapping is a mask.
#[derive(Debug, Clone)]
pub struct InsertionQueue<T> {
    items: Vec<Option<T>>,
    read: usize,
    count: usize,
}

impl<T> Default for InsertionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InsertionQueue<T> {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// An empty queue able to hold `capacity` items before growing.
    ///
    /// The capacity is rounded up to the next power of two.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(capacity, || None);
        InsertionQueue {
            items,
            read: 0,
            count: 0,
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.items.len() - 1
    }

    #[inline]
    fn slot(&self, index: usize) -> usize {
        (self.read + index) & self.mask()
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the queue holds no item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    fn grow_if_full(&mut self) {
        if self.count < self.items.len() {
            return;
        }
        let capacity = self.items.len() * 2;
        let mut items = Vec::with_capacity(capacity);
        for index in 0..self.count {
            let slot = self.slot(index);
            items.push(self.items[slot].take());
        }
        items.resize_with(capacity, || None);
        self.items = items;
        self.read = 0;
    }

    /// Append an item at the back of the queue.
    pub fn enqueue(&mut self, item: T) {
        self.grow_if_full();
        let slot = self.slot(self.count);
        self.items[slot] = Some(item);
        self.count += 1;
    }

    /// Remove the item at the front of the queue.
    pub fn dequeue(&mut self) -> Result<T, EmptyQueue> {
        if self.count == 0 {
            return Err(EmptyQueue);
        }
        let item = self.items[self.read].take().ok_or(EmptyQueue)?;
        self.read = (self.read + 1) & self.mask();
        self.count -= 1;
        Ok(item)
    }

    /// Insert an item so that it ends up at position `index` from the front.
    ///
    /// # Panics
    /// If `index` is larger than the number of queued items.
    pub fn insert(&mut self, index: usize, item: T) {
        assert!(index <= self.count, "insert at {index} past the end of the queue");
        self.grow_if_full();
        let mut position = self.count;
        while position > index {
            let from = self.slot(position - 1);
            let to = self.slot(position);
            self.items[to] = self.items[from].take();
            position -= 1;
        }
        let slot = self.slot(index);
        self.items[slot] = Some(item);
        self.count += 1;
    }

    /// The item at `index` from the front.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.count {
            self.items[self.slot(index)].as_ref()
        } else {
            None
        }
    }

    /// Mutable access to the item at `index` from the front.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.count {
            let slot = self.slot(index);
            self.items[slot].as_mut()
        } else {
            None
        }
    }

    /// The item at the front of the queue.
    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// The item at the back of the queue.
    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.count.checked_sub(1).and_then(|last| self.get(last))
    }

    /// Iterate over the queued items, front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.count).filter_map(move |index| self.get(index))
    }
}

#[cfg(test)]
mod test {
    use super::{EmptyQueue, InsertionQueue};
    use quickcheck::quickcheck;
    use std::collections::VecDeque;

    fn drain<T>(queue: &mut InsertionQueue<T>) -> Vec<T> {
        let mut out = vec![];
        while let Ok(item) = queue.dequeue() {
            out.push(item);
        }
        out
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut queue = InsertionQueue::new();
        for i in 0..10 {
            queue.enqueue(i);
        }
        queue.insert(5, 99);
        assert_eq!(drain(&mut queue), vec![0, 1, 2, 3, 4, 99, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_dequeue_empty() {
        let mut queue = InsertionQueue::<u8>::new();
        assert_eq!(queue.dequeue(), Err(EmptyQueue));
        queue.enqueue(1);
        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.dequeue(), Err(EmptyQueue));
    }

    #[test]
    fn test_grows_across_wraparound() {
        let mut queue = InsertionQueue::with_capacity(4);
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.dequeue(), Ok(2));
        for i in 4..9 {
            queue.enqueue(i);
        }
        queue.insert(0, 0);
        assert_eq!(queue.capacity(), 8);
        assert_eq!(queue.front(), Some(&0));
        assert_eq!(queue.back(), Some(&8));
        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![0, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_get_mut() {
        let mut queue = InsertionQueue::new();
        queue.enqueue(String::from("a"));
        queue.enqueue(String::from("b"));
        if let Some(item) = queue.get_mut(1) {
            item.push('!');
        }
        assert_eq!(queue.get(1).map(String::as_str), Some("b!"));
        assert!(queue.get(2).is_none());
    }

    #[test]
    fn test_matches_vecdeque() {
        fn prop(ops: Vec<(u8, u16)>) -> bool {
            let mut queue = InsertionQueue::with_capacity(2);
            let mut reference = VecDeque::new();
            for (op, value) in ops {
                match op % 3 {
                    0 => {
                        queue.enqueue(value);
                        reference.push_back(value);
                    }
                    1 => {
                        if queue.dequeue().ok() != reference.pop_front() {
                            return false;
                        }
                    }
                    _ => {
                        let index = usize::from(value) % (reference.len() + 1);
                        queue.insert(index, value);
                        reference.insert(index, value);
                    }
                }
                if queue.len() != reference.len() {
                    return false;
                }
            }
            drain(&mut queue) == reference.into_iter().collect::<Vec<_>>()
        }
        quickcheck(prop as fn(Vec<(u8, u16)>) -> bool);
    }
}
