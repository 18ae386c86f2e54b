//! Ring Buffer Implementation

/// Fixed-capacity ring buffer.
///
/// Storage is allocated once; pushing into a full buffer overwrites the
/// oldest entry and hands it back to the caller.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[T]>,
    /// Next write position
    head: usize,
    /// Number of live entries
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer; a zero capacity is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            storage: vec![T::default(); capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Push an item, returning the evicted oldest item if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let capacity = self.capacity();
        let evicted = if self.len == capacity {
            Some(self.storage[self.head])
        } else {
            self.len += 1;
            None
        };

        self.storage[self.head] = item;
        self.head = (self.head + 1) % capacity;
        evicted
    }

    /// Iterate live items from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        let capacity = self.capacity();
        let start = (self.head + capacity - self.len) % capacity;
        (0..self.len).map(move |i| self.storage[(start + i) % capacity])
    }
}

impl<T> RingBuffer<T> {
    /// Get the number of items currently in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Clear the buffer; storage is kept
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
