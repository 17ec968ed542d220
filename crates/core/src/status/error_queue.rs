//! Bounded error queue with optional device-dependent text.
//!
//! The queue never grows past its capacity. When it is full, the newest
//! entry is replaced by -350 "Queue overflow", so the overflow marker is
//! always last and older entries survive. Error text is copied into a
//! fixed-size ring ([`InfoHeap`]); when the ring is full the entry is stored
//! without text instead of failing the push.

use std::collections::VecDeque;

use scpi_engine_diagnostics::codes;

/// Longest error text kept per entry, in bytes.
pub const MAX_INFO_LEN: usize = 255;

/// A popped error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    /// SCPI error code.
    pub code: i16,
    /// Device-dependent text attached at push time.
    pub info: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    start: usize,
    len: usize,
}

/// Fixed-capacity ring allocator for error text.
///
/// Allocations are released in the order they were made, except that the
/// most recent one can be rolled back.
#[derive(Debug, Clone)]
pub struct InfoHeap {
    buf: Box<[u8]>,
    head: usize,
    used: usize,
}

impl InfoHeap {
    /// A ring of `size` bytes. Size 0 stores no text at all.
    pub fn new(size: usize) -> Self {
        Self {
            buf: vec![0; size].into_boxed_slice(),
            head: 0,
            used: 0,
        }
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.used
    }

    fn alloc(&mut self, data: &[u8]) -> Option<Slot> {
        let cap = self.buf.len();
        if data.is_empty() || cap - self.used < data.len() {
            return None;
        }
        let start = (self.head + self.used) % cap;
        for (i, &b) in data.iter().enumerate() {
            self.buf[(start + i) % cap] = b;
        }
        self.used += data.len();
        Some(Slot {
            start,
            len: data.len(),
        })
    }

    fn read(&self, slot: Slot) -> String {
        let cap = self.buf.len();
        let bytes: Vec<u8> = (0..slot.len).map(|i| self.buf[(slot.start + i) % cap]).collect();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    fn release_oldest(&mut self, slot: Slot) {
        self.head = (slot.start + slot.len) % self.buf.len();
        self.used -= slot.len;
    }

    fn release_newest(&mut self, slot: Slot) {
        self.used -= slot.len;
    }

    fn clear(&mut self) {
        self.head = 0;
        self.used = 0;
    }
}

/// FIFO of error codes with a fixed capacity.
#[derive(Debug, Clone)]
pub struct ErrorQueue {
    entries: VecDeque<(i16, Option<Slot>)>,
    capacity: usize,
    heap: InfoHeap,
}

impl ErrorQueue {
    /// Queue holding up to `capacity` entries with `heap_size` bytes of text.
    pub fn new(capacity: usize, heap_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            heap: InfoHeap::new(heap_size),
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries currently queued.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no error is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Text ring backing the entries.
    pub fn heap(&self) -> &InfoHeap {
        &self.heap
    }

    /// Queued codes, oldest first.
    pub fn codes(&self) -> impl Iterator<Item = i16> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }

    /// Append `code`, with optional text truncated to [`MAX_INFO_LEN`].
    ///
    /// Returns `false` when the queue was full and the newest entry was
    /// replaced by the overflow marker instead.
    pub fn push(&mut self, code: i16, info: Option<&[u8]>) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.entries.len() >= self.capacity {
            if let Some((_, Some(slot))) = self.entries.pop_back() {
                self.heap.release_newest(slot);
            }
            self.entries.push_back((codes::QUEUE_OVERFLOW, None));
            return false;
        }
        let slot = info.and_then(|text| self.heap.alloc(&text[..text.len().min(MAX_INFO_LEN)]));
        self.entries.push_back((code, slot));
        true
    }

    /// Remove the oldest entry.
    pub fn pop(&mut self) -> Option<ErrorEntry> {
        let (code, slot) = self.entries.pop_front()?;
        let info = slot.map(|s| {
            let text = self.heap.read(s);
            self.heap.release_oldest(s);
            text
        });
        Some(ErrorEntry { code, info })
    }

    /// Drop every entry and all stored text.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut q = ErrorQueue::new(4, 0);
        assert!(q.push(-100, None));
        assert!(q.push(-200, None));
        assert_eq!(q.pop().map(|e| e.code), Some(-100));
        assert_eq!(q.pop().map(|e| e.code), Some(-200));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn overflow_replaces_newest() {
        let mut q = ErrorQueue::new(3, 0);
        assert!(q.push(-1, None));
        assert!(q.push(-2, None));
        assert!(q.push(-3, None));
        assert!(!q.push(-4, None));
        assert!(!q.push(-5, None));
        assert_eq!(q.codes().collect::<Vec<_>>(), vec![-1, -2, -350]);
    }

    #[test]
    fn info_round_trip() {
        let mut q = ErrorQueue::new(4, 16);
        q.push(-113, Some(b"FOO:BAR"));
        q.push(-200, None);
        assert_eq!(
            q.pop(),
            Some(ErrorEntry {
                code: -113,
                info: Some("FOO:BAR".to_string())
            })
        );
        assert_eq!(q.heap().used(), 0);
        assert_eq!(q.pop().and_then(|e| e.info), None);
    }

    #[test]
    fn heap_exhaustion_drops_text_not_entry() {
        let mut q = ErrorQueue::new(4, 8);
        q.push(-1, Some(b"abcdef"));
        q.push(-2, Some(b"ghijkl"));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().and_then(|e| e.info).as_deref(), Some("abcdef"));
        assert_eq!(q.pop().and_then(|e| e.info), None);
    }

    #[test]
    fn heap_wraps_around() {
        let mut q = ErrorQueue::new(4, 8);
        q.push(-1, Some(b"abcde"));
        q.pop();
        q.push(-2, Some(b"vwxyz"));
        assert_eq!(q.pop().and_then(|e| e.info).as_deref(), Some("vwxyz"));
    }

    #[test]
    fn overflow_releases_text_of_replaced_entry() {
        let mut q = ErrorQueue::new(1, 8);
        q.push(-1, Some(b"abc"));
        q.push(-2, Some(b"def"));
        assert_eq!(q.heap().used(), 0);
        assert_eq!(q.pop().map(|e| e.code), Some(-350));
    }

    #[test]
    fn long_text_is_truncated() {
        let mut q = ErrorQueue::new(2, 1024);
        let long = vec![b'x'; 400];
        q.push(-1, Some(&long));
        assert_eq!(q.pop().and_then(|e| e.info).map(|s| s.len()), Some(MAX_INFO_LEN));
    }

    #[test]
    fn clear_resets_heap() {
        let mut q = ErrorQueue::new(2, 8);
        q.push(-1, Some(b"abc"));
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.heap().used(), 0);
    }
}
