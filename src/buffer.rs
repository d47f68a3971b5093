use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;

/// An append-only FIFO byte queue with peek/consume of `n` bytes.
///
/// `peek`/`get` return `None` rather than erroring when fewer than `n`
/// bytes are buffered — that's the `NeedsMore` signal from the outer
/// state machine, not an error condition in its own right.
#[derive(Default)]
pub struct ByteBuffer {
    segments: VecDeque<Bytes>,
    used: usize,
}

impl ByteBuffer {
    pub fn new() -> Self {
        ByteBuffer::default()
    }

    pub fn put(&mut self, bytes: impl Into<Bytes>) {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return;
        }
        self.used += bytes.len();
        self.segments.push_back(bytes);
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Make sure the front segment holds at least `want` bytes, merging
    /// leading segments together if it doesn't. A no-op if there already
    /// aren't enough bytes buffered at all.
    fn coagulate(&mut self, want: usize) {
        if self.segments.len() < 2 {
            return;
        }
        let mut total = 0;
        let mut count = 0;
        for seg in &self.segments {
            if total >= want {
                break;
            }
            total += seg.len();
            count += 1;
        }
        if count > 1 {
            let mut merged = BytesMut::with_capacity(total);
            for seg in self.segments.drain(..count) {
                merged.extend_from_slice(&seg);
            }
            self.segments.push_front(merged.freeze());
        }
    }

    pub fn peek(&mut self, n: usize) -> Option<Bytes> {
        if self.used < n {
            return None;
        }
        self.coagulate(n);
        Some(self.segments[0].slice(0..n))
    }

    pub fn get(&mut self, n: usize) -> Option<Bytes> {
        if self.used < n {
            return None;
        }
        self.coagulate(n);
        let front = self.segments.pop_front().expect("checked above");
        self.used -= n;
        if front.len() == n {
            Some(front)
        } else {
            let (head, tail) = (front.slice(0..n), front.slice(n..));
            self.segments.push_front(tail);
            Some(head)
        }
    }
}
