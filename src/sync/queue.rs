//! Expansion queue

use std::collections::VecDeque;

use crate::types::ObjectId;

/// FIFO of containers waiting to be expanded
#[derive(Debug, Default)]
pub struct ExpansionQueue {
    pending: VecDeque<ObjectId>,
}

impl ExpansionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a container; duplicates are kept
    pub fn enqueue(&mut self, container: ObjectId) {
        self.pending.push_back(container);
    }

    /// Remove the oldest pending container
    pub fn dequeue_next(&mut self) -> Option<ObjectId> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
