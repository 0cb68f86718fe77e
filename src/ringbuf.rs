//! Bounded in-memory history

use parking_lot::RwLock;
use std::collections::VecDeque;

/// Fixed-capacity FIFO; the oldest entry is evicted on overflow
#[derive(Debug)]
pub struct RingBuffer<T> {
    capacity: usize,
    items: RwLock<VecDeque<T>>,
}

impl<T: Clone> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            items: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, item: T) {
        let mut items = self.items.write();
        if items.len() >= self.capacity {
            items.pop_front();
        }
        items.push_back(item);
    }

    /// Rebuild the contents from the current items under a single lock
    pub fn rebuild(&self, f: impl FnOnce(Vec<T>) -> Vec<T>) {
        let mut items = self.items.write();
        let current: Vec<T> = items.drain(..).collect();
        for item in f(current) {
            if items.len() >= self.capacity {
                items.pop_front();
            }
            items.push_back(item);
        }
    }

    /// Snapshot, oldest first
    pub fn items(&self) -> Vec<T> {
        self.items.read().iter().cloned().collect()
    }

    pub fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.items.read().iter().any(pred)
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
