//! Bounded history of previous z positions

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use spider_core::{Result, SpiderError};

/// Fixed-capacity FIFO of previous z values, oldest first.
///
/// Once full, every push evicts the oldest entry, so a warmed-up queue
/// always holds exactly `capacity` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreZQueue {
    buffer: VecDeque<f64>,
    capacity: usize,
}

impl PreZQueue {
    /// Create an empty queue with given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a queue already warmed up with `capacity` copies of `value`
    pub fn filled(capacity: usize, value: f64) -> Self {
        let mut queue = Self::new(capacity);
        queue.fill(value);
        queue
    }

    /// Replace the contents with `capacity` copies of `value`
    pub fn fill(&mut self, value: f64) {
        self.buffer.clear();
        self.buffer.extend(std::iter::repeat(value).take(self.capacity));
    }

    /// Add a z value, evicting the oldest once full
    pub fn push(&mut self, z: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(z);
    }

    /// Read every queued value in order without consuming any.
    ///
    /// Each value is taken from the head and re-queued at the tail, so
    /// after a full pass the queue is back in its original order.
    pub fn peek_rotate(&mut self) -> Result<Vec<f64>> {
        if !self.is_warm() {
            return Err(SpiderError::QueueNotWarm {
                expected: self.capacity,
                actual: self.buffer.len(),
            });
        }

        let mut values = Vec::with_capacity(self.capacity);
        for _ in 0..self.capacity {
            if let Some(z) = self.buffer.pop_front() {
                values.push(z);
                self.buffer.push_back(z);
            }
        }
        Ok(values)
    }

    /// Get queue length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once the queue holds exactly `capacity` values
    pub fn is_warm(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Clear the queue
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Snapshot of the queued values, oldest first
    pub fn to_vec(&self) -> Vec<f64> {
        self.buffer.iter().copied().collect()
    }
}
