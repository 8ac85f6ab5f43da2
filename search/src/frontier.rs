//! Depth-ordered frontier queue for breadth-first expansion.
//!
//! FIFO order over [`SearchTask`] items guarantees the parent→child depth
//! ordering the engine promises: a task is never expanded before every task
//! of a shallower depth has been expanded, because children are always
//! enqueued behind their whole parent generation.

use std::collections::VecDeque;

use crate::node::SearchTask;

/// The breadth-first work queue.
///
/// Non-shareable mutable state: exactly one search owns it, and every
/// search constructs its own fresh instance.
#[derive(Debug, Default)]
pub struct DepthFrontier {
    queue: VecDeque<SearchTask>,
    high_water: u64,
}

impl DepthFrontier {
    /// Create a new empty frontier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a surviving task behind the current generation.
    pub fn push(&mut self, task: SearchTask) {
        debug_assert!(
            self.queue.back().is_none_or(|t| t.depth <= task.depth),
            "frontier must stay non-decreasing in depth"
        );
        self.queue.push_back(task);
        let size = self.queue.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
    }

    /// Dequeue the oldest (shallowest) task.
    #[must_use]
    pub fn pop(&mut self) -> Option<SearchTask> {
        self.queue.pop_front()
    }

    /// Current queue length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// High-water mark of queue size over the frontier's lifetime.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }
}
