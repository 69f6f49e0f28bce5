//! Bounded FIFO queue of statements awaiting delivery.

use learnpulse_core::{Statement, Time};

/// One queued statement with its delivery bookkeeping.
#[derive(Debug, Clone)]
pub struct OutboundEntry {
    /// The statement to deliver
    pub statement: Statement,

    /// When it was enqueued
    pub enqueued_at: Time,

    /// Delivery attempts made so far
    pub attempts: u32,
}

impl OutboundEntry {
    /// Wrap a statement for queueing.
    pub fn new(statement: Statement) -> Self {
        Self {
            statement,
            enqueued_at: chrono::Utc::now(),
            attempts: 0,
        }
    }
}

/// Bounded FIFO queue. On overflow the oldest entry is dropped, so the most
/// recent activity survives a stalled sink.
#[derive(Debug)]
pub struct OutboundQueue {
    entries: std::collections::VecDeque<OutboundEntry>,
    capacity: usize,
    dropped_overflow: u64,
}

impl OutboundQueue {
    /// Create a queue with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: std::collections::VecDeque::with_capacity(capacity),
            capacity,
            dropped_overflow: 0,
        }
    }

    /// Enqueue a statement, dropping the oldest entry if the queue is full.
    pub fn push(&mut self, statement: Statement) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
            self.dropped_overflow += 1;
        }
        self.entries.push_back(OutboundEntry::new(statement));
    }

    /// Take every queued entry, preserving enqueue order.
    pub fn drain_batch(&mut self) -> Vec<OutboundEntry> {
        self.entries.drain(..).collect()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries dropped because the queue was full.
    pub fn dropped_overflow(&self) -> u64 {
        self.dropped_overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learnpulse_core::{Activity, Actor, StatementBuilder, Verb};

    fn statement(name: &str) -> Statement {
        StatementBuilder::new()
            .actor(Actor::account("u-1"))
            .verb(Verb::Interacted)
            .activity(Activity::new("id", name, "type"))
            .build()
            .unwrap()
    }

    #[test]
    fn drain_preserves_enqueue_order() {
        let mut queue = OutboundQueue::new(8);
        queue.push(statement("first"));
        queue.push(statement("second"));
        queue.push(statement("third"));

        let names: Vec<_> = queue
            .drain_batch()
            .into_iter()
            .map(|e| e.statement.activity.name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut queue = OutboundQueue::new(2);
        queue.push(statement("first"));
        queue.push(statement("second"));
        queue.push(statement("third"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped_overflow(), 1);
        let names: Vec<_> = queue
            .drain_batch()
            .into_iter()
            .map(|e| e.statement.activity.name)
            .collect();
        assert_eq!(names, vec!["second", "third"]);
    }
}
