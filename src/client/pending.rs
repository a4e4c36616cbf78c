use std::collections::{HashMap, VecDeque};

use tokio::sync::oneshot;

use crate::protocol::Reply;

/// Identifies one enqueued waiter so a failed send can roll it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Ticket(u64);

/// Tracks pending requests waiting for responses, one FIFO queue per
/// operation name.
///
/// The wire format carries no request identifier, so an inbound reply can
/// only be matched to the *oldest* still-unanswered request of the same
/// operation. Concurrent same-type requests therefore rely on the proxy
/// answering in send order; that assumption belongs to the protocol and is
/// preserved here unverified.
///
/// A queue entry, once created, persists after draining: an empty queue
/// means "surplus reply of a known type, drop it", while a missing entry
/// means "not a reply at all, route as a forwarded frame". This distinction
/// is load-bearing in the dispatcher.
pub(super) struct PendingQueues {
    // ---
    queues: HashMap<String, VecDeque<(Ticket, oneshot::Sender<Reply>)>>,
    next_ticket: u64,
}

impl PendingQueues {
    // ---

    /// Create an empty set of queues.
    pub fn new() -> Self {
        // ---
        Self {
            queues: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Append a new waiter to the queue for `op`, in issuance order.
    ///
    /// Returns the rollback ticket and the receiver that resolves when the
    /// matching reply arrives.
    pub fn push(&mut self, op: &str) -> (Ticket, oneshot::Receiver<Reply>) {
        // ---
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let (tx, rx) = oneshot::channel();
        self.queues
            .entry(op.to_string())
            .or_default()
            .push_back((ticket, tx));

        (ticket, rx)
    }

    /// Pop the oldest waiter for `op`, if any.
    ///
    /// The queue entry itself is kept even when this drains it.
    pub fn pop(&mut self, op: &str) -> Option<oneshot::Sender<Reply>> {
        // ---
        self.queues
            .get_mut(op)
            .and_then(|q| q.pop_front())
            .map(|(_, tx)| tx)
    }

    /// Whether a queue entry exists for `op` (empty or not).
    pub fn has_queue(&self, op: &str) -> bool {
        self.queues.contains_key(op)
    }

    /// Remove one specific un-consumed waiter.
    ///
    /// Only used to roll back an enqueue whose send failed, so a transport
    /// error never leaves a ghost waiter ahead of later callers. Returns
    /// false if a reply already consumed it.
    pub fn abandon(&mut self, op: &str, ticket: Ticket) -> bool {
        // ---
        let Some(q) = self.queues.get_mut(op) else {
            return false;
        };

        let before = q.len();
        q.retain(|(t, _)| *t != ticket);
        q.len() < before
    }

    /// Remove the queue entry for `op` if it holds no waiters.
    ///
    /// Pairs with [`abandon`](Self::abandon) when rolling back an issuance
    /// that created the entry: a leftover empty entry would make the
    /// dispatcher drop frames it should route as forwarded.
    pub fn remove_if_empty(&mut self, op: &str) {
        // ---
        if self.queues.get(op).is_some_and(VecDeque::is_empty) {
            self.queues.remove(op);
        }
    }

    /// Drop every waiter and every queue entry.
    pub fn clear(&mut self) {
        self.queues.clear();
    }

    /// Number of waiters currently queued for `op`.
    #[cfg(test)]
    pub fn len(&self, op: &str) -> usize {
        self.queues.get(op).map_or(0, VecDeque::len)
    }
}
