//! Retry bookkeeping: an ordered queue of retry requests and a dedup ledger
//! of pairs still pending a final verdict.
//!
//! The two are maintained independently. Popping a pair from the queue does
//! not clear its ledger entry; whoever resolves the retried pair does that.

use ncx_core::LoginPair;
use std::collections::{HashSet, VecDeque};

/// FIFO of pairs to retry. Equal pairs may appear more than once.
#[derive(Debug, Default, Clone)]
pub struct RetryQueue {
    pairs: VecDeque<LoginPair>,
}

impl RetryQueue {
    pub fn push(&mut self, pair: LoginPair) {
        self.pairs.push_back(pair);
    }

    pub fn pop(&mut self) -> Option<LoginPair> {
        self.pairs.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// Set of pairs considered outstanding. Inserting an equal pair twice keeps
/// one entry.
#[derive(Debug, Default, Clone)]
pub struct PendingLedger {
    pairs: HashSet<LoginPair>,
}

impl PendingLedger {
    /// Returns `false` if an equal pair was already pending.
    pub fn insert(&mut self, pair: LoginPair) -> bool {
        self.pairs.insert(pair)
    }

    /// Returns `true` if a matching entry was removed.
    pub fn remove(&mut self, pair: &LoginPair) -> bool {
        self.pairs.remove(pair)
    }

    pub fn contains(&self, pair: &LoginPair) -> bool {
        self.pairs.contains(pair)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo_and_keeps_duplicates() {
        let mut queue = RetryQueue::default();
        queue.push(LoginPair::new("a", "1"));
        queue.push(LoginPair::new("b", "2"));
        queue.push(LoginPair::new("a", "1"));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(LoginPair::new("a", "1")));
        assert_eq!(queue.pop(), Some(LoginPair::new("b", "2")));
        assert_eq!(queue.pop(), Some(LoginPair::new("a", "1")));
        assert_eq!(queue.pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ledger_deduplicates() {
        let mut ledger = PendingLedger::default();
        assert!(ledger.insert(LoginPair::new("a", "1")));
        assert!(!ledger.insert(LoginPair::new("a", "1")));
        assert!(ledger.insert(LoginPair::new("a", "2")));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_ledger_remove_single_entry() {
        let mut ledger = PendingLedger::default();
        let pair = LoginPair::new("a", "1");
        ledger.insert(pair.clone());
        assert!(ledger.contains(&pair));
        assert!(ledger.remove(&pair));
        assert!(!ledger.remove(&pair));
        assert!(ledger.is_empty());
    }
}
