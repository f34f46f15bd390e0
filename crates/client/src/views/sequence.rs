//! Request sequence guard for last-issued-wins view updates.
//!
//! Every fetch takes a [`Ticket`] before it starts. When the response comes
//! back, it may only be applied if its ticket is still the latest one issued;
//! anything older has been superseded by a newer request and is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic ticket dispenser for one view.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

/// Position of a request in its view's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl RequestSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issue the next ticket, superseding all earlier ones.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is the most recently issued one.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// The most recently issued ticket, if any.
    #[must_use]
    pub fn latest(&self) -> Option<Ticket> {
        match self.latest.load(Ordering::Acquire) {
            0 => None,
            n => Some(Ticket(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let sequence = RequestSequence::new();
        assert_eq!(sequence.latest(), None);
        let first = sequence.issue();
        let second = sequence.issue();
        assert!(second > first);
        assert_eq!(sequence.latest(), Some(second));
    }

    #[test]
    fn test_only_latest_is_current() {
        let sequence = RequestSequence::new();
        let first = sequence.issue();
        assert!(sequence.is_current(first));
        let second = sequence.issue();
        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
    }

    #[test]
    fn test_concurrent_issue_never_repeats() {
        let sequence = std::sync::Arc::new(RequestSequence::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sequence = std::sync::Arc::clone(&sequence);
                std::thread::spawn(move || (0..250).map(|_| sequence.issue()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<Ticket> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap_or_default())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(sequence.latest().map(Ticket::value), Some(1000));
    }
}
