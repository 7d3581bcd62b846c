//! Per-user mailbox.

use std::collections::VecDeque;

use crate::notification::Notification;

/// Most notifications handed out by one drain. Anything past this stays
/// queued for the next one.
pub const MAX_DRAIN_BATCH: usize = 200;

/// Ordered, unbounded queue of pending notifications for one user.
///
/// Insertion order is delivery order. There is no dedup and no expiry;
/// the only way out is [`Mailbox::drain`], which hands out the oldest
/// entries first.
#[derive(Debug, Default)]
pub struct Mailbox {
    pending: VecDeque<Notification>,
}

impl Mailbox {
    pub fn new() -> Self {
        Mailbox::default()
    }

    /// Append one notification at the back.
    pub fn deliver(&mut self, notification: Notification) {
        self.pending.push_back(notification);
    }

    /// Take up to `max` of the oldest notifications. The rest stay queued
    /// in order.
    pub fn drain(&mut self, max: usize) -> Vec<Notification> {
        let take = max.min(self.pending.len());
        self.pending.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_arrival_order_then_empties() {
        let mut mailbox = Mailbox::new();
        mailbox.deliver(Notification::joined("a"));
        mailbox.deliver(Notification::said("b", "one"));
        mailbox.deliver(Notification::said("b", "two"));

        let drained = mailbox.drain(MAX_DRAIN_BATCH);
        assert_eq!(
            drained,
            vec![
                Notification::joined("a"),
                Notification::said("b", "one"),
                Notification::said("b", "two"),
            ]
        );
        assert!(mailbox.is_empty());
        assert!(mailbox.drain(MAX_DRAIN_BATCH).is_empty());
    }

    #[test]
    fn drain_leaves_the_newest_behind() {
        let mut mailbox = Mailbox::new();
        for i in 0..5 {
            mailbox.deliver(Notification::said("a", i.to_string()));
        }

        assert_eq!(
            mailbox.drain(3),
            vec![
                Notification::said("a", "0"),
                Notification::said("a", "1"),
                Notification::said("a", "2"),
            ]
        );
        assert_eq!(mailbox.len(), 2);
        assert_eq!(
            mailbox.drain(3),
            vec![Notification::said("a", "3"), Notification::said("a", "4")]
        );
        assert!(mailbox.is_empty());
    }
}
