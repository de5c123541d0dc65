//! Output seam of the engine
//!
//! This module defines the trait through which the quiz reaches the page
//! around the map: prompt, score and timer labels, tooltips, sounds and
//! effects. Hosts decide how each message is shown.

use std::cell::RefCell;

use super::{SyncMessage, UpdateMessage};

/// Trait for showing engine output to the player
pub trait Presenter {
    /// Shows an update
    fn send_message(&self, message: &UpdateMessage);

    /// Replaces the host's view with a full snapshot
    ///
    /// Hosts that never reattach can ignore snapshots.
    fn send_state(&self, _state: &SyncMessage) {}
}

impl<F: Fn(&UpdateMessage)> Presenter for F {
    fn send_message(&self, message: &UpdateMessage) {
        self(message);
    }
}

/// Presenter that queues messages until the host drains them
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: RefCell<Vec<UpdateMessage>>,
    state: RefCell<Option<SyncMessage>>,
}

impl MessageQueue {
    /// Creates an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every queued update, oldest first
    pub fn drain(&self) -> Vec<UpdateMessage> {
        self.messages.take()
    }

    /// Takes the latest snapshot, if one was sent
    pub fn take_state(&self) -> Option<SyncMessage> {
        self.state.take()
    }
}

impl Presenter for MessageQueue {
    fn send_message(&self, message: &UpdateMessage) {
        self.messages.borrow_mut().push(message.clone());
    }

    fn send_state(&self, state: &SyncMessage) {
        self.state.replace(Some(state.clone()));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::quiz;

    #[test]
    fn test_closure_presenter() {
        let count = Cell::new(0);
        let presenter = |_: &UpdateMessage| count.set(count.get() + 1);
        presenter.send_message(&quiz::UpdateMessage::Timer("0:01".to_string()).into());
        presenter.send_message(&quiz::UpdateMessage::Timer("0:02".to_string()).into());
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_queue_drains_in_order() {
        let queue = MessageQueue::new();
        queue.send_message(&quiz::UpdateMessage::Score { percentage: 0 }.into());
        queue.send_message(&quiz::UpdateMessage::Score { percentage: 100 }.into());

        assert_eq!(
            queue.drain(),
            [
                UpdateMessage::Quiz(quiz::UpdateMessage::Score { percentage: 0 }),
                UpdateMessage::Quiz(quiz::UpdateMessage::Score { percentage: 100 }),
            ]
        );
        assert!(queue.drain().is_empty());
        assert!(queue.take_state().is_none());
    }
}
