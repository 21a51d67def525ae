//! The value threaded through a handler chain.

use std::sync::Arc;
use tileguard_proto::{MessageKind, Payload};

/// What happens to the message's default world effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Apply the default effect.
    #[default]
    Continue,
    /// Drop the message; the default effect is skipped.
    Cancel,
    /// A handler already applied (a modified) effect; skip the default.
    Overwrite,
}

/// Chain position. Higher tiers run first; equal tiers run in registration
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Higher,
    High,
    Normal,
    Low,
}

/// One inbound message on its way through the handler chain.
#[derive(Debug, Clone)]
pub struct DispatchEvent {
    pub kind: MessageKind,
    pub payload: Payload,
    /// Connection slot of the sender.
    pub sender: u8,
    pub instance: Arc<str>,
    pub outcome: Outcome,
    /// No later handler runs once set.
    pub stop_propagation: bool,
}

impl DispatchEvent {
    pub fn new(instance: Arc<str>, sender: u8, payload: Payload) -> Self {
        Self {
            kind: payload.kind(),
            payload,
            sender,
            instance,
            outcome: Outcome::Continue,
            stop_propagation: false,
        }
    }

    /// Suppress the default effect; later handlers still run.
    pub fn cancel(&mut self) {
        self.outcome = Outcome::Cancel;
    }

    /// Suppress the default effect and end the chain.
    pub fn reject(&mut self) {
        self.outcome = Outcome::Cancel;
        self.stop_propagation = true;
    }

    /// Record that a handler applied the effect itself.
    pub fn overwrite(&mut self) {
        self.outcome = Outcome::Overwrite;
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == Outcome::Cancel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileguard_proto::message::ChatText;

    #[test]
    fn priority_orders_highest_first() {
        let mut tiers = vec![Priority::Low, Priority::Higher, Priority::Normal, Priority::High];
        tiers.sort();
        assert_eq!(
            tiers,
            vec![Priority::Higher, Priority::High, Priority::Normal, Priority::Low]
        );
    }

    #[test]
    fn cancel_does_not_stop() {
        let mut event = DispatchEvent::new(
            Arc::from("main"),
            1,
            Payload::ChatText(ChatText { text: "hi".into() }),
        );
        assert_eq!(event.kind, MessageKind::ChatText);
        event.cancel();
        assert!(event.is_cancelled());
        assert!(!event.stop_propagation);
        event.reject();
        assert!(event.stop_propagation);
    }
}
