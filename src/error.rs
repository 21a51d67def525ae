//! Unified error handling for tileguard.
//!
//! Policy violations never surface as errors: validators express them through
//! the dispatch outcome. The types here cover genuine failures, which the
//! dispatcher converts into a cancel for the one message that caused them.

use crate::state::machine::{ConnectionState, Transition};
use thiserror::Error;
use tileguard_proto::MessageKind;

// ============================================================================
// Handler Errors (message processing)
// ============================================================================

/// Errors that can occur while a handler processes a message.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A handler registered for one kind was handed another kind's payload.
    #[error("payload mismatch: expected {expected}, got {actual}")]
    PayloadMismatch {
        expected: MessageKind,
        actual: MessageKind,
    },

    #[error("no session for connection {0}")]
    SessionMissing(u8),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::PayloadMismatch { .. } => "payload_mismatch",
            Self::SessionMissing(_) => "session_missing",
            Self::Transition(_) => "illegal_transition",
            Self::Store(_) => "store_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Result type for message handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Connection state errors
// ============================================================================

/// A transition the connection state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal transition {transition:?} from state {from:?}")]
pub struct TransitionError {
    pub from: ConnectionState,
    pub transition: Transition,
}

// ============================================================================
// Instance errors (connection management)
// ============================================================================

/// Errors raised by a world instance outside message dispatch.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("no instance named {0}")]
    UnknownInstance(String),

    #[error("connection slot {0} is outside the player limit")]
    SlotOutOfRange(u8),

    #[error("connection slot {0} is already in use")]
    SlotOccupied(u8),

    #[error("instance is full")]
    Full,

    /// The instance task has shut down and no longer accepts work.
    #[error("instance {0} is closed")]
    Closed(String),
}

// ============================================================================
// Store errors (accounts, characters, world saves)
// ============================================================================

/// Failures of the account, character and world stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account {0} already exists")]
    AccountExists(String),

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("character record for {account} has {actual} slots, expected {expected}")]
    SlotCount {
        account: String,
        expected: usize,
        actual: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(HandlerError::SessionMissing(3).error_code(), "session_missing");
        assert_eq!(HandlerError::Internal("x".into()).error_code(), "internal_error");
        let err = HandlerError::from(StoreError::AccountExists("bob".into()));
        assert_eq!(err.error_code(), "store_error");
    }

    #[test]
    fn test_transition_error_display() {
        let err = TransitionError {
            from: ConnectionState::Complete,
            transition: Transition::InfoAccepted,
        };
        assert!(err.to_string().contains("Complete"));
    }

    #[test]
    fn test_slot_count_message() {
        let err = StoreError::SlotCount {
            account: "alice".into(),
            expected: 350,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "character record for alice has 12 slots, expected 350"
        );
    }
}
