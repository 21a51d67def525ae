//! Connection lifecycle state machine.
//!
//! ## State Machine
//!
//! ```text
//! ┌───────────────┐  PlayerInfo   ┌────────────────────┐  WorldDataRequest  ┌─────────────────────┐  login   ┌──────────┐
//! │ AssigningSlot ├──────────────►│ AwaitingPlayerInfo ├───────────────────►│ RequestingWorldData ├─────────►│ Complete │
//! └───────┬───────┘               └─────────┬──────────┘                    └──────────┬──────────┘          └────┬─────┘
//!         │                                 │                                          │                          │
//!         └─────────────────────────────────┴──────────────┬───────────────────────────┴──────────────────────────┘
//!                                                          ▼
//!                                                   ┌──────────────┐
//!                                                   │ Disconnected │
//!                                                   └──────────────┘
//! ```
//!
//! States only move forward. A reconnecting client gets a fresh session in
//! `AssigningSlot`.
//!
//! Message kinds are gated per state before any handler runs, the same way
//! pre-registration commands are separated from the rest:
//! - `PlayerInfo`: any live state (later ones are appearance updates)
//! - `SlotSync`, `LoadoutSwitch`: from `AwaitingPlayerInfo` on, so the client
//!   can upload its inventory during the handshake
//! - `WorldDataRequest`: only in `AwaitingPlayerInfo`
//! - `Password`: only in `RequestingWorldData`
//! - everything else: only in `Complete`

use crate::error::TransitionError;
use tileguard_proto::MessageKind;

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ConnectionState {
    #[default]
    AssigningSlot,
    AwaitingPlayerInfo,
    RequestingWorldData,
    Complete,
    Disconnected,
}

/// Events that move a connection forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// First valid `PlayerInfo` received.
    InfoAccepted,
    /// `WorldDataRequest` received.
    WorldRequested,
    /// World info sent; the player may act.
    LoginCompleted,
    /// Forced or voluntary disconnect.
    Disconnect,
}

impl ConnectionState {
    /// Apply a transition, returning the next state.
    pub fn advance(self, transition: Transition) -> Result<Self, TransitionError> {
        use ConnectionState::*;
        let next = match (self, transition) {
            (Disconnected, _) => None,
            (_, Transition::Disconnect) => Some(Disconnected),
            (AssigningSlot, Transition::InfoAccepted) => Some(AwaitingPlayerInfo),
            (AwaitingPlayerInfo, Transition::WorldRequested) => Some(RequestingWorldData),
            (RequestingWorldData, Transition::LoginCompleted) => Some(Complete),
            _ => None,
        };
        next.ok_or(TransitionError {
            from: self,
            transition,
        })
    }

    /// Whether a message of `kind` may be dispatched in this state.
    pub fn permits(self, kind: MessageKind) -> bool {
        use ConnectionState::*;
        match kind {
            MessageKind::PlayerInfo => self != Disconnected,
            MessageKind::SlotSync | MessageKind::LoadoutSwitch => {
                matches!(self, AwaitingPlayerInfo | RequestingWorldData | Complete)
            }
            MessageKind::WorldDataRequest => self == AwaitingPlayerInfo,
            MessageKind::Password => self == RequestingWorldData,
            _ => self == Complete,
        }
    }

    pub fn is_complete(self) -> bool {
        self == ConnectionState::Complete
    }

    pub fn is_disconnected(self) -> bool {
        self == ConnectionState::Disconnected
    }
}
