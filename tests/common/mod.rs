//! Integration test common infrastructure.
//!
//! Provides an in-process instance driven message by message, a client that
//! talks to a running instance task, and payload builders.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestInstance;

use tileguard_proto::message::{ChatText, Difficulty, Password, PlayerInfo, TileAction, TileEdit};
use tileguard_proto::{Packet, Payload};

#[allow(dead_code)]
pub fn player_info(conn: u8, name: &str, uuid: Option<&str>) -> Payload {
    Payload::PlayerInfo(PlayerInfo {
        player: conn,
        name: name.to_string(),
        difficulty: Difficulty::Softcore,
        client_uuid: uuid.map(str::to_string),
    })
}

#[allow(dead_code)]
pub fn password(text: &str) -> Payload {
    Payload::Password(Password {
        password: text.to_string(),
    })
}

#[allow(dead_code)]
pub fn chat(text: &str) -> Payload {
    Payload::ChatText(ChatText {
        text: text.to_string(),
    })
}

#[allow(dead_code)]
pub fn tile_edit(action: TileAction, x: i32, y: i32) -> Payload {
    Payload::TileEdit(TileEdit {
        action,
        x,
        y,
        style: 1,
    })
}

/// Reason of the first `Disconnect` in `packets`.
#[allow(dead_code)]
pub fn disconnect_reason(packets: &[Packet]) -> Option<&str> {
    packets.iter().find_map(|p| match p {
        Packet::Disconnect { reason } => Some(reason.as_str()),
        _ => None,
    })
}

/// How many packets match `pred`.
#[allow(dead_code)]
pub fn count(packets: &[Packet], pred: impl Fn(&Packet) -> bool) -> usize {
    packets.iter().filter(|p| pred(p)).count()
}
