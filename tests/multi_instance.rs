//! Integration tests for hosting several instances in one process.

mod common;

use common::{TestClient, chat, player_info};
use tileguard::config::Config;
use tileguard::error::InstanceError;
use tileguard::server::Server;
use tileguard::state::World;
use tileguard_proto::{Packet, Payload};

fn config(saves: &std::path::Path) -> Config {
    let text = format!(
        r#"
        [saves]
        directory = "{}"

        [[instances]]
        name = "alpha"
        max_players = 4

        [[instances]]
        name = "beta"
        max_players = 4
        "#,
        saves.display().to_string().replace('\\', "/")
    );
    Config::parse(&text).expect("valid config")
}

async fn join(server: &Server, instance: &str, name: &str) -> anyhow::Result<TestClient> {
    let handle = server.instance(instance)?;
    let outbound = server.outbound(instance)?;
    let mut client = TestClient::connect(handle, &outbound).await?;
    client.send(player_info(client.conn, name, None))?;
    client.send(Payload::WorldDataRequest)?;
    client
        .recv_until(|p| matches!(p, Packet::WorldInfo { .. }))
        .await?;
    client.send(Payload::SpawnPlayer(tileguard_proto::message::SpawnPlayer {
        player: client.conn,
        spawn_x: -1,
        spawn_y: -1,
        respawn_timer: 0,
        deaths_pve: 0,
        deaths_pvp: 0,
        context: tileguard_proto::message::SpawnContext::SpawningIntoWorld,
    }))?;
    Ok(client)
}

fn chat_text(packet: &Packet) -> Option<&str> {
    match packet {
        Packet::Chat { text, .. } => Some(text.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn instances_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(&config(dir.path())).unwrap();

    let a1 = join(&server, "alpha", "ann").await.unwrap();
    let mut a2 = join(&server, "alpha", "abe").await.unwrap();
    let mut b1 = join(&server, "beta", "bea").await.unwrap();

    a1.send(chat("hello alpha")).unwrap();
    let heard = a2
        .recv_until(|p| matches!(p, Packet::Chat { .. }))
        .await
        .unwrap();
    assert_eq!(chat_text(&heard), Some("hello alpha"));

    // The first chat beta sees is its own.
    b1.send(chat("hello beta")).unwrap();
    let heard = b1
        .recv_until(|p| matches!(p, Packet::Chat { .. }))
        .await
        .unwrap();
    assert_eq!(chat_text(&heard), Some("hello beta"));

    server.shutdown().await;
}

#[tokio::test]
async fn same_name_may_join_different_instances() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(&config(dir.path())).unwrap();

    join(&server, "alpha", "twin").await.unwrap();
    join(&server, "beta", "twin").await.unwrap();

    // A second "twin" on alpha is refused.
    let handle = server.instance("alpha").unwrap();
    let outbound = server.outbound("alpha").unwrap();
    let mut dup = TestClient::connect(handle, &outbound).await.unwrap();
    dup.send(player_info(dup.conn, "twin", None)).unwrap();
    let packet = dup.recv().await.unwrap();
    assert!(matches!(packet, Packet::Disconnect { .. }));

    server.shutdown().await;
}

#[tokio::test]
async fn accounts_are_shared_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(&config(dir.path())).unwrap();
    server
        .shared()
        .accounts
        .register("roamer", "pw", "default")
        .unwrap();

    for instance in ["alpha", "beta"] {
        let handle = server.instance(instance).unwrap();
        let outbound = server.outbound(instance).unwrap();
        let mut client = TestClient::connect(handle, &outbound).await.unwrap();
        client.send(player_info(client.conn, "roamer", None)).unwrap();
        client.send(Payload::WorldDataRequest).unwrap();
        assert_eq!(client.recv().await.unwrap(), Packet::PasswordChallenge);
        client.send(common::password("pw")).unwrap();
        client
            .recv_until(|p| matches!(p, Packet::WorldInfo { .. }))
            .await
            .unwrap();
        client.disconnect().unwrap();
    }

    server.shutdown().await;
}

#[tokio::test]
async fn unknown_instance_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(&config(dir.path())).unwrap();
    assert!(matches!(
        server.instance("gamma"),
        Err(InstanceError::UnknownInstance(_))
    ));
    let mut names: Vec<_> = server.instance_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["alpha", "beta"]);
    server.shutdown().await;
}

#[tokio::test]
async fn shutdown_saves_every_world_and_restart_loads_them() {
    let dir = tempfile::tempdir().unwrap();
    let server = Server::start(&config(dir.path())).unwrap();
    server.shutdown().await;

    for name in ["alpha", "beta"] {
        let bytes = std::fs::read(dir.path().join(format!("{name}.world"))).unwrap();
        let world = World::from_snapshot(&bytes).unwrap();
        assert_eq!(world.width(), 400);
    }

    // Second start picks the saves up again.
    let server = Server::start(&config(dir.path())).unwrap();
    server.shutdown().await;
}
