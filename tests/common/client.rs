//! Client attached to a running instance task.

#![allow(dead_code)]

use std::time::Duration;
use tileguard::server::{ChannelOutbound, InstanceHandle};
use tileguard_proto::{Packet, Payload};
use tokio::sync::mpsc;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

pub struct TestClient {
    pub conn: u8,
    handle: InstanceHandle,
    rx: mpsc::UnboundedReceiver<Packet>,
}

impl TestClient {
    /// Take a slot on the instance and attach to its transport.
    pub async fn connect(handle: &InstanceHandle, outbound: &ChannelOutbound) -> anyhow::Result<Self> {
        let conn = handle.connect().await?;
        let rx = outbound.register(conn);
        Ok(Self {
            conn,
            handle: handle.clone(),
            rx,
        })
    }

    pub fn send(&self, payload: Payload) -> anyhow::Result<()> {
        self.handle.submit(self.conn, payload)?;
        Ok(())
    }

    pub async fn recv(&mut self) -> anyhow::Result<Packet> {
        tokio::time::timeout(RECV_TIMEOUT, self.rx.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("transport closed"))
    }

    /// Read until a packet matches `pred`, returning it.
    pub async fn recv_until(&mut self, pred: impl Fn(&Packet) -> bool) -> anyhow::Result<Packet> {
        loop {
            let packet = self.recv().await?;
            if pred(&packet) {
                return Ok(packet);
            }
        }
    }

    pub fn disconnect(&self) -> anyhow::Result<()> {
        self.handle.disconnect(self.conn)?;
        Ok(())
    }
}
