//! The task that owns one instance.
//!
//! Each instance lives on its own tokio task, which `select!`s between the
//! inbound command queue and the game-tick interval. Work for one instance is
//! therefore strictly sequential while instances run side by side.

use super::instance::ServerInstance;
use crate::error::InstanceError;
use crate::telemetry::spans;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileguard_proto::Payload;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, info};

/// Work submitted to an instance task.
#[derive(Debug)]
pub enum Command {
    Connect {
        reply: oneshot::Sender<Result<u8, InstanceError>>,
    },
    Message {
        conn: u8,
        payload: Payload,
    },
    Disconnect {
        conn: u8,
    },
    Shutdown,
}

/// Cheap, cloneable submission handle for one running instance.
#[derive(Debug, Clone)]
pub struct InstanceHandle {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<Command>,
}

impl InstanceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, command: Command) -> Result<(), InstanceError> {
        self.tx
            .send(command)
            .map_err(|_| InstanceError::Closed(self.name.to_string()))
    }

    /// Attach a new connection, returning its slot.
    pub async fn connect(&self) -> Result<u8, InstanceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect { reply })?;
        rx.await
            .map_err(|_| InstanceError::Closed(self.name.to_string()))?
    }

    /// Queue one inbound message.
    pub fn submit(&self, conn: u8, payload: Payload) -> Result<(), InstanceError> {
        self.send(Command::Message { conn, payload })
    }

    pub fn disconnect(&self, conn: u8) -> Result<(), InstanceError> {
        self.send(Command::Disconnect { conn })
    }

    /// Ask the task to save and stop. The join handle yields the instance.
    pub fn shutdown(&self) -> Result<(), InstanceError> {
        self.send(Command::Shutdown)
    }
}

/// Move `instance` onto its own task.
pub fn spawn(instance: ServerInstance) -> (InstanceHandle, JoinHandle<ServerInstance>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let name: Arc<str> = Arc::from(instance.name());
    let span = spans::instance(&name);
    let task = tokio::spawn(run(instance, rx).instrument(span));
    (InstanceHandle { name, tx }, task)
}

async fn run(mut instance: ServerInstance, mut rx: mpsc::UnboundedReceiver<Command>) -> ServerInstance {
    let period = Duration::from_millis(instance.settings().tick_millis.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(tick_ms = period.as_millis() as u64, "Instance task started");

    loop {
        tokio::select! {
            command = rx.recv() => {
                match command {
                    Some(Command::Connect { reply }) => {
                        let result = instance.connect(Instant::now());
                        if reply.send(result).is_err() {
                            debug!("Connect requester went away");
                        }
                    }
                    Some(Command::Message { conn, payload }) => {
                        instance.handle_message(conn, payload, Instant::now());
                    }
                    Some(Command::Disconnect { conn }) => {
                        instance.disconnect(conn);
                    }
                    Some(Command::Shutdown) | None => break,
                }
            }
            _ = ticker.tick() => {
                instance.tick(Instant::now());
            }
        }
    }

    let conns = instance.sessions().ids();
    for conn in conns {
        instance.disconnect(conn);
    }
    instance.save_world();
    info!("Instance task stopped");
    instance
}
