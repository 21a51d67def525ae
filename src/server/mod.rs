//! Instance hosting.
//!
//! A process hosts several world instances. Each one runs on its own task
//! ([`runner`]) and shares the account store, the character store, the
//! permission groups and the item ban list with every other instance.

pub mod instance;
pub mod outbound;
pub mod runner;

pub use instance::ServerInstance;
pub use outbound::{ChannelOutbound, LoopbackOutbound, Outbound, TrackedOutbound};
pub use runner::{InstanceHandle, spawn};

use crate::config::Config;
use crate::error::InstanceError;
use crate::handlers::{Registry, Services};
use crate::persistence::{FileWorldSink, MemoryAccountStore, MemoryCharacterStore, SaveQueue};
use crate::security::{GroupTable, ItemBanList};
use crate::state::World;
use anyhow::Context as _;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Stores and policy tables shared by every instance of the process.
#[derive(Clone)]
pub struct SharedState {
    pub groups: Arc<GroupTable>,
    pub bans: Arc<ItemBanList>,
    pub accounts: Arc<MemoryAccountStore>,
    pub characters: Arc<MemoryCharacterStore>,
}

impl SharedState {
    pub fn from_config(config: &Config) -> Self {
        let groups = Arc::new(GroupTable::from_config(&config.groups));
        let bans = Arc::new(ItemBanList::from_config(&config.item_bans, groups.clone()));
        Self {
            groups,
            bans,
            accounts: Arc::new(MemoryAccountStore::from_config(&config.accounts)),
            characters: Arc::new(MemoryCharacterStore::new()),
        }
    }

    /// The trait-object view handed to handlers.
    pub fn services(&self) -> Services {
        Services {
            permissions: self.groups.clone(),
            bans: self.bans.clone(),
            accounts: self.accounts.clone(),
            characters: self.characters.clone(),
        }
    }
}

/// Every running instance of the process.
pub struct Server {
    shared: SharedState,
    outbounds: HashMap<String, Arc<ChannelOutbound>>,
    handles: HashMap<String, InstanceHandle>,
    tasks: Vec<JoinHandle<ServerInstance>>,
    saves: SaveQueue,
}

impl Server {
    /// Start one task per configured instance.
    ///
    /// Worlds saved by an earlier run are loaded from the saves directory.
    pub fn start(config: &Config) -> anyhow::Result<Self> {
        let shared = SharedState::from_config(config);
        let registry = Arc::new(Registry::new());
        let sink = Arc::new(FileWorldSink::new(config.saves.directory.clone()));
        let saves = SaveQueue::spawn(sink.clone());

        let mut outbounds = HashMap::new();
        let mut handles = HashMap::new();
        let mut tasks = Vec::new();
        for settings in &config.instances {
            let outbound = Arc::new(ChannelOutbound::new());
            let mut instance = ServerInstance::new(
                Arc::new(settings.clone()),
                registry.clone(),
                shared.services(),
                outbound.clone(),
                Instant::now(),
            )
            .with_saves(saves.clone());

            let path = sink.path_for(&settings.name);
            if path.exists() {
                let bytes = std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?;
                let world = World::from_snapshot(&bytes)
                    .with_context(|| format!("decoding {}", path.display()))?;
                info!(instance = %settings.name, path = %path.display(), "Loaded saved world");
                instance = instance.with_world(world);
            }

            let (handle, task) = spawn(instance);
            info!(instance = %settings.name, max_players = settings.max_players, "Instance started");
            outbounds.insert(settings.name.clone(), outbound);
            handles.insert(settings.name.clone(), handle);
            tasks.push(task);
        }

        Ok(Self {
            shared,
            outbounds,
            handles,
            tasks,
            saves,
        })
    }

    pub fn shared(&self) -> &SharedState {
        &self.shared
    }

    /// Submission handle of the instance called `name`.
    pub fn instance(&self, name: &str) -> Result<&InstanceHandle, InstanceError> {
        self.handles
            .get(name)
            .ok_or_else(|| InstanceError::UnknownInstance(name.to_string()))
    }

    /// Transport of the instance called `name`, for attaching connections.
    pub fn outbound(&self, name: &str) -> Result<Arc<ChannelOutbound>, InstanceError> {
        self.outbounds
            .get(name)
            .cloned()
            .ok_or_else(|| InstanceError::UnknownInstance(name.to_string()))
    }

    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.handles.keys().map(String::as_str)
    }

    /// Stop every instance, then wait for the last world saves to land.
    pub async fn shutdown(self) {
        for (name, handle) in &self.handles {
            if let Err(e) = handle.shutdown() {
                warn!(instance = %name, error = %e, "Instance already stopped");
            }
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Instance task failed");
            }
        }
        self.saves.flush().await;
        info!("All instances stopped");
    }
}
