//! tileguard - an inbound protocol bouncer for tile sandbox game servers.
//!
//! Every client message passes through a chain of validators before it may
//! touch the shared world of its instance. Validators cancel, rewrite or
//! disconnect; messages that survive have their default effect applied and
//! are relayed to the other players.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod persistence;
pub mod security;
pub mod server;
pub mod state;
pub mod telemetry;
