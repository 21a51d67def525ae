//! Message handler registry and dispatch.
//!
//! Each message kind owns an immutable, priority-sorted chain. Registering a
//! handler builds a new chain and swaps it in, so a dispatch in progress keeps
//! running against the chain it started with.

use super::context::{Context, HandlerResult};
use super::event::{DispatchEvent, Outcome, Priority};
use crate::telemetry::{DispatchTimer, spans};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tileguard_proto::MessageKind;
use tracing::{debug, error, warn};

/// A message handler.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>, &mut DispatchEvent) -> HandlerResult + Send + Sync,
{
    fn handle(&self, ctx: &mut Context<'_>, event: &mut DispatchEvent) -> HandlerResult {
        self(ctx, event)
    }
}

#[derive(Clone)]
struct Entry {
    priority: Priority,
    handler: Arc<dyn Handler>,
}

type Chain = Arc<[Entry]>;

/// Registry of message handlers.
pub struct Registry {
    chains: RwLock<HashMap<MessageKind, Chain>>,
    /// Dispatch counters per kind.
    dispatch_counts: HashMap<MessageKind, AtomicU64>,
}

impl Registry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            chains: RwLock::new(HashMap::new()),
            dispatch_counts: MessageKind::ALL
                .iter()
                .map(|&k| (k, AtomicU64::new(0)))
                .collect(),
        }
    }

    /// Create a registry with every built-in validator registered.
    pub fn new() -> Self {
        let registry = Self::empty();
        crate::handlers::register_all(&registry);
        registry
    }

    /// Add a handler to `kind`'s chain.
    pub fn register(&self, kind: MessageKind, handler: impl Handler + 'static, priority: Priority) {
        let entry = Entry {
            priority,
            handler: Arc::new(handler),
        };
        let mut chains = self.chains.write();
        let mut entries: Vec<Entry> = chains
            .get(&kind)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default();
        entries.push(entry);
        // Stable: equal tiers keep registration order.
        entries.sort_by_key(|e| e.priority);
        chains.insert(kind, entries.into());
    }

    /// Number of handlers registered for `kind`.
    pub fn chain_len(&self, kind: MessageKind) -> usize {
        self.chains.read().get(&kind).map_or(0, |c| c.len())
    }

    /// Get dispatch statistics, busiest kind first.
    pub fn dispatch_stats(&self) -> Vec<(MessageKind, u64)> {
        let mut stats: Vec<_> = self
            .dispatch_counts
            .iter()
            .map(|(kind, count)| (*kind, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        stats
    }

    /// Run `event` through its kind's chain.
    ///
    /// A handler error or panic cancels the message and ends the chain; it
    /// never escapes the dispatch.
    pub fn dispatch(&self, ctx: &mut Context<'_>, event: &mut DispatchEvent) {
        let kind = event.kind;
        if let Some(counter) = self.dispatch_counts.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        let chain = self.chains.read().get(&kind).cloned();
        let Some(chain) = chain else {
            return;
        };

        let span = spans::dispatch(ctx.instance, event.sender, kind);
        let _enter = span.enter();
        let _timer = DispatchTimer::new(kind);

        for entry in chain.iter() {
            let result = catch_unwind(AssertUnwindSafe(|| entry.handler.handle(ctx, event)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(kind = %kind, error = %e, "Handler error, cancelling message");
                    crate::metrics::record_handler_error(kind.as_str(), e.error_code());
                    event.reject();
                }
                Err(_) => {
                    error!(kind = %kind, "Handler panicked, cancelling message");
                    crate::metrics::record_handler_error(kind.as_str(), "panic");
                    event.reject();
                }
            }
            if event.stop_propagation {
                break;
            }
        }

        if event.outcome == Outcome::Cancel {
            debug!(kind = %kind, conn = event.sender, "Message cancelled");
            crate::metrics::record_cancel(kind.as_str());
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
