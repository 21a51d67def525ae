//! Prometheus metrics for the bouncer.
//!
//! Metrics live in a process-wide registry shared by every world instance and
//! are rendered on demand with [`gather_metrics`]. Recording before [`init`]
//! is a no-op, which keeps unit tests free of global setup.
//!
//! - `tileguard_messages_total{kind}` - inbound messages dispatched
//! - `tileguard_messages_cancelled_total{kind}` - messages whose default effect was suppressed
//! - `tileguard_handler_errors_total{kind,error}` - handler failures turned into cancels
//! - `tileguard_dispatch_duration_seconds{kind}` - dispatch latency
//! - `tileguard_disables_total{reason}` - threshold and ban disables
//! - `tileguard_connected_players{instance}` - live sessions per world

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

/// Inbound messages by kind.
pub static MESSAGES: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages cancelled by kind.
pub static CANCELLED: OnceLock<IntCounterVec> = OnceLock::new();

/// Handler errors and caught panics.
pub static HANDLER_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

/// Dispatch latency by kind.
pub static DISPATCH_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Sessions disabled, by reason.
pub static DISABLES: OnceLock<IntCounterVec> = OnceLock::new();

/// Messages dropped by the per-connection flood limiter.
pub static RATE_LIMITED: OnceLock<IntCounter> = OnceLock::new();

/// Connected players per instance.
pub static CONNECTED_PLAYERS: OnceLock<IntGaugeVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(MESSAGES, IntCounterVec::new(Opts::new("tileguard_messages_total", "Inbound messages dispatched by kind"), &["kind"]));
    register!(CANCELLED, IntCounterVec::new(Opts::new("tileguard_messages_cancelled_total", "Inbound messages cancelled by kind"), &["kind"]));
    register!(HANDLER_ERRORS, IntCounterVec::new(Opts::new("tileguard_handler_errors_total", "Handler errors converted to cancels"), &["kind", "error"]));
    register!(DISPATCH_LATENCY, HistogramVec::new(
        HistogramOpts::new("tileguard_dispatch_duration_seconds", "Dispatch latency by kind")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["kind"]));
    register!(DISABLES, IntCounterVec::new(Opts::new("tileguard_disables_total", "Sessions disabled by reason"), &["reason"]));
    register!(RATE_LIMITED, IntCounter::new("tileguard_rate_limited_total", "Messages dropped by the flood limiter"));
    register!(CONNECTED_PLAYERS, IntGaugeVec::new(Opts::new("tileguard_connected_players", "Connected players per instance"), &["instance"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

/// Record a dispatched message and its latency.
#[inline]
pub fn record_dispatch(kind: &str, duration_secs: f64) {
    if let Some(c) = MESSAGES.get() {
        c.with_label_values(&[kind]).inc();
    }
    if let Some(h) = DISPATCH_LATENCY.get() {
        h.with_label_values(&[kind]).observe(duration_secs);
    }
}

/// Record a cancelled message.
#[inline]
pub fn record_cancel(kind: &str) {
    if let Some(c) = CANCELLED.get() {
        c.with_label_values(&[kind]).inc();
    }
}

/// Record a handler failure.
#[inline]
pub fn record_handler_error(kind: &str, error: &str) {
    if let Some(c) = HANDLER_ERRORS.get() {
        c.with_label_values(&[kind, error]).inc();
    }
}

/// Record a session being disabled.
#[inline]
pub fn record_disable(reason: &str) {
    if let Some(c) = DISABLES.get() {
        c.with_label_values(&[reason]).inc();
    }
}

/// Record a flood-limited message.
#[inline]
pub fn record_rate_limited() {
    if let Some(c) = RATE_LIMITED.get() {
        c.inc();
    }
}

/// Update the connected player gauge of an instance.
#[inline]
pub fn set_connected_players(instance: &str, count: i64) {
    if let Some(g) = CONNECTED_PLAYERS.get() {
        g.with_label_values(&[instance]).set(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_lifecycle() {
        init();
        init();

        record_dispatch("tile_edit", 0.0001);
        record_cancel("tile_edit");
        record_disable("tile_kill");
        set_connected_players("main", 3);

        let text = gather_metrics();
        assert!(text.contains("tileguard_messages_total"));
        assert!(text.contains("tileguard_disables_total"));
    }
}
