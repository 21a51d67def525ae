//! Logging setup and dispatch timing.

use crate::config::{LogFormat, LoggingConfig};
use std::time::Instant;
use tileguard_proto::MessageKind;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is harmless;
/// the second subscriber is rejected and the first stays active.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {e}");
    }
}

/// Guard for timing a dispatch and recording metrics.
///
/// Records dispatch latency when dropped.
pub struct DispatchTimer {
    kind: MessageKind,
    start: Instant,
}

impl DispatchTimer {
    /// Start timing a dispatch.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for DispatchTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_dispatch(self.kind.as_str(), duration);
    }
}

/// Standardized span constructors.
pub mod spans {
    use tileguard_proto::MessageKind;
    use tracing::{Span, info_span};

    /// Span for one world instance task.
    pub fn instance(name: &str) -> Span {
        info_span!("instance", name = %name)
    }

    /// Span for one message dispatch.
    pub fn dispatch(instance: &str, conn: u8, kind: MessageKind) -> Span {
        info_span!("dispatch", instance = %instance, conn = conn, kind = %kind)
    }
}
