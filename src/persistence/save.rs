//! World save worker.
//!
//! A single background task drains an unbounded FIFO of snapshots, so at most
//! one save is in flight per process. There is no priority and no
//! cancellation; [`SaveQueue::flush`] waits for everything queued before it.

use anyhow::Context as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Destination of world snapshots.
pub trait WorldSink: Send + Sync + 'static {
    fn write(&self, instance: &str, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Writes `<directory>/<instance>.world`, replacing the previous file
/// atomically.
#[derive(Debug, Clone)]
pub struct FileWorldSink {
    directory: PathBuf,
}

impl FileWorldSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, instance: &str) -> PathBuf {
        self.directory.join(format!("{instance}.world"))
    }
}

impl WorldSink for FileWorldSink {
    fn write(&self, instance: &str, bytes: &[u8]) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.directory)
            .with_context(|| format!("creating {}", self.directory.display()))?;
        let path = self.path_for(instance);
        let tmp = path.with_extension("world.tmp");
        std::fs::write(&tmp, bytes).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }
}

enum SaveJob {
    Save { instance: String, bytes: Vec<u8> },
    Flush(oneshot::Sender<()>),
}

/// Handle to the save worker. Cheap to clone.
#[derive(Clone)]
pub struct SaveQueue {
    tx: mpsc::UnboundedSender<SaveJob>,
}

impl SaveQueue {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn WorldSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SaveJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    SaveJob::Save { instance, bytes } => {
                        let sink = Arc::clone(&sink);
                        let name = instance.clone();
                        let size = bytes.len();
                        let result =
                            tokio::task::spawn_blocking(move || sink.write(&instance, &bytes))
                                .await;
                        match result {
                            Ok(Ok(())) => info!(instance = %name, bytes = size, "World saved"),
                            Ok(Err(e)) => {
                                error!(instance = %name, error = %e, "World save failed")
                            }
                            Err(e) => error!(instance = %name, error = %e, "World save task panicked"),
                        }
                    }
                    SaveJob::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("save queue closed");
        });

        Self { tx }
    }

    /// Queue a snapshot. Returns `false` if the worker is gone.
    pub fn enqueue(&self, instance: impl Into<String>, bytes: Vec<u8>) -> bool {
        self.tx
            .send(SaveJob::Save {
                instance: instance.into(),
                bytes,
            })
            .is_ok()
    }

    /// Wait until every save queued before this call has finished.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.tx.send(SaveJob::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(String, usize)>>,
    }

    impl WorldSink for RecordingSink {
        fn write(&self, instance: &str, bytes: &[u8]) -> anyhow::Result<()> {
            self.writes.lock().push((instance.to_string(), bytes.len()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn saves_run_in_order_and_flush_waits() {
        let sink = Arc::new(RecordingSink::default());
        let queue = SaveQueue::spawn(sink.clone());
        assert!(queue.enqueue("a", vec![0; 3]));
        assert!(queue.enqueue("b", vec![0; 5]));
        assert!(queue.enqueue("a", vec![0; 7]));
        queue.flush().await;
        assert_eq!(
            *sink.writes.lock(),
            vec![("a".to_string(), 3), ("b".to_string(), 5), ("a".to_string(), 7)]
        );
    }

    #[tokio::test]
    async fn file_sink_writes_instance_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileWorldSink::new(dir.path().join("worlds"));
        let queue = SaveQueue::spawn(Arc::new(sink.clone()));
        queue.enqueue("main", b"snapshot".to_vec());
        queue.flush().await;
        let written = std::fs::read(sink.path_for("main")).unwrap();
        assert_eq!(written, b"snapshot");
    }
}
