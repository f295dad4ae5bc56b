//! Background eviction of expired request cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::store::RequestCache;

/// Handle to a running sweep task. Dropping it aborts the task.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweepHandle {
    /// Stop the sweep and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Spawn a task that calls [`RequestCache::sweep_expired`] every `interval`.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_sweeper<V>(cache: Arc<RequestCache<V>>, interval: Duration) -> SweepHandle
where
    V: Clone + Send + 'static,
{
    let (tx, mut rx) = oneshot::channel();
    let period = interval.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // Skip the first immediate tick
        info!(interval_ms = period.as_millis() as u64, "Request cache sweep started");
        loop {
            tokio::select! {
                _ = &mut rx => break,
                _ = ticker.tick() => {
                    let removed = cache.sweep_expired();
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "Swept expired cache entries");
                    }
                }
            }
        }
        info!("Request cache sweep stopped");
    });

    SweepHandle {
        shutdown: Some(tx),
        task: Some(task),
    }
}
