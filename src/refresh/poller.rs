use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{Level, event};

use crate::core::{EngineError, Result};
use crate::refresh::{LiveTable, RecordSource, RefreshOutcome};

/// Background re-fetch loop for one table.
pub struct PollerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Signals the poller to stop and waits for it to finish.
    pub async fn stop(mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle
                .await
                .map_err(|err| EngineError::Worker(format!("poller join: {}", err)))?;
        }
        Ok(())
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}

/// Re-fetch `table` every `interval` until stopped.
///
/// Each tick goes through `LiveTable::refresh`, so a slow tick that is
/// overtaken by a later one is discarded by the request sequence. Failed
/// ticks are logged and polling continues.
pub fn spawn_poller<S>(table: Arc<LiveTable<S>>, interval: Duration) -> PollerHandle
where
    S: RecordSource + 'static,
{
    let interval = interval.max(Duration::from_millis(10));
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let join_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    break;
                }
                _ = sleep(interval) => {
                    match table.refresh().await {
                        Ok(RefreshOutcome::Applied(count)) => {
                            event!(Level::TRACE, records = count, "poll applied");
                        }
                        Ok(RefreshOutcome::Superseded) => {}
                        Err(err) => {
                            event!(Level::WARN, error = %err, "poll refresh failed");
                        }
                    }
                }
            }
        }
    });

    PollerHandle {
        stop_tx: Some(stop_tx),
        join_handle: Some(join_handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value as JsonValue, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl RecordSource for CountingSource {
        async fn fetch(&self) -> Result<JsonValue> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                return Err(EngineError::Source("flaky".into()));
            }
            Ok(json!([{ "_id": format!("tick-{}", n) }]))
        }
    }

    #[tokio::test]
    async fn test_poller_refreshes_until_stopped() {
        let calls = Arc::new(AtomicUsize::new(0));
        let table = Arc::new(LiveTable::new(CountingSource { calls: calls.clone() }));

        let poller = spawn_poller(table.clone(), Duration::from_millis(10));
        while calls.load(Ordering::SeqCst) < 3 {
            sleep(Duration::from_millis(5)).await;
        }
        poller.stop().await.unwrap();

        let after_stop = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_stop);
        assert_eq!(table.records().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let table = Arc::new(LiveTable::new(CountingSource { calls: calls.clone() }));

        let poller = spawn_poller(table, Duration::from_millis(10));
        drop(poller);
        sleep(Duration::from_millis(40)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
