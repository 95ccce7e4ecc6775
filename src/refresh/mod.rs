//! Fetch cycle for one table: request sequencing, snapshot install and
//! timer-driven polling.

mod envelope;
mod poller;

pub use envelope::records_from_response;
pub use poller::{PollerHandle, spawn_poller};

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::RwLock;
use tracing::{Instrument, Level, event, info_span};

use crate::core::{Record, Result};
use crate::guard::{RequestSequence, RequestToken};

/// A list endpoint. Transport is up to the implementor.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn name(&self) -> &str {
        "records"
    }

    /// Fetch the raw response body of the list endpoint.
    async fn fetch(&self) -> Result<JsonValue>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was current and replaced the snapshot.
    Applied(usize),
    /// A newer request started before this one completed.
    Superseded,
}

/// Current records of one table plus the sequence guarding their refresh.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use opsgrid::{LiveTable, RecordSource, RefreshOutcome, Result};
/// use serde_json::{Value, json};
///
/// struct Tasks;
///
/// #[async_trait]
/// impl RecordSource for Tasks {
///     async fn fetch(&self) -> Result<Value> {
///         Ok(json!({ "items": [{ "_id": "t1", "quantity": 3 }] }))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let table = LiveTable::new(Tasks);
/// assert_eq!(table.refresh().await.unwrap(), RefreshOutcome::Applied(1));
/// assert_eq!(table.records().await.len(), 1);
/// # });
/// ```
pub struct LiveTable<S> {
    source: S,
    sequence: RequestSequence,
    snapshot: RwLock<Arc<Vec<Record>>>,
}

impl<S: RecordSource> LiveTable<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            sequence: RequestSequence::new(),
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sequence(&self) -> &RequestSequence {
        &self.sequence
    }

    pub async fn records(&self) -> Arc<Vec<Record>> {
        self.snapshot.read().await.clone()
    }

    /// Re-fetch the list and install it if no newer refresh has started.
    ///
    /// A superseded response is dropped even if it failed. Errors of the
    /// current request are returned and leave the snapshot untouched.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let token = self.sequence.begin_request();
        let span = info_span!("refresh", source = self.source.name(), token = token.value());
        self.complete(token).instrument(span).await
    }

    async fn complete(&self, token: RequestToken) -> Result<RefreshOutcome> {
        event!(Level::DEBUG, "refresh started");
        let response = self.source.fetch().await;

        if !self.sequence.is_current(token) {
            event!(Level::DEBUG, "response superseded, dropping");
            return Ok(RefreshOutcome::Superseded);
        }

        let records = match response.and_then(records_from_response) {
            Ok(records) => records,
            Err(err) => {
                event!(Level::WARN, error = %err, "refresh failed");
                return Err(err);
            }
        };

        let mut snapshot = self.snapshot.write().await;
        if !self.sequence.is_current(token) {
            event!(Level::DEBUG, "response superseded, dropping");
            return Ok(RefreshOutcome::Superseded);
        }
        let count = records.len();
        *snapshot = Arc::new(records);
        event!(Level::DEBUG, records = count, "snapshot applied");
        Ok(RefreshOutcome::Applied(count))
    }

    /// Await a mutation against the backend, then re-fetch.
    ///
    /// Records are never patched locally; the fresh list is the only source
    /// of truth after an edit.
    pub async fn after_mutation<F, T>(&self, mutation: F) -> Result<(T, RefreshOutcome)>
    where
        F: Future<Output = Result<T>> + Send,
    {
        let output = mutation.await?;
        let outcome = self.refresh().await?;
        Ok((output, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Mutex, oneshot};

    struct StaticSource {
        body: JsonValue,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch(&self) -> Result<JsonValue> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch(&self) -> Result<JsonValue> {
            Err(EngineError::Source("HTTP 500".into()))
        }
    }

    /// Each fetch waits on the next queued gate.
    struct GatedSource {
        gates: Mutex<VecDeque<oneshot::Receiver<JsonValue>>>,
        started: AtomicUsize,
    }

    #[async_trait]
    impl RecordSource for GatedSource {
        async fn fetch(&self) -> Result<JsonValue> {
            let gate = self.gates.lock().await.pop_front();
            self.started.fetch_add(1, Ordering::SeqCst);
            match gate {
                Some(rx) => rx.await.map_err(|e| EngineError::Source(e.to_string())),
                None => Err(EngineError::Source("no gate".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_refresh_applies_snapshot() {
        let table = LiveTable::new(StaticSource {
            body: json!({ "items": [{ "_id": "a" }, { "_id": "b" }] }),
            calls: AtomicUsize::new(0),
        });
        assert!(table.records().await.is_empty());
        assert_eq!(table.refresh().await.unwrap(), RefreshOutcome::Applied(2));
        assert_eq!(table.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let table = LiveTable::new(FailingSource);
        assert!(matches!(table.refresh().await, Err(EngineError::Source(_))));
        assert!(table.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let table = Arc::new(LiveTable::new(GatedSource {
            gates: Mutex::new(VecDeque::from([rx1, rx2])),
            started: AtomicUsize::new(0),
        }));

        let first = tokio::spawn({
            let table = table.clone();
            async move { table.refresh().await }
        });
        while table.source().started.load(Ordering::SeqCst) < 1 {
            tokio::task::yield_now().await;
        }

        let second = tokio::spawn({
            let table = table.clone();
            async move { table.refresh().await }
        });
        while table.source().started.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }

        tx2.send(json!([{ "_id": "fresh" }])).unwrap();
        assert_eq!(second.await.unwrap().unwrap(), RefreshOutcome::Applied(1));

        tx1.send(json!([{ "_id": "old" }, { "_id": "older" }])).unwrap();
        assert_eq!(first.await.unwrap().unwrap(), RefreshOutcome::Superseded);

        let records = table.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), Some("fresh".into()));
    }

    #[tokio::test]
    async fn test_after_mutation_refetches() {
        let table = LiveTable::new(StaticSource {
            body: json!([{ "_id": "a", "completedQuantity": 3 }]),
            calls: AtomicUsize::new(0),
        });
        let (output, outcome) = table
            .after_mutation(async { Ok::<_, EngineError>("saved") })
            .await
            .unwrap();
        assert_eq!(output, "saved");
        assert_eq!(outcome, RefreshOutcome::Applied(1));
        assert_eq!(table.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_mutation_skips_refetch() {
        let table = LiveTable::new(StaticSource {
            body: json!([]),
            calls: AtomicUsize::new(0),
        });
        let result = table
            .after_mutation(async { Err::<(), _>(EngineError::Source("rejected".into())) })
            .await;
        assert!(result.is_err());
        assert_eq!(table.source().calls.load(Ordering::SeqCst), 0);
    }
}
