use chrono::NaiveDate;
use edu_metrics::dashboards::{
    parse_date_lenient, FeedSnapshot, SnapshotStore, SnapshotUpdate, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local snapshot store. Feed uploads replace whole feeds, so a
/// coarse read-write lock around the snapshot is all the coordination the
/// service needs.
#[derive(Default)]
pub(crate) struct InMemoryFeedStore {
    snapshot: RwLock<FeedSnapshot>,
}

impl SnapshotStore for InMemoryFeedStore {
    fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }

    fn replace(&self, update: SnapshotUpdate) -> Result<(), StoreError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))?;
        guard.apply(update);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    parse_date_lenient(raw).ok_or_else(|| format!("'{raw}' is not a recognized date"))
}
