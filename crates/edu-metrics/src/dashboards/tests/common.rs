use crate::dashboards::service::DashboardService;
use crate::dashboards::store::{FeedSnapshot, SnapshotStore, SnapshotUpdate, StoreError};
use std::sync::{Arc, RwLock};

/// In-memory store double mirroring the one the API binary wires in.
#[derive(Debug, Default)]
pub(super) struct MemoryStore {
    snapshot: RwLock<FeedSnapshot>,
}

impl SnapshotStore for MemoryStore {
    fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }

    fn replace(&self, update: SnapshotUpdate) -> Result<(), StoreError> {
        self.snapshot
            .write()
            .map(|mut guard| guard.apply(update))
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }
}

/// A store that always fails, for exercising the error path.
pub(super) struct BrokenStore;

impl SnapshotStore for BrokenStore {
    fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
        Err(StoreError::Unavailable("backing store offline".to_string()))
    }

    fn replace(&self, _update: SnapshotUpdate) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("backing store offline".to_string()))
    }
}

pub(super) fn service() -> Arc<DashboardService<MemoryStore>> {
    Arc::new(DashboardService::new(Arc::new(MemoryStore::default())))
}

pub(super) const SPEND_CSV: &str = "\
Month,Source,Amount Spent (NPR)
2024-01-01,Facebook,\"NPR 40,000\"
2024-02-01,Google,25000
2024-02-01,TikTok,10000
";

pub(super) const LEADS_CSV: &str = "\
Date,Source,Client ID,Stage,Student Name
2024-01-10,fb,C-1,Qualified,Asha Thapa
2024-01-12,fb,C-1,Qualified,Asha Thapa
2024-02-03,google,C-2,Disqualified,Bikram Rai
2024-02-14,tiktok,,New,Walk-up Visitor
";

pub(super) fn call_center_payload() -> serde_json::Value {
    serde_json::json!({ "data": [
        { "Date": "2024-01-11", "Source": "fb", "Client ID": "C-1",
          "Status": "Called", "Stage": "Hot", "Rep": "Mina" },
        { "Date": "2024-02-05", "Source": "google", "Client ID": "C-9",
          "Status": "New", "Stage": "Warm", "Rep": "Mina" },
        { "Date": "2024-02-06", "Source": "tiktok", "Client ID": "",
          "Status": "Uncalled", "Stage": "Cold", "Rep": "Sagar" },
    ] })
}

pub(super) fn sales_payload() -> serde_json::Value {
    serde_json::json!({ "sales": [
        { "Date": "2024-01-20", "Status Date": "2024-02-10", "Source": "fb",
          "Client ID": "C-1", "Outcome": "Completed", "Visa Outcome": "Approved",
          "Sales Rep": "Dipesh", "Student Name": "Asha Thapa" },
        { "Date": "2024-02-01", "Source": "google", "Client ID": "C-2",
          "Outcome": "In Process", "Current Stage": "GTE Review",
          "Stage Start Date": "2024-01-25", "Sales Rep": "Dipesh" },
        { "Date": "2024-02-02", "Source": "tiktok", "Client ID": "C-9",
          "Outcome": "Completed", "Visa Outcome": "Rejected", "Sales Rep": "Ritika" },
    ] })
}
