use super::domain::{CallRecord, LeadRecord, SalesRecord, SpendRecord};

/// The service's current in-memory copy of all four feeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub spend: Vec<SpendRecord>,
    pub leads: Vec<LeadRecord>,
    pub calls: Vec<CallRecord>,
    pub sales: Vec<SalesRecord>,
}

impl FeedSnapshot {
    /// Swaps in only the feeds the update carries, keeping last-known-good
    /// data for the rest.
    pub fn apply(&mut self, update: SnapshotUpdate) {
        if let Some(spend) = update.spend {
            self.spend = spend;
        }
        if let Some(leads) = update.leads {
            self.leads = leads;
        }
        if let Some(calls) = update.calls {
            self.calls = calls;
        }
        if let Some(sales) = update.sales {
            self.sales = sales;
        }
    }
}

/// Partial snapshot replacement; `None` slices are left untouched.
#[derive(Debug, Clone, Default)]
pub struct SnapshotUpdate {
    pub spend: Option<Vec<SpendRecord>>,
    pub leads: Option<Vec<LeadRecord>>,
    pub calls: Option<Vec<CallRecord>>,
    pub sales: Option<Vec<SalesRecord>>,
}

impl SnapshotUpdate {
    pub fn is_empty(&self) -> bool {
        self.spend.is_none() && self.leads.is_none() && self.calls.is_none() && self.sales.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for the current feed snapshot, so the service layer can be
/// exercised against an in-memory double. Implementations use interior
/// mutability; the `&self` contract keeps the dashboard functions callable
/// concurrently over one shared store.
pub trait SnapshotStore: Send + Sync {
    fn snapshot(&self) -> Result<FeedSnapshot, StoreError>;
    fn replace(&self, update: SnapshotUpdate) -> Result<(), StoreError>;
}
