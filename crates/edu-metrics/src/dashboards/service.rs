use super::call_center::{call_center_dashboard, CallCenterDashboard};
use super::domain::{Channel, DateRange, SourceFilter, Sourced};
use super::marketing::{marketing_dashboard, MarketingDashboard};
use super::overview::{executive_overview, ExecutiveOverview};
use super::sales::{sales_dashboard, SalesDashboard};
use super::store::{FeedSnapshot, SnapshotStore, SnapshotUpdate, StoreError};
use crate::feeds::{
    parse_call_center_json, parse_leads_csv, parse_sales_json, parse_spend_csv, FeedError,
};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Caller-selected reporting window and source filter, every field
/// optional. Missing pieces fall back to the dashboard defaults: the
/// all-time range starting 2023-01-01, the channels observed in the
/// snapshot plus the fixed vocabulary, and the local calendar date.
#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    pub range: Option<DateRange>,
    pub sources: Option<Vec<String>>,
    pub today: Option<NaiveDate>,
}

/// Raw feed payloads as the upload endpoint receives them: the spreadsheet
/// feeds as CSV text, the API feeds as JSON.
#[derive(Debug, Clone, Default)]
pub struct FeedIngest {
    pub spend_csv: Option<String>,
    pub leads_csv: Option<String>,
    pub call_center: Option<serde_json::Value>,
    pub sales: Option<serde_json::Value>,
}

/// Row counts per feed accepted by one ingest call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spend: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calls: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestrates the pure dashboard functions over the shared snapshot,
/// resolving query defaults so every computation still receives explicit
/// arguments.
pub struct DashboardService<S> {
    store: Arc<S>,
}

impl<S: SnapshotStore> DashboardService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Parses whichever feed payloads arrived and swaps them into the
    /// snapshot; feeds absent from the payload keep their last-known-good
    /// rows.
    pub fn ingest(&self, payload: FeedIngest) -> Result<IngestSummary, ServiceError> {
        let mut update = SnapshotUpdate::default();
        let mut summary = IngestSummary::default();

        if let Some(csv) = payload.spend_csv.as_deref() {
            let records = parse_spend_csv(csv)?;
            summary.spend = Some(records.len());
            update.spend = Some(records);
        }
        if let Some(csv) = payload.leads_csv.as_deref() {
            let records = parse_leads_csv(csv)?;
            summary.leads = Some(records.len());
            update.leads = Some(records);
        }
        if let Some(json) = payload.call_center.as_ref() {
            let records = parse_call_center_json(json)?;
            summary.calls = Some(records.len());
            update.calls = Some(records);
        }
        if let Some(json) = payload.sales.as_ref() {
            let records = parse_sales_json(json)?;
            summary.sales = Some(records.len());
            update.sales = Some(records);
        }

        if !update.is_empty() {
            self.store.replace(update)?;
        }

        info!(
            spend = ?summary.spend,
            leads = ?summary.leads,
            calls = ?summary.calls,
            sales = ?summary.sales,
            "feed snapshot updated"
        );
        Ok(summary)
    }

    pub fn marketing(&self, query: &DashboardQuery) -> Result<MarketingDashboard, ServiceError> {
        let snapshot = self.store.snapshot()?;
        Ok(self.marketing_from(&snapshot, query))
    }

    pub fn call_center(&self, query: &DashboardQuery) -> Result<CallCenterDashboard, ServiceError> {
        let snapshot = self.store.snapshot()?;
        Ok(self.call_center_from(&snapshot, query))
    }

    pub fn sales(&self, query: &DashboardQuery) -> Result<SalesDashboard, ServiceError> {
        let snapshot = self.store.snapshot()?;
        let (range, _, today) = self.resolve(&snapshot, query);
        Ok(sales_dashboard(&snapshot.sales, range, today))
    }

    pub fn overview(&self, query: &DashboardQuery) -> Result<ExecutiveOverview, ServiceError> {
        let snapshot = self.store.snapshot()?;
        let (range, _, today) = self.resolve(&snapshot, query);
        let marketing = self.marketing_from(&snapshot, query);
        let call_center = self.call_center_from(&snapshot, query);
        let sales = sales_dashboard(&snapshot.sales, range, today);
        Ok(executive_overview(&marketing, &call_center, &sales))
    }

    /// Channels observed in the snapshot merged with the fixed vocabulary,
    /// sorted, for the source multi-select.
    pub fn sources(&self) -> Result<Vec<String>, ServiceError> {
        let snapshot = self.store.snapshot()?;
        let filter = observed_sources(&snapshot);
        let mut labels: Vec<String> = filter
            .iter()
            .map(|channel| channel.label().to_string())
            .collect();
        labels.sort();
        Ok(labels)
    }

    fn marketing_from(&self, snapshot: &FeedSnapshot, query: &DashboardQuery) -> MarketingDashboard {
        let (range, sources, today) = self.resolve(snapshot, query);
        marketing_dashboard(
            &snapshot.spend,
            &snapshot.leads,
            Some(snapshot.calls.as_slice()),
            range,
            &sources,
            today,
        )
    }

    fn call_center_from(
        &self,
        snapshot: &FeedSnapshot,
        query: &DashboardQuery,
    ) -> CallCenterDashboard {
        let (range, sources, today) = self.resolve(snapshot, query);
        call_center_dashboard(&snapshot.calls, range, &sources, today)
    }

    fn resolve(
        &self,
        snapshot: &FeedSnapshot,
        query: &DashboardQuery,
    ) -> (DateRange, SourceFilter, NaiveDate) {
        let today = query.today.unwrap_or_else(|| Local::now().date_naive());
        let range = query.range.unwrap_or_else(|| default_range(today));
        let sources = match &query.sources {
            Some(labels) => SourceFilter::from_labels(labels),
            None => observed_sources(snapshot),
        };
        (range, sources, today)
    }
}

/// The "all time" preset: January 2023 through the end of the evaluation
/// year.
fn default_range(today: NaiveDate) -> DateRange {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(today);
    let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
    DateRange::new(start, end)
}

fn observed_sources(snapshot: &FeedSnapshot) -> SourceFilter {
    let mut filter = SourceFilter::default();
    for channel in Channel::fixed() {
        filter.insert(channel);
    }
    for record in &snapshot.spend {
        filter.insert(record.channel().clone());
    }
    for record in &snapshot.leads {
        filter.insert(record.channel().clone());
    }
    for record in &snapshot.calls {
        filter.insert(record.channel().clone());
    }
    for record in &snapshot.sales {
        filter.insert(record.channel().clone());
    }
    filter
}
