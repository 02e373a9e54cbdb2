//! Dashboard aggregation for the four reporting surfaces: marketing,
//! call center, sales pipeline, and the executive overview.
//!
//! Each surface is a pure function over canonical records plus an explicit
//! reporting window, source filter, and evaluation date. Nothing in this
//! module reads the clock or any other ambient state, so a given input
//! always reduces to the same summary.

pub(crate) mod call_center;
pub mod domain;
pub(crate) mod filters;
pub(crate) mod marketing;
pub(crate) mod normalize;
pub(crate) mod overview;
pub mod router;
pub(crate) mod sales;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use call_center::{call_center_dashboard, CallCenterDashboard, MonthlyHotCount, RepCallStats};
pub use domain::{
    CallRecord, Channel, DateRange, Dated, LeadRecord, PipelineStage, SalesRecord, Sourced,
    SourceFilter, SpendRecord,
};
pub use marketing::{
    marketing_dashboard, CombinedLead, LeadTargets, LeaderboardEntry, MarketingDashboard,
    SpendTrend, TargetProgress,
};
pub use normalize::{month_key, month_label, parse_amount, parse_date_lenient};
pub use overview::{executive_overview, ExecutiveOverview, GrowthPoint, RepHighlight};
pub use router::dashboard_router;
pub use sales::{
    sales_dashboard, PipelineTrend, RepPipelineStats, SalesDashboard, StageSlaStats, VisaGrant,
};
pub use service::{DashboardQuery, DashboardService, FeedIngest, IngestSummary, ServiceError};
pub use store::{FeedSnapshot, SnapshotStore, SnapshotUpdate, StoreError};
