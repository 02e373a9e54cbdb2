//! Aggregation engine behind the study-abroad consultancy growth dashboards.
//!
//! Raw feed exports (marketing spend, lead lists, call center logs, sales
//! pipeline records) are normalized once at ingestion, cached as a
//! [`dashboards::FeedSnapshot`], and reduced into per-dashboard summaries by
//! pure functions that take the reporting window, the source filter, and the
//! evaluation date as explicit arguments.

pub mod config;
pub mod dashboards;
pub mod error;
pub mod feeds;
pub mod telemetry;

pub use error::AppError;
