use super::domain::DateRange;
use super::service::{DashboardQuery, DashboardService, FeedIngest, ServiceError};
use super::store::SnapshotStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;

/// Router exposing the feed upload and the four dashboard computations.
pub fn dashboard_router<S>(service: Arc<DashboardService<S>>) -> Router
where
    S: SnapshotStore + 'static,
{
    Router::new()
        .route("/api/v1/feeds", post(ingest_handler::<S>))
        .route(
            "/api/v1/dashboards/marketing",
            post(marketing_handler::<S>),
        )
        .route(
            "/api/v1/dashboards/call-center",
            post(call_center_handler::<S>),
        )
        .route("/api/v1/dashboards/sales", post(sales_handler::<S>))
        .route("/api/v1/dashboards/overview", post(overview_handler::<S>))
        .route("/api/v1/sources", get(sources_handler::<S>))
        .with_state(service)
}

/// Body of a dashboard request. Every field is optional; `start` and `end`
/// must both be present to override the default window.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardRequest {
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub(crate) start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub(crate) end: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) sources: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

impl DashboardRequest {
    pub(crate) fn into_query(self) -> DashboardQuery {
        let range = match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };
        DashboardQuery {
            range,
            sources: self.sources,
            today: self.today,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FeedIngestRequest {
    #[serde(default)]
    pub(crate) spend_csv: Option<String>,
    #[serde(default)]
    pub(crate) leads_csv: Option<String>,
    #[serde(default)]
    pub(crate) call_center: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) sales: Option<serde_json::Value>,
}

impl FeedIngestRequest {
    fn into_ingest(self) -> FeedIngest {
        FeedIngest {
            spend_csv: self.spend_csv,
            leads_csv: self.leads_csv,
            call_center: self.call_center,
            sales: self.sales,
        }
    }
}

fn lenient_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(value) => crate::dashboards::normalize::parse_date_lenient(&value)
            .map(Some)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("'{value}' is not a recognized date"))
            }),
        None => Ok(None),
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Feed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn ingest_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Json(payload): Json<FeedIngestRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.ingest(payload.into_ingest()) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn marketing_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Json(payload): Json<DashboardRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.marketing(&payload.into_query()) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn call_center_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Json(payload): Json<DashboardRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.call_center(&payload.into_query()) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sales_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Json(payload): Json<DashboardRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.sales(&payload.into_query()) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn overview_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
    Json(payload): Json<DashboardRequest>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.overview(&payload.into_query()) {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn sources_handler<S>(
    State(service): State<Arc<DashboardService<S>>>,
) -> Response
where
    S: SnapshotStore + 'static,
{
    match service.sources() {
        Ok(sources) => (StatusCode::OK, Json(json!({ "sources": sources }))).into_response(),
        Err(error) => error_response(error),
    }
}
