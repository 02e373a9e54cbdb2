use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use edu_metrics::dashboards::{dashboard_router, DashboardService, SnapshotStore};
use serde_json::json;
use std::sync::Arc;

/// Dashboard API plus the operational endpoints every deployment expects.
pub(crate) fn with_dashboard_routes<S>(service: Arc<DashboardService<S>>) -> axum::Router
where
    S: SnapshotStore + 'static,
{
    dashboard_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use edu_metrics::dashboards::{FeedSnapshot, SnapshotStore, SnapshotUpdate, StoreError};
    use std::sync::atomic::AtomicBool;
    use std::sync::{Arc, RwLock};
    use tower::ServiceExt;

    #[derive(Default)]
    struct MemoryStore {
        snapshot: RwLock<FeedSnapshot>,
    }

    impl SnapshotStore for MemoryStore {
        fn snapshot(&self) -> Result<FeedSnapshot, StoreError> {
            Ok(self.snapshot.read().expect("lock poisoned").clone())
        }

        fn replace(&self, update: SnapshotUpdate) -> Result<(), StoreError> {
            self.snapshot.write().expect("lock poisoned").apply(update);
            Ok(())
        }
    }

    fn app(ready: bool) -> axum::Router {
        let service = Arc::new(DashboardService::new(Arc::new(MemoryStore::default())));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(
                metrics_exporter_prometheus::PrometheusBuilder::new()
                    .build_recorder()
                    .handle(),
            ),
        };
        with_dashboard_routes(service).layer(Extension(state))
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let response = app(false)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
