use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::error;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl HealthReport {
    fn status(status: &'static str) -> Self {
        Self {
            status,
            detail: None,
        }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: "degraded",
            detail: Some(detail.into()),
        }
    }
}

/// カタログへ到達できる場合のみ ready を返す。
pub(crate) async fn ready(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, (StatusCode, Json<HealthReport>)> {
    state.telemetry().record_ready_probe();

    if let Err(error) = state.catalog().ping().await {
        error!(%error, "catalog readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport::degraded(format!("catalog: {error:#}"))),
        ));
    }

    Ok(Json(HealthReport::status("ready")))
}

pub(crate) async fn live(State(state): State<AppState>) -> Json<HealthReport> {
    state.telemetry().record_live_probe();
    Json(HealthReport::status("live"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;

    use crate::{
        api::test_support::{get_json, router_with},
        clients::{CatalogItem, CatalogSource},
        pipeline::test_support::StubCatalog,
        questionnaire::RatingCeiling,
        util::time::Season,
    };

    struct UnreachableCatalog;

    #[async_trait]
    impl CatalogSource for UnreachableCatalog {
        async fn by_genres(&self, _: &[String], _: RatingCeiling) -> Vec<CatalogItem> {
            Vec::new()
        }

        async fn top_by_popularity(&self) -> Vec<CatalogItem> {
            Vec::new()
        }

        async fn by_season(&self, _: i32, _: Season) -> Vec<CatalogItem> {
            Vec::new()
        }

        async fn by_id(&self, _: u32) -> Option<CatalogItem> {
            None
        }

        async fn search(&self, _: &str) -> Vec<CatalogItem> {
            Vec::new()
        }

        async fn ping(&self) -> anyhow::Result<()> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn live_reports_live() {
        let (status, body) =
            get_json(router_with(Arc::new(StubCatalog::default())), "/health/live").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"status": "live"}));
    }

    #[tokio::test]
    async fn ready_reports_ready_when_catalog_answers() {
        let (status, body) =
            get_json(router_with(Arc::new(StubCatalog::default())), "/health/ready").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn ready_degrades_when_catalog_is_unreachable() {
        let (status, body) = get_json(router_with(Arc::new(UnreachableCatalog)), "/health/ready").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
        assert!(
            body["detail"]
                .as_str()
                .is_some_and(|detail| detail.contains("connection refused"))
        );
    }
}
