pub(crate) mod anime;
pub(crate) mod health;
pub(crate) mod metrics;
pub(crate) mod questionnaire;
pub(crate) mod recommendations;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health/ready", get(health::ready))
        .route("/health/live", get(health::live))
        .route("/metrics", get(metrics::exporter))
        .route("/v1/questionnaire", get(questionnaire::describe))
        .route("/v1/recommendations", post(recommendations::generate))
        .route("/v1/anime/search", get(anime::search))
        .route("/v1/anime/{id}", get(anime::detail))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
