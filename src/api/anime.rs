use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{app::AppState, clients::CatalogItem, detail::AnimeDetail};

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchResponse {
    results: Vec<CatalogItem>,
}

pub(crate) async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    let results = state.catalog().search(&params.q).await;
    Json(SearchResponse { results })
}

pub(crate) async fn detail(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<AnimeDetail>, StatusCode> {
    state
        .catalog()
        .by_id(id)
        .await
        .map(|item| Json(AnimeDetail::from_item(item)))
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::{
        api::test_support::{get_json, router_with},
        clients::CatalogItem,
        pipeline::test_support::{StubCatalog, item},
    };

    fn catalog() -> Arc<StubCatalog> {
        let bebop = CatalogItem {
            title: "Cowboy Bebop".into(),
            score: Some(8.76),
            episodes: Some(26),
            genres: vec!["Action".into(), "Sci-Fi".into()],
            ..item(1)
        };
        Arc::new(StubCatalog::default().with_genre(vec![bebop, item(2)]))
    }

    #[tokio::test]
    async fn search_returns_matching_titles() {
        let (status, body) = get_json(router_with(catalog()), "/v1/anime/search?q=bebop").await;

        assert_eq!(status, StatusCode::OK);
        let results = body["results"].as_array().expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Cowboy Bebop");
    }

    #[tokio::test]
    async fn detail_includes_display_labels() {
        let (status, body) = get_json(router_with(catalog()), "/v1/anime/1").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["score_label"], "8.76");
        assert_eq!(body["episode_label"], "26 episodes");
        assert_eq!(
            body["streaming_platforms"],
            serde_json::json!(["Crunchyroll", "Funimation", "Netflix"])
        );
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (status, _) = get_json(router_with(catalog()), "/v1/anime/999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
