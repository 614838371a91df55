use std::{sync::Arc, time::Duration, time::Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::models::{ListResponse, SingleResponse};
use crate::{
    clients::catalog::{CatalogItem, CatalogSource},
    observability::metrics::Metrics,
    questionnaire::RatingCeiling,
    util::{
        retry::{RetryConfig, retry_async},
        time::Season,
    },
};

/// Jikan の1ページあたり最大件数。
pub const MAX_PAGE_LIMIT: u32 = 25;

/// Jikanクライアントの設定。
#[derive(Debug, Clone)]
pub struct JikanConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
    pub page_limit: u32,
    pub search_limit: u32,
    pub retry: RetryConfig,
}

impl JikanConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.jikan.moe/v4/";

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(3),
            total_timeout: Duration::from_secs(10),
            page_limit: MAX_PAGE_LIMIT,
            search_limit: 10,
            retry: RetryConfig::default(),
        }
    }
}

/// 質問票のジャンルIDをカタログ側のジャンルIDに対応付ける。
///
/// 空白・アンダースコアはハイフンとして扱う（`slice of life` → `slice-of-life`）。
#[must_use]
pub fn genre_id(tag: &str) -> Option<u32> {
    let folded = tag.trim().to_ascii_lowercase().replace([' ', '_'], "-");
    let id = match folded.as_str() {
        "action" => 1,
        "adventure" => 2,
        "comedy" => 4,
        "mystery" => 7,
        "drama" => 8,
        "fantasy" => 10,
        "horror" => 14,
        "romance" => 22,
        "sci-fi" => 24,
        "sports" => 30,
        "slice-of-life" => 36,
        "psychological" => 40,
        _ => return None,
    };
    Some(id)
}

/// Jikan v4 (MyAnimeList) への読み取り専用クライアント。
///
/// タイムアウトと再試行をサポートし、[`CatalogSource`] としては失敗を空の結果に変換する。
#[derive(Debug, Clone)]
pub struct JikanClient {
    client: Client,
    base_url: Url,
    page_limit: u32,
    search_limit: u32,
    retry: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl JikanClient {
    /// 新しいJikanクライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返します。
    pub fn new(config: JikanConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .context("failed to build catalog HTTP client")?;

        // Url::join は末尾スラッシュが無いと最後のセグメントを置き換えてしまう
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).context("invalid catalog base URL")?;

        Ok(Self {
            client,
            base_url,
            page_limit: config.page_limit.clamp(1, MAX_PAGE_LIMIT),
            search_limit: config.search_limit.clamp(1, MAX_PAGE_LIMIT),
            retry: config.retry,
            metrics: None,
        })
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build catalog URL for {path}"))
    }

    /// 再試行付きでGETし、JSONをデコードする。404は `None` を返す。
    async fn get_json<T: DeserializeOwned>(&self, operation: &str, url: Url) -> Result<Option<T>> {
        let started = Instant::now();
        if let Some(metrics) = &self.metrics {
            metrics.catalog_requests.inc();
        }

        let result = retry_async(
            self.retry,
            operation,
            || {
                if let Some(metrics) = &self.metrics {
                    metrics.catalog_retries.inc();
                }
            },
            || {
                let url = url.clone();
                async move {
                    let response = self
                        .client
                        .get(url)
                        .send()
                        .await
                        .context("catalog request failed")?;

                    if response.status() == StatusCode::NOT_FOUND {
                        return Ok::<_, anyhow::Error>(None);
                    }

                    let body = response
                        .error_for_status()
                        .context("catalog returned error status")?
                        .json::<T>()
                        .await
                        .context("failed to deserialize catalog response")?;
                    Ok::<_, anyhow::Error>(Some(body))
                }
            },
        )
        .await;

        if let Some(metrics) = &self.metrics {
            metrics
                .catalog_request_duration
                .observe(started.elapsed().as_secs_f64());
        }
        result
    }

    async fn fetch_list(&self, operation: &str, url: Url) -> Result<Vec<CatalogItem>> {
        debug!(operation, url = %url, "querying catalog");
        let items: Vec<CatalogItem> = self
            .get_json::<ListResponse>(operation, url)
            .await?
            .map(|response| response.data)
            .unwrap_or_default()
            .into_iter()
            .map(super::models::JikanAnime::normalize)
            .collect();
        debug!(operation, count = items.len(), "catalog query returned");
        Ok(items)
    }

    /// ジャンル指定でスコア順に取得する。
    ///
    /// # Errors
    /// リクエストまたはデコードに失敗した場合はエラーを返す。
    pub async fn try_by_genres(
        &self,
        genres: &[String],
        ceiling: RatingCeiling,
    ) -> Result<Vec<CatalogItem>> {
        let ids: Vec<String> = genres
            .iter()
            .filter_map(|tag| genre_id(tag))
            .map(|id| id.to_string())
            .collect();
        if ids.is_empty() {
            debug!(?genres, "no catalog genre ids for selection, skipping query");
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("anime")?;
        url.query_pairs_mut()
            .append_pair("genres", &ids.join(","))
            .append_pair("order_by", "score")
            .append_pair("sort", "desc")
            .append_pair("limit", &self.page_limit.to_string())
            .append_pair(
                "sfw",
                if ceiling <= RatingCeiling::Pg {
                    "true"
                } else {
                    "false"
                },
            );
        self.fetch_list("by_genres", url).await
    }

    /// 人気順の上位作品を取得する。
    ///
    /// # Errors
    /// リクエストまたはデコードに失敗した場合はエラーを返す。
    pub async fn try_top_by_popularity(&self) -> Result<Vec<CatalogItem>> {
        let mut url = self.endpoint("top/anime")?;
        url.query_pairs_mut()
            .append_pair("filter", "bypopularity")
            .append_pair("limit", &self.page_limit.to_string());
        self.fetch_list("top_by_popularity", url).await
    }

    /// 指定クールの放送作品を取得する。
    ///
    /// # Errors
    /// リクエストまたはデコードに失敗した場合はエラーを返す。
    pub async fn try_by_season(&self, year: i32, season: Season) -> Result<Vec<CatalogItem>> {
        let mut url = self.endpoint(&format!("seasons/{year}/{season}"))?;
        url.query_pairs_mut()
            .append_pair("limit", &self.page_limit.to_string());
        self.fetch_list("by_season", url).await
    }

    /// 作品詳細を取得する。存在しない場合は `None`。
    ///
    /// # Errors
    /// リクエストまたはデコードに失敗した場合はエラーを返す。
    pub async fn try_by_id(&self, id: u32) -> Result<Option<CatalogItem>> {
        let url = self.endpoint(&format!("anime/{id}/full"))?;
        let response = self.get_json::<SingleResponse>("by_id", url).await?;
        Ok(response
            .and_then(|response| response.data)
            .map(super::models::JikanAnime::normalize))
    }

    /// タイトルで検索する。空の検索語ではリクエストしない。
    ///
    /// # Errors
    /// リクエストまたはデコードに失敗した場合はエラーを返す。
    pub async fn try_search(&self, text: &str) -> Result<Vec<CatalogItem>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = self.endpoint("anime")?;
        url.query_pairs_mut()
            .append_pair("q", text)
            .append_pair("limit", &self.search_limit.to_string());
        self.fetch_list("search", url).await
    }

    /// 失敗を記録して既定値に置き換える。
    fn recover<T: Default>(&self, operation: &str, result: Result<T>) -> T {
        result.unwrap_or_else(|error| {
            warn!(operation, error = ?error, "catalog query failed, resolving to empty result");
            if let Some(metrics) = &self.metrics {
                metrics.catalog_failures.inc();
            }
            T::default()
        })
    }
}

#[async_trait]
impl CatalogSource for JikanClient {
    async fn by_genres(&self, genres: &[String], ceiling: RatingCeiling) -> Vec<CatalogItem> {
        let result = self.try_by_genres(genres, ceiling).await;
        self.recover("by_genres", result)
    }

    async fn top_by_popularity(&self) -> Vec<CatalogItem> {
        let result = self.try_top_by_popularity().await;
        self.recover("top_by_popularity", result)
    }

    async fn by_season(&self, year: i32, season: Season) -> Vec<CatalogItem> {
        let result = self.try_by_season(year, season).await;
        self.recover("by_season", result)
    }

    async fn by_id(&self, id: u32) -> Option<CatalogItem> {
        let result = self.try_by_id(id).await;
        self.recover("by_id", result)
    }

    async fn search(&self, text: &str) -> Vec<CatalogItem> {
        let result = self.try_search(text).await;
        self.recover("search", result)
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .get(self.base_url.clone())
            .send()
            .await
            .context("catalog health request failed")?
            .error_for_status()
            .context("catalog health endpoint returned error status")?;
        Ok(())
    }
}
