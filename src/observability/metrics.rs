/// Prometheusメトリクス定義。
use prometheus::{
    Counter, Histogram, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // パイプライン
    pub pipeline_runs: Counter,
    pub pipeline_fallbacks: Counter,
    pub pipeline_failures: Counter,
    pub candidates_gathered: Counter,
    pub source_timeouts: Counter,

    // カタログ
    pub catalog_requests: Counter,
    pub catalog_failures: Counter,
    pub catalog_retries: Counter,

    // ヒストグラム
    pub pipeline_duration: Histogram,
    pub catalog_request_duration: Histogram,
}

impl Metrics {
    /// 指定レジストリにメトリクスを登録する。
    ///
    /// # Errors
    /// 同名のメトリクスが既に登録されている場合はエラーを返す。
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            pipeline_runs: register_counter_with_registry!(
                "recommender_pipeline_runs_total",
                "Total number of recommendation pipeline runs",
                registry
            )?,
            pipeline_fallbacks: register_counter_with_registry!(
                "recommender_pipeline_fallbacks_total",
                "Runs that returned the fixed fallback list",
                registry
            )?,
            pipeline_failures: register_counter_with_registry!(
                "recommender_pipeline_failures_total",
                "Runs that failed internally and were converted to the fallback list",
                registry
            )?,
            candidates_gathered: register_counter_with_registry!(
                "recommender_candidates_gathered_total",
                "Candidate items gathered from the catalog before deduplication",
                registry
            )?,
            source_timeouts: register_counter_with_registry!(
                "recommender_source_timeouts_total",
                "Candidate sources that exceeded their timeout",
                registry
            )?,
            catalog_requests: register_counter_with_registry!(
                "recommender_catalog_requests_total",
                "Total number of catalog queries issued",
                registry
            )?,
            catalog_failures: register_counter_with_registry!(
                "recommender_catalog_failures_total",
                "Catalog queries that resolved to an empty result after failing",
                registry
            )?,
            catalog_retries: register_counter_with_registry!(
                "recommender_catalog_retries_total",
                "Catalog request retries",
                registry
            )?,
            pipeline_duration: register_histogram_with_registry!(
                "recommender_pipeline_duration_seconds",
                "Duration of recommendation pipeline runs",
                registry
            )?,
            catalog_request_duration: register_histogram_with_registry!(
                "recommender_catalog_request_duration_seconds",
                "Duration of catalog queries including retries",
                registry
            )?,
        })
    }
}
