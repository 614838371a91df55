use std::{sync::Arc, time::Duration, time::Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    clients::{CatalogItem, CatalogSource},
    observability::metrics::Metrics,
    questionnaire::{AnswerSet, CompletedAnswers},
};

pub(crate) mod dedup;
pub mod explain;
pub mod fallback;
pub mod filter;
pub(crate) mod gather;
pub mod scoring;

use dedup::dedup_by_id;
use explain::{DefaultRationaleGenerator, RationaleGenerator};
use fallback::fallback_recommendations;
use gather::CandidateGatherer;

/// 1回の推薦で返す最大件数。
pub const MAX_RECOMMENDATIONS: usize = 6;
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(20);

/// 推薦スコアと理由付きの作品。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub recommendation_score: f64,
    pub explanation: String,
}

/// 回答から推薦リストを生成するパイプライン。
///
/// 収集 → 重複除去 → 絞り込み → スコア付け → 並べ替え → 切り詰め → 理由付け。
/// 呼び出し側にエラーを返すことはなく、候補が残らなければ固定リストを返す。
#[derive(Clone)]
pub struct RecommendationPipeline {
    gatherer: CandidateGatherer,
    rationale: Arc<dyn RationaleGenerator>,
    metrics: Option<Arc<Metrics>>,
}

pub struct PipelineBuilder {
    catalog: Arc<dyn CatalogSource>,
    source_timeout: Duration,
    rationale: Option<Arc<dyn RationaleGenerator>>,
    metrics: Option<Arc<Metrics>>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rationale(mut self, rationale: Arc<dyn RationaleGenerator>) -> Self {
        self.rationale = Some(rationale);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[must_use]
    pub fn build(self) -> RecommendationPipeline {
        RecommendationPipeline {
            gatherer: CandidateGatherer::new(
                self.catalog,
                self.source_timeout,
                self.metrics.clone(),
            ),
            rationale: self
                .rationale
                .unwrap_or_else(|| Arc::new(DefaultRationaleGenerator)),
            metrics: self.metrics,
        }
    }
}

impl RecommendationPipeline {
    #[must_use]
    pub fn builder(catalog: Arc<dyn CatalogSource>) -> PipelineBuilder {
        PipelineBuilder {
            catalog,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            rationale: None,
            metrics: None,
        }
    }

    /// 現在時刻のクールを使って推薦を生成する。
    pub async fn generate(&self, answers: &AnswerSet) -> Vec<ScoredItem> {
        self.generate_at(answers, Utc::now()).await
    }

    /// `now` のクールを使って推薦を生成する。結果は常に1〜6件。
    pub async fn generate_at(&self, answers: &AnswerSet, now: DateTime<Utc>) -> Vec<ScoredItem> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        if let Some(metrics) = &self.metrics {
            metrics.pipeline_runs.inc();
        }

        let result = match self.try_generate(run_id, answers, now).await {
            Ok(items) if !items.is_empty() => {
                info!(
                    run_id = %run_id,
                    count = items.len(),
                    "recommendations generated"
                );
                items
            }
            Ok(_) => {
                info!(run_id = %run_id, "no candidates survived filtering; using fallback list");
                self.record_fallback();
                fallback_recommendations()
            }
            Err(error) => {
                warn!(run_id = %run_id, error = ?error, "recommendation pipeline failed; using fallback list");
                if let Some(metrics) = &self.metrics {
                    metrics.pipeline_failures.inc();
                }
                self.record_fallback();
                fallback_recommendations()
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics
                .pipeline_duration
                .observe(started.elapsed().as_secs_f64());
        }

        result
    }

    async fn try_generate(
        &self,
        run_id: Uuid,
        answers: &AnswerSet,
        now: DateTime<Utc>,
    ) -> Result<Vec<ScoredItem>> {
        let completed = answers.completed()?;
        let candidates = self.gatherer.gather(run_id, &completed, now).await;
        Ok(rank(
            run_id,
            candidates,
            &completed,
            self.rationale.as_ref(),
        ))
    }

    fn record_fallback(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.pipeline_fallbacks.inc();
        }
    }
}

/// 収集済み候補から上位の推薦を作る（収集以降の全段）。
///
/// 決定的であり、同じ入力には同じ順序の出力を返す。
pub(crate) fn rank(
    run_id: Uuid,
    candidates: Vec<CatalogItem>,
    answers: &CompletedAnswers,
    rationale: &dyn RationaleGenerator,
) -> Vec<ScoredItem> {
    let gathered = candidates.len();
    let unique = dedup_by_id(candidates);
    let deduplicated = unique.len();

    let retained: Vec<CatalogItem> = unique
        .into_iter()
        .filter(|item| filter::fits_time_commitment(item, answers.time_commitment))
        .filter(|item| filter::within_rating(item, answers.rating))
        .filter(filter::is_displayable)
        .collect();

    debug!(
        run_id = %run_id,
        gathered,
        deduplicated,
        retained = retained.len(),
        "candidate counts per stage"
    );

    let mut scored: Vec<(f64, CatalogItem)> = retained
        .into_iter()
        .map(|item| (scoring::score(&item, answers), item))
        .collect();
    // sort_by は安定ソート。同点はカタログ順を保つ
    scored.sort_by(|(left, _), (right, _)| right.total_cmp(left));
    scored.truncate(MAX_RECOMMENDATIONS);

    scored
        .into_iter()
        .map(|(recommendation_score, item)| {
            let explanation = rationale.generate(&item, answers);
            ScoredItem {
                item,
                recommendation_score,
                explanation,
            }
        })
        .collect()
}
