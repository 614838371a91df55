//! 候補作品の収集。
//!
//! ジャンル・人気順・今期の3ソースを並行に取得し、すべての完了を待つ。
//! 失敗またはタイムアウトしたソースは空として扱う。

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use futures::future::join3;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    clients::{CatalogItem, CatalogSource},
    observability::metrics::Metrics,
    questionnaire::{CompletedAnswers, Experience},
    util::time::season_of,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CandidateSource {
    Genre,
    Popularity,
    Season,
}

impl CandidateSource {
    const fn as_str(self) -> &'static str {
        match self {
            CandidateSource::Genre => "genre",
            CandidateSource::Popularity => "popularity",
            CandidateSource::Season => "season",
        }
    }
}

#[derive(Clone)]
pub(crate) struct CandidateGatherer {
    catalog: Arc<dyn CatalogSource>,
    source_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl CandidateGatherer {
    pub(crate) fn new(
        catalog: Arc<dyn CatalogSource>,
        source_timeout: Duration,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            catalog,
            source_timeout,
            metrics,
        }
    }

    /// 3ソースを連結して返す（ジャンル、人気順、今期の順）。
    pub(crate) async fn gather(
        &self,
        run_id: Uuid,
        answers: &CompletedAnswers,
        now: DateTime<Utc>,
    ) -> Vec<CatalogItem> {
        let (year, season) = season_of(now);

        let by_genre = async {
            if answers.genres.is_empty() {
                return Vec::new();
            }
            self.bounded(
                run_id,
                CandidateSource::Genre,
                self.catalog.by_genres(&answers.genres, answers.rating),
            )
            .await
        };

        let by_popularity = async {
            if !matches!(
                answers.experience,
                Experience::Beginner | Experience::Casual
            ) {
                return Vec::new();
            }
            self.bounded(
                run_id,
                CandidateSource::Popularity,
                self.catalog.top_by_popularity(),
            )
            .await
        };

        let by_season = self.bounded(
            run_id,
            CandidateSource::Season,
            self.catalog.by_season(year, season),
        );

        let (genre, popularity, seasonal) = join3(by_genre, by_popularity, by_season).await;

        debug!(
            run_id = %run_id,
            genre = genre.len(),
            popularity = popularity.len(),
            season = seasonal.len(),
            "gathered candidates"
        );

        let mut candidates = genre;
        candidates.extend(popularity);
        candidates.extend(seasonal);

        if let Some(metrics) = &self.metrics {
            metrics
                .candidates_gathered
                .inc_by(f64::from(u32::try_from(candidates.len()).unwrap_or(u32::MAX)));
        }

        candidates
    }

    async fn bounded<F>(&self, run_id: Uuid, source: CandidateSource, fetch: F) -> Vec<CatalogItem>
    where
        F: Future<Output = Vec<CatalogItem>>,
    {
        if let Ok(items) = tokio::time::timeout(self.source_timeout, fetch).await {
            items
        } else {
            warn!(
                run_id = %run_id,
                source = source.as_str(),
                timeout_ms = u64::try_from(self.source_timeout.as_millis()).unwrap_or(u64::MAX),
                "candidate source timed out"
            );
            if let Some(metrics) = &self.metrics {
                metrics.source_timeouts.inc();
            }
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{
        pipeline::test_support::{StubCatalog, answers, item},
        questionnaire::{Mood, RatingCeiling, TimeCommitment},
    };

    fn october() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 5, 12, 0, 0)
            .single()
            .expect("valid date")
    }

    #[tokio::test]
    async fn concatenates_sources_in_fixed_order() {
        let catalog = Arc::new(
            StubCatalog::default()
                .with_genre(vec![item(1)])
                .with_top(vec![item(2)])
                .with_season(vec![item(3)]),
        );
        let gatherer = CandidateGatherer::new(catalog.clone(), Duration::from_secs(1), None);
        let profile = answers(
            Experience::Casual,
            &["action"],
            Mood::Excited,
            RatingCeiling::Pg13,
            TimeCommitment::Any,
        );

        let candidates = gatherer.gather(Uuid::new_v4(), &profile, october()).await;

        let ids: Vec<u32> = candidates.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(catalog.seasons_requested(), vec![(2024, crate::util::time::Season::Fall)]);
    }

    #[tokio::test]
    async fn skips_popularity_for_experienced_viewers() {
        let catalog = Arc::new(
            StubCatalog::default()
                .with_genre(vec![item(1)])
                .with_top(vec![item(2)])
                .with_season(vec![item(3)]),
        );
        let gatherer = CandidateGatherer::new(catalog.clone(), Duration::from_secs(1), None);
        let profile = answers(
            Experience::Expert,
            &["action"],
            Mood::Excited,
            RatingCeiling::Pg13,
            TimeCommitment::Any,
        );

        let candidates = gatherer.gather(Uuid::new_v4(), &profile, october()).await;

        let ids: Vec<u32> = candidates.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(catalog.top_calls(), 0);
    }

    #[tokio::test]
    async fn slow_source_resolves_to_empty() {
        let catalog = Arc::new(
            StubCatalog::default()
                .with_genre(vec![item(1)])
                .with_season(vec![item(3)])
                .with_season_delay(Duration::from_millis(500)),
        );
        let registry = prometheus::Registry::new();
        let metrics = Arc::new(Metrics::new(&registry).expect("metrics"));
        let gatherer = CandidateGatherer::new(
            catalog,
            Duration::from_millis(50),
            Some(Arc::clone(&metrics)),
        );
        let profile = answers(
            Experience::Expert,
            &["action"],
            Mood::Excited,
            RatingCeiling::Pg13,
            TimeCommitment::Any,
        );

        let candidates = gatherer.gather(Uuid::new_v4(), &profile, october()).await;

        let ids: Vec<u32> = candidates.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1]);
        assert!((metrics.source_timeouts.get() - 1.0).abs() < f64::EPSILON);
    }
}
