//! 作品詳細の表示用ヘルパー。

use serde::Serialize;

use crate::clients::CatalogItem;

/// 詳細表示用に整形済みの作品。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimeDetail {
    #[serde(flatten)]
    pub item: CatalogItem,
    pub score_label: String,
    pub episode_label: String,
    pub streaming_platforms: Vec<&'static str>,
}

impl AnimeDetail {
    #[must_use]
    pub fn from_item(item: CatalogItem) -> Self {
        Self {
            score_label: score_label(item.score),
            episode_label: episode_label(item.episodes),
            streaming_platforms: streaming_platforms(&item),
            item,
        }
    }
}

/// "8.76" または "N/A"。
#[must_use]
pub fn score_label(score: Option<f64>) -> String {
    score.map_or_else(|| "N/A".to_string(), |score| format!("{score:.2}"))
}

#[must_use]
pub fn episode_label(episodes: Option<u32>) -> String {
    match episodes {
        None => "Unknown".to_string(),
        Some(1) => "1 episode".to_string(),
        Some(count) => format!("{count} episodes"),
    }
}

/// 配信先の目安。評価とジャンルから推定するだけで、実際の配信状況は確認しない。
#[must_use]
pub fn streaming_platforms(item: &CatalogItem) -> Vec<&'static str> {
    let mut platforms = Vec::new();
    let score = item.score.unwrap_or_default();

    if score > 8.0 {
        platforms.push("Crunchyroll");
    }
    if score > 7.5 {
        platforms.push("Funimation");
    }
    if item.has_genre("Action") {
        platforms.push("Netflix");
    }

    platforms
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::pipeline::test_support::item;

    #[rstest]
    #[case(Some(8.76), "8.76")]
    #[case(Some(7.0), "7.00")]
    #[case(None, "N/A")]
    fn formats_score(#[case] score: Option<f64>, #[case] expected: &str) {
        assert_eq!(score_label(score), expected);
    }

    #[rstest]
    #[case(Some(26), "26 episodes")]
    #[case(Some(1), "1 episode")]
    #[case(None, "Unknown")]
    fn formats_episodes(#[case] episodes: Option<u32>, #[case] expected: &str) {
        assert_eq!(episode_label(episodes), expected);
    }

    #[test]
    fn suggests_platforms_from_score_and_genre() {
        let acclaimed_action = CatalogItem {
            score: Some(8.76),
            genres: vec!["Action".into(), "Sci-Fi".into()],
            ..item(1)
        };
        assert_eq!(
            streaming_platforms(&acclaimed_action),
            vec!["Crunchyroll", "Funimation", "Netflix"]
        );

        let solid = CatalogItem {
            score: Some(7.8),
            genres: vec!["Drama".into()],
            ..item(2)
        };
        assert_eq!(streaming_platforms(&solid), vec!["Funimation"]);

        let unrated = CatalogItem {
            score: None,
            genres: vec![],
            ..item(3)
        };
        assert!(streaming_platforms(&unrated).is_empty());
    }

    #[test]
    fn detail_serializes_item_fields_flat() {
        let detail = AnimeDetail::from_item(CatalogItem {
            score: Some(8.5),
            episodes: Some(24),
            ..item(5)
        });

        let value = serde_json::to_value(&detail).expect("serialize");
        assert_eq!(value["id"], 5);
        assert_eq!(value["score_label"], "8.50");
        assert_eq!(value["episode_label"], "24 episodes");
        assert_eq!(value["streaming_platforms"][0], "Crunchyroll");
    }
}
