use crate::{
    clients::{CatalogItem, MediaType},
    pipeline::ScoredItem,
};

struct FallbackTitle {
    id: u32,
    title: &'static str,
    score: f64,
    popularity: u32,
    year: i32,
    genres: &'static [&'static str],
    synopsis: &'static str,
    explanation: &'static str,
}

/// 全年齢向けの長編映画。どのレーティング上限・視聴時間にも適合する。
const FALLBACK_TITLES: [FallbackTitle; 6] = [
    FallbackTitle {
        id: 523,
        title: "Tonari no Totoro",
        score: 8.24,
        popularity: 160,
        year: 1988,
        genres: &["Adventure", "Fantasy", "Supernatural"],
        synopsis: "Two sisters move to the countryside and befriend the forest spirits living beside their new home.",
        explanation: "A timeless classic perfect for any mood",
    },
    FallbackTitle {
        id: 512,
        title: "Majo no Takkyuubin",
        score: 8.22,
        popularity: 250,
        year: 1989,
        genres: &["Adventure", "Drama", "Fantasy"],
        synopsis: "A young witch sets out on her own and starts a flying delivery service in a seaside town.",
        explanation: "A warm coming-of-age story loved by every generation",
    },
    FallbackTitle {
        id: 404,
        title: "Mimi wo Sumaseba",
        score: 8.14,
        popularity: 640,
        year: 1995,
        genres: &["Drama", "Romance"],
        synopsis: "A bookish student notices the same name on every library card she borrows and follows it to its owner.",
        explanation: "A gentle story about chasing your dreams",
    },
    FallbackTitle {
        id: 7711,
        title: "Karigurashi no Arrietty",
        score: 7.94,
        popularity: 560,
        year: 2010,
        genres: &["Adventure", "Fantasy"],
        synopsis: "A family of tiny people living under the floorboards is discovered by the boy upstairs.",
        explanation: "A beautifully crafted small-scale adventure",
    },
    FallbackTitle {
        id: 1829,
        title: "Gake no Ue no Ponyo",
        score: 7.92,
        popularity: 620,
        year: 2008,
        genres: &["Adventure", "Comedy", "Fantasy"],
        synopsis: "A goldfish princess longs to become human after being rescued by a boy living on a seaside cliff.",
        explanation: "A colorful fairy tale for relaxed viewing",
    },
    FallbackTitle {
        id: 597,
        title: "Neko no Ongaeshi",
        score: 7.73,
        popularity: 900,
        year: 2002,
        genres: &["Adventure", "Comedy", "Fantasy"],
        synopsis: "After saving a cat from traffic, a schoolgirl is whisked away to the Kingdom of Cats.",
        explanation: "A light and whimsical short feature",
    },
];

/// 候補が一件も残らなかった場合に返す固定リスト。
///
/// 順序は固定で、すべて `recommendation_score = 0.0`。
#[must_use]
pub fn fallback_recommendations() -> Vec<ScoredItem> {
    FALLBACK_TITLES
        .iter()
        .map(|title| ScoredItem {
            item: CatalogItem {
                id: title.id,
                title: title.title.to_string(),
                english_title: None,
                episodes: Some(1),
                score: Some(title.score),
                genres: title.genres.iter().map(|genre| (*genre).to_string()).collect(),
                rating: Some("G - All Ages".to_string()),
                popularity: title.popularity,
                image_url: None,
                synopsis: Some(title.synopsis.to_string()),
                media_type: Some(MediaType::Movie),
                year: Some(title.year),
                season: None,
                status: Some("Finished Airing".to_string()),
            },
            recommendation_score: 0.0,
            explanation: title.explanation.to_string(),
        })
        .collect()
}
