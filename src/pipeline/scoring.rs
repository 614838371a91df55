//! 推薦スコアの算出。
//!
//! スコアは正規化されず上限もない。相対順位のみが意味を持つ。

use crate::{
    clients::CatalogItem,
    questionnaire::{CompletedAnswers, Experience, Mood},
};

/// 未評価作品の基礎点。
pub const BASE_SCORE_WHEN_UNRATED: f64 = 5.0;
/// 一致したジャンル1件あたりの加点。
pub const GENRE_MATCH_BONUS: f64 = 1.5;
pub const MOOD_MATCH_BONUS: f64 = 1.0;

/// 経験段階と人気順位の組み合わせによる加点。条件を満たさなければ `None`。
#[must_use]
pub fn popularity_bonus(experience: Experience, popularity: u32) -> Option<f64> {
    match experience {
        Experience::Beginner if popularity < 500 => Some(2.0),
        Experience::Casual if popularity < 1000 => Some(1.5),
        Experience::Experienced if popularity > 500 => Some(1.0),
        Experience::Expert if popularity > 2000 => Some(2.0),
        _ => None,
    }
}

/// ジャンル名を比較用に畳み込む（小文字化、`-`/`_` は空白扱い）。
#[must_use]
pub fn fold_genre(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['-', '_'], " ")
}

/// 利用者の選んだジャンルのうち、作品ジャンルと部分一致するもの（選択順）。
#[must_use]
pub fn matched_genres<'a>(item: &CatalogItem, selected: &'a [String]) -> Vec<&'a str> {
    let item_genres: Vec<String> = item.genres.iter().map(|genre| fold_genre(genre)).collect();

    selected
        .iter()
        .filter(|tag| {
            let tag = fold_genre(tag);
            !tag.is_empty()
                && item_genres
                    .iter()
                    .any(|genre| genre.contains(&tag) || tag.contains(genre.as_str()))
        })
        .map(String::as_str)
        .collect()
}

/// 気分ごとのジャンルキーワード（畳み込み済み）。
#[must_use]
pub const fn mood_keywords(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Excited => &["action", "sports"],
        Mood::Relaxed => &["slice of life", "comedy"],
        Mood::Thoughtful => &["mystery", "psychological"],
        Mood::Emotional => &["drama", "romance"],
        Mood::Adventurous => &["adventure", "fantasy"],
        Mood::Dark => &["horror", "psychological", "thriller"],
    }
}

#[must_use]
pub fn matches_mood(item: &CatalogItem, mood: Mood) -> bool {
    let keywords = mood_keywords(mood);
    item.genres
        .iter()
        .map(|genre| fold_genre(genre))
        .any(|genre| keywords.contains(&genre.as_str()))
}

/// 作品の推薦スコアを計算する。
#[must_use]
pub fn score(item: &CatalogItem, answers: &CompletedAnswers) -> f64 {
    let mut total = item.score.unwrap_or(BASE_SCORE_WHEN_UNRATED);

    if let Some(bonus) = popularity_bonus(answers.experience, item.popularity) {
        total += bonus;
    }

    let matches = matched_genres(item, &answers.genres).len();
    total += GENRE_MATCH_BONUS * f64::from(u32::try_from(matches).unwrap_or(u32::MAX));

    if matches_mood(item, answers.mood) {
        total += MOOD_MATCH_BONUS;
    }

    total
}
