//! 話数・レーティング・欠損レコードによる候補の絞り込み。

use crate::{
    clients::CatalogItem,
    questionnaire::{RatingCeiling, TimeCommitment},
};

/// カタログが返すレーティング文字列と、その段階。
///
/// ここに無い文字列（"Rx - Hentai" を含む）はどの上限でも許可されない。
const KNOWN_RATINGS: [(&str, RatingCeiling); 6] = [
    ("G - All Ages", RatingCeiling::G),
    ("PG - Children", RatingCeiling::Pg),
    ("PG-13 - Teens 13 or older", RatingCeiling::Pg13),
    ("R - 17+ (violence & profanity)", RatingCeiling::R),
    ("R - 17+", RatingCeiling::R),
    ("R+ - Mild Nudity", RatingCeiling::R),
];

/// レーティング文字列を段階に変換する。未知の文字列は `None`。
#[must_use]
pub fn rating_tier(raw: &str) -> Option<RatingCeiling> {
    let raw = raw.trim();
    KNOWN_RATINGS
        .iter()
        .find(|(label, _)| *label == raw)
        .map(|(_, tier)| *tier)
}

/// 上限以下のレーティングを持つ作品のみ許可する。レーティング欠損は不許可。
#[must_use]
pub fn within_rating(item: &CatalogItem, ceiling: RatingCeiling) -> bool {
    item.rating
        .as_deref()
        .and_then(rating_tier)
        .is_some_and(|tier| tier <= ceiling)
}

/// 視聴時間の希望に話数が合うかどうか。
///
/// 話数不明の作品は `Any` 以外では除外する（映画も同様）。
#[must_use]
pub fn fits_time_commitment(item: &CatalogItem, commitment: TimeCommitment) -> bool {
    if commitment == TimeCommitment::Any {
        return true;
    }
    let Some(episodes) = item.episodes else {
        return false;
    };

    match commitment {
        TimeCommitment::Short => episodes <= 13 || item.is_movie(),
        TimeCommitment::Medium => (12..=26).contains(&episodes),
        TimeCommitment::Long => (26..=100).contains(&episodes),
        TimeCommitment::Any => true,
    }
}

/// 画像もスコアも無い作品は表示・順位付けができない。
#[must_use]
pub fn is_displayable(item: &CatalogItem) -> bool {
    item.image_url.is_some() || item.score.is_some()
}
