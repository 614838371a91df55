//! Catalog boundary shared by the pipeline, the HTTP API and the terminal quiz.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{questionnaire::RatingCeiling, util::time::Season};

/// 人気順位が不明な作品に割り当てる順位（マイナー扱い）。
pub const UNKNOWN_POPULARITY: u32 = 10_000;

/// 作品の媒体種別。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "TV")]
    Tv,
    Movie,
    #[serde(rename = "OVA")]
    Ova,
    #[serde(rename = "ONA")]
    Ona,
    Special,
    Music,
    #[serde(untagged)]
    Other(String),
}

impl MediaType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "TV" => MediaType::Tv,
            "Movie" => MediaType::Movie,
            "OVA" => MediaType::Ova,
            "ONA" => MediaType::Ona,
            "Special" => MediaType::Special,
            "Music" => MediaType::Music,
            other => MediaType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Tv => f.write_str("TV"),
            MediaType::Movie => f.write_str("Movie"),
            MediaType::Ova => f.write_str("OVA"),
            MediaType::Ona => f.write_str("ONA"),
            MediaType::Special => f.write_str("Special"),
            MediaType::Music => f.write_str("Music"),
            MediaType::Other(raw) => f.write_str(raw),
        }
    }
}

/// 正規化済みのカタログ作品。
///
/// 欠損値の既定値はフェッチ直後の正規化で一度だけ適用される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_title: Option<String>,
    pub episodes: Option<u32>,
    /// 0〜10。未評価なら `None`。
    pub score: Option<f64>,
    pub genres: Vec<String>,
    pub rating: Option<String>,
    /// 小さいほど人気。不明な場合は [`UNKNOWN_POPULARITY`]。
    pub popularity: u32,
    pub image_url: Option<String>,
    pub synopsis: Option<String>,
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CatalogItem {
    #[must_use]
    pub fn is_movie(&self) -> bool {
        self.media_type == Some(MediaType::Movie)
    }

    #[must_use]
    pub fn has_genre(&self, name: &str) -> bool {
        self.genres
            .iter()
            .any(|genre| genre.eq_ignore_ascii_case(name))
    }
}

/// 外部アニメカタログへの読み取り専用クエリ。
///
/// どの操作も失敗時はエラーを返さず、空のリスト（`by_id` は `None`）に解決する。
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn by_genres(&self, genres: &[String], ceiling: RatingCeiling) -> Vec<CatalogItem>;

    async fn top_by_popularity(&self) -> Vec<CatalogItem>;

    async fn by_season(&self, year: i32, season: Season) -> Vec<CatalogItem>;

    async fn by_id(&self, id: u32) -> Option<CatalogItem>;

    async fn search(&self, text: &str) -> Vec<CatalogItem>;

    /// カタログへの疎通確認。既定では常に成功とみなす。
    ///
    /// # Errors
    /// 実装がカタログに到達できない場合はエラーを返す。
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
