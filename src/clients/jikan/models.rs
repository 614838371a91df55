//! Jikan v4 wire types and their normalization into [`CatalogItem`].

use serde::Deserialize;

use crate::{
    clients::catalog::{CatalogItem, MediaType, UNKNOWN_POPULARITY},
    util::time::Season,
};

/// 一覧系エンドポイントの応答。
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub(crate) data: Vec<JikanAnime>,
}

/// 単一作品エンドポイントの応答。
#[derive(Debug, Deserialize)]
pub(crate) struct SingleResponse {
    pub(crate) data: Option<JikanAnime>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct JikanAnime {
    pub(crate) mal_id: u32,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) title_english: Option<String>,
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
    #[serde(default)]
    pub(crate) episodes: Option<u32>,
    #[serde(default)]
    pub(crate) score: Option<f64>,
    #[serde(default)]
    pub(crate) rating: Option<String>,
    #[serde(default)]
    pub(crate) popularity: Option<u32>,
    #[serde(default)]
    pub(crate) synopsis: Option<String>,
    #[serde(default)]
    pub(crate) images: Option<Images>,
    #[serde(default)]
    pub(crate) genres: Vec<NamedResource>,
    #[serde(default)]
    pub(crate) themes: Vec<NamedResource>,
    #[serde(default)]
    pub(crate) demographics: Vec<NamedResource>,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) season: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Images {
    #[serde(default)]
    pub(crate) jpg: Option<ImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ImageSet {
    #[serde(default)]
    pub(crate) image_url: Option<String>,
    #[serde(default)]
    pub(crate) large_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NamedResource {
    pub(crate) name: String,
}

/// 空文字・空白のみの値を `None` に畳む。
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_season(raw: &str) -> Option<Season> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "winter" => Some(Season::Winter),
        "spring" => Some(Season::Spring),
        "summer" => Some(Season::Summer),
        "fall" | "autumn" => Some(Season::Fall),
        _ => None,
    }
}

impl JikanAnime {
    /// 欠損値の既定値をまとめて適用し、正規化済みの作品に変換する。
    ///
    /// - スコア 0 以下や非有限値は未評価として扱う
    /// - 人気順位が無ければ [`UNKNOWN_POPULARITY`]
    /// - 画像は大サイズ優先、無ければ通常サイズ
    /// - ジャンルはgenres/themes/demographicsの順で重複なく結合
    pub(crate) fn normalize(self) -> CatalogItem {
        let image_url = self.images.and_then(|images| images.jpg).and_then(|jpg| {
            non_blank(jpg.large_image_url).or_else(|| non_blank(jpg.image_url))
        });

        let mut genres: Vec<String> = Vec::new();
        for resource in self
            .genres
            .into_iter()
            .chain(self.themes)
            .chain(self.demographics)
        {
            let name = resource.name.trim().to_string();
            if !name.is_empty() && !genres.iter().any(|g| g.eq_ignore_ascii_case(&name)) {
                genres.push(name);
            }
        }

        let english_title = non_blank(self.title_english);
        let title = non_blank(self.title)
            .or_else(|| english_title.clone())
            .unwrap_or_else(|| format!("#{}", self.mal_id));

        CatalogItem {
            id: self.mal_id,
            title,
            english_title,
            episodes: self.episodes.filter(|count| *count > 0),
            score: self
                .score
                .filter(|score| score.is_finite() && *score > 0.0),
            genres,
            rating: non_blank(self.rating),
            popularity: self
                .popularity
                .filter(|rank| *rank > 0)
                .unwrap_or(UNKNOWN_POPULARITY),
            image_url,
            synopsis: non_blank(self.synopsis),
            media_type: non_blank(self.kind).map(|kind| MediaType::parse(&kind)),
            year: self.year,
            season: self.season.as_deref().and_then(parse_season),
            status: non_blank(self.status),
        }
    }
}
