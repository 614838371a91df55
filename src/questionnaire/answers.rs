/// 質問票で収集するユーザーの嗜好ベクトル。
///
/// 各フィールドは質問ステップごとに順に埋まり、全フィールドが揃った時点で
/// [`CompletedAnswers`] に変換できるようになります。
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Step;

/// ジャンルの最大選択数。
pub const MAX_GENRES: usize = 3;

/// 視聴経験レベル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Experience {
    Beginner,
    Casual,
    Experienced,
    Expert,
}

/// 現在の気分。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Excited,
    Relaxed,
    Thoughtful,
    Emotional,
    Adventurous,
    Dark,
}

/// 許容するレーティングの上限。
///
/// 順序付きで、上位の段階は下位の段階をすべて含みます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingCeiling {
    G,
    Pg,
    #[serde(alias = "pg-13")]
    Pg13,
    #[serde(alias = "r+")]
    R,
}

/// 視聴時間の希望（話数バケット）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeCommitment {
    Short,
    Medium,
    Long,
    Any,
}

/// 挿入順を保持する最大3件のジャンル集合。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct GenreSelection(Vec<String>);

/// 4件目以上のジャンルを含むリストを拒否したことを示す。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at most {MAX_GENRES} genres can be selected, got {0}")]
pub struct TooManyGenres(pub usize);

impl GenreSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|selected| selected == tag)
    }

    /// タグを追加する。既に3件選択済み、または重複の場合は何もしない。
    ///
    /// 追加できた場合は `true` を返す。
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = normalize_tag(&tag.into());
        if tag.is_empty() || self.contains(&tag) || self.0.len() >= MAX_GENRES {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// 選択済みなら外し、未選択なら追加する。
    pub fn toggle(&mut self, tag: &str) {
        let tag = normalize_tag(tag);
        if let Some(index) = self.0.iter().position(|selected| *selected == tag) {
            self.0.remove(index);
        } else {
            self.insert(tag);
        }
    }
}

impl TryFrom<Vec<String>> for GenreSelection {
    type Error = TooManyGenres;

    fn try_from(tags: Vec<String>) -> Result<Self, Self::Error> {
        let mut selection = Self::new();
        for tag in tags {
            let tag = normalize_tag(&tag);
            if tag.is_empty() || selection.contains(&tag) {
                continue;
            }
            if selection.0.len() == MAX_GENRES {
                return Err(TooManyGenres(selection.0.len() + 1));
            }
            selection.0.push(tag);
        }
        Ok(selection)
    }
}

impl From<GenreSelection> for Vec<String> {
    fn from(selection: GenreSelection) -> Self {
        selection.0
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// 質問票の途中状態を含む回答セット。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnswerSet {
    #[serde(default)]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub genres: GenreSelection,
    #[serde(default)]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub rating: Option<RatingCeiling>,
    #[serde(default, alias = "timeCommitment")]
    pub time_commitment: Option<TimeCommitment>,
}

/// 未回答のステップが残っている。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("answer set is incomplete: {0} is unanswered")]
pub struct IncompleteAnswers(pub Step);

impl AnswerSet {
    /// 指定ステップのフィールドが回答済みかどうか。
    #[must_use]
    pub fn is_answered(&self, step: Step) -> bool {
        match step {
            Step::Experience => self.experience.is_some(),
            Step::Genres => !self.genres.is_empty(),
            Step::Mood => self.mood.is_some(),
            Step::Rating => self.rating.is_some(),
            Step::TimeCommitment => self.time_commitment.is_some(),
        }
    }

    /// 最初の未回答ステップを返す。すべて回答済みなら `None`。
    #[must_use]
    pub fn first_unanswered(&self) -> Option<Step> {
        Step::ALL.into_iter().find(|step| !self.is_answered(*step))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.first_unanswered().is_none()
    }

    /// 全フィールドが揃った不変の回答に変換する。
    ///
    /// # Errors
    /// 未回答のステップがある場合は [`IncompleteAnswers`] を返す。
    pub fn completed(&self) -> Result<CompletedAnswers, IncompleteAnswers> {
        match (self.experience, self.mood, self.rating, self.time_commitment) {
            (Some(experience), Some(mood), Some(rating), Some(time_commitment))
                if !self.genres.is_empty() =>
            {
                Ok(CompletedAnswers {
                    experience,
                    genres: self.genres.as_slice().to_vec(),
                    mood,
                    rating,
                    time_commitment,
                })
            }
            _ => Err(IncompleteAnswers(
                self.first_unanswered().unwrap_or(Step::Genres),
            )),
        }
    }
}

/// パイプラインに渡される完成済みの回答。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedAnswers {
    pub experience: Experience,
    pub genres: Vec<String>,
    pub mood: Mood,
    pub rating: RatingCeiling,
    pub time_commitment: TimeCommitment,
}
