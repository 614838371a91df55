//! Five-step preference questionnaire.
//!
//! [`Questionnaire`] is the state machine the presentation layer drives;
//! [`steps`] holds the fixed question/option catalog shown for each step.

pub mod answers;
pub mod machine;
pub mod steps;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use answers::{
    AnswerSet, CompletedAnswers, Experience, GenreSelection, IncompleteAnswers, MAX_GENRES, Mood,
    RatingCeiling, TimeCommitment, TooManyGenres,
};
pub use machine::{Answer, Questionnaire, State, Transition};

/// 質問ステップ。順序は固定で、分岐やスキップはない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Experience,
    Genres,
    Mood,
    Rating,
    TimeCommitment,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Experience,
        Step::Genres,
        Step::Mood,
        Step::Rating,
        Step::TimeCommitment,
    ];

    /// 0始まりのステップ番号。
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Step::Experience => 0,
            Step::Genres => 1,
            Step::Mood => 2,
            Step::Rating => 3,
            Step::TimeCommitment => 4,
        }
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    #[must_use]
    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    #[must_use]
    pub const fn is_last(self) -> bool {
        matches!(self, Step::TimeCommitment)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Step::Experience => "experience",
            Step::Genres => "genres",
            Step::Mood => "mood",
            Step::Rating => "rating",
            Step::TimeCommitment => "time_commitment",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
