/// 各ステップで提示する質問と選択肢の定義。
use serde::Serialize;

use super::{MAX_GENRES, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionOption {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub step: Step,
    pub title: &'static str,
    pub max_selections: usize,
    pub options: &'static [QuestionOption],
}

const fn option(id: &'static str, label: &'static str) -> QuestionOption {
    QuestionOption { id, label }
}

const EXPERIENCE_OPTIONS: &[QuestionOption] = &[
    option("beginner", "Complete beginner"),
    option("casual", "Casual viewer"),
    option("experienced", "Experienced fan"),
    option("expert", "Otaku / expert"),
];

pub const GENRE_OPTIONS: &[QuestionOption] = &[
    option("action", "Action"),
    option("adventure", "Adventure"),
    option("comedy", "Comedy"),
    option("drama", "Drama"),
    option("fantasy", "Fantasy"),
    option("horror", "Horror"),
    option("mystery", "Mystery"),
    option("psychological", "Psychological"),
    option("romance", "Romance"),
    option("sci-fi", "Sci-Fi"),
    option("slice-of-life", "Slice of Life"),
    option("sports", "Sports"),
];

const MOOD_OPTIONS: &[QuestionOption] = &[
    option("excited", "Excited"),
    option("relaxed", "Relaxed"),
    option("thoughtful", "Thoughtful"),
    option("emotional", "Emotional"),
    option("adventurous", "Adventurous"),
    option("dark", "Dark"),
];

const RATING_OPTIONS: &[QuestionOption] = &[
    option("g", "G - All ages"),
    option("pg", "PG - Children"),
    option("pg13", "PG-13 - Teens"),
    option("r", "R-17+ - Mature"),
];

const TIME_OPTIONS: &[QuestionOption] = &[
    option("short", "Short & sweet"),
    option("medium", "Standard length"),
    option("long", "Epic journey"),
    option("any", "Any length"),
];

pub const QUESTIONS: [Question; 5] = [
    Question {
        step: Step::Experience,
        title: "Experience level",
        max_selections: 1,
        options: EXPERIENCE_OPTIONS,
    },
    Question {
        step: Step::Genres,
        title: "Preferred genres",
        max_selections: MAX_GENRES,
        options: GENRE_OPTIONS,
    },
    Question {
        step: Step::Mood,
        title: "Current mood",
        max_selections: 1,
        options: MOOD_OPTIONS,
    },
    Question {
        step: Step::Rating,
        title: "Content rating",
        max_selections: 1,
        options: RATING_OPTIONS,
    },
    Question {
        step: Step::TimeCommitment,
        title: "Viewing time",
        max_selections: 1,
        options: TIME_OPTIONS,
    },
];

#[must_use]
pub fn question(step: Step) -> &'static Question {
    &QUESTIONS[step.index()]
}
