use axum::Json;
use serde::Serialize;

use crate::questionnaire::{MAX_GENRES, steps::QUESTIONS, steps::Question};

#[derive(Debug, Serialize)]
pub(crate) struct QuestionnaireDescription {
    max_genres: usize,
    steps: &'static [Question],
}

pub(crate) async fn describe() -> Json<QuestionnaireDescription> {
    Json(QuestionnaireDescription {
        max_genres: MAX_GENRES,
        steps: &QUESTIONS,
    })
}
