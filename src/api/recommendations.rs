use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::{
    app::AppState,
    pipeline::ScoredItem,
    questionnaire::{Answer, AnswerSet, Questionnaire, Step, Transition},
};

#[derive(Debug, Serialize)]
pub(crate) struct RecommendationsResponse {
    recommendations: Vec<ScoredItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct IncompleteResponse {
    error: String,
    step: Step,
}

/// 送信された回答を質問票に順に流し込み、完了した回答だけをパイプラインに渡す。
pub(crate) async fn generate(
    State(state): State<AppState>,
    Json(body): Json<AnswerSet>,
) -> Result<Json<RecommendationsResponse>, (StatusCode, Json<IncompleteResponse>)> {
    let answers = replay(&body).map_err(|step| {
        debug!(step = %step, "rejected incomplete answer set");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(IncompleteResponse {
                error: format!("answer set is incomplete: {step} is unanswered"),
                step,
            }),
        )
    })?;

    let recommendations = state.pipeline().generate(&answers).await;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// 質問票の状態機械で回答を再生する。最初に前進できなかったステップを `Err` で返す。
fn replay(body: &AnswerSet) -> Result<AnswerSet, Step> {
    let (sender, mut receiver) = oneshot::channel();
    let mut questionnaire = Questionnaire::new(move |answers| {
        let _ = sender.send(answers);
    });

    for step in Step::ALL {
        if let Some(answer) = answer_for(body, step) {
            questionnaire.answer(answer);
        }
        if questionnaire.advance() == Transition::Stalled {
            return Err(step);
        }
    }

    receiver
        .try_recv()
        .map_err(|_| body.first_unanswered().unwrap_or(Step::TimeCommitment))
}

fn answer_for(body: &AnswerSet, step: Step) -> Option<Answer> {
    match step {
        Step::Experience => body.experience.map(Answer::Experience),
        Step::Genres => Some(Answer::Genres(body.genres.as_slice().to_vec())),
        Step::Mood => body.mood.map(Answer::Mood),
        Step::Rating => body.rating.map(Answer::Rating),
        Step::TimeCommitment => body.time_commitment.map(Answer::TimeCommitment),
    }
}
