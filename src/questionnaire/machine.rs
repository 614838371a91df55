use std::fmt;

use tracing::debug;

use super::{
    AnswerSet, Experience, GenreSelection, Mood, RatingCeiling, Step, TimeCommitment,
};

/// 1ステップ分の回答。バリアントが書き込み先のステップを表す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Experience(Experience),
    Genres(Vec<String>),
    Mood(Mood),
    Rating(RatingCeiling),
    TimeCommitment(TimeCommitment),
}

impl Answer {
    #[must_use]
    pub fn step(&self) -> Step {
        match self {
            Answer::Experience(_) => Step::Experience,
            Answer::Genres(_) => Step::Genres,
            Answer::Mood(_) => Step::Mood,
            Answer::Rating(_) => Step::Rating,
            Answer::TimeCommitment(_) => Step::TimeCommitment,
        }
    }
}

/// 状態機械の現在位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Active(Step),
    Completed,
}

/// 操作の結果として起きた遷移。
///
/// 表示層はこれを見て効果音やアニメーションを選ぶ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced(Step),
    Retreated(Step),
    Completed,
    /// 現在ステップが未回答のため前進できなかった。
    Stalled,
    Unchanged,
}

type CompletionCallback = Box<dyn FnOnce(AnswerSet) + Send>;

/// 5ステップの線形な質問票。
pub struct Questionnaire {
    state: State,
    answers: AnswerSet,
    on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for Questionnaire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Questionnaire")
            .field("state", &self.state)
            .field("answers", &self.answers)
            .field("completion_pending", &self.on_complete.is_some())
            .finish()
    }
}

impl Questionnaire {
    /// ステップ0・空の回答で質問票を開始する。
    ///
    /// `on_complete` は最終ステップで `advance` が成功したときに一度だけ呼ばれる。
    pub fn new(on_complete: impl FnOnce(AnswerSet) + Send + 'static) -> Self {
        Self {
            state: State::Active(Step::Experience),
            answers: AnswerSet::default(),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// 現在のステップ。完了後は `None`。
    #[must_use]
    pub fn current_step(&self) -> Option<Step> {
        match self.state {
            State::Active(step) => Some(step),
            State::Completed => None,
        }
    }

    /// 1始まりのステップ番号（完了後はステップ数）。
    #[must_use]
    pub fn step_number(&self) -> usize {
        self.current_step()
            .map_or(Step::ALL.len(), |step| step.index() + 1)
    }

    /// 進捗率（0.0〜1.0）。
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self) -> f64 {
        self.step_number() as f64 / Step::ALL.len() as f64
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == State::Completed
    }

    /// 回答を書き込む。値の形以外の検証はしない。
    ///
    /// ジャンルは4件以上のリストを受け付けず、その場合は何も変わらない。
    pub fn answer(&mut self, answer: Answer) {
        if self.is_completed() {
            return;
        }
        match answer {
            Answer::Experience(value) => self.answers.experience = Some(value),
            Answer::Genres(tags) => match GenreSelection::try_from(tags) {
                Ok(selection) => self.answers.genres = selection,
                Err(error) => debug!(%error, "genre answer ignored"),
            },
            Answer::Mood(value) => self.answers.mood = Some(value),
            Answer::Rating(value) => self.answers.rating = Some(value),
            Answer::TimeCommitment(value) => self.answers.time_commitment = Some(value),
        }
    }

    /// ジャンルを1件ずつ選択・解除する。
    pub fn toggle_genre(&mut self, tag: &str) {
        if !self.is_completed() {
            self.answers.genres.toggle(tag);
        }
    }

    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current_step()
            .is_some_and(|step| self.answers.is_answered(step))
    }

    /// 次のステップへ進む。最終ステップでは完了コールバックを呼ぶ。
    pub fn advance(&mut self) -> Transition {
        let State::Active(step) = self.state else {
            return Transition::Unchanged;
        };
        if !self.can_advance() {
            return Transition::Stalled;
        }

        match step.next() {
            Some(next) => {
                self.state = State::Active(next);
                Transition::Advanced(next)
            }
            None => {
                self.state = State::Completed;
                if let Some(on_complete) = self.on_complete.take() {
                    on_complete(self.answers.clone());
                }
                Transition::Completed
            }
        }
    }

    /// 前のステップへ戻る。回答は消さない。
    pub fn retreat(&mut self) -> Transition {
        let State::Active(step) = self.state else {
            return Transition::Unchanged;
        };
        match step.previous() {
            Some(previous) => {
                self.state = State::Active(previous);
                Transition::Retreated(previous)
            }
            None => Transition::Unchanged,
        }
    }
}
