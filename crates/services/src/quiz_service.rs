use std::sync::Arc;

use study_core::Clock;
use study_core::model::{AnswerChoice, CategoryId, QuizScore, QuizSession};

use crate::error::QuizError;
use crate::progress_service::ProgressService;
use crate::question_store::QuestionStore;

/// Lifecycle of one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    NotStarted,
    InProgress,
    Submitted,
}

/// Everything a front end needs to render the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizView {
    pub question_text: String,
    pub options: [String; 4],
    pub selection: Option<AnswerChoice>,
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered_count: usize,
}

/// Drives quiz attempts end to end: fetches a question snapshot, steps
/// through answers and navigation, grades on submit and forwards the result
/// to the progress totals.
pub struct QuizService {
    store: Arc<QuestionStore>,
    progress: Arc<ProgressService>,
    clock: Clock,
    session: Option<QuizSession>,
    last_score: Option<QuizScore>,
}

impl QuizService {
    #[must_use]
    pub fn new(store: Arc<QuestionStore>, progress: Arc<ProgressService>, clock: Clock) -> Self {
        Self {
            store,
            progress,
            clock,
            session: None,
            last_score: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        match &self.session {
            None => QuizPhase::NotStarted,
            Some(session) if session.is_submitted() => QuizPhase::Submitted,
            Some(_) => QuizPhase::InProgress,
        }
    }

    /// Starts a fresh attempt for the category, replacing any prior attempt.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` if the category has no questions and
    /// `QuizError::Storage` if the fallback backend fails.
    pub async fn start(&mut self, category_id: CategoryId) -> Result<QuizView, QuizError> {
        let questions = self.store.questions_for_category(category_id).await?;
        let session =
            QuizSession::new(questions, self.clock.now()).map_err(|_| QuizError::NoQuestions)?;
        self.last_score = None;
        self.session = Some(session);
        self.view().ok_or(QuizError::NotInProgress)
    }

    /// Records an answer for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` before a start and
    /// `QuizError::Session` after submission.
    pub fn select_answer(&mut self, choice: AnswerChoice) -> Result<QuizView, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;
        session.select_answer(choice)?;
        self.view().ok_or(QuizError::NotInProgress)
    }

    /// Moves to the next question; a no-op at the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` before a start and
    /// `QuizError::Session` after submission.
    pub fn go_to_next(&mut self) -> Result<QuizView, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;
        session.go_to_next()?;
        self.view().ok_or(QuizError::NotInProgress)
    }

    /// Moves to the previous question; a no-op at the first one.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` before a start and
    /// `QuizError::Session` after submission.
    pub fn go_to_previous(&mut self) -> Result<QuizView, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;
        session.go_to_previous()?;
        self.view().ok_or(QuizError::NotInProgress)
    }

    /// Grades the attempt and folds the result into the progress totals.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotInProgress` before a start,
    /// `QuizError::Session` on a second submit and `QuizError::Storage` if
    /// persisting the totals fails (the attempt is still graded then).
    pub async fn submit(&mut self) -> Result<QuizScore, QuizError> {
        let session = self.session.as_mut().ok_or(QuizError::NotInProgress)?;
        let score = session.submit(self.clock.now())?;
        self.last_score = Some(score);
        self.progress.record_quiz(score.correct, score.total).await?;
        Ok(score)
    }

    /// Discards the current attempt and any last score.
    pub fn restart(&mut self) {
        self.session = None;
        self.last_score = None;
    }

    /// Render state for the current question, if an attempt exists.
    #[must_use]
    pub fn view(&self) -> Option<QuizView> {
        let session = self.session.as_ref()?;
        let question = session.current_question();
        Some(QuizView {
            question_text: question.question_text().to_owned(),
            options: question.options().map(ToOwned::to_owned),
            selection: session.selected_answer(),
            position: session.current_index() + 1,
            total: session.total(),
            answered_count: session.answered_count(),
        })
    }

    #[must_use]
    pub fn last_score(&self) -> Option<QuizScore> {
        self.last_score
    }

    /// Seconds spent on the current attempt; frozen once submitted.
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<i64> {
        self.session
            .as_ref()
            .map(|s| s.elapsed_seconds(self.clock.now()))
    }
}
