use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::question::{AnswerChoice, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("no questions available for a quiz session")]
    Empty,

    #[error("quiz session already submitted")]
    AlreadySubmitted,
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Result of grading one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
}

impl QuizScore {
    /// Grades `correct` out of `total` using round-half-up percentage.
    #[must_use]
    pub fn new(correct: u32, total: u32) -> Self {
        let percent = if total == 0 {
            0
        } else {
            let ratio = f64::from(correct) / f64::from(total) * 100.0;
            // f64::round is round-half-away-from-zero, which is half-up
            // for the non-negative ratios possible here.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                ratio.round() as u32
            }
        };
        Self {
            correct,
            total,
            percent,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One in-progress or submitted quiz attempt.
///
/// Holds a snapshot of questions fixed at creation, a parallel array of
/// user answers, and a cursor. Navigation clamps at both ends; answers may
/// be revisited and changed any number of times until [`QuizSession::submit`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: Vec<Option<AnswerChoice>>,
    current: usize,
    started_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Creates a session over a non-empty question snapshot.
    ///
    /// All answers start unset and the cursor starts at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided;
    /// callers must treat that as "no quiz available" rather than a fault.
    pub fn new(
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        if questions.is_empty() {
            return Err(QuizSessionError::Empty);
        }
        let answers = vec![None; questions.len()];
        Ok(Self {
            questions,
            answers,
            current: 0,
            started_at,
            submitted_at: None,
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        // Invariant: 0 <= current < questions.len() (len >= 1 by construction).
        &self.questions[self.current]
    }

    /// Selection at the current cursor position, if any.
    #[must_use]
    pub fn selected_answer(&self) -> Option<AnswerChoice> {
        self.answers[self.current]
    }

    /// Selection at an arbitrary position, if in range.
    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<AnswerChoice> {
        self.answers.get(index).copied().flatten()
    }

    /// Number of positions with a recorded answer.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// Seconds accrued since start; frozen at submission time.
    #[must_use]
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.submitted_at.unwrap_or(now);
        (end - self.started_at).num_seconds().max(0)
    }

    /// Records an answer at the current position, replacing any prior one.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` after [`QuizSession::submit`].
    pub fn select_answer(&mut self, choice: AnswerChoice) -> Result<(), QuizSessionError> {
        if self.is_submitted() {
            return Err(QuizSessionError::AlreadySubmitted);
        }
        self.answers[self.current] = Some(choice);
        Ok(())
    }

    /// Moves the cursor forward; a no-op at the last question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` after [`QuizSession::submit`].
    pub fn go_to_next(&mut self) -> Result<(), QuizSessionError> {
        if self.is_submitted() {
            return Err(QuizSessionError::AlreadySubmitted);
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        Ok(())
    }

    /// Moves the cursor backward; a no-op at the first question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` after [`QuizSession::submit`].
    pub fn go_to_previous(&mut self) -> Result<(), QuizSessionError> {
        if self.is_submitted() {
            return Err(QuizSessionError::AlreadySubmitted);
        }
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Grades the attempt and freezes elapsed-time accrual.
    ///
    /// Unanswered positions never count as correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadySubmitted` on a second call.
    pub fn submit(&mut self, at: DateTime<Utc>) -> Result<QuizScore, QuizSessionError> {
        if self.is_submitted() {
            return Err(QuizSessionError::AlreadySubmitted);
        }
        self.submitted_at = Some(at);
        Ok(self.score())
    }

    /// Current grade of the attempt (also callable after submission).
    #[must_use]
    pub fn score(&self) -> QuizScore {
        let correct = self
            .questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| a.is_some_and(|choice| q.is_correct(choice)))
            .count();
        let correct = u32::try_from(correct).unwrap_or(u32::MAX);
        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        QuizScore::new(correct, total)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CategoryId, Difficulty, QuestionDraft, QuestionId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_question(id: u64, correct: AnswerChoice) -> Question {
        QuestionDraft {
            category_id: CategoryId::new(1),
            question_text: format!("Question {id}?"),
            option_a: "first".into(),
            option_b: "second".into(),
            option_c: "third".into(),
            option_d: "fourth".into(),
            correct_answer: correct,
            explanation: None,
            difficulty: Difficulty::Easy,
            subject: None,
            grade_level: None,
            time_estimate: None,
        }
        .build(QuestionId::new(id))
        .unwrap()
    }

    fn three_question_session() -> QuizSession {
        let questions = vec![
            build_question(1, AnswerChoice::A),
            build_question(2, AnswerChoice::B),
            build_question(3, AnswerChoice::C),
        ];
        QuizSession::new(questions, fixed_now()).unwrap()
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let err = QuizSession::new(Vec::new(), fixed_now()).unwrap_err();
        assert_eq!(err, QuizSessionError::Empty);
    }

    #[test]
    fn answers_start_unset_and_sized_to_questions() {
        let session = three_question_session();
        assert_eq!(session.total(), 3);
        assert_eq!(session.answered_count(), 0);
        for i in 0..3 {
            assert_eq!(session.answer_at(i), None);
        }
    }

    #[test]
    fn navigation_clamps_at_boundaries() {
        let mut session = three_question_session();

        session.go_to_previous().unwrap();
        assert_eq!(session.current_index(), 0);

        session.go_to_next().unwrap();
        session.go_to_next().unwrap();
        assert_eq!(session.current_index(), 2);
        session.go_to_next().unwrap();
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn reselecting_replaces_without_history() {
        let mut session = three_question_session();
        session.select_answer(AnswerChoice::D).unwrap();
        session.select_answer(AnswerChoice::A).unwrap();
        assert_eq!(session.selected_answer(), Some(AnswerChoice::A));

        // Revisit from another index and change it again.
        session.go_to_next().unwrap();
        session.go_to_previous().unwrap();
        session.select_answer(AnswerChoice::B).unwrap();
        assert_eq!(session.selected_answer(), Some(AnswerChoice::B));
    }

    #[test]
    fn two_of_three_rounds_to_67() {
        let mut session = three_question_session();
        session.select_answer(AnswerChoice::A).unwrap();
        session.go_to_next().unwrap();
        session.select_answer(AnswerChoice::B).unwrap();
        session.go_to_next().unwrap();
        session.select_answer(AnswerChoice::D).unwrap();

        let score = session.submit(fixed_now()).unwrap();
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 3);
        assert_eq!(score.percent, 67);
    }

    #[test]
    fn unanswered_positions_never_match() {
        let mut session = three_question_session();
        let score = session.submit(fixed_now()).unwrap();
        assert_eq!(score.correct, 0);
        assert_eq!(score.percent, 0);
    }

    #[test]
    fn submit_is_terminal() {
        let mut session = three_question_session();
        session.submit(fixed_now()).unwrap();

        assert_eq!(
            session.submit(fixed_now()).unwrap_err(),
            QuizSessionError::AlreadySubmitted
        );
        assert_eq!(
            session.select_answer(AnswerChoice::A).unwrap_err(),
            QuizSessionError::AlreadySubmitted
        );
        assert_eq!(
            session.go_to_next().unwrap_err(),
            QuizSessionError::AlreadySubmitted
        );
    }

    #[test]
    fn elapsed_time_freezes_at_submission() {
        let mut session = three_question_session();
        let submit_at = fixed_now() + Duration::seconds(30);
        session.submit(submit_at).unwrap();

        let much_later = fixed_now() + Duration::seconds(300);
        assert_eq!(session.elapsed_seconds(much_later), 30);
    }

    #[test]
    fn elapsed_time_accrues_before_submission() {
        let session = three_question_session();
        assert_eq!(
            session.elapsed_seconds(fixed_now() + Duration::seconds(45)),
            45
        );
    }

    #[test]
    fn half_up_rounding() {
        // 1 of 8 = 12.5% -> 13 with round-half-up.
        assert_eq!(QuizScore::new(1, 8).percent, 13);
        assert_eq!(QuizScore::new(0, 0).percent, 0);
        assert_eq!(QuizScore::new(5, 5).percent, 100);
    }
}
