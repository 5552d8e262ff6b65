use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("correct answers ({correct}) exceed questions answered ({answered})")]
    CorrectExceedsAnswered { correct: u64, answered: u64 },
}

/// Cumulative study statistics across all completed quizzes and exercises.
///
/// Counters only grow; they are persisted after every quiz submission or
/// exercise completion and loaded once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressStats {
    exercises_completed: u64,
    questions_answered: u64,
    correct_answers: u64,
}

impl ProgressStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrates statistics from persisted counters.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CorrectExceedsAnswered` if the counters are
    /// inconsistent.
    pub fn from_counts(
        exercises_completed: u64,
        questions_answered: u64,
        correct_answers: u64,
    ) -> Result<Self, ProgressError> {
        if correct_answers > questions_answered {
            return Err(ProgressError::CorrectExceedsAnswered {
                correct: correct_answers,
                answered: questions_answered,
            });
        }
        Ok(Self {
            exercises_completed,
            questions_answered,
            correct_answers,
        })
    }

    #[must_use]
    pub fn exercises_completed(&self) -> u64 {
        self.exercises_completed
    }

    #[must_use]
    pub fn questions_answered(&self) -> u64 {
        self.questions_answered
    }

    #[must_use]
    pub fn correct_answers(&self) -> u64 {
        self.correct_answers
    }

    /// Adds one quiz submission to the running totals.
    pub fn record_quiz(&mut self, correct: u32, total: u32) {
        self.questions_answered = self.questions_answered.saturating_add(u64::from(total));
        self.correct_answers = self.correct_answers.saturating_add(u64::from(correct));
    }

    /// Adds one completed exercise to the running totals.
    pub fn record_exercise(&mut self) {
        self.exercises_completed = self.exercises_completed.saturating_add(1);
    }

    /// Overall accuracy as a round-half-up percentage; 0 before any answers.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.questions_answered == 0 {
            return 0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.correct_answers as f64 / self.questions_answered as f64 * 100.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            ratio.round() as u32
        }
    }
}
