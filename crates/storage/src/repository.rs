use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use study_core::model::{
    Category, CategoryId, ProgressStats, Question, QuestionDraft, QuestionId,
};

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Persisted shape for a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
}

impl CategoryRecord {
    #[must_use]
    pub fn from_category(category: &Category) -> Self {
        Self {
            id: category.id().value(),
            name: category.name().to_owned(),
            description: category.description().map(ToOwned::to_owned),
        }
    }

    /// Convert the record back into a domain `Category`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the persisted name fails
    /// validation.
    pub fn into_category(self) -> Result<Category, StorageError> {
        Category::new(CategoryId::new(self.id), self.name, self.description)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Category fields before a backend has assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategoryRecord {
    pub name: String,
    pub description: Option<String>,
}

/// Persisted, flat shape for a question.
///
/// `correct_answer` and `difficulty` stay strings on the wire; turning the
/// record back into a domain `Question` re-validates them, so malformed
/// persisted rows surface as serialization errors instead of leaking into
/// the domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: u64,
    pub category_id: u64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub time_estimate: Option<String>,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        let [a, b, c, d] = question.options();
        Self {
            id: question.id().value(),
            category_id: question.category_id().value(),
            question_text: question.question_text().to_owned(),
            option_a: a.to_owned(),
            option_b: b.to_owned(),
            option_c: c.to_owned(),
            option_d: d.to_owned(),
            correct_answer: question.correct_answer().as_str().to_owned(),
            explanation: question.explanation().map(ToOwned::to_owned),
            difficulty: question.difficulty().as_str().to_owned(),
            subject: question.subject().map(ToOwned::to_owned),
            grade_level: question.grade_level().map(ToOwned::to_owned),
            time_estimate: question.time_estimate().map(ToOwned::to_owned),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the answer letter,
    /// difficulty, or text fields fail domain validation.
    pub fn into_question(self) -> Result<Question, StorageError> {
        let ser = |e: study_core::model::QuestionError| StorageError::Serialization(e.to_string());
        let draft = QuestionDraft {
            category_id: CategoryId::new(self.category_id),
            question_text: self.question_text,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            correct_answer: self.correct_answer.parse().map_err(ser)?,
            explanation: self.explanation,
            difficulty: self.difficulty.parse().map_err(ser)?,
            subject: self.subject,
            grade_level: self.grade_level,
            time_estimate: self.time_estimate,
        };
        draft.build(QuestionId::new(self.id)).map_err(ser)
    }
}

/// Question fields before a backend has assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestionRecord {
    pub category_id: u64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: String,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub time_estimate: Option<String>,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn from_draft(draft: &QuestionDraft) -> Self {
        Self {
            category_id: draft.category_id.value(),
            question_text: draft.question_text.clone(),
            option_a: draft.option_a.clone(),
            option_b: draft.option_b.clone(),
            option_c: draft.option_c.clone(),
            option_d: draft.option_d.clone(),
            correct_answer: draft.correct_answer.as_str().to_owned(),
            explanation: draft.explanation.clone(),
            difficulty: draft.difficulty.as_str().to_owned(),
            subject: draft.subject.clone(),
            grade_level: draft.grade_level.clone(),
            time_estimate: draft.time_estimate.clone(),
        }
    }

    /// Attaches a backend-assigned id, producing a persistable record.
    #[must_use]
    pub fn with_id(self, id: u64) -> QuestionRecord {
        QuestionRecord {
            id,
            category_id: self.category_id,
            question_text: self.question_text,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            difficulty: self.difficulty,
            subject: self.subject,
            grade_level: self.grade_level,
            time_estimate: self.time_estimate,
        }
    }
}

/// Persisted shape for cumulative progress statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub exercises_completed: u64,
    pub questions_answered: u64,
    pub correct_answers: u64,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_stats(stats: &ProgressStats) -> Self {
        Self {
            exercises_completed: stats.exercises_completed(),
            questions_answered: stats.questions_answered(),
            correct_answers: stats.correct_answers(),
        }
    }

    /// Convert the record back into domain statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the counters are
    /// inconsistent.
    pub fn into_stats(self) -> Result<ProgressStats, StorageError> {
        ProgressStats::from_counts(
            self.exercises_completed,
            self.questions_answered,
            self.correct_answers,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for quiz categories.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Persist a new category; the backend assigns the id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn insert_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError>;

    /// All categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<Category>, StorageError>;

    /// Whether a category with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn category_exists(&self, id: CategoryId) -> Result<bool, StorageError>;
}

/// Repository contract for quiz questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new question; the backend assigns the id.
    ///
    /// Inserts unconditionally; duplicate content is accepted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError>;

    /// At most `limit` questions for the category, in random order.
    ///
    /// An empty result means the category has no questions; it is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn sample_questions(
        &self,
        category_id: CategoryId,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError>;

    /// Total number of stored questions across all categories.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_questions(&self) -> Result<u64, StorageError>;
}

/// Repository contract for cumulative progress statistics and study time.
///
/// Statistics always live in the key-value store, whichever question
/// backend is active.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Load persisted statistics, if any were ever saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_stats(&self) -> Result<Option<ProgressStats>, StorageError>;

    /// Persist the current statistics, replacing the previous snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_stats(&self, stats: &ProgressStats) -> Result<(), StorageError>;

    /// Total accumulated study-timer seconds (0 if never saved).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_study_seconds(&self) -> Result<u64, StorageError>;

    /// Persist the total accumulated study-timer seconds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn save_study_seconds(&self, seconds: u64) -> Result<(), StorageError>;
}

/// Aggregates the question-side repositories of one backend behind trait
/// objects so backends stay interchangeable.
#[derive(Clone)]
pub struct Storage {
    pub categories: Arc<dyn CategoryRepository>,
    pub questions: Arc<dyn QuestionRepository>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{AnswerChoice, Difficulty};

    fn record() -> QuestionRecord {
        QuestionRecord {
            id: 7,
            category_id: 1,
            question_text: "What is the chemical symbol for gold?".into(),
            option_a: "Au".into(),
            option_b: "Ag".into(),
            option_c: "Fe".into(),
            option_d: "Cu".into(),
            correct_answer: "A".into(),
            explanation: Some("From the Latin aurum".into()),
            difficulty: "easy".into(),
            subject: Some("Chemistry".into()),
            grade_level: None,
            time_estimate: Some("2 minutes".into()),
        }
    }

    #[test]
    fn question_record_roundtrip() {
        let question = record().into_question().unwrap();
        assert_eq!(question.id(), QuestionId::new(7));
        assert_eq!(question.correct_answer(), AnswerChoice::A);
        assert_eq!(question.difficulty(), Difficulty::Easy);

        let back = QuestionRecord::from_question(&question);
        assert_eq!(back.correct_answer, "A");
        assert_eq!(back.difficulty, "easy");
    }

    #[test]
    fn malformed_answer_letter_is_a_serialization_error() {
        let mut rec = record();
        rec.correct_answer = "Z".into();
        let err = rec.into_question().unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn progress_record_roundtrip() {
        let mut stats = ProgressStats::new();
        stats.record_quiz(3, 5);
        stats.record_exercise();

        let restored = ProgressRecord::from_stats(&stats).into_stats().unwrap();
        assert_eq!(restored, stats);
    }
}
