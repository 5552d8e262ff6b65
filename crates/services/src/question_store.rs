use storage::repository::{
    CategoryRepository, NewQuestionRecord, QuestionRepository, Storage, StorageError,
};
use study_core::model::{Category, CategoryId, Question, QuestionDraft, QuestionId};

/// Upper bound on questions per quiz attempt.
pub const MAX_QUIZ_QUESTIONS: u32 = 10;

/// Outcome of an attempted question insert, suitable for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub success: bool,
    pub message: String,
    pub question_id: Option<QuestionId>,
}

impl InsertOutcome {
    fn rejected(message: String) -> Self {
        Self {
            success: false,
            message,
            question_id: None,
        }
    }
}

/// Question access over a primary backend with a key-value fallback.
///
/// The primary slot is `None` when initialization degraded to the fallback;
/// degradation is one-way for the lifetime of the store. Reads that hit a
/// primary failure quietly retry against the fallback so a flaky database
/// never blocks a quiz.
pub struct QuestionStore {
    primary: Option<Storage>,
    fallback: Storage,
}

impl QuestionStore {
    #[must_use]
    pub fn new(primary: Option<Storage>, fallback: Storage) -> Self {
        Self { primary, fallback }
    }

    /// True when the primary backend is unavailable.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.primary.is_none()
    }

    fn active(&self) -> &Storage {
        self.primary.as_ref().unwrap_or(&self.fallback)
    }

    /// All categories, ordered by name. Never fails: a primary error falls
    /// through to the fallback, and a fallback error yields a built-in
    /// category list. An empty list from a working backend is returned
    /// as-is.
    pub async fn list_categories(&self) -> Vec<Category> {
        if let Some(primary) = &self.primary
            && let Ok(categories) = primary.categories.list_categories().await
        {
            return categories;
        }

        match self.fallback.categories.list_categories().await {
            Ok(categories) => categories,
            Err(_) => built_in_categories(),
        }
    }

    /// At most [`MAX_QUIZ_QUESTIONS`] questions for the category, in random
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` only when the fallback backend itself fails;
    /// primary failures retry against the fallback first.
    pub async fn questions_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Question>, StorageError> {
        if let Some(primary) = &self.primary
            && let Ok(questions) = primary
                .questions
                .sample_questions(category_id, MAX_QUIZ_QUESTIONS)
                .await
        {
            return Ok(questions);
        }

        self.fallback
            .questions
            .sample_questions(category_id, MAX_QUIZ_QUESTIONS)
            .await
    }

    /// Validates and stores a question draft in the active backend.
    ///
    /// Never returns an error: validation failures, unknown categories and
    /// backend failures all surface as an unsuccessful outcome message.
    pub async fn insert_question(&self, draft: &QuestionDraft) -> InsertOutcome {
        if let Err(e) = draft.validate() {
            return InsertOutcome::rejected(e.to_string());
        }

        let storage = self.active();
        match storage.categories.category_exists(draft.category_id).await {
            Ok(true) => {}
            Ok(false) => {
                return InsertOutcome::rejected(format!(
                    "unknown category id {}",
                    draft.category_id.value()
                ));
            }
            Err(e) => return InsertOutcome::rejected(e.to_string()),
        }

        match storage
            .questions
            .insert_question(NewQuestionRecord::from_draft(draft))
            .await
        {
            Ok(id) => InsertOutcome {
                success: true,
                message: "Question added successfully!".into(),
                question_id: Some(id),
            },
            Err(e) => InsertOutcome::rejected(e.to_string()),
        }
    }
}

/// Minimal category list shown when no backend has any content.
fn built_in_categories() -> Vec<Category> {
    [
        (1, "Mathematics"),
        (2, "Language Arts"),
        (3, "Science"),
    ]
    .into_iter()
    .filter_map(|(id, name)| Category::new(CategoryId::new(id), name, None).ok())
    .collect()
}
