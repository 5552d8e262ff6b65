//! Built-in starter content.
//!
//! A fresh backend gets five categories and a small set of questions so a
//! quiz can be taken immediately. Seeding is guarded by the question count
//! only, so it is safe to call on every startup.

use study_core::model::CategoryId;

use crate::repository::{
    CategoryRepository, NewCategoryRecord, NewQuestionRecord, QuestionRepository, Storage,
    StorageError,
};

/// Number of categories the seed inserts.
pub const SEED_CATEGORY_COUNT: usize = 5;
/// Number of questions the seed inserts.
pub const SEED_QUESTION_COUNT: usize = 7;

struct SeedQuestion {
    category: usize,
    question_text: &'static str,
    options: [&'static str; 4],
    correct_answer: &'static str,
    explanation: &'static str,
    difficulty: &'static str,
    subject: &'static str,
    grade_level: &'static str,
    time_estimate: &'static str,
}

const SEED_CATEGORIES: [(&str, &str); SEED_CATEGORY_COUNT] = [
    ("Mathematics", "Arithmetic, algebra and geometry practice"),
    ("Language Arts", "Grammar, vocabulary and reading comprehension"),
    ("Science", "Biology, chemistry and physics fundamentals"),
    ("History", "World and national history"),
    ("Geography", "Maps, countries and physical geography"),
];

const SEED_QUESTIONS: [SeedQuestion; SEED_QUESTION_COUNT] = [
    SeedQuestion {
        category: 0,
        question_text: "What is 15 + 27?",
        options: ["40", "42", "44", "46"],
        correct_answer: "B",
        explanation: "15 + 27 = 42. Add the units first (5 + 7 = 12), carry the 1.",
        difficulty: "easy",
        subject: "Arithmetic",
        grade_level: "Elementary",
        time_estimate: "1 minute",
    },
    SeedQuestion {
        category: 0,
        question_text: "What is the area of a square with sides of 5 cm?",
        options: ["20 cm²", "25 cm²", "30 cm²", "35 cm²"],
        correct_answer: "B",
        explanation: "The area of a square is side × side, so 5 × 5 = 25 cm².",
        difficulty: "easy",
        subject: "Geometry",
        grade_level: "Elementary",
        time_estimate: "1 minute",
    },
    SeedQuestion {
        category: 0,
        question_text: "If 2x + 8 = 20, what is the value of x?",
        options: ["4", "6", "8", "10"],
        correct_answer: "B",
        explanation: "Subtract 8 from both sides (2x = 12), then divide by 2 (x = 6).",
        difficulty: "medium",
        subject: "Algebra",
        grade_level: "Middle school",
        time_estimate: "2 minutes",
    },
    SeedQuestion {
        category: 1,
        question_text: "Which sentence uses correct subject-verb agreement?",
        options: [
            "The children play in the park.",
            "The children plays in the park.",
            "The child play in the park.",
            "The childs play in the park.",
        ],
        correct_answer: "A",
        explanation: "A plural subject takes a plural verb: the children play.",
        difficulty: "medium",
        subject: "Grammar",
        grade_level: "Middle school",
        time_estimate: "2 minutes",
    },
    SeedQuestion {
        category: 1,
        question_text: "What figure of speech is used in \"The wind whispered secrets\"?",
        options: ["Personification", "Metaphor", "Simile", "Hyperbole"],
        correct_answer: "A",
        explanation: "Giving human behavior to the wind is personification.",
        difficulty: "medium",
        subject: "Literature",
        grade_level: "Middle school",
        time_estimate: "2 minutes",
    },
    SeedQuestion {
        category: 2,
        question_text: "Which organelle is known as the powerhouse of the cell?",
        options: ["Mitochondria", "Nucleus", "Ribosome", "Chloroplast"],
        correct_answer: "A",
        explanation: "Mitochondria produce most of the cell's ATP.",
        difficulty: "easy",
        subject: "Biology",
        grade_level: "Middle school",
        time_estimate: "1 minute",
    },
    SeedQuestion {
        category: 2,
        question_text: "What is the chemical symbol for gold?",
        options: ["Au", "Ag", "Fe", "Cu"],
        correct_answer: "A",
        explanation: "Au comes from the Latin name for gold, aurum.",
        difficulty: "easy",
        subject: "Chemistry",
        grade_level: "Middle school",
        time_estimate: "1 minute",
    },
];

/// Seeds starter categories and questions if the backend has no questions.
///
/// Returns `true` when seeding ran, `false` when the backend already had
/// content.
///
/// # Errors
///
/// Returns `StorageError` if the guard query or any insert fails.
pub async fn seed_if_empty(storage: &Storage) -> Result<bool, StorageError> {
    if storage.questions.count_questions().await? > 0 {
        return Ok(false);
    }

    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(SEED_CATEGORIES.len());
    for (name, description) in SEED_CATEGORIES {
        let id = storage
            .categories
            .insert_category(NewCategoryRecord {
                name: name.to_owned(),
                description: Some(description.to_owned()),
            })
            .await?;
        category_ids.push(id);
    }

    for seed in SEED_QUESTIONS {
        let [a, b, c, d] = seed.options;
        storage
            .questions
            .insert_question(NewQuestionRecord {
                category_id: category_ids[seed.category].value(),
                question_text: seed.question_text.to_owned(),
                option_a: a.to_owned(),
                option_b: b.to_owned(),
                option_c: c.to_owned(),
                option_d: d.to_owned(),
                correct_answer: seed.correct_answer.to_owned(),
                explanation: Some(seed.explanation.to_owned()),
                difficulty: seed.difficulty.to_owned(),
                subject: Some(seed.subject.to_owned()),
                grade_level: Some(seed.grade_level.to_owned()),
                time_estimate: Some(seed.time_estimate.to_owned()),
            })
            .await?;
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::KvStore;

    #[tokio::test]
    async fn seeds_once_and_only_once() {
        let storage = Storage::key_value(KvStore::new());

        assert!(seed_if_empty(&storage).await.unwrap());
        assert_eq!(
            storage.questions.count_questions().await.unwrap(),
            SEED_QUESTION_COUNT as u64
        );
        assert_eq!(
            storage.categories.list_categories().await.unwrap().len(),
            SEED_CATEGORY_COUNT
        );

        assert!(!seed_if_empty(&storage).await.unwrap());
        assert_eq!(
            storage.questions.count_questions().await.unwrap(),
            SEED_QUESTION_COUNT as u64
        );
    }

    #[tokio::test]
    async fn seed_content_passes_domain_validation() {
        let storage = Storage::key_value(KvStore::new());
        seed_if_empty(&storage).await.unwrap();

        for category in storage.categories.list_categories().await.unwrap() {
            let sampled = storage
                .questions
                .sample_questions(category.id(), 10)
                .await
                .unwrap();
            for question in &sampled {
                assert_eq!(question.category_id(), category.id());
                assert!(!question.question_text().is_empty());
            }
        }
    }
}
