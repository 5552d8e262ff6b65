use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use study_core::model::{Category, CategoryId, ProgressStats, Question, QuestionId};

use crate::repository::{
    CategoryRecord, CategoryRepository, NewCategoryRecord, NewQuestionRecord, ProgressRecord,
    ProgressRepository, QuestionRecord, QuestionRepository, Storage, StorageError,
};

/// Key holding the JSON array of all question records.
pub const QUESTIONS_KEY: &str = "quiz_questions";
/// Key holding the JSON array of all category records.
pub const CATEGORIES_KEY: &str = "quiz_categories";
/// Key holding the JSON progress-statistics record.
pub const PROGRESS_KEY: &str = "study_progress_stats";
/// Key holding the total accumulated study-timer seconds.
pub const STUDY_TIME_KEY: &str = "total_study_seconds";

/// Key-value fallback backend.
///
/// Mirrors a browser localStorage layout: whole collections serialized as
/// JSON strings under fixed keys. There is no query engine, so random-order
/// sampling is done in application code with an in-memory shuffle.
#[derive(Clone, Default)]
pub struct KvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl KvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw string value under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    /// Stores a raw string value under `key`, replacing any prior value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the store lock is poisoned.
    pub fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value);
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn write_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set(key, raw)
    }

    fn read_categories(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        Ok(self.read_json(CATEGORIES_KEY)?.unwrap_or_default())
    }

    fn read_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        Ok(self.read_json(QUESTIONS_KEY)?.unwrap_or_default())
    }
}

#[async_trait]
impl CategoryRepository for KvStore {
    async fn insert_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        let mut records = self.read_categories()?;
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(CategoryRecord {
            id,
            name: record.name,
            description: record.description,
        });
        self.write_json(CATEGORIES_KEY, &records)?;
        Ok(CategoryId::new(id))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let mut categories = self
            .read_categories()?
            .into_iter()
            .map(CategoryRecord::into_category)
            .collect::<Result<Vec<_>, _>>()?;
        categories.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(categories)
    }

    async fn category_exists(&self, id: CategoryId) -> Result<bool, StorageError> {
        Ok(self.read_categories()?.iter().any(|r| r.id == id.value()))
    }
}

#[async_trait]
impl QuestionRepository for KvStore {
    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError> {
        let mut records = self.read_questions()?;
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(record.with_id(id));
        self.write_json(QUESTIONS_KEY, &records)?;
        Ok(QuestionId::new(id))
    }

    async fn sample_questions(
        &self,
        category_id: CategoryId,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError> {
        let mut matching: Vec<QuestionRecord> = self
            .read_questions()?
            .into_iter()
            .filter(|r| r.category_id == category_id.value())
            .collect();

        // No ORDER BY RANDOM() here; shuffle in application code instead.
        let mut rng = rand::rng();
        matching.shuffle(&mut rng);
        matching.truncate(limit as usize);

        matching
            .into_iter()
            .map(QuestionRecord::into_question)
            .collect()
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        Ok(self.read_questions()?.len() as u64)
    }
}

#[async_trait]
impl ProgressRepository for KvStore {
    async fn load_stats(&self) -> Result<Option<ProgressStats>, StorageError> {
        match self.read_json::<ProgressRecord>(PROGRESS_KEY)? {
            Some(record) => record.into_stats().map(Some),
            None => Ok(None),
        }
    }

    async fn save_stats(&self, stats: &ProgressStats) -> Result<(), StorageError> {
        self.write_json(PROGRESS_KEY, &ProgressRecord::from_stats(stats))
    }

    async fn load_study_seconds(&self) -> Result<u64, StorageError> {
        Ok(self.read_json(STUDY_TIME_KEY)?.unwrap_or(0))
    }

    async fn save_study_seconds(&self, seconds: u64) -> Result<(), StorageError> {
        self.write_json(STUDY_TIME_KEY, &seconds)
    }
}

impl Storage {
    /// Build a `Storage` backed by the key-value store.
    #[must_use]
    pub fn key_value(store: KvStore) -> Self {
        let categories: Arc<dyn CategoryRepository> = Arc::new(store.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(store);
        Self {
            categories,
            questions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_question(category_id: u64, text: &str) -> NewQuestionRecord {
        NewQuestionRecord {
            category_id,
            question_text: text.into(),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: "c".into(),
            option_d: "d".into(),
            correct_answer: "A".into(),
            explanation: None,
            difficulty: "easy".into(),
            subject: None,
            grade_level: None,
            time_estimate: None,
        }
    }

    #[tokio::test]
    async fn categories_list_ordered_by_name() {
        let store = KvStore::new();
        for name in ["Science", "History", "Mathematics"] {
            store
                .insert_category(NewCategoryRecord {
                    name: name.into(),
                    description: None,
                })
                .await
                .unwrap();
        }

        let listed = store.list_categories().await.unwrap();
        let names: Vec<&str> = listed.iter().map(Category::name).collect();
        assert_eq!(names, vec!["History", "Mathematics", "Science"]);
    }

    #[tokio::test]
    async fn sample_filters_by_category_and_caps_limit() {
        let store = KvStore::new();
        let cat = store
            .insert_category(NewCategoryRecord {
                name: "Mathematics".into(),
                description: None,
            })
            .await
            .unwrap();
        let other = store
            .insert_category(NewCategoryRecord {
                name: "Science".into(),
                description: None,
            })
            .await
            .unwrap();

        for i in 0..15 {
            store
                .insert_question(new_question(cat.value(), &format!("math {i}?")))
                .await
                .unwrap();
        }
        store
            .insert_question(new_question(other.value(), "science?"))
            .await
            .unwrap();

        let sampled = store.sample_questions(cat, 10).await.unwrap();
        assert_eq!(sampled.len(), 10);
        assert!(sampled.iter().all(|q| q.category_id() == cat));
    }

    #[tokio::test]
    async fn sample_of_empty_category_is_empty_not_an_error() {
        let store = KvStore::new();
        let sampled = store
            .sample_questions(CategoryId::new(42), 10)
            .await
            .unwrap();
        assert!(sampled.is_empty());
    }

    #[tokio::test]
    async fn sample_order_varies_across_calls() {
        let store = KvStore::new();
        let cat = store
            .insert_category(NewCategoryRecord {
                name: "Mathematics".into(),
                description: None,
            })
            .await
            .unwrap();
        for i in 0..12 {
            store
                .insert_question(new_question(cat.value(), &format!("q{i}?")))
                .await
                .unwrap();
        }

        // The chance of 20 independent draws all starting with the same
        // question is (1/12)^19; a stable first element means no shuffle.
        let mut first_ids = Vec::new();
        for _ in 0..20 {
            let sampled = store.sample_questions(cat, 10).await.unwrap();
            first_ids.push(sampled[0].id());
        }
        assert!(first_ids.iter().any(|id| *id != first_ids[0]));
    }

    #[tokio::test]
    async fn progress_and_study_time_roundtrip() {
        let store = KvStore::new();
        assert_eq!(store.load_stats().await.unwrap(), None);
        assert_eq!(store.load_study_seconds().await.unwrap(), 0);

        let mut stats = ProgressStats::new();
        stats.record_quiz(2, 5);
        store.save_stats(&stats).await.unwrap();
        store.save_study_seconds(1_234).await.unwrap();

        assert_eq!(store.load_stats().await.unwrap(), Some(stats));
        assert_eq!(store.load_study_seconds().await.unwrap(), 1_234);
    }

    #[tokio::test]
    async fn duplicate_question_content_is_accepted() {
        let store = KvStore::new();
        let first = store
            .insert_question(new_question(1, "same text?"))
            .await
            .unwrap();
        let second = store
            .insert_question(new_question(1, "same text?"))
            .await
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(store.count_questions().await.unwrap(), 2);
    }
}
