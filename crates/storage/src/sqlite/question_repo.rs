use chrono::Utc;
use sqlx::Row;

use study_core::model::{CategoryId, Question, QuestionId};

use super::SqliteBackend;
use super::mapping::{category_id_to_i64, map_question_row, question_id_from_i64};
use crate::repository::{NewQuestionRecord, QuestionRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteBackend {
    async fn insert_question(&self, record: NewQuestionRecord) -> Result<QuestionId, StorageError> {
        let category_id = i64::try_from(record.category_id)
            .map_err(|_| StorageError::Serialization("category_id overflow".into()))?;

        let res = sqlx::query(
            r"
            INSERT INTO questions (
                category_id, question_text,
                option_a, option_b, option_c, option_d,
                correct_answer, explanation, difficulty,
                subject, grade_level, time_estimate, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ",
        )
        .bind(category_id)
        .bind(record.question_text)
        .bind(record.option_a)
        .bind(record.option_b)
        .bind(record.option_c)
        .bind(record.option_d)
        .bind(record.correct_answer)
        .bind(record.explanation)
        .bind(record.difficulty)
        .bind(record.subject)
        .bind(record.grade_level)
        .bind(record.time_estimate)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn sample_questions(
        &self,
        category_id: CategoryId,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, category_id, question_text,
                   option_a, option_b, option_c, option_d,
                   correct_answer, explanation, difficulty,
                   subject, grade_level, time_estimate
            FROM questions
            WHERE category_id = ?1
            ORDER BY RANDOM()
            LIMIT ?2
            ",
        )
        .bind(category_id_to_i64(category_id)?)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn count_questions(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM questions")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(|_| StorageError::Serialization("count sign overflow".into()))
    }
}
