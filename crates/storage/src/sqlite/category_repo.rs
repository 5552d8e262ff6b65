use chrono::Utc;

use study_core::model::{Category, CategoryId};

use super::SqliteBackend;
use super::mapping::{category_id_from_i64, category_id_to_i64, map_category_row};
use crate::repository::{CategoryRepository, NewCategoryRecord, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for SqliteBackend {
    async fn insert_category(&self, record: NewCategoryRecord) -> Result<CategoryId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO categories (name, description, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(record.name)
        .bind(record.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        category_id_from_i64(res.last_insert_rowid())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description
            FROM categories
            ORDER BY name ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut categories = Vec::with_capacity(rows.len());
        for row in rows {
            categories.push(map_category_row(&row)?);
        }
        Ok(categories)
    }

    async fn category_exists(&self, id: CategoryId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM categories WHERE id = ?1")
            .bind(category_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(row.is_some())
    }
}
