use std::sync::{Arc, Mutex};

use storage::repository::{ProgressRepository, StorageError};
use study_core::model::ProgressStats;

/// Cumulative study statistics, loaded once and persisted after every
/// update.
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
    stats: Mutex<ProgressStats>,
}

impl ProgressService {
    /// Loads persisted statistics, starting from zero when none exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if loading fails.
    pub async fn load(repo: Arc<dyn ProgressRepository>) -> Result<Self, StorageError> {
        let stats = repo.load_stats().await?.unwrap_or_default();
        Ok(Self {
            repo,
            stats: Mutex::new(stats),
        })
    }

    /// Current statistics.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the stats lock is poisoned.
    pub fn snapshot(&self) -> Result<ProgressStats, StorageError> {
        let guard = self
            .stats
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(*guard)
    }

    /// Folds one quiz submission into the totals and persists them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails; the in-memory totals are
    /// already updated at that point.
    pub async fn record_quiz(&self, correct: u32, total: u32) -> Result<ProgressStats, StorageError> {
        let updated = {
            let mut guard = self
                .stats
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.record_quiz(correct, total);
            *guard
        };
        self.repo.save_stats(&updated).await?;
        Ok(updated)
    }

    /// Counts one completed exercise and persists the totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub async fn record_exercise(&self) -> Result<ProgressStats, StorageError> {
        let updated = {
            let mut guard = self
                .stats
                .lock()
                .map_err(|e| StorageError::Connection(e.to_string()))?;
            guard.record_exercise();
            *guard
        };
        self.repo.save_stats(&updated).await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::kv::KvStore;

    #[tokio::test]
    async fn starts_from_zero_when_nothing_persisted() {
        let service = ProgressService::load(Arc::new(KvStore::new())).await.unwrap();
        let stats = service.snapshot().unwrap();
        assert_eq!(stats.questions_answered(), 0);
        assert_eq!(stats.accuracy_percent(), 0);
    }

    #[tokio::test]
    async fn updates_survive_a_reload() {
        let store = KvStore::new();
        let repo: Arc<dyn ProgressRepository> = Arc::new(store.clone());

        let service = ProgressService::load(Arc::clone(&repo)).await.unwrap();
        service.record_quiz(3, 5).await.unwrap();
        service.record_quiz(2, 5).await.unwrap();
        service.record_exercise().await.unwrap();

        let reloaded = ProgressService::load(Arc::new(store)).await.unwrap();
        let stats = reloaded.snapshot().unwrap();
        assert_eq!(stats.questions_answered(), 10);
        assert_eq!(stats.correct_answers(), 5);
        assert_eq!(stats.exercises_completed(), 1);
        assert_eq!(stats.accuracy_percent(), 50);
    }
}
