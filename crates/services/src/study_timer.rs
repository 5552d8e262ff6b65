use std::sync::Arc;

use chrono::{DateTime, Utc};

use storage::repository::{ProgressRepository, StorageError};

/// Accumulates study time across sessions.
///
/// A running stretch accrues from its start timestamp; pausing or
/// resetting folds the stretch into the persisted lifetime total. Callers
/// pass the current time in so the timer stays deterministic under a fixed
/// clock.
pub struct StudyTimer {
    repo: Arc<dyn ProgressRepository>,
    persisted_seconds: u64,
    running_since: Option<DateTime<Utc>>,
}

impl StudyTimer {
    /// Loads the lifetime total and starts paused.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if loading fails.
    pub async fn load(repo: Arc<dyn ProgressRepository>) -> Result<Self, StorageError> {
        let persisted_seconds = repo.load_study_seconds().await?;
        Ok(Self {
            repo,
            persisted_seconds,
            running_since: None,
        })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Starts accruing time. A no-op while already running.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Seconds accrued by the current running stretch.
    #[must_use]
    pub fn session_seconds(&self, now: DateTime<Utc>) -> u64 {
        match self.running_since {
            Some(since) => u64::try_from((now - since).num_seconds().max(0)).unwrap_or(0),
            None => 0,
        }
    }

    /// Lifetime total including the current running stretch.
    #[must_use]
    pub fn total_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.persisted_seconds
            .saturating_add(self.session_seconds(now))
    }

    /// Stops the timer, folding the current stretch into the persisted
    /// total. A no-op while paused.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails; the stretch is still
    /// folded into the in-memory total then.
    pub async fn pause(&mut self, now: DateTime<Utc>) -> Result<(), StorageError> {
        if let Some(since) = self.running_since.take() {
            let stretch = u64::try_from((now - since).num_seconds().max(0)).unwrap_or(0);
            self.persisted_seconds = self.persisted_seconds.saturating_add(stretch);
            self.repo.save_study_seconds(self.persisted_seconds).await?;
        }
        Ok(())
    }

    /// Stops the timer and clears the current stretch. The stretch is
    /// folded into the persisted total first, as with [`StudyTimer::pause`].
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if persisting fails.
    pub async fn reset(&mut self, now: DateTime<Utc>) -> Result<(), StorageError> {
        self.pause(now).await
    }

    /// Formats a second count as `HH:MM:SS`.
    #[must_use]
    pub fn format_hms(seconds: u64) -> String {
        let hours = seconds / 3600;
        let minutes = (seconds % 3600) / 60;
        let secs = seconds % 60;
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::kv::KvStore;
    use study_core::time::fixed_now;

    #[tokio::test]
    async fn pausing_folds_the_stretch_into_the_total() {
        let store = KvStore::new();
        let mut timer = StudyTimer::load(Arc::new(store.clone())).await.unwrap();

        let t0 = fixed_now();
        timer.start(t0);
        assert!(timer.is_running());

        let t1 = t0 + Duration::seconds(90);
        assert_eq!(timer.session_seconds(t1), 90);
        assert_eq!(timer.total_seconds(t1), 90);

        timer.pause(t1).await.unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.session_seconds(t1), 0);
        assert_eq!(timer.total_seconds(t1), 90);

        // The total survives a reload.
        let reloaded = StudyTimer::load(Arc::new(store)).await.unwrap();
        assert_eq!(reloaded.total_seconds(t1), 90);
    }

    #[tokio::test]
    async fn start_and_pause_are_idempotent() {
        let mut timer = StudyTimer::load(Arc::new(KvStore::new())).await.unwrap();

        let t0 = fixed_now();
        timer.start(t0);
        timer.start(t0 + Duration::seconds(30));
        assert_eq!(timer.session_seconds(t0 + Duration::seconds(60)), 60);

        timer.pause(t0 + Duration::seconds(60)).await.unwrap();
        timer.pause(t0 + Duration::seconds(120)).await.unwrap();
        assert_eq!(timer.total_seconds(t0 + Duration::seconds(120)), 60);
    }

    #[tokio::test]
    async fn reset_persists_the_running_stretch() {
        let store = KvStore::new();
        let mut timer = StudyTimer::load(Arc::new(store.clone())).await.unwrap();

        let t0 = fixed_now();
        timer.start(t0);
        let t1 = t0 + Duration::seconds(300);
        timer.reset(t1).await.unwrap();

        assert!(!timer.is_running());
        assert_eq!(timer.session_seconds(t1 + Duration::seconds(10)), 0);
        assert_eq!(timer.total_seconds(t1), 300);
        assert_eq!(store.load_study_seconds().await.unwrap(), 300);
    }

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(StudyTimer::format_hms(0), "00:00:00");
        assert_eq!(StudyTimer::format_hms(61), "00:01:01");
        assert_eq!(StudyTimer::format_hms(3_725), "01:02:05");
        assert_eq!(StudyTimer::format_hms(360_000), "100:00:00");
    }
}
