use std::sync::Arc;
use std::time::Duration;

use storage::kv::KvStore;
use storage::repository::{ProgressRepository, Storage};
use storage::seed::seed_if_empty;
use study_core::Clock;

use crate::error::BootstrapError;
use crate::flashcard_service::FlashcardService;
use crate::progress_service::ProgressService;
use crate::question_store::QuestionStore;
use crate::quiz_service::QuizService;
use crate::study_timer::StudyTimer;

/// How app services come up.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// `SQLite` URL for the primary backend; `None` runs on the fallback
    /// only.
    pub database_url: Option<String>,
    /// Cap on how long primary initialization may take before the app
    /// degrades to the fallback.
    pub init_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            init_timeout: Duration::from_secs(5),
        }
    }
}

impl BootstrapConfig {
    #[must_use]
    pub fn with_database_url(url: impl Into<String>) -> Self {
        Self {
            database_url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Assembles the question store, progress totals and per-feature services.
pub struct AppServices {
    store: Arc<QuestionStore>,
    progress: Arc<ProgressService>,
    progress_repo: Arc<dyn ProgressRepository>,
    clock: Clock,
}

impl AppServices {
    /// Brings the backends up and seeds starter content.
    ///
    /// Primary initialization failures (connect errors, timeouts, a failing
    /// seed) degrade to the key-value fallback without surfacing an error;
    /// [`AppServices::is_degraded`] reports which side is active.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` only if the fallback itself fails.
    pub async fn bootstrap(config: BootstrapConfig, clock: Clock) -> Result<Self, BootstrapError> {
        let kv = KvStore::new();
        let fallback = Storage::key_value(kv.clone());

        let mut primary = match &config.database_url {
            Some(url) => match tokio::time::timeout(config.init_timeout, Storage::sqlite(url)).await
            {
                Ok(Ok(storage)) => Some(storage),
                Ok(Err(_)) | Err(_) => None,
            },
            None => None,
        };

        if let Some(storage) = &primary
            && seed_if_empty(storage).await.is_err()
        {
            primary = None;
        }
        if primary.is_none() {
            seed_if_empty(&fallback).await?;
        }

        let store = Arc::new(QuestionStore::new(primary, fallback));
        let progress_repo: Arc<dyn ProgressRepository> = Arc::new(kv);
        let progress = Arc::new(ProgressService::load(Arc::clone(&progress_repo)).await?);

        Ok(Self {
            store,
            progress,
            progress_repo,
            clock,
        })
    }

    /// True when the app runs on the key-value fallback.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }

    #[must_use]
    pub fn question_store(&self) -> Arc<QuestionStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// A fresh quiz driver over the shared store and progress totals.
    #[must_use]
    pub fn quiz_service(&self) -> QuizService {
        QuizService::new(
            Arc::clone(&self.store),
            Arc::clone(&self.progress),
            self.clock,
        )
    }

    /// A study timer over the persisted lifetime total.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` if the total cannot be loaded.
    pub async fn study_timer(&self) -> Result<StudyTimer, BootstrapError> {
        Ok(StudyTimer::load(Arc::clone(&self.progress_repo)).await?)
    }

    /// A flashcard deck session over the built-in starter cards.
    #[must_use]
    pub fn flashcards(&self) -> FlashcardService {
        FlashcardService::builtin()
    }
}
