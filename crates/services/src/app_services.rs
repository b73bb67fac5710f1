use std::sync::Arc;

use lesson_core::model::LessonCatalog;
use storage::repository::Storage;
use tracing::info;

use crate::Clock;
use crate::error::{AppServicesError, RunnerError};
use crate::lessons::LessonRunner;
use crate::progress::ProgressStore;
use crate::provider::{ContentProvider, GenerativeContentProvider};

/// Assembles the app-facing services over one storage backend and one catalog.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<LessonCatalog>,
    progress: Arc<ProgressStore>,
    provider: Arc<dyn ContentProvider>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage, the built-in catalog, and a provider
    /// configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let provider: Arc<dyn ContentProvider> = Arc::new(GenerativeContentProvider::from_env());
        Ok(Self::from_parts(
            clock,
            storage,
            Arc::new(LessonCatalog::thai_starter()),
            provider,
        ))
    }

    /// Wire services from already-built parts.
    #[must_use]
    pub fn from_parts(
        clock: Clock,
        storage: Storage,
        catalog: Arc<LessonCatalog>,
        provider: Arc<dyn ContentProvider>,
    ) -> Self {
        info!(lessons = catalog.len(), "app services ready");
        let progress = Arc::new(ProgressStore::new(
            clock,
            Arc::clone(&storage.progress),
            Arc::clone(&catalog),
        ));
        Self {
            catalog,
            progress,
            provider,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<LessonCatalog> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn progress_store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn provider(&self) -> Arc<dyn ContentProvider> {
        Arc::clone(&self.provider)
    }

    /// Enter a lesson with this app's store and provider.
    ///
    /// # Errors
    ///
    /// Returns `RunnerError::UnknownLesson` if the catalog has no such lesson.
    pub async fn open_lesson(&self, lesson_id: &str) -> Result<LessonRunner, RunnerError> {
        LessonRunner::open(lesson_id, self.progress_store(), self.provider()).await
    }
}
