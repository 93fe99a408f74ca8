use std::sync::Arc;

use permit_core::catalog::QuestionBank;
use permit_core::{Clock, LocalCalendar};
use storage::{ProgressStore, Storage};

use crate::error::AppServicesError;
use crate::exam_service::ExamService;
use crate::progress_service::ProgressService;
use crate::review_lists::ReviewListService;

/// Assembles app-facing services over one progress store.
#[derive(Clone)]
pub struct AppServices {
    bank: Arc<QuestionBank>,
    progress: Arc<ProgressService>,
    exams: Arc<ExamService>,
    review_lists: Arc<ReviewListService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if the database cannot be opened or migrated.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        calendar: LocalCalendar,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, calendar, QuestionBank::seed()))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock, calendar: LocalCalendar) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, calendar, QuestionBank::seed())
    }

    #[must_use]
    pub fn from_storage(
        storage: &Storage,
        clock: Clock,
        calendar: LocalCalendar,
        bank: QuestionBank,
    ) -> Self {
        let store = Arc::new(ProgressStore::new(Arc::clone(&storage.kv), clock));
        let bank = Arc::new(bank);

        let progress = Arc::new(ProgressService::new(Arc::clone(&store), calendar));
        let exams = Arc::new(ExamService::new(Arc::clone(&store), Arc::clone(&bank)));
        let review_lists = Arc::new(ReviewListService::new(store, Arc::clone(&bank)));

        Self {
            bank,
            progress,
            exams,
            review_lists,
        }
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBank> {
        Arc::clone(&self.bank)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn exams(&self) -> Arc<ExamService> {
        Arc::clone(&self.exams)
    }

    #[must_use]
    pub fn review_lists(&self) -> Arc<ReviewListService> {
        Arc::clone(&self.review_lists)
    }
}
