//! Record stores for everything the app remembers about the user.
//!
//! Every collection is one JSON document under one key and every mutation
//! rewrites that document as a whole. Mutations on the same collection are
//! serialized through a per-collection lock and run on their own tokio task,
//! so a caller that stops waiting never cancels a write halfway. Separate
//! `ProgressStore` instances (or processes) sharing an adapter are still
//! last-write-wins.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use permit_core::Clock;
use permit_core::model::{
    Bookmark, CategoryId, CategoryProgress, MissedQuestion, NewQuestionAttempt, NewTestResult,
    QuestionAttempt, QuestionId, StoredUserSettings, TestId, TestRecord, UserSettings,
    UserSettingsPatch,
};

use crate::collection::JsonCollection;
use crate::repository::{KeyValueStore, StorageError};

pub const USER_SETTINGS_KEY: &str = "permit:user_settings";
pub const CATEGORY_PROGRESS_KEY: &str = "permit:category_progress";
pub const QUESTION_ATTEMPTS_KEY: &str = "permit:question_attempts";
pub const BOOKMARKS_KEY: &str = "permit:bookmarks";
pub const MISSED_QUESTIONS_KEY: &str = "permit:missed_questions";
pub const TEST_HISTORY_KEY: &str = "permit:test_history";

pub const ALL_KEYS: [&str; 6] = [
    USER_SETTINGS_KEY,
    CATEGORY_PROGRESS_KEY,
    QUESTION_ATTEMPTS_KEY,
    BOOKMARKS_KEY,
    MISSED_QUESTIONS_KEY,
    TEST_HISTORY_KEY,
];

/// Most recent attempts kept in the attempt log.
pub const ATTEMPT_LOG_CAP: usize = 1000;
/// Most recent tests kept in the test history.
pub const TEST_HISTORY_CAP: usize = 50;

/// What `mark_missed_question_correct` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissedOutcome {
    /// The question was not in the missed set.
    NotTracked,
    /// Still in the set with the given streak.
    Progressed { correct_streak: u32 },
    /// Reached the graduation streak and was removed.
    Graduated,
}

#[derive(Default)]
struct CollectionLocks {
    settings: Mutex<()>,
    progress: Mutex<()>,
    attempts: Mutex<()>,
    bookmarks: Mutex<()>,
    missed: Mutex<()>,
    tests: Mutex<()>,
}

/// Typed access to the six persisted collections.
#[derive(Clone)]
pub struct ProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
    locks: Arc<CollectionLocks>,
    settings: JsonCollection<StoredUserSettings>,
    progress: JsonCollection<Vec<CategoryProgress>>,
    attempts: JsonCollection<Vec<QuestionAttempt>>,
    bookmarks: JsonCollection<Vec<Bookmark>>,
    missed: JsonCollection<Vec<MissedQuestion>>,
    tests: JsonCollection<Vec<TestRecord>>,
}

impl ProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self {
            settings: JsonCollection::new(Arc::clone(&kv), USER_SETTINGS_KEY),
            progress: JsonCollection::new(Arc::clone(&kv), CATEGORY_PROGRESS_KEY),
            attempts: JsonCollection::new(Arc::clone(&kv), QUESTION_ATTEMPTS_KEY),
            bookmarks: JsonCollection::new(Arc::clone(&kv), BOOKMARKS_KEY),
            missed: JsonCollection::new(Arc::clone(&kv), MISSED_QUESTIONS_KEY),
            tests: JsonCollection::new(Arc::clone(&kv), TEST_HISTORY_KEY),
            locks: Arc::new(CollectionLocks::default()),
            clock,
            kv,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Run a read-modify-write on its own task.
    ///
    /// The write completes even if the caller stops awaiting the result.
    async fn detached<T, F, Fut>(&self, op: F) -> Result<T, StorageError>
    where
        F: FnOnce(ProgressStore) -> Fut,
        Fut: Future<Output = Result<T, StorageError>> + Send + 'static,
        T: Send + 'static,
    {
        tokio::spawn(op(self.clone()))
            .await
            .map_err(|e| StorageError::Interrupted(e.to_string()))?
    }

    //
    // ─── USER SETTINGS ─────────────────────────────────────────────────────────
    //

    /// Current settings, or defaults if nothing was saved yet.
    pub async fn get_user_settings(&self) -> UserSettings {
        self.settings
            .load()
            .await
            .unwrap_or_default()
            .into_settings(self.clock.now())
    }

    /// Merge `patch` onto the current settings and persist the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_user_settings(
        &self,
        patch: UserSettingsPatch,
    ) -> Result<UserSettings, StorageError> {
        self.detached(move |store| async move { store.merge_settings(patch).await })
            .await
    }

    async fn merge_settings(&self, patch: UserSettingsPatch) -> Result<UserSettings, StorageError> {
        let _guard = self.locks.settings.lock().await;
        let now = self.clock.now();
        let updated = self.get_user_settings().await.merged(patch, now);
        self.settings
            .store(&StoredUserSettings::from(updated.clone()))
            .await?;
        Ok(updated)
    }

    pub async fn is_onboarding_complete(&self) -> bool {
        self.get_user_settings().await.onboarding_complete
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn complete_onboarding(&self) -> Result<UserSettings, StorageError> {
        self.save_user_settings(UserSettingsPatch::new().onboarding_complete(true))
            .await
    }

    //
    // ─── CATEGORY PROGRESS ─────────────────────────────────────────────────────
    //

    pub async fn get_category_progress(&self) -> Vec<CategoryProgress> {
        self.progress.load_all().await
    }

    pub async fn get_category_progress_by_id(
        &self,
        category_id: &CategoryId,
    ) -> Option<CategoryProgress> {
        self.get_category_progress()
            .await
            .into_iter()
            .find(|p| &p.category_id == category_id)
    }

    /// Count one answer in `category_id`, creating its record on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn update_category_progress(
        &self,
        category_id: &CategoryId,
        is_correct: bool,
    ) -> Result<CategoryProgress, StorageError> {
        let category_id = category_id.clone();
        self.detached(move |store| async move {
            store.count_answer(&category_id, is_correct).await
        })
        .await
    }

    async fn count_answer(
        &self,
        category_id: &CategoryId,
        is_correct: bool,
    ) -> Result<CategoryProgress, StorageError> {
        let _guard = self.locks.progress.lock().await;
        let now = self.clock.now();
        let mut progress = self.progress.load_all().await;

        let updated = match progress.iter_mut().find(|p| &p.category_id == category_id) {
            Some(record) => {
                record.record_attempt(is_correct, now);
                record.clone()
            }
            None => {
                let record = CategoryProgress::first_attempt(category_id.clone(), is_correct, now);
                progress.push(record.clone());
                record
            }
        };

        self.progress.store(&progress).await?;
        debug!(category = %category_id, attempted = updated.questions_attempted, "category progress updated");
        Ok(updated)
    }

    //
    // ─── QUESTION ATTEMPTS ─────────────────────────────────────────────────────
    //

    pub async fn get_question_attempts(&self) -> Vec<QuestionAttempt> {
        self.attempts.load_all().await
    }

    /// Append to the attempt log, keeping only the latest `ATTEMPT_LOG_CAP` entries.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_question_attempt(
        &self,
        attempt: NewQuestionAttempt,
    ) -> Result<QuestionAttempt, StorageError> {
        self.detached(move |store| async move { store.append_attempt(attempt).await })
            .await
    }

    async fn append_attempt(
        &self,
        attempt: NewQuestionAttempt,
    ) -> Result<QuestionAttempt, StorageError> {
        let _guard = self.locks.attempts.lock().await;
        let mut attempts = self.attempts.load_all().await;
        let stamped = attempt.stamped(self.clock.now());
        attempts.push(stamped.clone());
        keep_latest(&mut attempts, ATTEMPT_LOG_CAP);

        self.attempts.store(&attempts).await?;
        debug!(question = %stamped.question_id, logged = attempts.len(), "attempt saved");
        Ok(stamped)
    }

    //
    // ─── BOOKMARKS ─────────────────────────────────────────────────────────────
    //

    pub async fn get_bookmarks(&self) -> Vec<Bookmark> {
        self.bookmarks.load_all().await
    }

    /// Bookmark a question. Returns `false` if it was already bookmarked.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn add_bookmark(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
    ) -> Result<bool, StorageError> {
        let (question_id, category_id) = (question_id.clone(), category_id.clone());
        self.detached(move |store| async move {
            store.insert_bookmark(question_id, category_id).await
        })
        .await
    }

    async fn insert_bookmark(
        &self,
        question_id: QuestionId,
        category_id: CategoryId,
    ) -> Result<bool, StorageError> {
        let _guard = self.locks.bookmarks.lock().await;
        let mut bookmarks = self.bookmarks.load_all().await;
        if bookmarks.iter().any(|b| b.question_id == question_id) {
            return Ok(false);
        }

        bookmarks.push(Bookmark {
            question_id,
            category_id,
            added_at: self.clock.now(),
        });
        self.bookmarks.store(&bookmarks).await?;
        Ok(true)
    }

    /// Remove a bookmark. Returns `false` if there was none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn remove_bookmark(&self, question_id: &QuestionId) -> Result<bool, StorageError> {
        let question_id = question_id.clone();
        self.detached(move |store| async move { store.delete_bookmark(&question_id).await })
            .await
    }

    async fn delete_bookmark(&self, question_id: &QuestionId) -> Result<bool, StorageError> {
        let _guard = self.locks.bookmarks.lock().await;
        let mut bookmarks = self.bookmarks.load_all().await;
        let before = bookmarks.len();
        bookmarks.retain(|b| &b.question_id != question_id);
        if bookmarks.len() == before {
            return Ok(false);
        }

        self.bookmarks.store(&bookmarks).await?;
        Ok(true)
    }

    pub async fn is_bookmarked(&self, question_id: &QuestionId) -> bool {
        self.get_bookmarks()
            .await
            .iter()
            .any(|b| &b.question_id == question_id)
    }

    //
    // ─── MISSED QUESTIONS ──────────────────────────────────────────────────────
    //

    pub async fn get_missed_questions(&self) -> Vec<MissedQuestion> {
        self.missed.load_all().await
    }

    /// Record a wrong answer: start tracking the question or reset its streak.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn add_missed_question(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
    ) -> Result<MissedQuestion, StorageError> {
        let (question_id, category_id) = (question_id.clone(), category_id.clone());
        self.detached(move |store| async move { store.track_miss(question_id, category_id).await })
            .await
    }

    async fn track_miss(
        &self,
        question_id: QuestionId,
        category_id: CategoryId,
    ) -> Result<MissedQuestion, StorageError> {
        let _guard = self.locks.missed.lock().await;
        let now = self.clock.now();
        let mut missed = self.missed.load_all().await;

        let record = match missed.iter_mut().find(|m| m.question_id == question_id) {
            Some(existing) => {
                existing.register_miss(now);
                existing.clone()
            }
            None => {
                let record = MissedQuestion::new(question_id, category_id, now);
                missed.push(record.clone());
                record
            }
        };

        self.missed.store(&missed).await?;
        Ok(record)
    }

    /// Record a correct answer to a tracked question, dropping it once it graduates.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn mark_missed_question_correct(
        &self,
        question_id: &QuestionId,
    ) -> Result<MissedOutcome, StorageError> {
        let question_id = question_id.clone();
        self.detached(move |store| async move { store.track_correct(&question_id).await })
            .await
    }

    async fn track_correct(&self, question_id: &QuestionId) -> Result<MissedOutcome, StorageError> {
        let _guard = self.locks.missed.lock().await;
        let mut missed = self.missed.load_all().await;
        let Some(index) = missed.iter().position(|m| &m.question_id == question_id) else {
            return Ok(MissedOutcome::NotTracked);
        };

        let outcome = if missed[index].register_correct() {
            missed.remove(index);
            MissedOutcome::Graduated
        } else {
            MissedOutcome::Progressed {
                correct_streak: missed[index].correct_streak,
            }
        };

        self.missed.store(&missed).await?;
        if outcome == MissedOutcome::Graduated {
            debug!(question = %question_id, "missed question graduated");
        }
        Ok(outcome)
    }

    //
    // ─── TEST HISTORY ──────────────────────────────────────────────────────────
    //

    pub async fn get_test_history(&self) -> Vec<TestRecord> {
        self.tests.load_all().await
    }

    pub async fn get_test_by_id(&self, id: &TestId) -> Option<TestRecord> {
        self.get_test_history().await.into_iter().find(|t| &t.id == id)
    }

    /// Stamp, append and cap the test history. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn save_test_result(&self, test: NewTestResult) -> Result<TestRecord, StorageError> {
        self.detached(move |store| async move { store.append_test(test).await })
            .await
    }

    async fn append_test(&self, test: NewTestResult) -> Result<TestRecord, StorageError> {
        let _guard = self.locks.tests.lock().await;
        let now = self.clock.now();
        let mut history = self.tests.load_all().await;

        let mut millis = now.timestamp_millis();
        let mut id = TestId::from_millis(millis);
        while history.iter().any(|t| t.id == id) {
            millis += 1;
            id = TestId::from_millis(millis);
        }

        let record = test.into_record(id, now);
        history.push(record.clone());
        keep_latest(&mut history, TEST_HISTORY_CAP);

        self.tests.store(&history).await?;
        info!(test = %record.id, score = record.score, total = record.total_questions, passed = record.passed, "test result saved");
        Ok(record)
    }

    //
    // ─── RESET ─────────────────────────────────────────────────────────────────
    //

    /// Delete every collection. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the adapter fails to delete.
    pub async fn clear_all_data(&self) -> Result<(), StorageError> {
        self.detached(|store| async move { store.remove_all().await })
            .await
    }

    async fn remove_all(&self) -> Result<(), StorageError> {
        let _settings = self.locks.settings.lock().await;
        let _progress = self.locks.progress.lock().await;
        let _attempts = self.locks.attempts.lock().await;
        let _bookmarks = self.locks.bookmarks.lock().await;
        let _missed = self.locks.missed.lock().await;
        let _tests = self.locks.tests.lock().await;

        self.kv.remove_many(&ALL_KEYS).await?;
        info!("all progress data cleared");
        Ok(())
    }
}

/// Drop the oldest entries (by insertion order) beyond `cap`.
fn keep_latest<T>(items: &mut Vec<T>, cap: usize) {
    if items.len() > cap {
        let excess = items.len() - cap;
        items.drain(..excess);
    }
}
