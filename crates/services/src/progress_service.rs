use std::sync::Arc;

use tracing::debug;

use permit_core::LocalCalendar;
use permit_core::metrics::{self, OverallStats, ReadinessFactors};
use permit_core::model::{
    Bookmark, CategoryId, CategoryProgress, MissedQuestion, NewQuestionAttempt, NewTestResult,
    QuestionAttempt, QuestionId, TestId, TestRecord, UserSettings, UserSettingsPatch,
};
use storage::{MissedOutcome, ProgressStore, StorageError};

use crate::error::ProgressServiceError;

/// What happened to the missed-question list after an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissedUpdate {
    /// The answer was wrong; the question is tracked with a reset streak.
    Missed(MissedQuestion),
    /// The answer was right; outcome for the tracked entry, if any.
    Corrected(MissedOutcome),
}

/// Everything a single practice answer touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub attempt: QuestionAttempt,
    pub category: CategoryProgress,
    pub missed: MissedUpdate,
}

/// Study-facing facade over the progress store plus the derived metrics.
#[derive(Clone)]
pub struct ProgressService {
    store: Arc<ProgressStore>,
    calendar: LocalCalendar,
}

impl ProgressService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, calendar: LocalCalendar) -> Self {
        Self { store, calendar }
    }

    #[must_use]
    pub fn store(&self) -> Arc<ProgressStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn calendar(&self) -> LocalCalendar {
        self.calendar
    }

    //
    // ─── SETTINGS ──────────────────────────────────────────────────────────────
    //

    pub async fn get_user_settings(&self) -> UserSettings {
        self.store.get_user_settings().await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the settings cannot be written.
    pub async fn save_user_settings(
        &self,
        patch: UserSettingsPatch,
    ) -> Result<UserSettings, ProgressServiceError> {
        Ok(self.store.save_user_settings(patch).await?)
    }

    pub async fn is_onboarding_complete(&self) -> bool {
        self.store.is_onboarding_complete().await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the settings cannot be written.
    pub async fn complete_onboarding(&self) -> Result<UserSettings, ProgressServiceError> {
        Ok(self.store.complete_onboarding().await?)
    }

    //
    // ─── PRACTICE ──────────────────────────────────────────────────────────────
    //

    /// Record one practice answer.
    ///
    /// Appends the attempt, bumps category progress, then either tracks the
    /// question as missed or advances its correct streak. The sequence runs
    /// on its own task, so it finishes even if the caller stops waiting.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if any step fails to persist.
    /// Steps already written stay written.
    pub async fn record_answer(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
        selected_answer: i32,
        is_correct: bool,
    ) -> Result<AnswerOutcome, ProgressServiceError> {
        let store = Arc::clone(&self.store);
        let (question_id, category_id) = (question_id.clone(), category_id.clone());
        let task = tokio::spawn(async move {
            apply_answer(&store, &question_id, &category_id, selected_answer, is_correct).await
        });
        task.await
            .map_err(|e| StorageError::Interrupted(e.to_string()))?
    }

    pub async fn get_category_progress(&self) -> Vec<CategoryProgress> {
        self.store.get_category_progress().await
    }

    pub async fn get_category_progress_by_id(
        &self,
        category_id: &CategoryId,
    ) -> Option<CategoryProgress> {
        self.store.get_category_progress_by_id(category_id).await
    }

    pub async fn get_question_attempts(&self) -> Vec<QuestionAttempt> {
        self.store.get_question_attempts().await
    }

    //
    // ─── BOOKMARKS & MISSED ────────────────────────────────────────────────────
    //

    pub async fn get_bookmarks(&self) -> Vec<Bookmark> {
        self.store.get_bookmarks().await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the bookmark list cannot be written.
    pub async fn add_bookmark(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
    ) -> Result<bool, ProgressServiceError> {
        Ok(self.store.add_bookmark(question_id, category_id).await?)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the bookmark list cannot be written.
    pub async fn remove_bookmark(&self, question_id: &QuestionId) -> Result<bool, ProgressServiceError> {
        Ok(self.store.remove_bookmark(question_id).await?)
    }

    /// Add the bookmark if absent, remove it otherwise. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the bookmark list cannot be written.
    pub async fn toggle_bookmark(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
    ) -> Result<bool, ProgressServiceError> {
        if self.store.remove_bookmark(question_id).await? {
            Ok(false)
        } else {
            self.store.add_bookmark(question_id, category_id).await?;
            Ok(true)
        }
    }

    pub async fn is_bookmarked(&self, question_id: &QuestionId) -> bool {
        self.store.is_bookmarked(question_id).await
    }

    pub async fn get_missed_questions(&self) -> Vec<MissedQuestion> {
        self.store.get_missed_questions().await
    }

    //
    // ─── TESTS ─────────────────────────────────────────────────────────────────
    //

    pub async fn get_test_history(&self) -> Vec<TestRecord> {
        self.store.get_test_history().await
    }

    pub async fn get_test_by_id(&self, id: &TestId) -> Option<TestRecord> {
        self.store.get_test_by_id(id).await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the history cannot be written.
    pub async fn save_test_result(
        &self,
        test: NewTestResult,
    ) -> Result<TestRecord, ProgressServiceError> {
        Ok(self.store.save_test_result(test).await?)
    }

    //
    // ─── METRICS ───────────────────────────────────────────────────────────────
    //

    pub async fn get_overall_stats(&self) -> OverallStats {
        let progress = self.store.get_category_progress().await;
        let attempts = self.store.get_question_attempts().await;
        let tests = self.store.get_test_history().await;
        metrics::overall_stats(
            &progress,
            &attempts,
            &tests,
            &self.calendar,
            self.store.clock().now(),
        )
    }

    pub async fn get_study_streak(&self) -> u32 {
        let attempts = self.store.get_question_attempts().await;
        metrics::study_streak(&attempts, &self.calendar, self.store.clock().now())
    }

    /// Readiness inputs, or `None` before any category has progress.
    pub async fn get_readiness_factors(&self) -> Option<ReadinessFactors> {
        let progress = self.store.get_category_progress().await;
        let missed = self.store.get_missed_questions().await;
        let tests = self.store.get_test_history().await;
        ReadinessFactors::compute(&progress, missed.len(), &tests)
    }

    pub async fn get_exam_readiness(&self) -> u32 {
        self.get_readiness_factors()
            .await
            .map_or(0, |factors| factors.score())
    }

    //
    // ─── RESET ─────────────────────────────────────────────────────────────────
    //

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if any key cannot be removed.
    pub async fn clear_all_data(&self) -> Result<(), ProgressServiceError> {
        Ok(self.store.clear_all_data().await?)
    }
}

async fn apply_answer(
    store: &ProgressStore,
    question_id: &QuestionId,
    category_id: &CategoryId,
    selected_answer: i32,
    is_correct: bool,
) -> Result<AnswerOutcome, ProgressServiceError> {
    let attempt = store
        .save_question_attempt(NewQuestionAttempt::new(
            question_id.clone(),
            selected_answer,
            is_correct,
        ))
        .await?;
    let category = store.update_category_progress(category_id, is_correct).await?;
    let missed = if is_correct {
        MissedUpdate::Corrected(store.mark_missed_question_correct(question_id).await?)
    } else {
        MissedUpdate::Missed(store.add_missed_question(question_id, category_id).await?)
    };
    debug!(question = %question_id, correct = is_correct, "answer recorded");

    Ok(AnswerOutcome {
        attempt,
        category,
        missed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use permit_core::time::{fixed_clock, fixed_now};
    use permit_core::{Clock, LocalCalendar};
    use std::time::Duration as StdDuration;
    use storage::{InMemoryKeyValueStore, KeyValueStore};

    fn service_with(clock: Clock) -> ProgressService {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(ProgressStore::new(kv, clock));
        ProgressService::new(store, LocalCalendar::utc())
    }

    fn q(id: &str) -> QuestionId {
        QuestionId::new(id)
    }

    fn c(id: &str) -> CategoryId {
        CategoryId::new(id)
    }

    #[tokio::test]
    async fn wrong_answer_tracks_missed_question() {
        let service = service_with(fixed_clock());

        let outcome = service
            .record_answer(&q("rs_001"), &c("road_signs"), 2, false)
            .await
            .unwrap();

        assert_eq!(outcome.attempt.selected_answer, 2);
        assert_eq!(outcome.category.questions_attempted, 1);
        assert_eq!(outcome.category.questions_correct, 0);
        match outcome.missed {
            MissedUpdate::Missed(missed) => assert_eq!(missed.correct_streak, 0),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(service.get_missed_questions().await.len(), 1);
    }

    #[tokio::test]
    async fn two_correct_answers_graduate_missed_question() {
        let service = service_with(fixed_clock());
        service
            .record_answer(&q("rs_001"), &c("road_signs"), 2, false)
            .await
            .unwrap();

        let first = service
            .record_answer(&q("rs_001"), &c("road_signs"), 1, true)
            .await
            .unwrap();
        assert_eq!(
            first.missed,
            MissedUpdate::Corrected(MissedOutcome::Progressed { correct_streak: 1 })
        );

        let second = service
            .record_answer(&q("rs_001"), &c("road_signs"), 1, true)
            .await
            .unwrap();
        assert_eq!(second.missed, MissedUpdate::Corrected(MissedOutcome::Graduated));
        assert!(service.get_missed_questions().await.is_empty());

        let progress = service
            .get_category_progress_by_id(&c("road_signs"))
            .await
            .unwrap();
        assert_eq!(progress.questions_attempted, 3);
        assert_eq!(progress.questions_correct, 2);
    }

    #[tokio::test]
    async fn correct_answer_on_untracked_question_is_noop() {
        let service = service_with(fixed_clock());
        let outcome = service
            .record_answer(&q("ts_001"), &c("traffic_signals"), 0, true)
            .await
            .unwrap();
        assert_eq!(outcome.missed, MissedUpdate::Corrected(MissedOutcome::NotTracked));
    }

    #[tokio::test]
    async fn toggle_bookmark_flips_state() {
        let service = service_with(fixed_clock());
        assert!(service.toggle_bookmark(&q("rs_001"), &c("road_signs")).await.unwrap());
        assert!(service.is_bookmarked(&q("rs_001")).await);
        assert!(!service.toggle_bookmark(&q("rs_001"), &c("road_signs")).await.unwrap());
        assert!(!service.is_bookmarked(&q("rs_001")).await);
    }

    #[tokio::test]
    async fn stats_and_readiness_are_zero_without_data() {
        let service = service_with(fixed_clock());
        assert_eq!(service.get_overall_stats().await, OverallStats::default());
        assert_eq!(service.get_exam_readiness().await, 0);
        assert!(service.get_readiness_factors().await.is_none());
    }

    #[tokio::test]
    async fn streak_counts_today_after_practice() {
        let mut clock = Clock::fixed(fixed_now() - Duration::days(1));
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let store = Arc::new(ProgressStore::new(kv.clone(), clock));
        let service = ProgressService::new(store, LocalCalendar::utc());
        service
            .record_answer(&q("rs_001"), &c("road_signs"), 1, true)
            .await
            .unwrap();

        clock.advance(Duration::days(1));
        let store = Arc::new(ProgressStore::new(kv, clock));
        let service = ProgressService::new(store, LocalCalendar::utc());
        service
            .record_answer(&q("rs_002"), &c("road_signs"), 1, true)
            .await
            .unwrap();

        assert_eq!(service.get_study_streak().await, 2);
        let stats = service.get_overall_stats().await;
        assert_eq!(stats.total_questions_answered, 2);
        assert_eq!(stats.accuracy, 100);
        assert_eq!(stats.study_streak, 2);
    }

    #[tokio::test]
    async fn readiness_follows_weighted_formula() {
        let service = service_with(fixed_clock());
        service
            .record_answer(&q("rs_001"), &c("road_signs"), 1, true)
            .await
            .unwrap();

        // accuracy 1.0, coverage 1/9, no tests, no missed questions
        let factors = service.get_readiness_factors().await.unwrap();
        assert!((factors.accuracy - 1.0).abs() < f64::EPSILON);
        assert!((factors.missed_penalty_factor - 1.0).abs() < f64::EPSILON);
        assert_eq!(service.get_exam_readiness().await, 57);
    }

    #[tokio::test]
    async fn readiness_is_repeatable_and_read_only() {
        let kv = InMemoryKeyValueStore::new();
        let store = Arc::new(ProgressStore::new(Arc::new(kv.clone()), fixed_clock()));
        let service = ProgressService::new(store, LocalCalendar::utc());
        service
            .record_answer(&q("rs_001"), &c("road_signs"), 0, false)
            .await
            .unwrap();
        service
            .record_answer(&q("pr_001"), &c("parking_rules"), 2, true)
            .await
            .unwrap();

        let before = kv.snapshot().unwrap();
        let first = service.get_exam_readiness().await;
        let second = service.get_exam_readiness().await;
        assert_eq!(first, second);
        assert_eq!(kv.snapshot().unwrap(), before);
    }

    /// Adapter whose writes take `delay` to land.
    struct SlowStore {
        inner: InMemoryKeyValueStore,
        delay: StdDuration,
    }

    #[async_trait]
    impl KeyValueStore for SlowStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            tokio::time::sleep(self.delay).await;
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }
    }

    #[tokio::test]
    async fn abandoned_answer_is_recorded_in_full() {
        let slow = SlowStore {
            inner: InMemoryKeyValueStore::new(),
            delay: StdDuration::from_millis(20),
        };
        let store = Arc::new(ProgressStore::new(Arc::new(slow), fixed_clock()));
        let service = ProgressService::new(store, LocalCalendar::utc());

        let waited = tokio::time::timeout(
            StdDuration::from_millis(5),
            service.record_answer(&q("ad_001"), &c("alcohol_drugs"), 3, false),
        )
        .await;
        assert!(waited.is_err());

        tokio::time::sleep(StdDuration::from_millis(300)).await;
        assert_eq!(service.get_question_attempts().await.len(), 1);
        let progress = service
            .get_category_progress_by_id(&c("alcohol_drugs"))
            .await
            .unwrap();
        assert_eq!(progress.questions_attempted, 1);
        assert_eq!(service.get_missed_questions().await.len(), 1);
    }
}
