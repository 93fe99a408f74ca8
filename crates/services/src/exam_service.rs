use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use permit_core::catalog::{Question, QuestionBank, state_by_code};
use permit_core::exam::{ExamError, ExamRules, ExamSession};
use permit_core::metrics::{self, CategoryScore};
use permit_core::model::{TestRecord, UserSettings};
use storage::ProgressStore;

use crate::countdown::ExamCountdown;
use crate::error::ExamServiceError;

/// Starts, times and submits mock exams.
#[derive(Clone)]
pub struct ExamService {
    store: Arc<ProgressStore>,
    bank: Arc<QuestionBank>,
}

impl ExamService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, bank: Arc<QuestionBank>) -> Self {
        Self { store, bank }
    }

    /// Start an exam for the saved state and license type.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Exam` if no question fits the selection.
    pub async fn start_exam(&self) -> Result<ExamSession, ExamServiceError> {
        let settings = self.store.get_user_settings().await;
        let session = self.prepare_exam(&settings, &mut rand::rng())?;
        debug!(
            state = %session.rules().state_code,
            questions = session.len(),
            "exam started"
        );
        Ok(session)
    }

    /// Sample questions for `settings` and open a session at the current time.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Empty` if no question fits the selection.
    pub fn prepare_exam<R: Rng + ?Sized>(
        &self,
        settings: &UserSettings,
        rng: &mut R,
    ) -> Result<ExamSession, ExamError> {
        let state = settings.selected_state.as_deref().and_then(state_by_code);
        let rules = ExamRules::for_selection(
            settings.selected_state.as_deref(),
            state,
            settings.license_type,
        );

        let mut pool: Vec<&Question> = self
            .bank
            .for_state(&rules.state_code)
            .into_iter()
            .filter(|q| q.license_types.contains(&rules.license_type))
            .collect();
        pool.as_mut_slice().shuffle(rng);
        pool.truncate(usize::try_from(rules.question_count).unwrap_or(usize::MAX));

        let questions = pool.into_iter().cloned().collect();
        ExamSession::new(rules, questions, self.store.clock().now())
    }

    /// Countdown for whatever is left of the session's time limit.
    #[must_use]
    pub fn start_countdown(&self, session: &ExamSession) -> ExamCountdown {
        let elapsed = session.elapsed_secs(self.store.clock().now());
        ExamCountdown::start(session.rules().time_limit_secs().saturating_sub(elapsed))
    }

    /// Grade the session now and append it to the test history.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` if the history cannot be written.
    pub async fn submit(&self, session: &ExamSession) -> Result<TestRecord, ExamServiceError> {
        let result = session.grade(self.store.clock().now());
        let record = self.store.save_test_result(result).await?;
        info!(
            test = %record.id,
            score = record.score,
            total = record.total_questions,
            passed = record.passed,
            "exam submitted"
        );
        Ok(record)
    }

    /// Force a submission once `countdown` runs out.
    ///
    /// Returns `Ok(None)` if the countdown was cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `ExamServiceError::Storage` if the history cannot be written.
    pub async fn submit_on_expiry(
        &self,
        session: &ExamSession,
        countdown: &mut ExamCountdown,
    ) -> Result<Option<TestRecord>, ExamServiceError> {
        if !countdown.expired().await {
            return Ok(None);
        }
        info!("exam time expired");
        self.submit(session).await.map(Some)
    }

    /// Per-category results for a finished test, weakest first.
    #[must_use]
    pub fn category_breakdown(&self, test: &TestRecord) -> Vec<CategoryScore> {
        metrics::test_category_scores(test, |id| {
            self.bank.by_id(id).map(|q| q.category_id.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::model::{LicenseType, UserSettingsPatch};
    use permit_core::time::{fixed_clock, fixed_now};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::InMemoryKeyValueStore;

    fn service() -> ExamService {
        let store = Arc::new(ProgressStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            fixed_clock(),
        ));
        ExamService::new(store, Arc::new(QuestionBank::seed()))
    }

    #[test]
    fn defaults_apply_without_selected_state() {
        let service = service();
        let settings = UserSettings::defaults_at(fixed_now());
        let session = service
            .prepare_exam(&settings, &mut StdRng::seed_from_u64(7))
            .unwrap();

        let rules = session.rules();
        assert_eq!(rules.state_code, "CA");
        assert_eq!(rules.license_type, LicenseType::Car);
        assert_eq!(rules.question_count, 30);
        assert_eq!(rules.time_limit_minutes, 45);
        assert_eq!(rules.passing_score, 80);
        assert_eq!(session.started_at(), fixed_now());
    }

    #[test]
    fn sample_respects_license_type() {
        let service = service();
        let car = UserSettings::defaults_at(fixed_now());
        let session = service
            .prepare_exam(&car, &mut StdRng::seed_from_u64(1))
            .unwrap();
        // ve_002 is CDL only
        assert_eq!(session.len(), QuestionBank::seed().len() - 1);

        let cdl = car.merged(
            UserSettingsPatch::new().license_type(Some(LicenseType::Cdl)),
            fixed_now(),
        );
        let session = service
            .prepare_exam(&cdl, &mut StdRng::seed_from_u64(1))
            .unwrap();
        assert_eq!(session.len(), QuestionBank::seed().len());
        assert_eq!(session.rules().license_type, LicenseType::Cdl);
    }

    #[tokio::test]
    async fn submit_persists_unanswered_as_wrong() {
        let service = service();
        let session = service.start_exam().await.unwrap();

        let record = service.submit(&session).await.unwrap();
        assert_eq!(record.score, 0);
        assert!(!record.passed);
        assert_eq!(record.total_questions as usize, session.len());
        assert!(record.answers.iter().all(|a| a.selected_answer == -1));

        let history = service.store.get_test_history().await;
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn breakdown_groups_answers_by_category() {
        let service = service();
        let mut session = service.start_exam().await.unwrap();
        let correct = usize::from(session.current_question().correct_index);
        session.select_answer(correct).unwrap();

        let record = service.submit(&session).await.unwrap();
        let breakdown = service.category_breakdown(&record);

        let total: u32 = breakdown.iter().map(|s| s.total).sum();
        assert_eq!(total, record.total_questions);
        let correct: u32 = breakdown.iter().map(|s| s.correct).sum();
        assert_eq!(correct, 1);
        // weakest first
        assert!(breakdown.windows(2).all(|w| w[0].percent <= w[1].percent));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_forces_submission() {
        let service = service();
        let session = service.start_exam().await.unwrap();
        let mut countdown = ExamCountdown::start(2);

        let record = service
            .submit_on_expiry(&session, &mut countdown)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.score, 0);
        assert_eq!(service.store.get_test_history().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_countdown_skips_submission() {
        let service = service();
        let session = service.start_exam().await.unwrap();
        let mut countdown = service.start_countdown(&session);
        assert_eq!(countdown.remaining_secs(), 45 * 60);
        countdown.cancel();

        let outcome = service
            .submit_on_expiry(&session, &mut countdown)
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(service.store.get_test_history().await.is_empty());
    }
}
