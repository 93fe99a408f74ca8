use std::sync::Arc;

use async_trait::async_trait;
use permit_core::catalog::QuestionBank;
use permit_core::model::{CategoryId, LicenseType, QuestionId, UserSettingsPatch};
use permit_core::time::fixed_clock;
use permit_core::LocalCalendar;
use services::{AppServices, ProgressServiceError};
use storage::repository::{InMemoryKeyValueStore, KeyValueStore, Storage, StorageError};

/// Reads from an in-memory map but rejects every write.
struct ReadOnlyStore(InMemoryKeyValueStore);

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key).await
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("read-only".into()))
    }
}

#[tokio::test]
async fn study_session_then_exam_feeds_dashboard_metrics() {
    let app = AppServices::in_memory(fixed_clock(), LocalCalendar::utc());
    let progress = app.progress();
    let exams = app.exams();

    assert!(!progress.is_onboarding_complete().await);
    progress
        .save_user_settings(
            UserSettingsPatch::new()
                .selected_state(Some("CA".into()))
                .license_type(Some(LicenseType::Car)),
        )
        .await
        .unwrap();
    progress.complete_onboarding().await.unwrap();
    assert!(progress.is_onboarding_complete().await);

    let bank = app.question_bank();
    let rs_001 = bank.by_id(&QuestionId::new("rs_001")).unwrap();
    let wrong = (i32::from(rs_001.correct_index) + 1) % 4;
    progress
        .record_answer(&rs_001.id, &rs_001.category_id, wrong, false)
        .await
        .unwrap();
    let ts_001 = bank.by_id(&QuestionId::new("ts_001")).unwrap();
    progress
        .record_answer(
            &ts_001.id,
            &ts_001.category_id,
            i32::from(ts_001.correct_index),
            true,
        )
        .await
        .unwrap();

    let mut session = exams.start_exam().await.unwrap();
    assert_eq!(session.rules().state_code, "CA");
    assert_eq!(session.rules().passing_score, 83);
    loop {
        let correct = usize::from(session.current_question().correct_index);
        session.select_answer(correct).unwrap();
        if !session.next() {
            break;
        }
    }
    let record = exams.submit(&session).await.unwrap();
    assert!(record.passed);
    assert_eq!(record.score, record.total_questions);
    assert_eq!(progress.get_test_by_id(&record.id).await, Some(record.clone()));

    let stats = progress.get_overall_stats().await;
    assert_eq!(stats.total_questions_answered, 2);
    assert_eq!(stats.total_correct, 1);
    assert_eq!(stats.accuracy, 50);
    assert_eq!(stats.tests_completed, 1);
    assert_eq!(stats.tests_passed, 1);
    assert_eq!(stats.study_streak, 1);

    // 0.40*0.5 + 0.20*(2/9) + 0.25*1.0 + 0.15*(1 - 1/20) = 0.63694..
    assert_eq!(progress.get_exam_readiness().await, 64);

    let missed = app.review_lists().missed().await;
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0].category_name, "Road Signs");

    progress.clear_all_data().await.unwrap();
    assert!(progress.get_test_history().await.is_empty());
    assert!(progress.get_missed_questions().await.is_empty());
    assert!(!progress.is_onboarding_complete().await);
    assert_eq!(progress.get_exam_readiness().await, 0);
}

#[tokio::test]
async fn write_failures_surface_and_reads_degrade() {
    let inner = InMemoryKeyValueStore::new();
    inner
        .set("permit:bookmarks", "{not json")
        .await
        .unwrap();
    let kv: Arc<dyn KeyValueStore> = Arc::new(ReadOnlyStore(inner));
    let app = AppServices::from_storage(
        &Storage::new(kv),
        fixed_clock(),
        LocalCalendar::utc(),
        QuestionBank::seed(),
    );
    let progress = app.progress();

    // corrupt value reads as empty
    assert!(progress.get_bookmarks().await.is_empty());

    let err = progress
        .record_answer(
            &QuestionId::new("rs_001"),
            &CategoryId::new("road_signs"),
            0,
            true,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ProgressServiceError::Storage(StorageError::Connection(_))
    ));

    assert!(app.exams().start_exam().await.is_ok());
}
