use std::sync::Arc;

use permit_core::model::{
    CategoryId, LicenseType, NewQuestionAttempt, NewTestResult, QuestionId, UserSettingsPatch,
};
use permit_core::time::{fixed_clock, fixed_now};
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::{MissedOutcome, ProgressStore};

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_kv_upserts_and_removes() {
    let repo = connect("memdb_kv_basic").await;

    assert_eq!(repo.get("alpha").await.unwrap(), None);
    repo.set("alpha", "1").await.unwrap();
    repo.set("alpha", "2").await.unwrap();
    repo.set("beta", "3").await.unwrap();
    assert_eq!(repo.get("alpha").await.unwrap().as_deref(), Some("2"));

    repo.remove_many(&["alpha", "missing"]).await.unwrap();
    assert_eq!(repo.get("alpha").await.unwrap(), None);
    assert_eq!(repo.get("beta").await.unwrap().as_deref(), Some("3"));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn progress_store_persists_through_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("storage");
    let store = ProgressStore::new(Arc::clone(&storage.kv), fixed_clock());

    store
        .save_user_settings(
            UserSettingsPatch::new()
                .display_name(Some("Riley".into()))
                .license_type(Some(LicenseType::Cdl)),
        )
        .await
        .unwrap();

    let question = QuestionId::new("sd_004");
    let category = CategoryId::new("safe_driving");
    store
        .save_question_attempt(NewQuestionAttempt::new(question.clone(), 0, false))
        .await
        .unwrap();
    store.update_category_progress(&category, false).await.unwrap();
    store.add_missed_question(&question, &category).await.unwrap();
    store.add_bookmark(&question, &category).await.unwrap();
    let saved = store
        .save_test_result(NewTestResult {
            score: 18,
            total_questions: 20,
            passed: true,
            time_taken_seconds: 840,
            state_code: "NY".into(),
            license_type: LicenseType::Cdl,
            answers: Vec::new(),
        })
        .await
        .unwrap();

    // A second store over the same database sees everything.
    let reopened = ProgressStore::new(Arc::clone(&storage.kv), fixed_clock());
    let settings = reopened.get_user_settings().await;
    assert_eq!(settings.display_name.as_deref(), Some("Riley"));
    assert_eq!(settings.license_type, Some(LicenseType::Cdl));
    assert_eq!(reopened.get_question_attempts().await.len(), 1);
    assert_eq!(
        reopened.get_category_progress_by_id(&category).await.unwrap().questions_attempted,
        1
    );
    assert!(reopened.is_bookmarked(&question).await);
    assert_eq!(reopened.get_test_by_id(&saved.id).await.unwrap().completed_at, fixed_now());
    assert_eq!(
        reopened.mark_missed_question_correct(&question).await.unwrap(),
        MissedOutcome::Progressed { correct_streak: 1 }
    );

    reopened.clear_all_data().await.unwrap();
    assert!(store.get_test_history().await.is_empty());
    assert!(store.get_missed_questions().await.is_empty());
    assert_eq!(store.get_user_settings().await.display_name, None);
}
