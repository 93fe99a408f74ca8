use std::sync::Arc;

use permit_core::catalog::{Question, QuestionBank, category_by_id};
use permit_core::model::{Bookmark, CategoryId, MissedQuestion, QuestionId};
use storage::ProgressStore;

pub const QUESTION_NOT_FOUND: &str = "Question not found";
pub const UNKNOWN_CATEGORY: &str = "Unknown category";

/// A bookmarked or missed question resolved against the catalog.
///
/// Entries that point at questions or categories the catalog no longer has
/// still resolve, with placeholder text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_id: QuestionId,
    pub category_id: CategoryId,
    pub question_text: String,
    pub category_name: String,
    pub question: Option<Question>,
    /// Present for missed questions only.
    pub correct_streak: Option<u32>,
}

impl ReviewItem {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.question.is_some()
    }
}

/// Builds the bookmark and missed-question review lists.
#[derive(Clone)]
pub struct ReviewListService {
    store: Arc<ProgressStore>,
    bank: Arc<QuestionBank>,
}

impl ReviewListService {
    #[must_use]
    pub fn new(store: Arc<ProgressStore>, bank: Arc<QuestionBank>) -> Self {
        Self { store, bank }
    }

    pub async fn bookmarked(&self) -> Vec<ReviewItem> {
        self.store
            .get_bookmarks()
            .await
            .iter()
            .map(|b| self.resolve_bookmark(b))
            .collect()
    }

    pub async fn missed(&self) -> Vec<ReviewItem> {
        self.store
            .get_missed_questions()
            .await
            .iter()
            .map(|m| self.resolve_missed(m))
            .collect()
    }

    /// Missed questions that still exist in the bank, for a review drill.
    pub async fn missed_practice_queue(&self) -> Vec<Question> {
        self.missed()
            .await
            .into_iter()
            .filter_map(|item| item.question)
            .collect()
    }

    fn resolve_bookmark(&self, bookmark: &Bookmark) -> ReviewItem {
        self.resolve(&bookmark.question_id, &bookmark.category_id, None)
    }

    fn resolve_missed(&self, missed: &MissedQuestion) -> ReviewItem {
        self.resolve(
            &missed.question_id,
            &missed.category_id,
            Some(missed.correct_streak),
        )
    }

    fn resolve(
        &self,
        question_id: &QuestionId,
        category_id: &CategoryId,
        correct_streak: Option<u32>,
    ) -> ReviewItem {
        let question = self.bank.by_id(question_id).cloned();
        let question_text = question
            .as_ref()
            .map_or_else(|| QUESTION_NOT_FOUND.to_owned(), |q| q.text.clone());
        let category_name = category_by_id(category_id.as_str())
            .map_or(UNKNOWN_CATEGORY, |c| c.name)
            .to_owned();

        ReviewItem {
            question_id: question_id.clone(),
            category_id: category_id.clone(),
            question_text,
            category_name,
            question,
            correct_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permit_core::time::fixed_clock;
    use storage::InMemoryKeyValueStore;

    fn setup() -> (Arc<ProgressStore>, ReviewListService) {
        let store = Arc::new(ProgressStore::new(
            Arc::new(InMemoryKeyValueStore::new()),
            fixed_clock(),
        ));
        let service = ReviewListService::new(Arc::clone(&store), Arc::new(QuestionBank::seed()));
        (store, service)
    }

    #[tokio::test]
    async fn bookmarks_resolve_against_catalog() {
        let (store, service) = setup();
        store
            .add_bookmark(&QuestionId::new("rs_001"), &CategoryId::new("road_signs"))
            .await
            .unwrap();

        let items = service.bookmarked().await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_resolved());
        assert_eq!(items[0].category_name, "Road Signs");
        assert_eq!(items[0].correct_streak, None);
    }

    #[tokio::test]
    async fn dangling_entries_get_placeholders() {
        let (store, service) = setup();
        store
            .add_missed_question(&QuestionId::new("gone_999"), &CategoryId::new("retired"))
            .await
            .unwrap();

        let items = service.missed().await;
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_resolved());
        assert_eq!(items[0].question_text, QUESTION_NOT_FOUND);
        assert_eq!(items[0].category_name, UNKNOWN_CATEGORY);
        assert_eq!(items[0].correct_streak, Some(0));
        assert!(service.missed_practice_queue().await.is_empty());
    }

    #[tokio::test]
    async fn practice_queue_keeps_known_questions() {
        let (store, service) = setup();
        store
            .add_missed_question(&QuestionId::new("ts_001"), &CategoryId::new("traffic_signals"))
            .await
            .unwrap();
        store
            .add_missed_question(&QuestionId::new("gone_999"), &CategoryId::new("road_signs"))
            .await
            .unwrap();

        let queue = service.missed_practice_queue().await;
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id.as_str(), "ts_001");
    }
}
