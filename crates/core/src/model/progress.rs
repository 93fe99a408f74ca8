use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CategoryId, QuestionId};

/// Correct answers in a row needed before a missed question leaves the review set.
pub const GRADUATION_STREAK: u32 = 2;

//
// ─── CATEGORY PROGRESS ─────────────────────────────────────────────────────────
//

/// Running accuracy counters for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub category_id: CategoryId,
    pub questions_attempted: u32,
    pub questions_correct: u32,
    pub last_attempted_at: DateTime<Utc>,
}

impl CategoryProgress {
    /// Counters for the very first attempt in a category.
    #[must_use]
    pub fn first_attempt(category_id: CategoryId, is_correct: bool, at: DateTime<Utc>) -> Self {
        Self {
            category_id,
            questions_attempted: 1,
            questions_correct: u32::from(is_correct),
            last_attempted_at: at,
        }
    }

    /// Count one more attempt. Counters only grow.
    pub fn record_attempt(&mut self, is_correct: bool, at: DateTime<Utc>) {
        self.questions_attempted = self.questions_attempted.saturating_add(1);
        if is_correct {
            self.questions_correct = self.questions_correct.saturating_add(1);
        }
        self.last_attempted_at = at;
    }
}

//
// ─── QUESTION ATTEMPTS ─────────────────────────────────────────────────────────
//

/// One submitted answer, as kept in the attempt log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    pub question_id: QuestionId,
    pub selected_answer: i32,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

/// Attempt as submitted by a caller; the store stamps the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionAttempt {
    pub question_id: QuestionId,
    pub selected_answer: i32,
    pub is_correct: bool,
}

impl NewQuestionAttempt {
    #[must_use]
    pub fn new(question_id: QuestionId, selected_answer: i32, is_correct: bool) -> Self {
        Self {
            question_id,
            selected_answer,
            is_correct,
        }
    }

    #[must_use]
    pub fn stamped(self, attempted_at: DateTime<Utc>) -> QuestionAttempt {
        QuestionAttempt {
            question_id: self.question_id,
            selected_answer: self.selected_answer,
            is_correct: self.is_correct,
            attempted_at,
        }
    }
}

//
// ─── BOOKMARKS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub question_id: QuestionId,
    pub category_id: CategoryId,
    pub added_at: DateTime<Utc>,
}

//
// ─── MISSED QUESTIONS ──────────────────────────────────────────────────────────
//

/// A question answered wrong and not yet answered right twice since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissedQuestion {
    pub question_id: QuestionId,
    pub category_id: CategoryId,
    pub correct_streak: u32,
    pub last_missed_at: DateTime<Utc>,
}

impl MissedQuestion {
    #[must_use]
    pub fn new(question_id: QuestionId, category_id: CategoryId, at: DateTime<Utc>) -> Self {
        Self {
            question_id,
            category_id,
            correct_streak: 0,
            last_missed_at: at,
        }
    }

    /// Another miss: the streak starts over.
    pub fn register_miss(&mut self, at: DateTime<Utc>) {
        self.correct_streak = 0;
        self.last_missed_at = at;
    }

    /// Another correct answer. Returns `true` once the question graduates.
    pub fn register_correct(&mut self) -> bool {
        self.correct_streak = self.correct_streak.saturating_add(1);
        self.is_graduated()
    }

    #[must_use]
    pub fn is_graduated(&self) -> bool {
        self.correct_streak >= GRADUATION_STREAK
    }
}
