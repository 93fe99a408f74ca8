//! In-memory state of a timed mock exam.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::{Question, StateInfo};
use crate::model::{
    LicenseType, NewTestResult, TestAnswer, UNANSWERED, meets_passing_score,
};

/// Rules used when the user has not picked a state.
pub const DEFAULT_QUESTION_COUNT: u32 = 30;
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 45;
pub const DEFAULT_PASSING_SCORE: u32 = 80;
pub const DEFAULT_STATE_CODE: &str = "CA";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamError {
    #[error("no questions available for exam")]
    Empty,
    #[error("answer index {0} is out of range")]
    InvalidAnswer(usize),
    #[error("question index {0} is out of range")]
    InvalidQuestion(usize),
}

/// Length, time limit and pass mark of an exam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamRules {
    pub state_code: String,
    pub license_type: LicenseType,
    pub question_count: u32,
    pub time_limit_minutes: u32,
    pub passing_score: u32,
}

impl ExamRules {
    /// Rules for the selected state, falling back to defaults for anything unset.
    #[must_use]
    pub fn for_selection(
        selected_state: Option<&str>,
        state: Option<&StateInfo>,
        license_type: Option<LicenseType>,
    ) -> Self {
        Self {
            state_code: selected_state.unwrap_or(DEFAULT_STATE_CODE).to_owned(),
            license_type: license_type.unwrap_or(LicenseType::Car),
            question_count: state.map_or(DEFAULT_QUESTION_COUNT, |s| s.question_count),
            time_limit_minutes: state.map_or(DEFAULT_TIME_LIMIT_MINUTES, |s| s.time_limit),
            passing_score: state.map_or(DEFAULT_PASSING_SCORE, |s| s.passing_score),
        }
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u64 {
        u64::from(self.time_limit_minutes) * 60
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExamItem {
    question: Question,
    selected: Option<usize>,
    flagged: bool,
}

/// A mock exam in progress.
///
/// Holds the sampled questions with the user's current selections and flags.
/// Grading is pure; persisting the result is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    rules: ExamRules,
    items: Vec<ExamItem>,
    current: usize,
    started_at: DateTime<Utc>,
}

impl ExamSession {
    /// # Errors
    ///
    /// Returns `ExamError::Empty` if no questions are provided.
    pub fn new(
        rules: ExamRules,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ExamError> {
        if questions.is_empty() {
            return Err(ExamError::Empty);
        }
        let items = questions
            .into_iter()
            .map(|question| ExamItem {
                question,
                selected: None,
                flagged: false,
            })
            .collect();
        Ok(Self {
            rules,
            items,
            current: 0,
            started_at,
        })
    }

    #[must_use]
    pub fn rules(&self) -> &ExamRules {
        &self.rules
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the exam started; never negative.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = now.signed_duration_since(self.started_at).num_milliseconds();
        u64::try_from((millis + 500) / 1000).unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.items[self.current].question
    }

    #[must_use]
    pub fn selected(&self, index: usize) -> Option<usize> {
        self.items.get(index).and_then(|item| item.selected)
    }

    #[must_use]
    pub fn is_flagged(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| item.flagged)
    }

    /// Select an answer for the current question, replacing any earlier choice.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::InvalidAnswer` if `answer` is not one of the options.
    pub fn select_answer(&mut self, answer: usize) -> Result<(), ExamError> {
        let item = &mut self.items[self.current];
        if answer >= item.question.options.len() {
            return Err(ExamError::InvalidAnswer(answer));
        }
        item.selected = Some(answer);
        Ok(())
    }

    /// Toggle the review flag on the current question; returns the new state.
    pub fn toggle_flag(&mut self) -> bool {
        let item = &mut self.items[self.current];
        item.flagged = !item.flagged;
        item.flagged
    }

    /// Move forward; stays put on the last question.
    pub fn next(&mut self) -> bool {
        if self.current + 1 < self.items.len() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Move back; stays put on the first question.
    pub fn previous(&mut self) -> bool {
        if self.current > 0 {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// # Errors
    ///
    /// Returns `ExamError::InvalidQuestion` if `index` is past the end.
    pub fn go_to(&mut self, index: usize) -> Result<(), ExamError> {
        if index >= self.items.len() {
            return Err(ExamError::InvalidQuestion(index));
        }
        self.current = index;
        Ok(())
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.items.iter().filter(|i| i.selected.is_none()).count()
    }

    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.items.iter().filter(|i| i.flagged).count()
    }

    /// Grade every question as of `completed_at`. Unanswered questions count as wrong.
    #[must_use]
    pub fn grade(&self, completed_at: DateTime<Utc>) -> NewTestResult {
        let time_taken_seconds = self.elapsed_secs(completed_at);
        let answers: Vec<TestAnswer> = self
            .items
            .iter()
            .map(|item| {
                let selected_answer = item
                    .selected
                    .and_then(|s| i32::try_from(s).ok())
                    .unwrap_or(UNANSWERED);
                TestAnswer {
                    question_id: item.question.id.clone(),
                    selected_answer,
                    is_correct: item.selected.is_some()
                        && item.question.is_correct(selected_answer),
                    flagged: item.flagged,
                }
            })
            .collect();

        let score = u32::try_from(answers.iter().filter(|a| a.is_correct).count())
            .unwrap_or(u32::MAX);
        let total_questions = u32::try_from(answers.len()).unwrap_or(u32::MAX);

        NewTestResult {
            score,
            total_questions,
            passed: meets_passing_score(score, total_questions, self.rules.passing_score),
            time_taken_seconds,
            state_code: self.rules.state_code.clone(),
            license_type: self.rules.license_type,
            answers,
        }
    }
}
