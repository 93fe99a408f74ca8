//! Derived progress metrics.
//!
//! Everything here is a pure function of the stored records; nothing is
//! cached between calls.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::model::{CategoryId, CategoryProgress, QuestionAttempt, QuestionId, TestRecord};
use crate::time::LocalCalendar;

/// Number of fixed question categories used for coverage.
pub const TOTAL_CATEGORIES: usize = 9;
/// How many of the latest tests feed the readiness score.
pub const RECENT_TEST_WINDOW: usize = 5;
/// Outstanding missed questions at which the missed-question factor reaches zero.
pub const MISSED_PENALTY_CAP: usize = 20;

pub const ACCURACY_WEIGHT: f64 = 0.40;
pub const COVERAGE_WEIGHT: f64 = 0.20;
pub const RECENT_TESTS_WEIGHT: f64 = 0.25;
pub const MISSED_WEIGHT: f64 = 0.15;

/// Round a non-negative value half-up (`71.5 -> 72`).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_half_up(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    (value + 0.5).floor() as u32
}

/// Whole-number percentage of `part / whole`, `0` when `whole` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    round_half_up(100.0 * part as f64 / whole as f64)
}

//
// ─── OVERALL STATS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverallStats {
    pub total_questions_answered: u64,
    pub total_correct: u64,
    /// Percentage, 0-100.
    pub accuracy: u32,
    pub tests_completed: usize,
    pub tests_passed: usize,
    pub study_streak: u32,
}

#[must_use]
pub fn overall_stats(
    progress: &[CategoryProgress],
    attempts: &[QuestionAttempt],
    tests: &[TestRecord],
    calendar: &LocalCalendar,
    now: DateTime<Utc>,
) -> OverallStats {
    let (total_questions_answered, total_correct) = progress_totals(progress);

    OverallStats {
        total_questions_answered,
        total_correct,
        accuracy: percent(total_correct, total_questions_answered),
        tests_completed: tests.len(),
        tests_passed: tests.iter().filter(|t| t.passed).count(),
        study_streak: study_streak(attempts, calendar, now),
    }
}

/// Sum of `(attempted, correct)` over all categories.
#[must_use]
pub fn progress_totals(progress: &[CategoryProgress]) -> (u64, u64) {
    progress.iter().fold((0, 0), |(attempted, correct), p| {
        (
            attempted + u64::from(p.questions_attempted),
            correct + u64::from(p.questions_correct),
        )
    })
}

/// Consecutive study days ending today, or ending yesterday if nothing was
/// answered yet today.
///
/// A log whose latest day is older than yesterday has no live streak.
#[must_use]
pub fn study_streak(
    attempts: &[QuestionAttempt],
    calendar: &LocalCalendar,
    now: DateTime<Utc>,
) -> u32 {
    let days: BTreeSet<NaiveDate> = attempts
        .iter()
        .map(|a| calendar.date_of(a.attempted_at))
        .collect();
    let Some(&latest) = days.last() else {
        return 0;
    };

    let today = calendar.date_of(now);
    let Some(yesterday) = today.pred_opt() else {
        return 0;
    };
    if latest != today && latest != yesterday {
        return 0;
    }

    let mut cursor = if days.contains(&today) {
        today
    } else {
        yesterday
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

//
// ─── EXAM READINESS ────────────────────────────────────────────────────────────
//

/// The four normalized (0-1) inputs to the readiness score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReadinessFactors {
    pub accuracy: f64,
    pub category_coverage: f64,
    pub avg_recent_test_score: f64,
    pub missed_penalty_factor: f64,
}

impl ReadinessFactors {
    /// Compute the factors. Returns `None` when there is no category progress yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute(
        progress: &[CategoryProgress],
        missed_count: usize,
        tests: &[TestRecord],
    ) -> Option<Self> {
        if progress.is_empty() {
            return None;
        }

        let (attempted, correct) = progress_totals(progress);
        let accuracy = if attempted > 0 {
            correct as f64 / attempted as f64
        } else {
            0.0
        };

        let covered: HashSet<&CategoryId> = progress.iter().map(|p| &p.category_id).collect();
        let category_coverage = (covered.len() as f64 / TOTAL_CATEGORIES as f64).min(1.0);

        let recent = &tests[tests.len().saturating_sub(RECENT_TEST_WINDOW)..];
        let avg_recent_test_score = if recent.is_empty() {
            0.0
        } else {
            recent.iter().map(TestRecord::score_ratio).sum::<f64>() / recent.len() as f64
        };

        let missed_penalty_factor =
            (1.0 - missed_count as f64 / MISSED_PENALTY_CAP as f64).max(0.0);

        Some(Self {
            accuracy,
            category_coverage,
            avg_recent_test_score,
            missed_penalty_factor,
        })
    }

    /// Weighted score, 0-100.
    #[must_use]
    pub fn score(&self) -> u32 {
        let weighted = ACCURACY_WEIGHT * self.accuracy
            + COVERAGE_WEIGHT * self.category_coverage
            + RECENT_TESTS_WEIGHT * self.avg_recent_test_score
            + MISSED_WEIGHT * self.missed_penalty_factor;
        round_half_up(100.0 * weighted).min(100)
    }
}

/// Exam readiness score, 0-100. Zero until any category has progress.
#[must_use]
pub fn exam_readiness(
    progress: &[CategoryProgress],
    missed_count: usize,
    tests: &[TestRecord],
) -> u32 {
    ReadinessFactors::compute(progress, missed_count, tests).map_or(0, |f| f.score())
}

//
// ─── PER-TEST CATEGORY BREAKDOWN ───────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryScore {
    pub category_id: CategoryId,
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
}

/// Per-category results for one test, weakest category first.
///
/// `category_of` resolves a question to its category; answers whose question
/// cannot be resolved are skipped.
#[must_use]
pub fn test_category_scores<F>(test: &TestRecord, category_of: F) -> Vec<CategoryScore>
where
    F: Fn(&QuestionId) -> Option<CategoryId>,
{
    let mut tally: HashMap<CategoryId, (u32, u32)> = HashMap::new();
    for answer in &test.answers {
        let Some(category_id) = category_of(&answer.question_id) else {
            continue;
        };
        let entry = tally.entry(category_id).or_default();
        entry.0 += u32::from(answer.is_correct);
        entry.1 += 1;
    }

    let mut scores: Vec<CategoryScore> = tally
        .into_iter()
        .map(|(category_id, (correct, total))| CategoryScore {
            category_id,
            correct,
            total,
            percent: percent(u64::from(correct), u64::from(total)),
        })
        .collect();
    scores.sort_by(|a, b| {
        a.percent
            .cmp(&b.percent)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
    scores
}
