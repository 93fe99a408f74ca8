mod ids;
mod progress;
mod settings;
mod test_record;

pub use ids::{CategoryId, QuestionId, TestId};

pub use progress::{
    Bookmark, CategoryProgress, GRADUATION_STREAK, MissedQuestion, NewQuestionAttempt,
    QuestionAttempt,
};
pub use settings::{
    DEFAULT_LANGUAGE, LicenseType, LicenseTypeError, StoredUserSettings, UserSettings,
    UserSettingsPatch,
};
pub use test_record::{
    NewTestResult, TestAnswer, TestRecord, UNANSWERED, meets_passing_score, score_ratio,
};
