#![forbid(unsafe_code)]

pub mod app_services;
pub mod countdown;
pub mod error;
pub mod exam_service;
pub mod progress_service;
pub mod review_lists;

pub use permit_core::{Clock, LocalCalendar};

pub use app_services::AppServices;
pub use countdown::ExamCountdown;
pub use error::{AppServicesError, ExamServiceError, ProgressServiceError};
pub use exam_service::ExamService;
pub use progress_service::{AnswerOutcome, MissedUpdate, ProgressService};
pub use review_lists::{QUESTION_NOT_FOUND, ReviewItem, ReviewListService, UNKNOWN_CATEGORY};
