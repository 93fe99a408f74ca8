use thiserror::Error;

use crate::exam::ExamError;
use crate::model::LicenseTypeError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Exam(#[from] ExamError),
    #[error(transparent)]
    LicenseType(#[from] LicenseTypeError),
}
