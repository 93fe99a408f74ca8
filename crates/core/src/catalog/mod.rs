//! Static reference data: categories, state rules, road signs and questions.

mod categories;
mod questions;
mod signs;
mod states;

pub use categories::{CATEGORIES, Category, category_by_id};
pub use questions::{ALL_STATES, Question, QuestionBank};
pub use signs::{
    RoadSign, SIGNS, SignCategory, search_signs, sign_by_id, sign_categories, signs_by_category,
};
pub use states::{StateInfo, US_STATES, state_by_code};
