mod announcement;
mod question;

pub use announcement::format_text;
pub use question::{Difficulty, QualitySignal, Question};
