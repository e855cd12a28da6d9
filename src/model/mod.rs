pub mod language;
pub mod question;
pub mod submission;

pub use language::{is_known_language, language_label, normalize_language, DEFAULT_LANGUAGE, LANGUAGES};
pub use question::{AnswerOption, Bucket, Question};
pub use submission::{
    is_zero_width, sanitize_text, SubmissionPayload, SubmissionRecord, ValidationError, RECORD_FIELDS, REQUIRED_FIELDS,
};
