//! Client side of the survey: translations, remembered preferences,
//! the form itself and the HTTP submit call.

pub mod form;
pub mod i18n;
pub mod prefs;
pub mod submit;

pub use form::{resolve_language, FieldError, FormError, FormState, SurveyForm};
pub use i18n::{Messages, Translations};
pub use prefs::{FileStore, MemoryStore, PreferenceStore, LANGUAGE_KEY};
pub use submit::{SubmitClient, SubmitError, SubmitReceipt};
