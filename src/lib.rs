pub mod client;
pub mod error;
pub mod github;
pub mod model;
pub mod report;
pub mod server;

pub use error::{Result, SurveyError};
pub use model::*;
