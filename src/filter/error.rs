use thiserror::Error;

/// Input rejected before any SQL runs. Every variant maps to HTTP 400.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0} must be a string")]
    NotText(&'static str),

    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid URL format for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("{0} must be a positive integer")]
    InvalidId(&'static str),

    #[error("{0} must be an array of URLs")]
    InvalidLinks(&'static str),

    #[error("{field} must be at least {min} characters long")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters long")]
    TooLong { field: &'static str, max: usize },

    #[error("No fields to update")]
    NoChanges,

    #[error("Request body must be a JSON object")]
    InvalidJson,
}
