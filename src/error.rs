use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("API error: {status_code} - {message}")]
    Api { status_code: u16, message: String },

    #[error("Submission still executing after {attempts} status checks")]
    PollBudget { attempts: u32 },

    #[error("Interpreter error: {0}")]
    Interpreter(String),

    #[error("Interpreter runtime failed to load within {0:?}")]
    InterpreterLoadTimeout(Duration),

    #[error("Submission store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
