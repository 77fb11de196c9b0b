use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Error;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Go,
    C,
    Cpp,
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "go" => Ok(Language::Go),
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Python => "python",
            Language::Go => "go",
            Language::C => "c",
            Language::Cpp => "cpp",
        };
        f.write_str(name)
    }
}

/// Inbound execution request. The language stays a free-form string at the
/// edge; validation happens in the dispatcher, never in an adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub code: String,
}

/// What one adapter invocation produced. Constructed and owned entirely
/// within that invocation; failures never carry a measured duration.
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    pub succeeded: bool,
    pub stdout: String,
    pub diagnostic: Option<String>,
    pub elapsed: Option<Duration>,
}

impl BackendOutcome {
    pub fn success(stdout: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            succeeded: true,
            stdout: stdout.into(),
            diagnostic: None,
            elapsed: Some(elapsed),
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            diagnostic: Some(diagnostic.into()),
            elapsed: None,
        }
    }
}

/// The normalized result every execution path converges to. Exactly one of
/// `output` or `error` is meaningful: an error implies the output is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub output: String,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<u64>,
}

impl ExecutionResult {
    /// Validation failures: nothing ran, no adapter was consulted.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            output: String::new(),
            error: Some(message.into()),
            execution_time: None,
        }
    }
}

impl From<BackendOutcome> for ExecutionResult {
    fn from(outcome: BackendOutcome) -> Self {
        if outcome.succeeded {
            Self {
                output: outcome.stdout,
                error: None,
                execution_time: outcome.elapsed.map(|d| d.as_millis() as u64),
            }
        } else {
            Self {
                output: String::new(),
                error: Some(
                    outcome
                        .diagnostic
                        .unwrap_or_else(|| "Execution failed".to_string()),
                ),
                execution_time: None,
            }
        }
    }
}

/// One successful execution, persisted best-effort to the external resource
/// store. Owned by that store once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub language: Language,
    pub source: String,
    pub output: String,
    pub timestamp: u64,
}
