//! Language-specific backend adapters

mod c;
mod cpp;
mod go;
mod python;
pub(crate) mod simulate;

pub use c::SubmissionJudgeAdapter;
pub use cpp::CompileServiceAdapter;
pub use go::PlaygroundAdapter;
pub use python::{Interpreter, InterpreterLoader, PythonAdapter};

use async_trait::async_trait;

use crate::{error::Error, types::BackendOutcome};

/// Stand-in text when a run produced nothing on stdout.
pub(crate) const NO_OUTPUT: &str = "Code executed successfully (no output)";

/// Adapter owning one remote execution protocol (plus, for the compiled
/// languages, a paired local fallback). `Err` is the last-resort escape for
/// conditions the adapter cannot translate itself; the dispatcher converts
/// it into an error result.
#[async_trait]
pub trait LanguageAdapter: Send + Sync {
    async fn execute(&self, source: &str) -> Result<BackendOutcome, Error>;
}
