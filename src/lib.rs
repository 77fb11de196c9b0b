//! # Snippet Execution Service
//!
//! Execution backend for a programming-learning platform. Takes a snippet of
//! source code plus a declared language, dispatches it to one of several
//! heterogeneous remote execution backends, and normalizes every outcome into
//! a single result contract. Where a remote backend is unreachable, the
//! compiled-language paths degrade to a deterministic local approximation
//! instead of failing outright.

mod config;
mod dispatcher;
mod error;
mod interpreter;
mod languages;
mod recorder;
mod seeds;
mod server;
mod types;

#[cfg(test)]
mod tests;

pub use config::ServiceConfig;
pub use dispatcher::ExecutionService;
pub use error::Error;
pub use interpreter::EmbeddedRuntimeLoader;
pub use languages::{Interpreter, InterpreterLoader, LanguageAdapter};
pub use recorder::{
    AnonymousSession, HttpSubmissionStore, SessionProvider, SubmissionRecorder, SubmissionStore,
};
pub use seeds::initial_code;
pub use server::{router, serve};
pub use types::{
    BackendOutcome, ExecutionRequest, ExecutionResult, Language, SubmissionRecord,
};

/// Result type for execution-service operations
pub type Result<T> = std::result::Result<T, Error>;
