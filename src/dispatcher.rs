use reqwest::Client;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

use crate::{
    config::ServiceConfig,
    error::Error,
    interpreter::EmbeddedRuntimeLoader,
    languages::{
        CompileServiceAdapter, InterpreterLoader, LanguageAdapter, PlaygroundAdapter,
        PythonAdapter, SubmissionJudgeAdapter,
    },
    recorder::SubmissionRecorder,
    seeds,
    types::{BackendOutcome, ExecutionResult, Language},
};

/// Entry point for snippet execution. Maps a language identifier to its
/// adapter, enforces the result contract on whatever comes back, and hands
/// successful runs to the submission recorder without waiting on it.
pub struct ExecutionService {
    python: PythonAdapter,
    go: PlaygroundAdapter,
    c: SubmissionJudgeAdapter,
    cpp: CompileServiceAdapter,
    recorder: Option<Arc<SubmissionRecorder>>,
}

impl ExecutionService {
    pub fn new(config: ServiceConfig) -> Result<Self, Error> {
        Self::with_interpreter_loader(config, Arc::new(EmbeddedRuntimeLoader))
    }

    pub fn with_interpreter_loader(
        config: ServiceConfig,
        loader: Arc<dyn InterpreterLoader>,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            python: PythonAdapter::new(loader, config.interpreter_load_timeout),
            go: PlaygroundAdapter::new(client.clone(), config.playground_url),
            c: SubmissionJudgeAdapter::new(
                client.clone(),
                config.judge_url,
                config.judge_token,
                config.judge_compiler_id,
                config.poll_interval,
                config.poll_attempts,
            ),
            cpp: CompileServiceAdapter::new(
                client,
                config.compile_url,
                config.compiler,
                config.compiler_options,
                config.compiler_flags,
            ),
            recorder: None,
        })
    }

    pub fn with_recorder(mut self, recorder: Arc<SubmissionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Execute one snippet. Never fails: every path, including an unsupported
    /// language and an adapter escaping with an error, converges to a
    /// well-formed [`ExecutionResult`].
    pub async fn execute(&self, language: &str, source: &str) -> ExecutionResult {
        let parsed = match Language::from_str(language) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!("rejecting execution request: {err}");
                return ExecutionResult::rejected(err.to_string());
            }
        };

        debug!(language = %parsed, bytes = source.len(), "dispatching execution");
        let outcome = match self.adapter(parsed).execute(source).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("adapter for {parsed} escaped with: {err}");
                BackendOutcome::failure(err.to_string())
            }
        };

        let result = ExecutionResult::from(outcome);
        if result.error.is_none() {
            if let Some(recorder) = &self.recorder {
                let recorder = recorder.clone();
                let source = source.to_string();
                let output = result.output.clone();
                tokio::spawn(async move {
                    recorder.record(parsed, &source, &output).await;
                });
            }
        }
        result
    }

    /// Starter snippet for the editor; pure and total.
    pub fn initial_code(&self, language: &str) -> &'static str {
        seeds::initial_code(language)
    }

    fn adapter(&self, language: Language) -> &dyn LanguageAdapter {
        match language {
            Language::Python => &self.python,
            Language::Go => &self.go,
            Language::C => &self.c,
            Language::Cpp => &self.cpp,
        }
    }
}
