use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};
use tokio::time;
use tracing::{debug, info, warn};

use crate::{
    error::Error,
    languages::{LanguageAdapter, NO_OUTPUT},
    types::BackendOutcome,
};

/// Prefix stamped onto every failure on the interpreted path.
const ERROR_TAG: &str = "Python execution error";

/// Installs a fresh capture buffer in front of the interpreter's stdout.
const REDIRECT_STDOUT: &str = "import sys\nfrom io import StringIO\n__snippet_stdout = StringIO()\nsys.stdout = __snippet_stdout\n";

/// Reads back everything captured since the redirect.
const READ_CAPTURE: &str = "__snippet_stdout.getvalue()";

/// Puts the interpreter's stdout back.
const RESTORE_STDOUT: &str = "import sys\nsys.stdout = sys.__stdout__\n";

/// One loaded in-process interpreter. `Err` values carry the interpreter's
/// own error text, which callers surface verbatim behind the language tag.
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Execute a statement block.
    async fn exec(&self, source: &str) -> Result<(), String>;

    /// Evaluate a single expression and return its string value.
    async fn eval(&self, expr: &str) -> Result<String, String>;

    /// Queue a statement without waiting for it; usable from drop paths.
    fn exec_detached(&self, source: &str);
}

/// Performs the one-time interpreter load. The production loader boots the
/// embedded VM; tests substitute scripted fakes.
#[async_trait]
pub trait InterpreterLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Interpreter>, Error>;
}

enum RuntimeState {
    Uninitialized,
    Loading,
    Ready(Arc<dyn Interpreter>),
}

/// Process-wide interpreter lifecycle. The first caller performs the load;
/// concurrent callers wait on that same load instead of starting their own.
/// A failed or timed-out load resets the cell so a later call can retry from
/// scratch.
struct RuntimeCell {
    loader: Arc<dyn InterpreterLoader>,
    load_timeout: Duration,
    state: Mutex<RuntimeState>,
    loaded: Notify,
}

impl RuntimeCell {
    fn new(loader: Arc<dyn InterpreterLoader>, load_timeout: Duration) -> Self {
        Self {
            loader,
            load_timeout,
            state: Mutex::new(RuntimeState::Uninitialized),
            loaded: Notify::new(),
        }
    }

    async fn acquire(&self) -> Result<Arc<dyn Interpreter>, Error> {
        loop {
            let waiter = {
                let mut state = self.state.lock().await;
                match &*state {
                    RuntimeState::Ready(interpreter) => return Ok(interpreter.clone()),
                    RuntimeState::Uninitialized => {
                        *state = RuntimeState::Loading;
                        None
                    }
                    // Register for the wake-up before releasing the lock so a
                    // load finishing in between cannot be missed.
                    RuntimeState::Loading => Some(self.loaded.notified()),
                }
            };
            match waiter {
                Some(notified) => notified.await,
                None => break,
            }
        }

        info!("loading embedded interpreter runtime");
        let outcome = time::timeout(self.load_timeout, self.loader.load()).await;

        let mut state = self.state.lock().await;
        let result = match outcome {
            Ok(Ok(interpreter)) => {
                *state = RuntimeState::Ready(interpreter.clone());
                Ok(interpreter)
            }
            Ok(Err(err)) => {
                *state = RuntimeState::Uninitialized;
                Err(err)
            }
            Err(_) => {
                *state = RuntimeState::Uninitialized;
                Err(Error::InterpreterLoadTimeout(self.load_timeout))
            }
        };
        drop(state);
        self.loaded.notify_waiters();
        result
    }
}

/// Scoped stdout capture. `finish`/`discard` drain and restore on the normal
/// paths; dropping an unfinished scope still queues the restore so an early
/// return cannot leave the next execution reading leftover output.
struct CaptureScope<'a> {
    interpreter: &'a dyn Interpreter,
    armed: bool,
}

impl<'a> CaptureScope<'a> {
    async fn begin(interpreter: &'a dyn Interpreter) -> Result<CaptureScope<'a>, String> {
        interpreter.exec(REDIRECT_STDOUT).await?;
        Ok(Self {
            interpreter,
            armed: true,
        })
    }

    async fn finish(mut self) -> Result<String, String> {
        self.armed = false;
        let captured = self.interpreter.eval(READ_CAPTURE).await;
        let restored = self.interpreter.exec(RESTORE_STDOUT).await;
        let captured = captured?;
        restored?;
        Ok(captured)
    }

    async fn discard(mut self) {
        self.armed = false;
        if let Err(err) = self.interpreter.exec(RESTORE_STDOUT).await {
            warn!("failed to restore interpreter stdout: {err}");
        }
    }
}

impl Drop for CaptureScope<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.interpreter.exec_detached(RESTORE_STDOUT);
        }
    }
}

/// Python path: runs source in the lazily-loaded in-process interpreter.
/// There is no fallback simulator here; when the runtime cannot be loaded the
/// call fails outright.
pub struct PythonAdapter {
    runtime: RuntimeCell,
    // Interpreted runs share one capture buffer and must not interleave.
    exec_lock: Mutex<()>,
}

impl PythonAdapter {
    pub fn new(loader: Arc<dyn InterpreterLoader>, load_timeout: Duration) -> Self {
        Self {
            runtime: RuntimeCell::new(loader, load_timeout),
            exec_lock: Mutex::new(()),
        }
    }

    fn tagged_failure(detail: impl std::fmt::Display) -> BackendOutcome {
        BackendOutcome::failure(format!("{ERROR_TAG}: {detail}"))
    }
}

#[async_trait]
impl LanguageAdapter for PythonAdapter {
    async fn execute(&self, source: &str) -> Result<BackendOutcome, Error> {
        let started = Instant::now();
        let interpreter = match self.runtime.acquire().await {
            Ok(interpreter) => interpreter,
            Err(err) => return Ok(Self::tagged_failure(err)),
        };

        let _serial = self.exec_lock.lock().await;
        let capture = match CaptureScope::begin(interpreter.as_ref()).await {
            Ok(capture) => capture,
            Err(err) => return Ok(Self::tagged_failure(err)),
        };

        match interpreter.exec(source).await {
            Ok(()) => match capture.finish().await {
                Ok(captured) => {
                    debug!(elapsed = ?started.elapsed(), "interpreted run completed");
                    let stdout = if captured.is_empty() {
                        NO_OUTPUT.to_string()
                    } else {
                        captured
                    };
                    Ok(BackendOutcome::success(stdout, started.elapsed()))
                }
                Err(err) => Ok(Self::tagged_failure(err)),
            },
            Err(raised) => {
                capture.discard().await;
                Ok(Self::tagged_failure(raised))
            }
        }
    }
}
