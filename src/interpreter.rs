//! Embedded Python runtime bridge.
//!
//! A dedicated OS thread owns the VM and a persistent scope; callers talk to
//! it over a job channel, which both keeps the VM's non-thread-safe internals
//! on one thread and gives interpreted executions a natural single-worker
//! queue. The thread exits when the last handle is dropped.

use async_trait::async_trait;
use rustpython::vm::{
    builtins::PyBaseExceptionRef, compiler::Mode, scope::Scope, AsObject, VirtualMachine,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::{
    error::Error,
    languages::{Interpreter, InterpreterLoader},
};

const THREAD_GONE: &str = "interpreter runtime thread terminated";

enum JobKind {
    Exec,
    Eval,
}

struct Job {
    kind: JobKind,
    source: String,
    reply: Option<oneshot::Sender<Result<String, String>>>,
}

/// Handle to the interpreter thread.
pub struct EmbeddedRuntime {
    jobs: mpsc::UnboundedSender<Job>,
}

impl EmbeddedRuntime {
    /// Boot the VM on its own thread and wait until it accepts work.
    /// Initialization includes the interpreter's standard library and is the
    /// expensive part of the load.
    pub async fn boot() -> Result<Self, Error> {
        let (jobs_tx, mut jobs_rx) = mpsc::unbounded_channel::<Job>();
        let (ready_tx, ready_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("python-runtime".to_string())
            .spawn(move || {
                let interpreter = rustpython::InterpreterConfig::new()
                    .init_stdlib()
                    .interpreter();
                interpreter.enter(|vm| {
                    let scope = vm.new_scope_with_builtins();
                    let _ = ready_tx.send(());
                    while let Some(job) = jobs_rx.blocking_recv() {
                        let result = run_job(vm, &scope, &job);
                        if let Some(reply) = job.reply {
                            let _ = reply.send(result);
                        }
                    }
                });
                debug!("python runtime thread shutting down");
            })?;

        ready_rx
            .await
            .map_err(|_| Error::Interpreter("runtime thread died during startup".to_string()))?;
        info!("embedded python runtime ready");
        Ok(Self { jobs: jobs_tx })
    }

    fn submit(&self, kind: JobKind, source: &str) -> oneshot::Receiver<Result<String, String>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            kind,
            source: source.to_string(),
            reply: Some(reply_tx),
        };
        // A send failure means the runtime thread is gone; the dropped reply
        // sender surfaces that to the caller.
        let _ = self.jobs.send(job);
        reply_rx
    }
}

#[async_trait]
impl Interpreter for EmbeddedRuntime {
    async fn exec(&self, source: &str) -> Result<(), String> {
        self.submit(JobKind::Exec, source)
            .await
            .map_err(|_| THREAD_GONE.to_string())?
            .map(|_| ())
    }

    async fn eval(&self, expr: &str) -> Result<String, String> {
        self.submit(JobKind::Eval, expr)
            .await
            .map_err(|_| THREAD_GONE.to_string())?
    }

    fn exec_detached(&self, source: &str) {
        let _ = self.jobs.send(Job {
            kind: JobKind::Exec,
            source: source.to_string(),
            reply: None,
        });
    }
}

fn run_job(vm: &VirtualMachine, scope: &Scope, job: &Job) -> Result<String, String> {
    let mode = match job.kind {
        JobKind::Exec => Mode::Exec,
        JobKind::Eval => Mode::Eval,
    };
    let code = vm
        .compile(&job.source, mode, "<snippet>".to_string())
        .map_err(|err| err.to_string())?;
    match vm.run_code_obj(code, scope.clone()) {
        Ok(value) => match job.kind {
            JobKind::Eval => value
                .str(vm)
                .map(|s| s.as_str().to_string())
                .map_err(|exc| exception_text(vm, &exc)),
            JobKind::Exec => Ok(String::new()),
        },
        Err(exc) => Err(exception_text(vm, &exc)),
    }
}

fn exception_text(vm: &VirtualMachine, exc: &PyBaseExceptionRef) -> String {
    let mut text = String::new();
    if vm.write_exception(&mut text, exc).is_err() || text.trim().is_empty() {
        return exc.class().name().to_string();
    }
    text.trim_end().to_string()
}

/// Production loader: boots the embedded runtime on first use.
pub struct EmbeddedRuntimeLoader;

#[async_trait]
impl InterpreterLoader for EmbeddedRuntimeLoader {
    async fn load(&self) -> Result<Arc<dyn Interpreter>, Error> {
        Ok(Arc::new(EmbeddedRuntime::boot().await?))
    }
}
