use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{
    error::Error,
    recorder::{SessionProvider, SubmissionRecorder, SubmissionStore},
    types::SubmissionRecord,
    ExecutionService, ServiceConfig,
};

mod adapters;

/// Point every backend at the given mock server.
fn test_config(backend_url: &str) -> ServiceConfig {
    ServiceConfig::default()
        .with_playground_url(backend_url)
        .with_judge_url(backend_url)
        .with_compile_url(backend_url)
        .with_poll_interval(Duration::from_millis(25))
}

struct FixedSession(String);

#[async_trait]
impl SessionProvider for FixedSession {
    async fn current_user(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[derive(Default)]
struct MemoryStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<(), Error> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// The recorder runs on a detached task; poll briefly for its write.
async fn wait_for_records(store: &MemoryStore, expected: usize) -> usize {
    let deadline = Instant::now() + Duration::from_secs(1);
    loop {
        let count = store.records.lock().unwrap().len();
        if count >= expected || Instant::now() > deadline {
            return count;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn unsupported_languages_are_rejected_without_any_backend_traffic() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = ExecutionService::new(test_config(&server.uri())).unwrap();
    let result = service.execute("JavaScript", "console.log(1)").await;

    assert_eq!(result.output, "");
    assert_eq!(
        result.error.as_deref(),
        Some("Unsupported language: JavaScript")
    );
    assert!(result.execution_time.is_none());
}

#[tokio::test]
async fn language_identifiers_are_case_insensitive_with_cpp_aliases() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Errors": "",
            "Events": [{"Message": "Hello from Go!\n", "Kind": "stdout"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/compile.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0",
            "program_output": "Hello from C++!\n"
        })))
        .mount(&server)
        .await;

    let service = ExecutionService::new(test_config(&server.uri())).unwrap();

    let go = service.execute("GO", "package main").await;
    assert_eq!(go.output, "Hello from Go!\n");
    assert!(go.error.is_none());
    assert!(go.execution_time.is_some());

    for alias in ["cpp", "C++"] {
        let cpp = service.execute(alias, "int main() {}").await;
        assert_eq!(cpp.output, "Hello from C++!\n", "{alias}");
        assert!(cpp.error.is_none());
    }
}

#[tokio::test]
async fn backend_failures_produce_an_error_with_empty_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Errors": "prog.go:3: undefined: fmt"
        })))
        .mount(&server)
        .await;

    let service = ExecutionService::new(test_config(&server.uri())).unwrap();
    let result = service.execute("go", "package main").await;

    assert_eq!(result.output, "");
    assert_eq!(result.error.as_deref(), Some("prog.go:3: undefined: fmt"));
}

#[tokio::test]
async fn successful_executions_are_recorded_for_the_session_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Events": [{"Message": "ok\n", "Kind": "stdout"}]
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::default());
    let recorder = SubmissionRecorder::new(
        Arc::new(FixedSession("user-3".to_string())),
        store.clone(),
    );
    let service = ExecutionService::new(test_config(&server.uri()))
        .unwrap()
        .with_recorder(Arc::new(recorder));

    let result = service.execute("go", "package main").await;
    assert!(result.error.is_none());

    assert_eq!(wait_for_records(&store, 1).await, 1);
    let records = store.records.lock().unwrap();
    assert_eq!(records[0].user_id, "user-3");
    assert_eq!(records[0].output, "ok\n");
}

#[tokio::test]
async fn failed_executions_are_never_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Errors": "does not compile"
        })))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::default());
    let recorder =
        SubmissionRecorder::new(Arc::new(FixedSession("user-3".to_string())), store.clone());
    let service = ExecutionService::new(test_config(&server.uri()))
        .unwrap()
        .with_recorder(Arc::new(recorder));

    let failed = service.execute("go", "package main").await;
    assert!(failed.error.is_some());
    let rejected = service.execute("lisp", "(print 1)").await;
    assert!(rejected.error.is_some());

    assert_eq!(wait_for_records(&store, 1).await, 0);
}

#[tokio::test]
async fn embedded_interpreter_runs_python_end_to_end() {
    let service = ExecutionService::new(ServiceConfig::default()).unwrap();

    let hello = service
        .execute("python", "print('Hello, World!')")
        .await;
    assert!(hello.error.is_none(), "error: {:?}", hello.error);
    assert_eq!(hello.output, "Hello, World!\n");
    assert!(hello.execution_time.is_some());

    let raised = service.execute("python", "1 / 0").await;
    assert_eq!(raised.output, "");
    let diagnostic = raised.error.unwrap();
    assert!(diagnostic.starts_with("Python execution error"), "{diagnostic}");
    assert!(diagnostic.contains("ZeroDivision"), "{diagnostic}");

    // The failed run must not leak into the next capture.
    let clean = service.execute("python", "print('second run')").await;
    assert_eq!(clean.output, "second run\n");
}
