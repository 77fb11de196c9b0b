use reqwest::Client;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::languages::{
    simulate::SIMULATED_SUCCESS, CompileServiceAdapter, LanguageAdapter, PlaygroundAdapter,
    SubmissionJudgeAdapter,
};

fn judge(server: &MockServer, poll_interval: Duration) -> SubmissionJudgeAdapter {
    SubmissionJudgeAdapter::new(
        Client::new(),
        server.uri(),
        "demo-token".to_string(),
        11,
        poll_interval,
        10,
    )
}

fn compile_service(server: &MockServer) -> CompileServiceAdapter {
    CompileServiceAdapter::new(
        Client::new(),
        server.uri(),
        "gcc-head".to_string(),
        "warning,gnu++1y".to_string(),
        "-std=c++17".to_string(),
    )
}

#[tokio::test]
async fn playground_concatenates_output_events_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .and(body_string_contains("version=2"))
        .and(body_string_contains("withVet=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Errors": "",
            "Events": [
                {"Message": "out-1\n", "Kind": "stdout"},
                {"Message": "err-1\n", "Kind": "stderr"},
                {"Message": "ignored", "Kind": "vet"},
                {"Message": "out-2\n", "Kind": "stdout"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = PlaygroundAdapter::new(Client::new(), server.uri());
    let outcome = adapter.execute("package main").await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "out-1\nerr-1\nout-2\n");
    assert!(outcome.elapsed.is_some());
}

#[tokio::test]
async fn playground_compiler_errors_become_the_diagnostic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Errors": "prog.go:5:2: undefined: fmt.Printlnn"
        })))
        .mount(&server)
        .await;

    let adapter = PlaygroundAdapter::new(Client::new(), server.uri());
    let outcome = adapter.execute("package main").await.unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.diagnostic.as_deref(),
        Some("prog.go:5:2: undefined: fmt.Printlnn")
    );
}

#[tokio::test]
async fn playground_server_errors_degrade_to_the_simulator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/compile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let adapter = PlaygroundAdapter::new(Client::new(), server.uri());
    let source = r#"
package main
import "fmt"
func main() {
    fmt.Println("Hello")
}
"#;
    let outcome = adapter.execute(source).await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "Hello");
}

#[tokio::test]
async fn judge_accepts_a_terminal_accepted_verdict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/submissions"))
        .and(header("Authorization", "Bearer demo-token"))
        .and(body_json(serde_json::json!({
            "source": "int main() { return 0; }",
            "compilerId": 11,
            "input": ""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 77})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/submissions/77"))
        .and(header("Authorization", "Bearer demo-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "executing": false,
            "result": {"status": {"name": "accepted"}},
            "output": "judge says hi\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = judge(&server, Duration::from_millis(25));
    let outcome = adapter.execute("int main() { return 0; }").await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "judge says hi\n");
}

#[tokio::test]
async fn judge_rejected_verdicts_prefer_stderr_then_compiler_info() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/submissions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 5})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/submissions/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "executing": false,
            "result": {"status": {"name": "compilation error"}},
            "stderr": "",
            "cmpinfo": "error: expected ';' before '}' token"
        })))
        .mount(&server)
        .await;

    let adapter = judge(&server, Duration::from_millis(25));
    let outcome = adapter.execute("int main() {}").await.unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.diagnostic.as_deref(),
        Some("error: expected ';' before '}' token")
    );
}

#[tokio::test]
async fn judge_polls_ten_times_before_giving_up() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/submissions"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/submissions/9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"executing": true})),
        )
        .expect(10)
        .mount(&server)
        .await;

    let interval = Duration::from_millis(25);
    let adapter = judge(&server, interval);
    let started = Instant::now();
    let outcome = adapter.execute("int main() { return 0; }").await.unwrap();
    let elapsed = started.elapsed();

    // One sleep per poll attempt, then the local simulation takes over.
    assert!(elapsed >= interval * 9, "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "elapsed {elapsed:?}");
    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, SIMULATED_SUCCESS);
}

#[tokio::test]
async fn judge_submit_rejection_skips_polling_entirely() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/submissions"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let adapter = judge(&server, Duration::from_millis(25));
    let source = "#include <stdio.h>\nint main(){printf(\"Sum: %d\\n\", 5+5);}";
    let outcome = adapter.execute(source).await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "Sum: 10");
}

#[tokio::test]
async fn compile_service_treats_status_zero_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compile.json"))
        .and(body_json(serde_json::json!({
            "compiler": "gcc-head",
            "code": "int main() { return 0; }",
            "options": "warning,gnu++1y",
            "stdin": "",
            "compiler-option-raw": "-std=c++17"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "0",
            "program_output": "built and ran\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = compile_service(&server);
    let outcome = adapter.execute("int main() { return 0; }").await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "built and ran\n");
}

#[tokio::test]
async fn compile_service_nonzero_status_prefers_the_compiler_diagnostic() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compile.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "1",
            "compiler_error": "error: 'cout' was not declared in this scope",
            "program_error": "should not be used"
        })))
        .mount(&server)
        .await;

    let adapter = compile_service(&server);
    let outcome = adapter.execute("int main() { cout; }").await.unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(
        outcome.diagnostic.as_deref(),
        Some("error: 'cout' was not declared in this scope")
    );
}

#[tokio::test]
async fn compile_service_outages_degrade_to_the_simulator() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compile.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let adapter = compile_service(&server);
    let source = r#"#include <iostream>
using namespace std;
int main() {
    cout << "Sum: " << (5 + 5) << endl;
    return 0;
}"#;
    let outcome = adapter.execute(source).await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.stdout, "Sum: 10");
}
