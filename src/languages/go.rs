use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::{
    error::Error,
    languages::{
        simulate::{self, render_argument, PLACEHOLDER, SIMULATED_SUCCESS},
        LanguageAdapter, NO_OUTPUT,
    },
    types::BackendOutcome,
};

/// Go path: one synchronous build-and-run round trip against the playground
/// API, degrading to a local simulation when the playground is unreachable.
pub struct PlaygroundAdapter {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PlaygroundResponse {
    #[serde(rename = "Errors")]
    errors: Option<String>,
    #[serde(rename = "Events")]
    events: Option<Vec<PlaygroundEvent>>,
}

#[derive(Debug, Deserialize)]
struct PlaygroundEvent {
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "Kind")]
    kind: String,
}

impl PlaygroundAdapter {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    async fn remote_attempt(&self, source: &str) -> Result<BackendOutcome, Error> {
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/compile", self.base_url))
            .form(&[("version", "2"), ("body", source), ("withVet", "true")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let result: PlaygroundResponse = response.json().await?;
        if let Some(errors) = result.errors.filter(|e| !e.is_empty()) {
            return Ok(BackendOutcome::failure(errors));
        }

        let mut output = String::new();
        for event in result.events.unwrap_or_default() {
            if event.kind == "stdout" || event.kind == "stderr" {
                output.push_str(&event.message);
            }
        }
        if output.is_empty() {
            output = NO_OUTPUT.to_string();
        }
        debug!(elapsed = ?started.elapsed(), "playground build completed");
        Ok(BackendOutcome::success(output, started.elapsed()))
    }
}

#[async_trait]
impl LanguageAdapter for PlaygroundAdapter {
    async fn execute(&self, source: &str) -> Result<BackendOutcome, Error> {
        match self.remote_attempt(source).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!("playground unreachable, simulating locally: {err}");
                Ok(simulate_go(source))
            }
        }
    }
}

/// Best-effort textual approximation of a Go build-and-run: extracts
/// `fmt.Println` / `fmt.Printf` calls in source order and renders them with
/// the fixed placeholder for anything it cannot evaluate.
pub(crate) fn simulate_go(source: &str) -> BackendOutcome {
    let started = Instant::now();

    if !source.contains("package main") || !source.contains("func main()") {
        return BackendOutcome::failure(
            "Error: Go programs must have \"package main\" and \"func main()\"",
        );
    }

    let println_re = Regex::new(r"fmt\.Println\s*\(\s*([^)]+)\s*\)").unwrap();
    let printf_re = Regex::new(r#"fmt\.Printf\s*\(\s*"([^"]*)"(?:\s*,\s*([^)]*))?\s*\)"#).unwrap();
    let resolve = |_: &str| PLACEHOLDER;

    // Render both call forms, then merge by source position.
    let mut pieces: Vec<(usize, String)> = Vec::new();
    for cap in println_re.captures_iter(source) {
        let at = cap.get(0).map(|m| m.start()).unwrap_or(0);
        pieces.push((at, render_println(&cap[1], &resolve)));
    }
    for cap in printf_re.captures_iter(source) {
        let at = cap.get(0).map(|m| m.start()).unwrap_or(0);
        let args: Vec<&str> = cap
            .get(2)
            .map(|m| m.as_str().split(',').map(str::trim).collect())
            .unwrap_or_default();
        let formatted = simulate::substitute_format(&cap[1], &['v', 'd', 'f', 's'], &args, &resolve);
        pieces.push((at, simulate::unescape(&formatted)));
    }
    pieces.sort_by_key(|(at, _)| *at);

    let output: String = pieces.into_iter().map(|(_, text)| text).collect();
    let output = output.trim().to_string();
    if output.is_empty() {
        return BackendOutcome::success(SIMULATED_SUCCESS, started.elapsed());
    }
    BackendOutcome::success(output, started.elapsed())
}

fn render_println(args: &str, resolve: &dyn Fn(&str) -> i64) -> String {
    let args = args.trim();
    let mut line = String::new();
    if simulate::is_string_literal(args) {
        line.push_str(simulate::literal_contents(args));
    } else {
        for part in args.split(',') {
            line.push_str(&render_argument(part, resolve));
        }
    }
    line.push('\n');
    line
}
