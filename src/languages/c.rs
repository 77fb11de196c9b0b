use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, warn};

use crate::{
    error::Error,
    languages::{
        simulate::{self, PLACEHOLDER, SIMULATED_SUCCESS},
        LanguageAdapter, NO_OUTPUT,
    },
    types::BackendOutcome,
};

/// C path: submit to a queue-based judge, then poll for completion. Exhausting
/// the poll budget is treated like any other protocol failure and degrades to
/// the local simulation.
pub struct SubmissionJudgeAdapter {
    client: Client,
    base_url: String,
    token: String,
    compiler_id: u32,
    poll_interval: Duration,
    poll_attempts: u32,
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    source: &'a str,
    #[serde(rename = "compilerId")]
    compiler_id: u32,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmissionTicket {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct SubmissionStatus {
    executing: bool,
    result: Option<SubmissionVerdict>,
    output: Option<String>,
    stderr: Option<String>,
    cmpinfo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmissionVerdict {
    status: VerdictStatus,
}

#[derive(Debug, Deserialize)]
struct VerdictStatus {
    name: String,
}

impl SubmissionJudgeAdapter {
    pub fn new(
        client: Client,
        base_url: String,
        token: String,
        compiler_id: u32,
        poll_interval: Duration,
        poll_attempts: u32,
    ) -> Self {
        Self {
            client,
            base_url,
            token,
            compiler_id,
            poll_interval,
            poll_attempts,
        }
    }

    async fn remote_attempt(&self, source: &str) -> Result<BackendOutcome, Error> {
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/api/v4/submissions", self.base_url))
            .bearer_auth(&self.token)
            .json(&SubmitRequest {
                source,
                compiler_id: self.compiler_id,
                input: "",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api {
                status_code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }
        let ticket: SubmissionTicket = response.json().await?;
        debug!(id = ticket.id, "submission queued");

        for attempt in 1..=self.poll_attempts {
            time::sleep(self.poll_interval).await;

            let status: SubmissionStatus = self
                .client
                .get(format!("{}/api/v4/submissions/{}", self.base_url, ticket.id))
                .bearer_auth(&self.token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            if status.executing {
                debug!(attempt, "submission still executing");
                continue;
            }

            let accepted = status
                .result
                .as_ref()
                .map(|r| r.status.name == "accepted")
                .unwrap_or(false);
            if accepted {
                let output = status
                    .output
                    .filter(|o| !o.is_empty())
                    .unwrap_or_else(|| NO_OUTPUT.to_string());
                return Ok(BackendOutcome::success(output, started.elapsed()));
            }

            let diagnostic = status
                .stderr
                .filter(|s| !s.is_empty())
                .or(status.cmpinfo.filter(|s| !s.is_empty()))
                .unwrap_or_else(|| "Compilation failed".to_string());
            return Ok(BackendOutcome::failure(diagnostic));
        }

        Err(Error::PollBudget {
            attempts: self.poll_attempts,
        })
    }
}

#[async_trait]
impl LanguageAdapter for SubmissionJudgeAdapter {
    async fn execute(&self, source: &str) -> Result<BackendOutcome, Error> {
        match self.remote_attempt(source).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!("judge unavailable, simulating locally: {err}");
                Ok(simulate_c(source))
            }
        }
    }
}

/// Best-effort textual approximation of compiling and running C: checks the
/// entry point and the stdio include, tracks `int x = ...;` assignments line
/// by line, and substitutes `printf` format specifiers positionally.
pub(crate) fn simulate_c(source: &str) -> BackendOutcome {
    let started = Instant::now();

    if !source.contains("int main") {
        return BackendOutcome::failure("Error: No main function found");
    }
    if source.contains("printf") && !source.contains("#include <stdio.h>") {
        return BackendOutcome::failure("Error: Missing #include <stdio.h> for printf");
    }

    let assign_re = Regex::new(r"int\s+(\w+)\s*=\s*([^;]+);").unwrap();
    let mut vars: HashMap<String, i64> = HashMap::new();
    for line in source.lines() {
        if let Some(cap) = assign_re.captures(line.trim()) {
            let resolve = |name: &str| vars.get(name).copied().unwrap_or(0);
            let value = simulate::eval_int_expr(cap[2].trim(), &resolve).unwrap_or(0);
            vars.insert(cap[1].to_string(), value);
        }
    }

    let printf_re = Regex::new(r#"printf\s*\(\s*"([^"]*)"(?:\s*,\s*([^)]*))?\s*\)"#).unwrap();
    let resolve = |name: &str| vars.get(name).copied().unwrap_or(PLACEHOLDER);

    let mut output = String::new();
    for cap in printf_re.captures_iter(source) {
        let args: Vec<&str> = cap
            .get(2)
            .map(|m| m.as_str().split(',').map(str::trim).collect())
            .unwrap_or_default();
        let formatted = simulate::substitute_format(&cap[1], &['d', 'i', 'f', 's'], &args, &resolve);
        output.push_str(&simulate::unescape(&formatted));
    }

    let output = output.trim().to_string();
    if output.is_empty() {
        return BackendOutcome::success(SIMULATED_SUCCESS, started.elapsed());
    }
    BackendOutcome::success(output, started.elapsed())
}
