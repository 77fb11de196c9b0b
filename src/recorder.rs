use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::Error,
    types::{Language, SubmissionRecord},
};

/// Looks up the authenticated user, if any. The platform's auth layer owns
/// the real implementation; this crate only needs the id.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> Option<String>;
}

/// No authenticated session, ever. Default wiring for deployments where the
/// auth layer is not connected; the recorder then never writes.
pub struct AnonymousSession;

#[async_trait]
impl SessionProvider for AnonymousSession {
    async fn current_user(&self) -> Option<String> {
        None
    }
}

/// One-record insert into the external resource store.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, record: &SubmissionRecord) -> Result<(), Error>;
}

/// REST-style store client: one POST per record, api key in a header.
pub struct HttpSubmissionStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpSubmissionStore {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl SubmissionStore for HttpSubmissionStore {
    async fn insert(&self, record: &SubmissionRecord) -> Result<(), Error> {
        let response = self
            .client
            .post(format!("{}/rest/v1/code_submissions", self.base_url))
            .header("apikey", &self.api_key)
            .json(record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "insert rejected with status {}",
                response.status().as_u16()
            )));
        }
        Ok(())
    }
}

/// Best-effort persistence of successful executions. Failures here are
/// logged and swallowed; they never reach the caller, and the recorder is
/// never handed a failed execution.
pub struct SubmissionRecorder {
    session: Arc<dyn SessionProvider>,
    store: Arc<dyn SubmissionStore>,
}

impl SubmissionRecorder {
    pub fn new(session: Arc<dyn SessionProvider>, store: Arc<dyn SubmissionStore>) -> Self {
        Self { session, store }
    }

    pub async fn record(&self, language: Language, source: &str, output: &str) {
        let Some(user_id) = self.session.current_user().await else {
            debug!("no authenticated session, skipping submission record");
            return;
        };

        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            user_id,
            language,
            source: source.to_string(),
            output: output.to_string(),
            timestamp,
        };

        if let Err(err) = self.store.insert(&record).await {
            warn!("failed to store code submission: {err}");
        }
    }
}
