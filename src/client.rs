//! Client construction and the batch-facing call surface.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use url::Url;

use crate::api;
use crate::batch::{self, BatchOptions, DEFAULT_CONCURRENCY};
use crate::deltas::Deltas;
use crate::error::{NylasError, Result};
use crate::events::Events;
use crate::models::{Account, Outcome};
use crate::pool::RequestPool;
use crate::search::Search;
use crate::task::{Method, Task};
use crate::transport::{DecodeMode, HttpExecutor, MockHandler};
use crate::validation;

/// Global configuration options for the client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server every request is issued against (default: production).
    pub base_url: String,
    /// Per-request timeout (default: 30s).
    pub timeout: Duration,
    /// Connection timeout (default: 10s).
    pub connect_timeout: Duration,
    /// Concurrency limit used when a batch call does not specify one.
    pub default_concurrency: usize,
    /// Decode mode used when a batch call does not specify one.
    pub decode_mode: DecodeMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: api::DEFAULT_SERVER.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            default_concurrency: DEFAULT_CONCURRENCY,
            decode_mode: DecodeMode::Strict,
        }
    }
}

/// Builder for [`NylasClient`].
pub struct NylasClientBuilder {
    client_id: String,
    client_secret: String,
    access_token: Option<String>,
    config: ClientConfig,
    mock: Option<MockHandler>,
}

impl NylasClientBuilder {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            access_token: None,
            config: ClientConfig::default(),
            mock: None,
        }
    }

    /// Set the access token used to authorize requests.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Override the server base URL (e.g. for a test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the concurrency limit used when a batch call does not specify one.
    pub fn with_default_concurrency(mut self, limit: usize) -> Self {
        self.config.default_concurrency = limit.max(1);
        self
    }

    /// Set the default decode mode for response bodies.
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.config.decode_mode = mode;
        self
    }

    /// Apply a complete client configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Provide a mock handler to intercept all requests.
    ///
    /// This is primarily intended for unit tests where network calls
    /// should be avoided.
    pub fn with_mock(
        mut self,
        handler: impl Fn(&Task) -> Result<String> + Send + Sync + 'static,
    ) -> Self {
        self.mock = Some(Arc::new(handler));
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<NylasClient> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(NylasError::Config(
                "client_id and client_secret are required".into(),
            ));
        }

        let base_url = Url::parse(&self.config.base_url)
            .map_err(|e| NylasError::Config(format!("invalid base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .connect_timeout(self.config.connect_timeout)
            .build()
            .map_err(NylasError::Transport)?;

        info!(base_url = %base_url, "client configured");

        Ok(NylasClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                client_id: self.client_id,
                client_secret: self.client_secret,
                access_token: self.access_token,
                config: self.config,
                mock: self.mock,
                account: Mutex::new(None),
            }),
        })
    }
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
    access_token: Option<String>,
    config: ClientConfig,
    mock: Option<MockHandler>,
    account: Mutex<Option<Account>>,
}

/// Async client for the API. Cheap to clone; all clones share one
/// connection pool and account cache.
#[derive(Clone)]
pub struct NylasClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NylasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NylasClient").finish_non_exhaustive()
    }
}

impl NylasClient {
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> NylasClientBuilder {
        NylasClientBuilder::new(client_id, client_secret)
    }

    /// Events resource handle.
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    /// Full-text search resource handle.
    pub fn search(&self) -> Search<'_> {
        Search::new(self)
    }

    /// Deltas resource handle.
    pub fn deltas(&self) -> Deltas<'_> {
        Deltas::new(self)
    }

    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.inner.client_secret
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The access token, validated non-empty before any request is built.
    pub(crate) fn access_token(&self) -> Result<&str> {
        let token = self
            .inner
            .access_token
            .as_deref()
            .ok_or_else(|| NylasError::Validation("access token is not set".into()))?;
        validation::require_non_empty("access token", token)?;
        Ok(token)
    }

    /// The authorization header attached to every task.
    pub(crate) fn auth_header(&self) -> Result<(String, String)> {
        Ok(("Authorization".to_string(), self.access_token()?.to_string()))
    }

    pub(crate) fn executor(&self, decode_mode: DecodeMode) -> Arc<HttpExecutor> {
        Arc::new(HttpExecutor::new(
            self.inner.http.clone(),
            self.inner.base_url.clone(),
            decode_mode,
            self.inner.mock.clone(),
        ))
    }

    /// Execute one task outside any batch, surfacing its failure as an error.
    pub(crate) async fn execute_one(&self, task: Task) -> Result<Value> {
        let executor = self.executor(self.inner.config.decode_mode);
        let pool = RequestPool::new(executor, 1);
        let outcome = pool
            .execute(vec![task])
            .await
            .pop()
            .expect("a one-task batch yields exactly one outcome");
        outcome.into_payload()
    }

    /// Run one task per identifier with bounded concurrency and correlate
    /// the outcomes back onto the identifiers.
    ///
    /// All identifiers are collected and every task is built before the
    /// first request goes out, so an invalid input aborts the whole call
    /// without issuing any request. Per-task failures never fail the call:
    /// the returned map always has exactly one entry per identifier.
    #[instrument(skip_all, fields(ids = tracing::field::Empty))]
    pub async fn run_batch<I, S, F>(
        &self,
        ids: I,
        build_task: F,
        options: BatchOptions,
    ) -> Result<HashMap<String, Outcome>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> Result<Task>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        tracing::Span::current().record("ids", ids.len());

        batch::ensure_unique(&ids)?;
        for id in &ids {
            validation::require_non_empty("identifier", id)?;
        }

        let mut tasks = Vec::with_capacity(ids.len());
        for id in &ids {
            tasks.push(build_task(id)?);
        }

        let pool = RequestPool::new(self.executor(options.decode_mode), options.concurrency);
        let outcomes = pool.execute(tasks).await;

        Ok(batch::correlate(ids, outcomes))
    }

    /// Fetch the connected account, caching it for the client's lifetime.
    pub async fn account(&self) -> Result<Account> {
        let mut cached = self.inner.account.lock().await;
        if let Some(account) = cached.as_ref() {
            return Ok(account.clone());
        }

        let (name, value) = self.auth_header()?;
        let task = Task::new(Method::Get, api::ACCOUNT).header(name, value);
        let payload = self.execute_one(task).await?;
        let account: Account = serde_json::from_value(payload)?;

        debug!(account = %account.id, "cached account info");
        *cached = Some(account.clone());
        Ok(account)
    }

    /// Batch options seeded from the client's configured defaults.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: self.inner.config.default_concurrency,
            decode_mode: self.inner.config.decode_mode,
        }
    }
}
