//! Full-text search over threads and messages.

use serde_json::Value;
use tracing::instrument;

use crate::api::{self, Endpoint};
use crate::client::NylasClient;
use crate::error::Result;
use crate::task::{Method, Task};
use crate::validation;

/// Search resource handle, obtained from [`NylasClient::search`].
pub struct Search<'a> {
    client: &'a NylasClient,
}

impl<'a> Search<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// Search threads matching the query string.
    #[instrument(skip(self))]
    pub async fn threads(&self, q: &str) -> Result<Vec<Value>> {
        self.run(api::SEARCH_THREADS, q).await
    }

    /// Search messages matching the query string.
    #[instrument(skip(self))]
    pub async fn messages(&self, q: &str) -> Result<Vec<Value>> {
        self.run(api::SEARCH_MESSAGES, q).await
    }

    async fn run(&self, endpoint: Endpoint, q: &str) -> Result<Vec<Value>> {
        validation::require_non_empty("search query", q)?;

        let (name, value) = self.client.auth_header()?;
        let task = Task::new(Method::Get, endpoint)
            .query_pair("q", q)
            .header(name, value);

        let payload = self.client.execute_one(task).await?;
        serde_json::from_value(payload).map_err(Into::into)
    }
}
