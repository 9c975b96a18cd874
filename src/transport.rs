//! Single-request execution against the network.
//!
//! The pool only depends on the [`ExecuteTask`] contract: one task in, one
//! [`Outcome`] out, never an error past the boundary. The production
//! implementation is [`HttpExecutor`] on reqwest; tests substitute closures
//! or the client-level mock handler.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::{NylasError, Result};
use crate::models::Outcome;
use crate::task::Task;

/// How a response body that fails to decode is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// A malformed body becomes a decode failure for that task (default).
    #[default]
    Strict,
    /// A malformed body is passed through unmodified as a success payload.
    PassThroughRaw,
}

/// Contract for executing one task.
///
/// Implementations must translate every failure (transport, status,
/// decode) into a [`Outcome::Failure`] rather than returning an error,
/// so one bad task can never abort a batch.
#[async_trait]
pub trait ExecuteTask: Send + Sync {
    async fn execute(&self, task: Task) -> Outcome;
}

/// Handler used to short-circuit requests during tests.
///
/// The handler receives the task and returns the raw body a server would
/// have produced. Returning an error simulates a failed request, including
/// its status code when the error carries one.
pub type MockHandler = Arc<dyn Fn(&Task) -> Result<String> + Send + Sync>;

/// Production executor: performs the HTTP call and decodes the body.
pub struct HttpExecutor {
    http: reqwest::Client,
    base_url: Url,
    decode_mode: DecodeMode,
    mock: Option<MockHandler>,
}

impl HttpExecutor {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: Url,
        decode_mode: DecodeMode,
        mock: Option<MockHandler>,
    ) -> Self {
        Self {
            http,
            base_url,
            decode_mode,
            mock,
        }
    }

    pub fn decode_mode(&self) -> DecodeMode {
        self.decode_mode
    }

    /// Perform the network round trip, returning status and raw body.
    async fn perform(&self, task: &Task) -> Result<(u16, String)> {
        let url = self
            .base_url
            .join(&task.resolve_path())
            .map_err(|e| NylasError::Config(format!("invalid request URL: {e}")))?;

        let mut request = self.http.request(task.method().into(), url);

        if !task.query_pairs().is_empty() {
            request = request.query(task.query_pairs());
        }
        for (key, value) in task.headers_ref() {
            request = request.header(key, value);
        }
        if let Some(body) = task.body_ref() {
            request = request.form(&form_pairs(body));
        }

        trace!(method = task.method().as_str(), path = %task.resolve_path(), "sending request");

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok((status, body))
    }

    /// Decode a successful body per the configured mode.
    fn decode(&self, body: &str) -> Outcome {
        // Empty bodies (e.g. from DELETE) decode as null.
        if body.trim().is_empty() {
            return Outcome::Success(Value::Null);
        }
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Outcome::Success(value),
            Err(err) => match self.decode_mode {
                DecodeMode::Strict => {
                    Outcome::failure(NylasError::Decode(format!("{err}: {body}")))
                }
                DecodeMode::PassThroughRaw => Outcome::Success(Value::String(body.to_string())),
            },
        }
    }
}

#[async_trait]
impl ExecuteTask for HttpExecutor {
    async fn execute(&self, task: Task) -> Outcome {
        if let Some(mock) = &self.mock {
            return match mock(&task) {
                Ok(body) => self.decode(&body),
                Err(err) => Outcome::failure(err),
            };
        }

        match self.perform(&task).await {
            Ok((status, body)) if (200..300).contains(&status) => self.decode(&body),
            Ok((status, body)) => {
                debug!(status, path = %task.resolve_path(), "request rejected by API");
                Outcome::failure(NylasError::api(status, body))
            }
            Err(err) => {
                debug!(error = %err, path = %task.resolve_path(), "request failed in transport");
                Outcome::failure(err)
            }
        }
    }
}

/// Flatten a JSON object into form pairs. Scalar values are rendered
/// directly; nested arrays and objects are JSON-encoded.
fn form_pairs(body: &serde_json::Map<String, Value>) -> Vec<(String, String)> {
    body.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::task::Method;
    use serde_json::json;

    fn executor(mode: DecodeMode, mock: MockHandler) -> HttpExecutor {
        HttpExecutor::new(
            reqwest::Client::new(),
            Url::parse("http://localhost:1").unwrap(),
            mode,
            Some(mock),
        )
    }

    fn task() -> Task {
        Task::new(Method::Get, api::EVENTS).header("Authorization", "token")
    }

    #[tokio::test]
    async fn mock_body_decodes_to_success() {
        let exec = executor(
            DecodeMode::Strict,
            Arc::new(|_task| Ok(r#"{"id": "evt_1"}"#.to_string())),
        );
        let outcome = exec.execute(task()).await;
        assert_eq!(outcome.payload().unwrap()["id"], json!("evt_1"));
    }

    #[tokio::test]
    async fn malformed_body_fails_in_strict_mode() {
        let exec = executor(DecodeMode::Strict, Arc::new(|_task| Ok("not json".into())));
        let outcome = exec.execute(task()).await;
        assert!(outcome.is_failure());
    }

    #[tokio::test]
    async fn malformed_body_passes_through_when_suppressed() {
        let exec = executor(
            DecodeMode::PassThroughRaw,
            Arc::new(|_task| Ok("not json".into())),
        );
        let outcome = exec.execute(task()).await;
        assert_eq!(outcome.payload(), Some(&Value::String("not json".into())));
    }

    #[tokio::test]
    async fn mock_error_carries_status() {
        let exec = executor(
            DecodeMode::Strict,
            Arc::new(|_task| Err(NylasError::api(404, "gone"))),
        );
        let outcome = exec.execute(task()).await;
        assert_eq!(outcome.status(), Some(404));
    }

    #[tokio::test]
    async fn empty_body_is_null_payload() {
        let exec = executor(DecodeMode::Strict, Arc::new(|_task| Ok(String::new())));
        let outcome = exec.execute(task()).await;
        assert_eq!(outcome.payload(), Some(&Value::Null));
    }

    #[test]
    fn form_pairs_render_scalars_and_encode_nests() {
        let body = json!({
            "title": "standup",
            "busy": true,
            "limit": 5,
            "participants": [{"email": "a@b.c"}],
        });
        let pairs = form_pairs(body.as_object().unwrap());
        assert!(pairs.contains(&("title".into(), "standup".into())));
        assert!(pairs.contains(&("busy".into(), "true".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
        assert!(pairs
            .iter()
            .any(|(k, v)| k == "participants" && v.starts_with('[')));
    }
}
