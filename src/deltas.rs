//! Change tracking via delta cursors.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::api;
use crate::client::NylasClient;
use crate::error::{NylasError, Result};
use crate::models::DeltaSet;
use crate::task::{Method, Task};
use crate::validation;

/// Object types a delta query can be narrowed to.
const OBJECT_TYPES: [&str; 8] = [
    "contact", "event", "file", "message", "draft", "thread", "folder", "label",
];

/// Filters for fetching a delta set.
#[derive(Debug, Clone, Serialize)]
pub struct DeltaQuery {
    pub cursor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excluded_types: Option<Vec<String>>,
}

impl DeltaQuery {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            include_types: None,
            excluded_types: None,
        }
    }
}

/// Deltas resource handle, obtained from [`NylasClient::deltas`].
pub struct Deltas<'a> {
    client: &'a NylasClient,
}

impl<'a> Deltas<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// Obtain a cursor pointing at the current state of the account.
    #[instrument(skip_all)]
    pub async fn latest_cursor(&self) -> Result<String> {
        let (name, value) = self.client.auth_header()?;
        let task = Task::new(Method::Post, api::DELTA_LATEST_CURSOR).header(name, value);

        let payload = self.client.execute_one(task).await?;
        payload
            .get("cursor")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| NylasError::Decode("cursor missing from response".into()))
    }

    /// Fetch the set of changes recorded since a cursor.
    #[instrument(skip_all)]
    pub async fn since(&self, query: &DeltaQuery) -> Result<DeltaSet> {
        let params = serde_json::to_value(query)?;
        validation::validate(&delta_rules(), &params)?;

        let (name, value) = self.client.auth_header()?;
        let mut task = Task::new(Method::Get, api::DELTA)
            .query_pair("cursor", query.cursor.clone())
            .header(name, value);

        // Type filters travel as comma-separated lists.
        if let Some(include) = &query.include_types {
            task = task.query_pair("include_types", include.join(","));
        }
        if let Some(excluded) = &query.excluded_types {
            task = task.query_pair("excluded_types", excluded.join(","));
        }

        let payload = self.client.execute_one(task).await?;
        serde_json::from_value(payload).map_err(Into::into)
    }
}

fn delta_rules() -> Value {
    json!({
        "type": "object",
        "required": ["cursor"],
        "properties": {
            "cursor": {"type": "string", "minLength": 1},
            "include_types": {"type": "array", "items": {"enum": OBJECT_TYPES}},
            "excluded_types": {"type": "array", "items": {"enum": OBJECT_TYPES}},
        },
        "additionalProperties": false,
    })
}
