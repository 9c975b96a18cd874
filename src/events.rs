//! Calendar events: list, fetch, create, update, RSVP, and batch delete.
//!
//! Multi-item operations (`get_many`, `delete`) run through the bounded
//! request pool and return one outcome per identifier. The single-item
//! variants delegate to a one-element batch, so every code path shares the
//! same execution machinery.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::api;
use crate::batch::BatchOptions;
use crate::client::NylasClient;
use crate::error::{NylasError, Result};
use crate::models::{Event, Outcome, Participant, When};
use crate::task::{Method, Task};
use crate::validation;

/// Filters for listing events.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_cancelled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expand_recurring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_before: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_after: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_before: Option<i64>,
}

/// Parameters for creating an event.
#[derive(Debug, Clone, Serialize)]
pub struct EventDraft {
    pub calendar_id: String,
    pub when: When,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_participants: Option<bool>,
}

/// Parameters for updating an existing event.
#[derive(Debug, Clone, Serialize)]
pub struct EventUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<When>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_participants: Option<bool>,
}

/// RSVP status for an event invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    Yes,
    No,
    Maybe,
}

/// An RSVP to an event invitation.
#[derive(Debug, Clone, Serialize)]
pub struct Rsvp {
    pub event_id: String,
    pub status: RsvpStatus,
    /// Defaults to the connected account when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_participants: Option<bool>,
}

/// One entry of a batch delete.
#[derive(Debug, Clone)]
pub struct DeleteEvent {
    pub id: String,
    pub notify_participants: Option<bool>,
}

impl DeleteEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            notify_participants: None,
        }
    }

    pub fn notify_participants(mut self, notify: bool) -> Self {
        self.notify_participants = Some(notify);
        self
    }
}

/// Events resource handle, obtained from [`NylasClient::events`].
pub struct Events<'a> {
    client: &'a NylasClient,
}

impl<'a> Events<'a> {
    pub(crate) fn new(client: &'a NylasClient) -> Self {
        Self { client }
    }

    /// List events matching the query.
    #[instrument(skip_all)]
    pub async fn list(&self, query: &EventQuery) -> Result<Vec<Event>> {
        let params = serde_json::to_value(query)?;
        validation::validate(&query_rules(), &params)?;

        let (name, value) = self.client.auth_header()?;
        let task = Task::new(Method::Get, api::EVENTS)
            .query(scalar_pairs(&params))
            .header(name, value);

        let payload = self.client.execute_one(task).await?;
        serde_json::from_value(payload).map_err(NylasError::Json)
    }

    /// Fetch one event by id.
    ///
    /// Runs as a one-element batch through the request pool.
    pub async fn get(&self, id: &str) -> Result<Event> {
        let mut map = self
            .get_many([id], self.client.batch_options().with_concurrency(1))
            .await?;
        let outcome = map
            .remove(id)
            .expect("a one-element batch yields an outcome for its identifier");
        let payload = outcome.into_payload()?;
        serde_json::from_value(payload).map_err(NylasError::Json)
    }

    /// Fetch many events by id, one outcome per identifier.
    #[instrument(skip_all)]
    pub async fn get_many<I, S>(
        &self,
        ids: I,
        options: BatchOptions,
    ) -> Result<HashMap<String, Outcome>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (name, value) = self.client.auth_header()?;
        self.client
            .run_batch(
                ids,
                |id| {
                    Ok(Task::new(Method::Get, api::ONE_EVENT)
                        .path_param(id)
                        .header(name.clone(), value.clone()))
                },
                options,
            )
            .await
    }

    /// Create an event.
    #[instrument(skip_all)]
    pub async fn create(&self, draft: &EventDraft) -> Result<Event> {
        let params = serde_json::to_value(draft)?;
        validation::validate(&draft_rules(), &params)?;

        let (body, notify) = split_notify(params);
        let (name, value) = self.client.auth_header()?;

        let mut task = Task::new(Method::Post, api::EVENTS).header(name, value);
        if let Some(notify) = notify {
            task = task.query_pair("notify_participants", notify.to_string());
        }
        task = task.body(body);

        let payload = self.client.execute_one(task).await?;
        serde_json::from_value(payload).map_err(NylasError::Json)
    }

    /// Update an event. The id travels in the path, not the body.
    #[instrument(skip_all, fields(id = %update.id))]
    pub async fn update(&self, update: &EventUpdate) -> Result<Event> {
        let params = serde_json::to_value(update)?;
        validation::validate(&update_rules(), &params)?;

        let (mut body, notify) = split_notify(params);
        body.remove("id");
        let (name, value) = self.client.auth_header()?;

        let mut task = Task::new(Method::Put, api::ONE_EVENT)
            .path_param(update.id.clone())
            .header(name, value);
        if let Some(notify) = notify {
            task = task.query_pair("notify_participants", notify.to_string());
        }
        task = task.body(body);

        let payload = self.client.execute_one(task).await?;
        serde_json::from_value(payload).map_err(NylasError::Json)
    }

    /// RSVP to an event invitation.
    ///
    /// When `account_id` is omitted, the connected account is used.
    #[instrument(skip_all, fields(event_id = %rsvp.event_id))]
    pub async fn rsvp(&self, rsvp: &Rsvp) -> Result<Value> {
        let mut params = serde_json::to_value(rsvp)?;
        if rsvp.account_id.is_none() {
            let account = self.client.account().await?;
            let account_id = account.account_id.unwrap_or(account.id);
            params["account_id"] = Value::String(account_id);
        }
        validation::validate(&rsvp_rules(), &params)?;

        let (body, notify) = split_notify(params);
        let (name, value) = self.client.auth_header()?;

        let mut task = Task::new(Method::Post, api::RSVP).header(name, value);
        if let Some(notify) = notify {
            task = task.query_pair("notify_participants", notify.to_string());
        }
        task = task.body(body);

        self.client.execute_one(task).await
    }

    /// Delete many events, one outcome per identifier.
    #[instrument(skip_all)]
    pub async fn delete(
        &self,
        requests: Vec<DeleteEvent>,
        options: BatchOptions,
    ) -> Result<HashMap<String, Outcome>> {
        for request in &requests {
            validation::require_non_empty("event id", &request.id)?;
        }

        let notify_by_id: HashMap<String, Option<bool>> = requests
            .iter()
            .map(|r| (r.id.clone(), r.notify_participants))
            .collect();
        let ids: Vec<String> = requests.into_iter().map(|r| r.id).collect();

        let (name, value) = self.client.auth_header()?;
        self.client
            .run_batch(
                ids,
                |id| {
                    let mut task = Task::new(Method::Delete, api::ONE_EVENT)
                        .path_param(id)
                        .header(name.clone(), value.clone());
                    if let Some(Some(notify)) = notify_by_id.get(id) {
                        task = task.query_pair("notify_participants", notify.to_string());
                    }
                    Ok(task)
                },
                options,
            )
            .await
    }

    /// Delete one event by id.
    ///
    /// Delegates to a one-element batch delete.
    pub async fn delete_by_id(&self, id: &str, notify_participants: bool) -> Result<Value> {
        let request = DeleteEvent::new(id).notify_participants(notify_participants);
        let mut map = self
            .delete(
                vec![request],
                self.client.batch_options().with_concurrency(1),
            )
            .await?;
        map.remove(id)
            .expect("a one-element batch yields an outcome for its identifier")
            .into_payload()
    }
}

/// Pull `notify_participants` out of a serialized parameter object; it is
/// sent as a query parameter, never in the body.
fn split_notify(params: Value) -> (Map<String, Value>, Option<bool>) {
    let mut body = match params {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let notify = body
        .remove("notify_participants")
        .and_then(|v| v.as_bool());
    (body, notify)
}

/// Render a serialized parameter object as query pairs.
fn scalar_pairs(params: &Value) -> Vec<(String, String)> {
    params
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let rendered = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), rendered)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn when_rules() -> Value {
    json!({
        "oneOf": [
            {
                "type": "object",
                "required": ["time"],
                "properties": {"time": {"type": "integer"}},
                "additionalProperties": false,
            },
            {
                "type": "object",
                "required": ["date"],
                "properties": {"date": {"type": "string", "format": "date"}},
                "additionalProperties": false,
            },
            {
                "type": "object",
                "required": ["start_time", "end_time"],
                "properties": {
                    "start_time": {"type": "integer"},
                    "end_time": {"type": "integer"},
                },
                "additionalProperties": false,
            },
            {
                "type": "object",
                "required": ["start_date", "end_date"],
                "properties": {
                    "start_date": {"type": "string", "format": "date"},
                    "end_date": {"type": "string", "format": "date"},
                },
                "additionalProperties": false,
            },
        ]
    })
}

fn participants_rules() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "required": ["email"],
            "properties": {
                "email": {"type": "string", "format": "email"},
                "name": {"type": "string"},
                "status": {"type": "string"},
                "comment": {"type": "string"},
            },
            "additionalProperties": false,
        }
    })
}

fn query_rules() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {"type": "integer", "minimum": 1},
            "offset": {"type": "integer", "minimum": 0},
            "event_id": {"type": "string", "minLength": 1},
            "calendar_id": {"type": "string", "minLength": 1},
            "title": {"type": "string", "minLength": 1},
            "location": {"type": "string", "minLength": 1},
            "description": {"type": "string", "minLength": 1},
            "show_cancelled": {"type": "boolean"},
            "expand_recurring": {"type": "boolean"},
            "ends_after": {"type": "integer"},
            "ends_before": {"type": "integer"},
            "starts_after": {"type": "integer"},
            "starts_before": {"type": "integer"},
        },
        "additionalProperties": false,
    })
}

fn draft_rules() -> Value {
    json!({
        "type": "object",
        "required": ["calendar_id", "when"],
        "properties": {
            "calendar_id": {"type": "string", "minLength": 1},
            "when": when_rules(),
            "busy": {"type": "boolean"},
            "title": {"type": "string", "minLength": 1},
            "location": {"type": "string", "minLength": 1},
            "recurrence": {"type": "array"},
            "description": {"type": "string", "minLength": 1},
            "notify_participants": {"type": "boolean"},
            "participants": participants_rules(),
        },
        "additionalProperties": false,
    })
}

fn update_rules() -> Value {
    json!({
        "type": "object",
        "required": ["id"],
        "properties": {
            "id": {"type": "string", "minLength": 1},
            "when": when_rules(),
            "busy": {"type": "boolean"},
            "title": {"type": "string", "minLength": 1},
            "location": {"type": "string", "minLength": 1},
            "description": {"type": "string", "minLength": 1},
            "notify_participants": {"type": "boolean"},
            "participants": participants_rules(),
        },
        "additionalProperties": false,
    })
}

fn rsvp_rules() -> Value {
    json!({
        "type": "object",
        "required": ["event_id", "status", "account_id"],
        "properties": {
            "event_id": {"type": "string", "minLength": 1},
            "status": {"enum": ["yes", "no", "maybe"]},
            "account_id": {"type": "string", "minLength": 1},
            "notify_participants": {"type": "boolean"},
        },
        "additionalProperties": false,
    })
}
