//! Response payload types and the per-task [`Outcome`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{NylasError, Result};

/// The result of executing one task.
///
/// Exactly one outcome is produced per task, at the same position as the
/// task in its batch. A failing task never aborts the batch; callers
/// inspect each entry instead of catching errors per item.
#[derive(Debug)]
pub enum Outcome {
    /// The request succeeded and its body decoded.
    Success(Value),
    /// The request failed; `status` carries the HTTP status when one was
    /// received.
    Failure {
        error: NylasError,
        status: Option<u16>,
    },
}

impl Outcome {
    /// Wrap an error, capturing its status code when it has one.
    pub fn failure(error: NylasError) -> Self {
        let status = error.status();
        Self::Failure { error, status }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The decoded payload, if this outcome is a success.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The HTTP status attached to a failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success(_) => None,
            Self::Failure { status, .. } => *status,
        }
    }

    /// Convert into a `Result`, surfacing the failure's error.
    pub fn into_payload(self) -> Result<Value> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure { error, .. } => Err(error),
        }
    }
}

/// A calendar event as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub busy: Option<bool>,
    #[serde(default)]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub when: Option<When>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// The time shape of an event: a point in time, a full day, or a span of
/// either.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum When {
    Timespan { start_time: i64, end_time: i64 },
    Datespan { start_date: String, end_date: String },
    Time { time: i64 },
    Date { date: String },
}

/// An event participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// The connected account, fetched once and cached on the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub linked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_state: Option<String>,
    #[serde(default)]
    pub organization_unit: Option<String>,
}

/// A page of change records since a cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaSet {
    #[serde(default)]
    pub cursor_start: Option<String>,
    #[serde(default)]
    pub cursor_end: Option<String>,
    #[serde(default)]
    pub deltas: Vec<DeltaEntry>,
}

/// One change record: an object was created, modified, or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaEntry {
    pub cursor: String,
    /// `"create"`, `"modify"` or `"delete"`.
    pub event: String,
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Option<Value>,
}
