//! Unofficial async Rust client for the Nylas mail/calendar REST API.
//!
//! This crate wraps endpoint resolution, parameter validation, and
//! bounded-concurrency batch execution into a simpler interface for
//! application code. Multi-item operations (fetch or delete N events) run
//! through a request pool that keeps at most `concurrency` requests in
//! flight, tolerates individual failures, and correlates every outcome
//! back to the identifier that produced it.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nylas_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let client = NylasClient::builder("client-id", "client-secret")
//!         .with_access_token("access-token")
//!         .build()?;
//!
//!     let outcomes = client
//!         .events()
//!         .delete(
//!             vec![DeleteEvent::new("evt_1"), DeleteEvent::new("evt_2")],
//!             BatchOptions::default().with_concurrency(2),
//!         )
//!         .await?;
//!
//!     for (id, outcome) in &outcomes {
//!         println!("{id}: deleted={}", outcome.is_success());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Per-item failures are captured data, not errors: a batch call returns
//! one [`Outcome`] per identifier and only fails as a whole when its
//! input is invalid.

pub mod api;
pub mod batch;
pub mod client;
pub mod deltas;
pub mod error;
pub mod events;
pub mod models;
pub mod pool;
pub mod search;
pub mod task;
pub mod transport;
pub mod validation;

pub use batch::{correlate, BatchOptions, DEFAULT_CONCURRENCY};
pub use client::{ClientConfig, NylasClient, NylasClientBuilder};
pub use deltas::{DeltaQuery, Deltas};
pub use error::{NylasError, Result, ResultExt};
pub use events::{DeleteEvent, EventDraft, EventQuery, EventUpdate, Events, Rsvp, RsvpStatus};
pub use models::{Account, DeltaEntry, DeltaSet, Event, Outcome, Participant, When};
pub use pool::RequestPool;
pub use search::Search;
pub use task::{Method, Task};
pub use transport::{DecodeMode, ExecuteTask, HttpExecutor, MockHandler};

/// Prelude module for convenient imports.
///
/// ```rust
/// use nylas_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::BatchOptions;
    pub use crate::client::{ClientConfig, NylasClient, NylasClientBuilder};
    pub use crate::deltas::DeltaQuery;
    pub use crate::error::{NylasError, Result, ResultExt};
    pub use crate::events::{DeleteEvent, EventDraft, EventQuery, EventUpdate, Rsvp, RsvpStatus};
    pub use crate::models::{Account, DeltaSet, Event, Outcome, Participant, When};
    pub use crate::task::{Method, Task};
    pub use crate::transport::DecodeMode;
}
