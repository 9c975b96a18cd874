//! Parameter validation against per-operation rule sets.
//!
//! Every logical call validates its parameters here before a single task is
//! built, so a bad input can never produce a partial batch. Rule sets are
//! plain JSON Schema documents declared next to the resource that owns them.

use serde_json::Value;

use crate::error::{NylasError, Result};

/// Validate a candidate object against a rule set.
///
/// Returns a [`NylasError::Validation`] listing every violation. A rule set
/// that itself fails to compile is a configuration error.
pub fn validate(rules: &Value, candidate: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(rules)
        .map_err(|e| NylasError::Config(format!("invalid rule set: {e}")))?;

    let violations: Vec<String> = validator
        .iter_errors(candidate)
        .map(|err| err.to_string())
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(NylasError::Validation(violations.join("; ")))
    }
}

/// Require a non-empty string value, e.g. an access token or identifier.
pub fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(NylasError::Validation(format!("{name} must not be empty")))
    } else {
        Ok(())
    }
}
