//! Document operations the built-in actions run against
//!
//! The search backend is external; [`DocumentBackend`] is the slice of it the
//! delete and set-field actions use. Backends are not assumed to be read-after-
//! write consistent, so [`ConsistencyPolicy`] polls for a bounded time until a
//! change becomes visible instead of sleeping for a fixed delay.

use super::ActionError;
use crate::codec::RowIdentifier;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Write access to documents in the search backend
pub trait DocumentBackend: Send + Sync {
    /// Delete one document, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the backend rejects the call.
    fn delete(&self, row: &RowIdentifier) -> Result<bool, ActionError>;

    /// Whether the document is currently visible
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the backend rejects the call.
    fn exists(&self, row: &RowIdentifier) -> Result<bool, ActionError>;

    /// Set the dotted `path` in the document's source to `value`
    ///
    /// Returns `false` if the document does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if the backend rejects the call.
    fn set_field(&self, row: &RowIdentifier, path: &str, value: Value) -> Result<bool, ActionError>;
}

/// Bounded wait for backend changes to become visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyPolicy {
    /// How many times to check before giving up
    pub max_attempts: u32,
    /// Pause between checks, in milliseconds
    pub interval_ms: u64,
}

impl Default for ConsistencyPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            interval_ms: 200,
        }
    }
}

impl ConsistencyPolicy {
    /// Do not wait at all
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 0,
            interval_ms: 0,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Poll until none of `rows` is visible any more
    ///
    /// Returns the rows still visible after the last attempt; an empty list
    /// means the backend converged. With `max_attempts == 0` nothing is
    /// checked and the input is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ActionError` if an existence check fails.
    pub fn wait_until_gone(
        &self,
        backend: &dyn DocumentBackend,
        rows: &[RowIdentifier],
    ) -> Result<Vec<RowIdentifier>, ActionError> {
        let mut pending: Vec<RowIdentifier> = rows.to_vec();

        for attempt in 1..=self.max_attempts {
            let mut still_visible = Vec::new();
            for row in pending {
                if backend.exists(&row)? {
                    still_visible.push(row);
                }
            }
            pending = still_visible;

            tracing::debug!(attempt, pending = pending.len(), "consistency check");

            if pending.is_empty() {
                break;
            }
            if attempt < self.max_attempts {
                std::thread::sleep(self.interval());
            }
        }

        Ok(pending)
    }
}

/// Write `value` at the dotted `path` inside `source`
///
/// Missing objects along the path are created; anything that is not an
/// object where one is needed gets replaced by one.
pub fn set_source_path(source: &mut Value, path: &str, value: Value) {
    let mut current = source;
    let mut segments = path.split(crate::render::NESTED_SEPARATOR).peekable();

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(serde_json::Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
    }
}
