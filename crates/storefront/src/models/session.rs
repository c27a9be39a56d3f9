//! Session-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fudsiti_core::SessionId;

/// Server-side session handle returned by login.
///
/// The session itself travels as a cookie; this is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
