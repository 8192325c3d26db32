//! Bounded, most-recent-first activity log.

use serde::{Deserialize, Serialize};
use uuid::{NoContext, Timestamp, Uuid};

/// Default number of entries the log retains.
pub const DEFAULT_ACTIVITY_CAPACITY: usize = 10;

/// A single human-readable mutation description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Time-ordered identifier.
    pub id: String,
    /// Message shown in the "recent activity" panel.
    pub message: String,
    /// Unix time in milliseconds.
    pub timestamp_ms: u64,
}

impl Activity {
    /// Build an entry whose id is a v7 UUID derived from `timestamp_ms`.
    pub fn new(message: impl Into<String>, timestamp_ms: u64) -> Self {
        let ts = Timestamp::from_unix(
            NoContext,
            timestamp_ms / 1_000,
            ((timestamp_ms % 1_000) * 1_000_000) as u32,
        );
        Self {
            id: Uuid::new_v7(ts).to_string(),
            message: message.into(),
            timestamp_ms,
        }
    }
}

/// Recent activity, newest first, capped at `capacity` entries.
///
/// A deserialized log is trimmed to its capacity, so the cap also holds for
/// state restored from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredActivityLog")]
pub struct ActivityLog {
    capacity: usize,
    entries: Vec<Activity>,
}

/// Wire form of [`ActivityLog`] before the cap is enforced.
#[derive(Deserialize)]
struct StoredActivityLog {
    capacity: usize,
    entries: Vec<Activity>,
}

impl From<StoredActivityLog> for ActivityLog {
    fn from(stored: StoredActivityLog) -> Self {
        let mut entries = stored.entries;
        entries.truncate(stored.capacity);
        Self {
            capacity: stored.capacity,
            entries,
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    /// Empty log retaining at most `capacity` entries.
    ///
    /// Nothing is allocated up front; `capacity` is only a cap.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    /// Insert at the front and drop whatever falls past the cap.
    pub fn record(&mut self, activity: Activity) {
        self.entries.insert(0, activity);
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&Activity> {
        self.entries.first()
    }

    /// Maximum number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently held, never more than
    /// [`capacity`](ActivityLog::capacity).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
