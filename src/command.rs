//! Command context and the type-erased command envelope.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cross-cutting metadata passed alongside a command.
///
/// Carries the issuing actor, a correlation ID and the time the command was
/// issued without polluting the `Command` or `DomainEvent` types. Stores read
/// `issued_at_ms` whenever they derive identifiers or timestamps, which keeps
/// [`Store::handle`](crate::Store::handle) deterministic under test.
///
/// # Examples
///
/// ```
/// use dashboard_state::CommandContext;
/// use serde_json::json;
///
/// let ctx = CommandContext::default()
///     .with_actor("admin-1")
///     .with_correlation_id("req-abc-123")
///     .with_issued_at(1_700_000_000_000)
///     .with_metadata(json!({"source": "users-page"}));
///
/// assert_eq!(ctx.actor.as_deref(), Some("admin-1"));
/// assert_eq!(ctx.issued_at_ms, Some(1_700_000_000_000));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Identity of whoever issued the command (e.g. an admin user ID).
    pub actor: Option<String>,
    /// Correlation ID for tracing one UI interaction across stores.
    pub correlation_id: Option<String>,
    /// Arbitrary metadata supplied by the caller.
    pub metadata: Option<Value>,
    /// Unix time in milliseconds at which the command was issued.
    pub issued_at_ms: Option<u64>,
}

impl CommandContext {
    /// Set the actor identity.
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Set the correlation ID.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set arbitrary metadata.
    pub fn with_metadata(mut self, meta: Value) -> Self {
        self.metadata = Some(meta);
        self
    }

    /// Pin the issue time, in Unix milliseconds.
    pub fn with_issued_at(mut self, millis: u64) -> Self {
        self.issued_at_ms = Some(millis);
        self
    }

    /// Fill in `issued_at_ms` from the system clock if it is not set yet.
    pub(crate) fn stamped(mut self) -> Self {
        if self.issued_at_ms.is_none() {
            self.issued_at_ms = Some(now_millis());
        }
        self
    }

    /// The issue time in Unix milliseconds.
    ///
    /// Never reads the clock. An unstamped context reads as `0`;
    /// [`StoreHandle::execute`](crate::StoreHandle::execute) stamps the
    /// context before any store sees it.
    pub fn issued_at(&self) -> u64 {
        self.issued_at_ms.unwrap_or(0)
    }
}

/// Current Unix time in milliseconds. A clock before 1970 reads as zero.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A named operation addressed to one store.
///
/// This is the shape the view layer submits when it does not want to depend
/// on the concrete command types. The `command` field is the adjacently
/// tagged JSON form of the store's command enum, e.g.
/// `{"type": "Delete", "data": {"id": "TKT001"}}`. The dashboard deserializes
/// it into the store's `Command` type at dispatch time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Target store name (must match `Store::STORE_NAME`).
    pub store: String,
    /// JSON-serialized command payload.
    pub command: Value,
    /// Cross-cutting metadata forwarded to the command handler.
    #[serde(default)]
    pub context: CommandContext,
}

impl CommandEnvelope {
    /// Build an envelope with a default context.
    pub fn new(store: impl Into<String>, command: Value) -> Self {
        Self {
            store: store.into(),
            command,
            context: CommandContext::default(),
        }
    }

    /// Replace the context carried by this envelope.
    pub fn with_context(mut self, context: CommandContext) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_context_has_no_fields_set() {
        let ctx = CommandContext::default();
        assert_eq!(ctx.actor, None);
        assert_eq!(ctx.correlation_id, None);
        assert_eq!(ctx.metadata, None);
        assert_eq!(ctx.issued_at_ms, None);
    }

    #[test]
    fn builder_chains_all_fields() {
        let ctx = CommandContext::default()
            .with_actor("admin")
            .with_correlation_id("req-abc")
            .with_issued_at(42)
            .with_metadata(json!({"source": "test"}));

        assert_eq!(ctx.actor.as_deref(), Some("admin"));
        assert_eq!(ctx.correlation_id.as_deref(), Some("req-abc"));
        assert_eq!(ctx.issued_at_ms, Some(42));
        assert_eq!(ctx.metadata, Some(json!({"source": "test"})));
    }

    #[test]
    fn stamped_keeps_pinned_time() {
        let ctx = CommandContext::default().with_issued_at(1_000).stamped();
        assert_eq!(ctx.issued_at_ms, Some(1_000));
    }

    #[test]
    fn unstamped_context_reads_as_zero() {
        assert_eq!(CommandContext::default().issued_at(), 0);
        assert_eq!(CommandContext::default().with_issued_at(7).issued_at(), 7);
    }

    #[test]
    fn stamped_fills_missing_time_from_clock() {
        let ctx = CommandContext::default().stamped();
        // Anything after 2020-01-01 proves the clock was read.
        assert!(ctx.issued_at_ms.expect("stamped") > 1_577_836_800_000);
    }

    #[test]
    fn envelope_without_context_deserializes() {
        let envelope: CommandEnvelope = serde_json::from_value(json!({
            "store": "tickets",
            "command": {"type": "Delete", "data": {"id": "TKT001"}}
        }))
        .expect("context is optional");

        assert_eq!(envelope.store, "tickets");
        assert_eq!(envelope.context, CommandContext::default());
        assert_eq!(envelope.command["type"], "Delete");
    }
}
