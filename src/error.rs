//! Crate-level error types for the named dispatch interface and boundary parsing.

/// Error returned by [`Dashboard::dispatch`](crate::Dashboard::dispatch).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No store is registered under the envelope's store name.
    #[error("unknown store: {0}")]
    UnknownStore(String),

    /// The command payload does not match the store's command schema.
    ///
    /// Covers unknown operation names as well as invalid field values such
    /// as an out-of-range rating or an unrecognized status.
    #[error("invalid command for store '{store}': {source}")]
    InvalidCommand {
        /// Store the envelope was addressed to.
        store: &'static str,
        /// Deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// The store rejected the command.
    #[error("command rejected by store '{store}': {message}")]
    Rejected {
        /// Store that rejected the command.
        store: &'static str,
        /// Display text of the store's domain error.
        message: String,
    },

    /// The updated state could not be rendered as JSON.
    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[source] serde_json::Error),
}

/// A bounded numeric value was outside its allowed range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be between {min} and {max}, got {value}")]
pub struct RangeError {
    /// Field being validated (e.g. "rating").
    pub field: &'static str,
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
    /// Rejected input.
    pub value: i64,
}

/// A string could not be parsed into a categorical value or filter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind}: '{input}'")]
pub struct ParseError {
    /// What was being parsed (e.g. "ticket status").
    pub kind: &'static str,
    /// Rejected input.
    pub input: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, input: &str) -> Self {
        Self {
            kind,
            input: input.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_store_display() {
        let err = DispatchError::UnknownStore("orders".into());
        assert_eq!(err.to_string(), "unknown store: orders");
    }

    #[test]
    fn rejected_display_carries_store_and_message() {
        let err = DispatchError::Rejected {
            store: "finance",
            message: "transaction amount must be greater than zero".into(),
        };
        assert_eq!(
            err.to_string(),
            "command rejected by store 'finance': transaction amount must be greater than zero"
        );
    }

    #[test]
    fn invalid_command_exposes_source() {
        let source = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = DispatchError::InvalidCommand {
            store: "users",
            source,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("invalid command for store 'users'"));
    }

    #[test]
    fn range_error_display() {
        let err = RangeError {
            field: "rating",
            min: 1,
            max: 5,
            value: 9,
        };
        assert_eq!(err.to_string(), "rating must be between 1 and 5, got 9");
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::new("ticket priority", "Urgent");
        assert_eq!(err.to_string(), "unrecognized ticket priority: 'Urgent'");
    }

    const _: () = {
        #[allow(dead_code)]
        fn assert_send_sync<T: Send + Sync>() {}

        #[allow(dead_code)]
        fn check() {
            assert_send_sync::<DispatchError>();
            assert_send_sync::<RangeError>();
            assert_send_sync::<ParseError>();
        }
    };
}
