//! Store trait and the copy-on-write [`StoreHandle`].

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};

use crate::command::CommandContext;

/// A dashboard state container whose state changes only through events.
///
/// The implementing type itself is the store's state. State moves forward by
/// folding domain events through [`apply`](Store::apply).
///
/// # Contract
///
/// - [`handle`](Store::handle) is a pure decision function: no I/O, no clock
///   reads, no side effects. Anything time-dependent comes from the
///   [`CommandContext`], which [`StoreHandle::execute`] stamps with the
///   current time before calling `handle`. A command that targets a missing record returns
///   `Ok(vec![])`.
/// - [`apply`](Store::apply) is a pure, total function that takes ownership
///   of the current state and returns the next one.
pub trait Store: Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used by the dispatch interface (e.g. `"users"`).
    const STORE_NAME: &'static str;

    /// The set of commands this store accepts.
    type Command: DeserializeOwned + Send + 'static;

    /// The set of events this store produces and applies.
    type DomainEvent: Serialize + Clone + Send + Sync + 'static;

    /// Command rejection error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Validate a command against the current state and produce events.
    fn handle(
        &self,
        cmd: Self::Command,
        ctx: &CommandContext,
    ) -> Result<Vec<Self::DomainEvent>, Self::Error>;

    /// Apply a single event to produce the next state.
    fn apply(self, event: &Self::DomainEvent) -> Self;
}

/// Owner of one store's current state.
///
/// The state lives behind an `Arc`. Each successful command folds its events
/// into a fresh copy and swaps the pointer, so snapshots obtained through
/// [`state`](StoreHandle::state) are never mutated afterwards.
#[derive(Debug)]
pub struct StoreHandle<S: Store> {
    state: Arc<S>,
    version: u64,
}

impl<S: Store> Clone for StoreHandle<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            version: self.version,
        }
    }
}

impl<S: Store> Default for StoreHandle<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Store> StoreHandle<S> {
    /// Wrap an initial state at version 0.
    pub fn new(initial: S) -> Self {
        Self {
            state: Arc::new(initial),
            version: 0,
        }
    }

    /// Immutable snapshot of the current state.
    pub fn state(&self) -> Arc<S> {
        Arc::clone(&self.state)
    }

    /// Number of events applied since the handle was created.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Run a command through the store and apply the resulting events.
    ///
    /// The context is stamped with the current time when the caller did not
    /// pin `issued_at_ms`. On rejection the state is left untouched.
    ///
    /// # Returns
    ///
    /// The events that were applied; empty for no-op commands.
    ///
    /// # Errors
    ///
    /// Returns the store's domain error when the command is rejected.
    pub fn execute(
        &mut self,
        cmd: S::Command,
        ctx: CommandContext,
    ) -> Result<Vec<S::DomainEvent>, S::Error> {
        let _span = tracing::info_span!("execute", store = S::STORE_NAME).entered();
        let ctx = ctx.stamped();

        let events = self.state.handle(cmd, &ctx)?;
        if events.is_empty() {
            tracing::debug!("command produced no events");
            return Ok(events);
        }

        let next = events
            .iter()
            .fold(S::clone(&self.state), |state, event| state.apply(event));
        self.state = Arc::new(next);
        self.version += events.len() as u64;

        tracing::info!(
            count = events.len(),
            version = self.version,
            "events applied"
        );
        Ok(events)
    }

    /// Replace the state wholesale and reset the version.
    pub(crate) fn reset(&mut self, state: S) {
        self.state = Arc::new(state);
        self.version = 0;
    }
}
