//! In-memory state layer for an admin dashboard.
//!
//! Six stores (users, projects, finance, reviews, tickets, settings) each
//! own a normalized collection and change only through commands. A command
//! is turned into domain events by a pure [`Store::handle`], and the events
//! are folded into a new state by [`Store::apply`]. The [`Dashboard`] owns
//! all six stores and exposes typed and JSON dispatch.

mod activity;
mod command;
mod config;
mod dashboard;
pub mod domain;
mod error;
pub mod fixtures;
mod filter;
mod store;

pub use activity::{Activity, ActivityLog, DEFAULT_ACTIVITY_CAPACITY};
pub use command::{CommandContext, CommandEnvelope};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardBuilder, DashboardStore, DispatchOutcome};
pub use domain::*;
pub use error::{DispatchError, ParseError, RangeError};
pub use filter::Filter;
pub use store::{Store, StoreHandle};
