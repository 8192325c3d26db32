//! Ticket store -- customer support requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::error::ParseError;
use crate::filter::{Filter, contains};
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// How urgently a ticket needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketPriority {
    High,
    Medium,
    Low,
}

impl TicketPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            other => Err(ParseError::new("ticket priority", other)),
        }
    }
}

/// Where a ticket is in its handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "In Progress" | "InProgress" => Ok(Self::InProgress),
            "Closed" => Ok(Self::Closed),
            other => Err(ParseError::new("ticket status", other)),
        }
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Reference such as `TKT001`.
    pub id: String,
    pub subject: String,
    /// Name of the reporting user.
    pub user: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
}

/// Current filter selections on the support page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFilters {
    pub search: String,
    pub status: Filter<TicketStatus>,
    pub priority: Filter<TicketPriority>,
}

/// Tickets plus the active filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketStore {
    pub tickets: Vec<Ticket>,
    pub filters: TicketFilters,
}

impl TicketStore {
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets,
            filters: TicketFilters::default(),
        }
    }

    /// Tickets passing the current filters.
    pub fn visible(&self) -> Vec<&Ticket> {
        filtered_tickets(&self.tickets, &self.filters)
    }

    /// Ticket with the given id, if any.
    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`TicketStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TicketCommand {
    Add(Ticket),
    Delete { id: String },
    SetSearchFilter { search: String },
    SetStatusFilter { status: Filter<TicketStatus> },
    SetPriorityFilter { priority: Filter<TicketPriority> },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`TicketStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TicketEvent {
    Added(Ticket),
    Deleted { id: String },
    SearchFilterSet { search: String },
    StatusFilterSet { status: Filter<TicketStatus> },
    PriorityFilterSet { priority: Filter<TicketPriority> },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`TicketCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("ticket {0} already exists")]
    DuplicateId(String),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for TicketStore {
    const STORE_NAME: &'static str = "tickets";
    type Command = TicketCommand;
    type DomainEvent = TicketEvent;
    type Error = TicketError;

    fn handle(
        &self,
        cmd: TicketCommand,
        _ctx: &CommandContext,
    ) -> Result<Vec<TicketEvent>, TicketError> {
        match cmd {
            TicketCommand::Add(ticket) => {
                if self.get(&ticket.id).is_some() {
                    return Err(TicketError::DuplicateId(ticket.id));
                }
                Ok(vec![TicketEvent::Added(ticket)])
            }
            TicketCommand::Delete { id } => {
                if self.get(&id).is_none() {
                    tracing::debug!(%id, "delete ignored: ticket not found");
                    return Ok(vec![]);
                }
                Ok(vec![TicketEvent::Deleted { id }])
            }
            TicketCommand::SetSearchFilter { search } => {
                Ok(vec![TicketEvent::SearchFilterSet { search }])
            }
            TicketCommand::SetStatusFilter { status } => {
                Ok(vec![TicketEvent::StatusFilterSet { status }])
            }
            TicketCommand::SetPriorityFilter { priority } => {
                Ok(vec![TicketEvent::PriorityFilterSet { priority }])
            }
        }
    }

    fn apply(mut self, event: &TicketEvent) -> Self {
        match event {
            TicketEvent::Added(ticket) => self.tickets.push(ticket.clone()),
            TicketEvent::Deleted { id } => self.tickets.retain(|t| t.id != *id),
            TicketEvent::SearchFilterSet { search } => self.filters.search = search.clone(),
            TicketEvent::StatusFilterSet { status } => self.filters.status = *status,
            TicketEvent::PriorityFilterSet { priority } => self.filters.priority = *priority,
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Tickets whose subject or user contains the search text (case-sensitive)
/// and which pass both the status and priority filters.
pub fn filtered_tickets<'a>(tickets: &'a [Ticket], filters: &TicketFilters) -> Vec<&'a Ticket> {
    let needle = filters.search.as_str();
    tickets
        .iter()
        .filter(|t| contains(&t.subject, needle) || contains(&t.user, needle))
        .filter(|t| filters.status.matches(&t.status))
        .filter(|t| filters.priority.matches(&t.priority))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(
        id: &str,
        subject: &str,
        user: &str,
        priority: TicketPriority,
        status: TicketStatus,
    ) -> Ticket {
        Ticket {
            id: id.into(),
            subject: subject.into(),
            user: user.into(),
            priority,
            status,
            date: "2024-03-22".into(),
        }
    }

    fn sample() -> Vec<Ticket> {
        vec![
            ticket("T1", "login page blank", "Fatima Zahra", TicketPriority::High, TicketStatus::Open),
            ticket("T2", "Login Authentication Failure", "Omar", TicketPriority::High, TicketStatus::Open),
            ticket("T3", "Billing question", "login_admin", TicketPriority::Low, TicketStatus::Open),
            ticket("T4", "login timeout", "Ahmed Ali", TicketPriority::Medium, TicketStatus::Closed),
        ]
    }

    #[test]
    fn open_login_tickets_match_subject_or_user() {
        let tickets = sample();
        let filters = TicketFilters {
            status: "Open".parse().expect("valid status"),
            priority: "all".parse().expect("valid priority"),
            search: "login".into(),
        };
        let ids: Vec<&str> = filtered_tickets(&tickets, &filters)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        // T2 only has "Login" (capitalized); T4 is closed.
        assert_eq!(ids, vec!["T1", "T3"]);
    }

    #[test]
    fn priority_and_status_combine() {
        let tickets = sample();
        let filters = TicketFilters {
            search: String::new(),
            status: Filter::Only(TicketStatus::Open),
            priority: Filter::Only(TicketPriority::High),
        };
        assert_eq!(filtered_tickets(&tickets, &filters).len(), 2);
    }

    #[test]
    fn default_filters_show_everything() {
        let store = TicketStore::with_tickets(sample());
        assert_eq!(store.visible().len(), 4);
    }

    #[test]
    fn setters_and_delete() {
        let ctx = CommandContext::default();
        let mut store = TicketStore::with_tickets(sample());
        for cmd in [
            TicketCommand::SetStatusFilter {
                status: Filter::Only(TicketStatus::Closed),
            },
            TicketCommand::SetPriorityFilter {
                priority: Filter::Only(TicketPriority::Medium),
            },
            TicketCommand::SetSearchFilter {
                search: "timeout".into(),
            },
        ] {
            let events = store.handle(cmd, &ctx).expect("setter succeeds");
            store = events.into_iter().fold(store, |s, e| s.apply(&e));
        }
        assert_eq!(store.visible().len(), 1);

        let events = store
            .handle(TicketCommand::Delete { id: "T4".into() }, &ctx)
            .expect("delete succeeds");
        let store = events.into_iter().fold(store, |s, e| s.apply(&e));
        assert!(store.visible().is_empty());
        assert_eq!(store.tickets.len(), 3);
    }

    #[test]
    fn delete_unknown_is_noop() {
        let store = TicketStore::with_tickets(sample());
        let events = store
            .handle(TicketCommand::Delete { id: "T99".into() }, &CommandContext::default())
            .expect("not found is not an error");
        assert!(events.is_empty());
    }

    #[test]
    fn status_wire_spellings() {
        let status: TicketStatus = serde_json::from_str("\"In Progress\"").expect("display form");
        assert_eq!(status, TicketStatus::InProgress);
        let status: TicketStatus = serde_json::from_str("\"InProgress\"").expect("variant form");
        assert_eq!(status, TicketStatus::InProgress);
        assert_eq!(
            "In Progress".parse::<Filter<TicketStatus>>(),
            Ok(Filter::Only(TicketStatus::InProgress))
        );
        assert!("Urgent".parse::<Filter<TicketPriority>>().is_err());
    }
}
