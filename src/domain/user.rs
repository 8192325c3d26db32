//! User store -- dashboard accounts.
//!
//! Users are appended, replaced wholesale, or removed by id. `Register`
//! derives the id from the command's issue time the way the "add user" form
//! does, and assigns one of the five stock avatars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::error::ParseError;
use crate::filter::contains_ignore_case;
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(alias = "Client")]
    Customer,
    Developer,
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Developer => "Developer",
            Self::Manager => "Manager",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" | "Client" => Ok(Self::Customer),
            "Developer" => Ok(Self::Developer),
            "Manager" => Ok(Self::Manager),
            other => Err(ParseError::new("user role", other)),
        }
    }
}

/// Whether the account can sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Inactive,
}

/// A dashboard user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    /// Path of the avatar image.
    pub avatar: String,
}

/// Form data for a user whose id is not chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
}

/// Stock avatar for a generated id: `/avatars/avatar1.png` .. `avatar5.png`.
pub fn avatar_for(id: u64) -> String {
    format!("/avatars/avatar{}.png", id % 5 + 1)
}

/// The user collection plus the list view's loading and error flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStore {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl UserStore {
    /// Store pre-populated with `users`.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    /// Look up a user.
    ///
    /// # Arguments
    ///
    /// * `id` - The user id to find.
    ///
    /// # Returns
    ///
    /// The user with that id, or `None` when no such user exists.
    pub fn get(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    /// First id at or after `start` that no user holds yet, or `None` when
    /// every id up to `u64::MAX` is taken.
    fn next_free_id(&self, start: u64) -> Option<u64> {
        let mut id = start;
        while self.contains(id) {
            id = id.checked_add(1)?;
        }
        Some(id)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`UserStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserCommand {
    /// Append a fully specified user.
    Add(User),
    /// Append a user, generating the id and avatar.
    Register(NewUser),
    /// Replace the user with the same id.
    Update(User),
    /// Remove a user by id.
    Delete { id: u64 },
    /// Toggle the list view's loading flag.
    SetLoading { loading: bool },
    /// Set or clear the list view's error message.
    SetError { error: Option<String> },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`UserStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    Added(User),
    Updated(User),
    Deleted { id: u64 },
    LoadingSet { loading: bool },
    ErrorSet { error: Option<String> },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`UserCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// A user with this id already exists.
    #[error("user {0} already exists")]
    DuplicateId(u64),
    /// No free id remains at or after the issue time.
    #[error("no free user id at or after {0}")]
    IdsExhausted(u64),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for UserStore {
    const STORE_NAME: &'static str = "users";
    type Command = UserCommand;
    type DomainEvent = UserEvent;
    type Error = UserError;

    fn handle(&self, cmd: UserCommand, ctx: &CommandContext) -> Result<Vec<UserEvent>, UserError> {
        match cmd {
            UserCommand::Add(user) => {
                if self.contains(user.id) {
                    return Err(UserError::DuplicateId(user.id));
                }
                Ok(vec![UserEvent::Added(user)])
            }
            UserCommand::Register(new) => {
                let start = ctx.issued_at();
                let id = self
                    .next_free_id(start)
                    .ok_or(UserError::IdsExhausted(start))?;
                Ok(vec![UserEvent::Added(User {
                    id,
                    name: new.name,
                    email: new.email,
                    role: new.role,
                    status: new.status,
                    avatar: avatar_for(id),
                })])
            }
            UserCommand::Update(user) => {
                if !self.contains(user.id) {
                    tracing::debug!(id = user.id, "update ignored: user not found");
                    return Ok(vec![]);
                }
                Ok(vec![UserEvent::Updated(user)])
            }
            UserCommand::Delete { id } => {
                if !self.contains(id) {
                    tracing::debug!(id, "delete ignored: user not found");
                    return Ok(vec![]);
                }
                Ok(vec![UserEvent::Deleted { id }])
            }
            UserCommand::SetLoading { loading } => Ok(vec![UserEvent::LoadingSet { loading }]),
            UserCommand::SetError { error } => Ok(vec![UserEvent::ErrorSet { error }]),
        }
    }

    fn apply(mut self, event: &UserEvent) -> Self {
        match event {
            UserEvent::Added(user) => self.users.push(user.clone()),
            UserEvent::Updated(user) => {
                if let Some(slot) = self.users.iter_mut().find(|u| u.id == user.id) {
                    *slot = user.clone();
                }
            }
            UserEvent::Deleted { id } => self.users.retain(|u| u.id != *id),
            UserEvent::LoadingSet { loading } => self.loading = *loading,
            UserEvent::ErrorSet { error } => self.error = error.clone(),
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Users whose name or email contains `query`, ignoring case.
pub fn search_users<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    users
        .iter()
        .filter(|u| contains_ignore_case(&u.name, query) || contains_ignore_case(&u.email, query))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
