//! Project store -- client projects, the active-project counter, the recent
//! activity log, and the overview counters shown on the dashboard home page.
//!
//! Every project mutation records an activity entry. How `active_projects`
//! follows project mutations is decided by [`ActiveProjectCounting`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityLog};
use crate::command::CommandContext;
use crate::error::{ParseError, RangeError};
use crate::filter::contains;
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStatus {
    Completed,
    Active,
    #[serde(rename = "On Hold", alias = "OnHold", alias = "Paused")]
    OnHold,
}

impl ProjectStatus {
    /// Label shown in the projects table, e.g. `"On Hold"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Active => "Active",
            Self::OnHold => "On Hold",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(Self::Completed),
            "Active" => Ok(Self::Active),
            "On Hold" | "OnHold" | "Paused" => Ok(Self::OnHold),
            other => Err(ParseError::new("project status", other)),
        }
    }
}

/// Completion percentage, 0 through 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Progress(u8);

impl Progress {
    pub const MAX: u8 = 100;

    /// Checked constructor.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError`] when `percent` is above [`Progress::MAX`].
    pub fn new(percent: u8) -> Result<Self, RangeError> {
        Self::try_from(i64::from(percent))
    }

    /// The percentage as a plain number.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Progress {
    type Error = RangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RangeError {
                field: "progress",
                min: 0,
                max: u32::from(Self::MAX),
                value,
            })
        }
    }
}

impl From<Progress> for u8 {
    fn from(p: Progress) -> Self {
        p.0
    }
}

/// A client project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub client: String,
    /// ISO date (`YYYY-MM-DD`).
    pub start_date: String,
    pub status: ProjectStatus,
    pub progress: Progress,
}

/// How `active_projects` tracks project mutations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveProjectCounting {
    /// Add always increments; delete decrements only when the removed
    /// project was Active; updates leave the counter alone. The counter can
    /// drift from the collection.
    #[default]
    Incremental,
    /// Recount Active projects after every project mutation.
    Recount,
}

/// Share of users per role, in percent, for the distribution chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDistribution {
    pub customers: u32,
    pub managers: u32,
    pub admins: u32,
}

/// Project counts per status bucket, for the status chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStatusBreakdown {
    pub completed: u64,
    pub in_progress: u64,
    pub pending: u64,
    pub cancelled: u64,
}

/// Headline numbers on the dashboard home page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardOverview {
    pub total_users: u64,
    pub total_transactions: u64,
    pub user_distribution: UserDistribution,
    pub project_status: ProjectStatusBreakdown,
}

/// Projects plus everything derived from or logged about them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStore {
    pub projects: Vec<Project>,
    pub active_projects: u64,
    pub activity: ActivityLog,
    pub overview: DashboardOverview,
    pub counting: ActiveProjectCounting,
}

impl ProjectStore {
    /// Store pre-populated with `projects`; the counter starts at their
    /// Active count.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let active_projects = count_active(&projects);
        Self {
            projects,
            active_projects,
            ..Self::default()
        }
    }

    /// Project with the given id, if any.
    pub fn get(&self, id: u64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Whether the counter matches a fresh scan of the collection.
    pub fn is_counter_consistent(&self) -> bool {
        self.active_projects == count_active(&self.projects)
    }

    fn contains(&self, id: u64) -> bool {
        self.get(id).is_some()
    }

    fn recount(&mut self) {
        if self.counting == ActiveProjectCounting::Recount {
            self.active_projects = count_active(&self.projects);
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`ProjectStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProjectCommand {
    /// Append a project.
    Add(Project),
    /// Replace the project with the same id.
    Update(Project),
    /// Remove a project by id.
    Delete { id: u64 },
    /// Overwrite the total-users headline number.
    SetTotalUsers { count: u64 },
    /// Overwrite the active-projects counter.
    SetActiveProjects { count: u64 },
    /// Overwrite the total-transactions headline number.
    SetTotalTransactions { count: u64 },
    /// Log a free-form activity entry.
    RecordActivity { message: String },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`ProjectStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProjectEvent {
    Added(Project),
    Updated(Project),
    /// Carries the removed record so the counter can look at its status.
    Deleted(Project),
    TotalUsersSet { count: u64 },
    ActiveProjectsSet { count: u64 },
    TotalTransactionsSet { count: u64 },
    ActivityRecorded(Activity),
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`ProjectCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// A project with this id already exists.
    #[error("project {0} already exists")]
    DuplicateId(u64),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for ProjectStore {
    const STORE_NAME: &'static str = "projects";
    type Command = ProjectCommand;
    type DomainEvent = ProjectEvent;
    type Error = ProjectError;

    fn handle(
        &self,
        cmd: ProjectCommand,
        ctx: &CommandContext,
    ) -> Result<Vec<ProjectEvent>, ProjectError> {
        let logged = |message: String| {
            ProjectEvent::ActivityRecorded(Activity::new(message, ctx.issued_at()))
        };

        match cmd {
            ProjectCommand::Add(project) => {
                if self.contains(project.id) {
                    return Err(ProjectError::DuplicateId(project.id));
                }
                let note = logged(format!("New project added: {}", project.title));
                Ok(vec![ProjectEvent::Added(project), note])
            }
            ProjectCommand::Update(project) => {
                if !self.contains(project.id) {
                    tracing::debug!(id = project.id, "update ignored: project not found");
                    return Ok(vec![]);
                }
                let note = logged(format!("Project updated: {}", project.title));
                Ok(vec![ProjectEvent::Updated(project), note])
            }
            ProjectCommand::Delete { id } => {
                let Some(project) = self.get(id) else {
                    tracing::debug!(id, "delete ignored: project not found");
                    return Ok(vec![]);
                };
                let note = logged(format!("Project deleted: {}", project.title));
                Ok(vec![ProjectEvent::Deleted(project.clone()), note])
            }
            ProjectCommand::SetTotalUsers { count } => {
                Ok(vec![ProjectEvent::TotalUsersSet { count }])
            }
            ProjectCommand::SetActiveProjects { count } => {
                Ok(vec![ProjectEvent::ActiveProjectsSet { count }])
            }
            ProjectCommand::SetTotalTransactions { count } => {
                Ok(vec![ProjectEvent::TotalTransactionsSet { count }])
            }
            ProjectCommand::RecordActivity { message } => Ok(vec![logged(message)]),
        }
    }

    fn apply(mut self, event: &ProjectEvent) -> Self {
        match event {
            ProjectEvent::Added(project) => {
                self.projects.push(project.clone());
                self.active_projects += 1;
                self.recount();
            }
            ProjectEvent::Updated(project) => {
                if let Some(slot) = self.projects.iter_mut().find(|p| p.id == project.id) {
                    *slot = project.clone();
                }
                self.recount();
            }
            ProjectEvent::Deleted(project) => {
                let before = self.projects.len();
                self.projects.retain(|p| p.id != project.id);
                if self.projects.len() < before && project.status == ProjectStatus::Active {
                    self.active_projects = self.active_projects.saturating_sub(1);
                }
                self.recount();
            }
            ProjectEvent::TotalUsersSet { count } => self.overview.total_users = *count,
            ProjectEvent::ActiveProjectsSet { count } => self.active_projects = *count,
            ProjectEvent::TotalTransactionsSet { count } => {
                self.overview.total_transactions = *count;
            }
            ProjectEvent::ActivityRecorded(activity) => self.activity.record(activity.clone()),
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Number of projects whose status is Active.
pub fn count_active(projects: &[Project]) -> u64 {
    projects
        .iter()
        .filter(|p| p.status == ProjectStatus::Active)
        .count() as u64
}

/// Projects whose title or client contains `query` (case-sensitive).
pub fn search_projects<'a>(projects: &'a [Project], query: &str) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| contains(&p.title, query) || contains(&p.client, query))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
