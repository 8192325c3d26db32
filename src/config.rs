//! Dashboard configuration.

use serde::{Deserialize, Serialize};

use crate::activity::DEFAULT_ACTIVITY_CAPACITY;
use crate::domain::ActiveProjectCounting;

/// Options for building a [`Dashboard`](crate::Dashboard).
///
/// Every field has a default, so a partial JSON document (or `{}`) is a
/// valid configuration.
///
/// # Examples
///
/// ```
/// use dashboard_state::{ActiveProjectCounting, DashboardConfig};
///
/// let config: DashboardConfig =
///     serde_json::from_str(r#"{"active_project_counting": "recount"}"#).unwrap();
/// assert_eq!(config.active_project_counting, ActiveProjectCounting::Recount);
/// assert_eq!(config.activity_capacity, 10);
/// assert!(config.seed_fixtures);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// How many entries the recent-activity log keeps.
    ///
    /// Default: 10.
    pub activity_capacity: usize,

    /// Start from the built-in demo data instead of empty stores.
    ///
    /// Default: `true`.
    pub seed_fixtures: bool,

    /// How the active-projects counter follows project mutations.
    ///
    /// Default: [`ActiveProjectCounting::Incremental`].
    pub active_project_counting: ActiveProjectCounting,

    /// Actor recorded on commands issued without an explicit context.
    pub actor: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            activity_capacity: DEFAULT_ACTIVITY_CAPACITY,
            seed_fixtures: true,
            active_project_counting: ActiveProjectCounting::default(),
            actor: None,
        }
    }
}
