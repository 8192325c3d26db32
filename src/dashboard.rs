//! The [`Dashboard`] facade owning all six stores.
//!
//! Commands reach a store either typed, through
//! [`execute`](Dashboard::execute), or by name, through
//! [`dispatch`](Dashboard::dispatch) with a JSON [`CommandEnvelope`].

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::activity::ActivityLog;
use crate::command::{CommandContext, CommandEnvelope, now_millis};
use crate::config::DashboardConfig;
use crate::domain::{
    ActiveProjectCounting, FinanceStore, ProjectStore, ReviewStore, SettingsStore, TicketStore,
    UserStore,
};
use crate::error::DispatchError;
use crate::fixtures;
use crate::store::{Store, StoreHandle};

/// Name the home page uses for the project store.
const PROJECTS_ALIAS: &str = "dashboard";

/// A store that lives inside a [`Dashboard`].
///
/// Maps each store type to its slot so that [`Dashboard::execute`] and
/// [`Dashboard::snapshot`] can be generic over the store.
pub trait DashboardStore: Store {
    fn slot(dashboard: &Dashboard) -> &StoreHandle<Self>;
    fn slot_mut(dashboard: &mut Dashboard) -> &mut StoreHandle<Self>;
}

macro_rules! dashboard_store {
    ($store:ty, $field:ident) => {
        impl DashboardStore for $store {
            fn slot(dashboard: &Dashboard) -> &StoreHandle<Self> {
                &dashboard.$field
            }

            fn slot_mut(dashboard: &mut Dashboard) -> &mut StoreHandle<Self> {
                &mut dashboard.$field
            }
        }
    };
}

dashboard_store!(UserStore, users);
dashboard_store!(ProjectStore, projects);
dashboard_store!(FinanceStore, finance);
dashboard_store!(ReviewStore, reviews);
dashboard_store!(TicketStore, tickets);
dashboard_store!(SettingsStore, settings);

/// Result of a successful [`Dashboard::dispatch`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchOutcome {
    /// Canonical name of the store that handled the command.
    pub store: &'static str,
    /// Number of events applied; zero for no-op commands.
    pub events: usize,
    /// Store version after the command.
    pub version: u64,
    /// JSON rendering of the store state after the command.
    pub snapshot: Value,
}

/// In-memory state of the admin dashboard.
///
/// Owns one [`StoreHandle`] per store. Every mutation takes `&mut self`, so
/// commands are applied one at a time in call order. Snapshots returned by
/// [`snapshot`](Dashboard::snapshot) are immutable and stay valid after
/// later commands.
///
/// # Examples
///
/// ```
/// use dashboard_state::{Dashboard, TicketCommand, TicketStore};
///
/// let mut dashboard = Dashboard::builder().build();
/// dashboard
///     .execute::<TicketStore>(TicketCommand::Delete { id: "TKT002".into() })
///     .unwrap();
/// assert_eq!(dashboard.snapshot::<TicketStore>().tickets.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    users: StoreHandle<UserStore>,
    projects: StoreHandle<ProjectStore>,
    finance: StoreHandle<FinanceStore>,
    reviews: StoreHandle<ReviewStore>,
    tickets: StoreHandle<TicketStore>,
    settings: StoreHandle<SettingsStore>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl Dashboard {
    /// Build a dashboard from `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Seeding, activity capacity and counting policy. The
    ///   dashboard keeps it for [`Dashboard::reset`].
    ///
    /// # Returns
    ///
    /// A dashboard whose stores all start at version 0.
    pub fn new(config: DashboardConfig) -> Self {
        let initial = InitialState::from_config(&config, now_millis());
        tracing::debug!(
            seeded = config.seed_fixtures,
            counting = ?config.active_project_counting,
            "dashboard created"
        );
        Self {
            users: StoreHandle::new(initial.users),
            projects: StoreHandle::new(initial.projects),
            finance: StoreHandle::new(initial.finance),
            reviews: StoreHandle::new(initial.reviews),
            tickets: StoreHandle::new(initial.tickets),
            settings: StoreHandle::new(initial.settings),
            config,
        }
    }

    /// Start a [`DashboardBuilder`] from the default configuration.
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::new()
    }

    /// The configuration this dashboard was built with.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Run a typed command against store `S` with a fresh context.
    ///
    /// # Errors
    ///
    /// Returns the store's domain error when the command is rejected; the
    /// store is left unchanged.
    pub fn execute<S: DashboardStore>(
        &mut self,
        cmd: S::Command,
    ) -> Result<Vec<S::DomainEvent>, S::Error> {
        self.execute_with::<S>(cmd, CommandContext::default())
    }

    /// Run a typed command with caller-supplied context.
    ///
    /// The configured default actor is filled in when `ctx` has none.
    ///
    /// # Errors
    ///
    /// Returns the store's domain error when the command is rejected.
    pub fn execute_with<S: DashboardStore>(
        &mut self,
        cmd: S::Command,
        ctx: CommandContext,
    ) -> Result<Vec<S::DomainEvent>, S::Error> {
        let ctx = match (&ctx.actor, &self.config.actor) {
            (None, Some(actor)) => ctx.with_actor(actor.clone()),
            _ => ctx,
        };
        S::slot_mut(self).execute(cmd, ctx)
    }

    /// Current state of store `S`.
    pub fn snapshot<S: DashboardStore>(&self) -> Arc<S> {
        S::slot(self).state()
    }

    /// Number of events store `S` has applied since creation or the last
    /// [`reset`](Dashboard::reset).
    pub fn version<S: DashboardStore>(&self) -> u64 {
        S::slot(self).version()
    }

    /// Recent activity from the project store, newest first.
    pub fn recent_activity(&self) -> ActivityLog {
        self.projects.state().activity.clone()
    }

    /// Route a named command to its store.
    ///
    /// `envelope.store` is a store name (`"users"`, `"projects"`,
    /// `"finance"`, `"reviews"`, `"tickets"`, `"settings"`, or
    /// `"dashboard"` for projects). `envelope.command` is the adjacently
    /// tagged JSON form of that store's command.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnknownStore`] if no store has that name.
    /// - [`DispatchError::InvalidCommand`] if the payload does not
    ///   deserialize into the store's command type.
    /// - [`DispatchError::Rejected`] if the store refused the command.
    /// - [`DispatchError::Snapshot`] if the new state cannot be rendered.
    pub fn dispatch(&mut self, envelope: CommandEnvelope) -> Result<DispatchOutcome, DispatchError> {
        let CommandEnvelope {
            store,
            command,
            context,
        } = envelope;

        match store.as_str() {
            UserStore::STORE_NAME => self.route::<UserStore>(command, context),
            ProjectStore::STORE_NAME | PROJECTS_ALIAS => {
                self.route::<ProjectStore>(command, context)
            }
            FinanceStore::STORE_NAME => self.route::<FinanceStore>(command, context),
            ReviewStore::STORE_NAME => self.route::<ReviewStore>(command, context),
            TicketStore::STORE_NAME => self.route::<TicketStore>(command, context),
            SettingsStore::STORE_NAME => self.route::<SettingsStore>(command, context),
            _ => {
                tracing::warn!(%store, "dispatch to unknown store");
                Err(DispatchError::UnknownStore(store))
            }
        }
    }

    fn route<S: DashboardStore>(
        &mut self,
        command: Value,
        context: CommandContext,
    ) -> Result<DispatchOutcome, DispatchError> {
        let cmd: S::Command =
            serde_json::from_value(command).map_err(|source| DispatchError::InvalidCommand {
                store: S::STORE_NAME,
                source,
            })?;

        let events = self.execute_with::<S>(cmd, context).map_err(|e| {
            tracing::warn!(store = S::STORE_NAME, error = %e, "command rejected");
            DispatchError::Rejected {
                store: S::STORE_NAME,
                message: e.to_string(),
            }
        })?;

        let handle = S::slot(self);
        let snapshot =
            serde_json::to_value(handle.state().as_ref()).map_err(DispatchError::Snapshot)?;
        Ok(DispatchOutcome {
            store: S::STORE_NAME,
            events: events.len(),
            version: handle.version(),
            snapshot,
        })
    }

    /// Restore every store to its initial state and reset versions.
    pub fn reset(&mut self) {
        let initial = InitialState::from_config(&self.config, now_millis());
        self.users.reset(initial.users);
        self.projects.reset(initial.projects);
        self.finance.reset(initial.finance);
        self.reviews.reset(initial.reviews);
        self.tickets.reset(initial.tickets);
        self.settings.reset(initial.settings);
        tracing::info!("dashboard reset");
    }
}

/// Starting state of every store for a given configuration.
struct InitialState {
    users: UserStore,
    projects: ProjectStore,
    finance: FinanceStore,
    reviews: ReviewStore,
    tickets: TicketStore,
    settings: SettingsStore,
}

impl InitialState {
    fn from_config(config: &DashboardConfig, now_ms: u64) -> Self {
        let counting = config.active_project_counting;
        if config.seed_fixtures {
            return Self {
                users: fixtures::user_store(),
                projects: fixtures::project_store(now_ms, config.activity_capacity, counting),
                finance: fixtures::finance_store(),
                reviews: fixtures::review_store(),
                tickets: fixtures::ticket_store(),
                settings: fixtures::settings_store(),
            };
        }
        Self {
            users: UserStore::default(),
            projects: empty_projects(config.activity_capacity, counting),
            finance: FinanceStore::default(),
            reviews: ReviewStore::default(),
            tickets: TicketStore::default(),
            settings: SettingsStore::default(),
        }
    }
}

fn empty_projects(activity_capacity: usize, counting: ActiveProjectCounting) -> ProjectStore {
    ProjectStore {
        activity: ActivityLog::with_capacity(activity_capacity),
        counting,
        ..ProjectStore::default()
    }
}

/// Builder for a [`Dashboard`].
///
/// # Examples
///
/// ```
/// use dashboard_state::{ActiveProjectCounting, Dashboard, ProjectStore};
///
/// let dashboard = Dashboard::builder()
///     .seed_fixtures(false)
///     .activity_capacity(5)
///     .active_project_counting(ActiveProjectCounting::Recount)
///     .build();
/// assert!(dashboard.snapshot::<ProjectStore>().projects.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DashboardBuilder {
    config: DashboardConfig,
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete configuration, e.g. one read from a file.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn activity_capacity(mut self, capacity: usize) -> Self {
        self.config.activity_capacity = capacity;
        self
    }

    pub fn seed_fixtures(mut self, seed: bool) -> Self {
        self.config.seed_fixtures = seed;
        self
    }

    pub fn active_project_counting(mut self, counting: ActiveProjectCounting) -> Self {
        self.config.active_project_counting = counting;
        self
    }

    /// Actor recorded on commands that arrive without one.
    pub fn actor(mut self, actor: impl Into<String>) -> Self {
        self.config.actor = Some(actor.into());
        self
    }

    pub fn build(self) -> Dashboard {
        Dashboard::new(self.config)
    }
}
