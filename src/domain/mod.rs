//! The six dashboard stores: state, commands, events and selectors.

pub mod finance;
pub mod project;
pub mod review;
pub mod settings;
pub mod ticket;
pub mod user;

pub use finance::{
    FinanceCommand, FinanceError, FinanceEvent, FinanceStore, RevenueDelta, Transaction,
    TransactionKind, TransactionStatus, search_transactions,
};
pub use project::{
    ActiveProjectCounting, DashboardOverview, Progress, Project, ProjectCommand, ProjectError,
    ProjectEvent, ProjectStatus, ProjectStatusBreakdown, ProjectStore, UserDistribution,
    count_active, search_projects,
};
pub use review::{
    Rating, RatingParseError, Review, ReviewCommand, ReviewError, ReviewEvent, ReviewFilters,
    ReviewStatus, ReviewStore, filtered_reviews,
};
pub use settings::{
    Credentials, GatewayMode, GeneralSettings, GeneralSettingsPatch, MediaSettings,
    MediaSettingsPatch, PaymentGateway, SettingsCommand, SettingsError, SettingsEvent,
    SettingsStore,
};
pub use ticket::{
    Ticket, TicketCommand, TicketError, TicketEvent, TicketFilters, TicketPriority, TicketStatus,
    TicketStore, filtered_tickets,
};
pub use user::{
    NewUser, User, UserCommand, UserError, UserEvent, UserRole, UserStatus, UserStore, avatar_for,
    search_users,
};
