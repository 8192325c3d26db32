//! Built-in demo data the dashboard starts from.
//!
//! Each function returns a fresh store state. Money is in cents.

use crate::activity::{Activity, ActivityLog};
use crate::domain::{
    ActiveProjectCounting, Credentials, DashboardOverview, FinanceStore, GatewayMode,
    GeneralSettings, MediaSettings, PaymentGateway, Progress, Project, ProjectStatus,
    ProjectStatusBreakdown, ProjectStore, Rating, Review, ReviewStatus, ReviewStore,
    SettingsStore, Ticket, TicketPriority, TicketStatus, TicketStore, Transaction,
    TransactionKind, TransactionStatus, User, UserDistribution, UserRole, UserStatus, UserStore,
};

const MINUTE_MS: u64 = 60 * 1_000;

/// Five customers and developers, with `avatar{id}.png` avatars.
pub fn user_store() -> UserStore {
    let users = [
        (1, "Ali Ahmed", "ali.ahmad@example.com", UserRole::Customer, UserStatus::Active),
        (2, "Fadi Mahmoud", "fadi.mahmoud@example.com", UserRole::Developer, UserStatus::Active),
        (3, "Layla Khalid", "layla.khalid@example.com", UserRole::Customer, UserStatus::Inactive),
        (4, "Sami Nasser", "sami.nasser@example.com", UserRole::Developer, UserStatus::Active),
        (5, "Nora Saeed", "nora.saeed@example.com", UserRole::Customer, UserStatus::Active),
    ]
    .into_iter()
    .map(|(id, name, email, role, status)| User {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        status,
        avatar: format!("/avatars/avatar{id}.png"),
    })
    .collect();
    UserStore::with_users(users)
}

/// Project page state with the headline numbers and recent activity.
///
/// Activity timestamps are placed before `now_ms`. Under
/// [`ActiveProjectCounting::Recount`] the counter starts from the seeded
/// collection rather than the headline figure.
pub fn project_store(
    now_ms: u64,
    activity_capacity: usize,
    counting: ActiveProjectCounting,
) -> ProjectStore {
    let projects = vec![Project {
        id: 1,
        title: "Mobile App".to_owned(),
        client: "Tech Company".to_owned(),
        start_date: "2023-01-15".to_owned(),
        status: ProjectStatus::Active,
        progress: Progress::new(75).unwrap_or_default(),
    }];

    // Oldest first so the log ends up newest first.
    let history = [
        ("New project \"Dashboard App\" assigned", 120),
        ("$500 deposited into user wallet #201", 60),
        ("Invoice #1024 has been paid", 30),
        ("Project \"App Development\" status updated to Active", 15),
        ("New user Ahmed Ali registered", 2),
    ];
    let mut activity = ActivityLog::with_capacity(activity_capacity);
    for (message, minutes_ago) in history {
        let at = now_ms.saturating_sub(minutes_ago * MINUTE_MS);
        activity.record(Activity::new(message, at));
    }

    let active_projects = match counting {
        ActiveProjectCounting::Incremental => 567,
        ActiveProjectCounting::Recount => crate::domain::count_active(&projects),
    };

    ProjectStore {
        projects,
        active_projects,
        activity,
        overview: DashboardOverview {
            total_users: 1234,
            total_transactions: 87654,
            user_distribution: UserDistribution {
                customers: 60,
                managers: 10,
                admins: 30,
            },
            project_status: ProjectStatusBreakdown {
                completed: 450,
                in_progress: 320,
                pending: 180,
                cancelled: 50,
            },
        },
        counting,
    }
}

/// Finance page state. The aggregates are baseline figures, not sums of the
/// seeded transactions.
pub fn finance_store() -> FinanceStore {
    FinanceStore {
        transactions: vec![Transaction {
            id: "TXN001".to_owned(),
            user: "Ali Smith".to_owned(),
            kind: TransactionKind::Deposit,
            amount: 50_000,
            date: "2024-01-15".to_owned(),
            status: TransactionStatus::Completed,
        }],
        total_revenue: 15_000_000,
        monthly_revenue: 2_800_000,
        pending_transactions: 750_000,
    }
}

/// Four reviews, one per rating from 2 to 5, with no filter set.
pub fn review_store() -> ReviewStore {
    let reviews = [
        (
            "1",
            "Mobile App Development",
            "Sara Khater",
            4,
            "Good work, and kept us informed on the numbers. Integration went smoothly.",
            "2024-01-10",
            ReviewStatus::Approved,
        ),
        (
            "2",
            "Digital Marketing Campaign",
            "Ahmed Mohamed",
            5,
            "The campaign grew our member base and engagement, backed by solid analysis.",
            "2024-01-12",
            ReviewStatus::Approved,
        ),
        (
            "3",
            "Website Delivery Setup",
            "Mohamed Ali",
            3,
            "The project was acceptable but there were some delays against the schedule.",
            "2024-01-14",
            ReviewStatus::Pending,
        ),
        (
            "4",
            "API Setup",
            "Fatima Ibrahim",
            2,
            "Overall code quality had errors and access issues in core features.",
            "2024-01-15",
            ReviewStatus::Rejected,
        ),
    ];
    let reviews = reviews
        .into_iter()
        .filter_map(|(id, project, author, stars, comment, date, status)| {
            Some(Review {
                id: id.to_owned(),
                project_name: project.to_owned(),
                author: author.to_owned(),
                rating: Rating::new(stars).ok()?,
                comment: comment.to_owned(),
                date: date.to_owned(),
                status,
            })
        })
        .collect();
    ReviewStore::with_reviews(reviews)
}

pub fn ticket_store() -> TicketStore {
    TicketStore::with_tickets(vec![
        Ticket {
            id: "TKT001".to_owned(),
            subject: "Login Authentication Failure".to_owned(),
            user: "Fatima Zahra".to_owned(),
            priority: TicketPriority::High,
            status: TicketStatus::Open,
            date: "2024-03-22".to_owned(),
        },
        Ticket {
            id: "TKT002".to_owned(),
            subject: "Billing Discrepancy on Invoice #453".to_owned(),
            user: "Ahmed Ali".to_owned(),
            priority: TicketPriority::Medium,
            status: TicketStatus::InProgress,
            date: "2024-03-21".to_owned(),
        },
    ])
}

/// Site settings with two test-mode gateways and a 2.5% commission.
pub fn settings_store() -> SettingsStore {
    let test_gateway = |id: &str, name: &str, enabled: bool| PaymentGateway {
        id: id.to_owned(),
        name: name.to_owned(),
        mode: GatewayMode::Test,
        enabled,
        credentials: Credentials {
            api_key: "test_api_key".to_owned(),
            secret: "test_secret".to_owned(),
        },
    };

    SettingsStore {
        general: GeneralSettings {
            site_name: "Admin Dashboard".to_owned(),
            site_url: "https://www.yourdomain.com".to_owned(),
            email: "contact@yourdomain.com".to_owned(),
            address: String::new(),
            phone: String::new(),
        },
        media: MediaSettings::default(),
        payment_gateways: vec![
            test_gateway("1", "PayPal", true),
            test_gateway("2", "Stripe", false),
        ],
        commission_rate: 2.5,
    }
}
