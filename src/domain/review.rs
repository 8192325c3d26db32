//! Review store -- client feedback on delivered projects.
//!
//! The visible list is never stored. [`filtered_reviews`] derives it from the
//! raw collection and the current [`ReviewFilters`] on every read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::command::CommandContext;
use crate::error::{ParseError, RangeError};
use crate::filter::{Filter, contains};
use crate::store::Store;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Star rating, 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, RangeError> {
        Self::try_from(i64::from(stars))
    }

    /// Number of stars, 1 through 5.
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RangeError {
                field: "rating",
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
                value,
            })
        }
    }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self {
        r.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse error for [`Rating`] strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RatingParseError {
    #[error(transparent)]
    NotANumber(#[from] ParseError),
    #[error(transparent)]
    OutOfRange(#[from] RangeError),
}

impl FromStr for Rating {
    type Err = RatingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s.parse().map_err(|_| ParseError::new("rating", s))?;
        Ok(Self::try_from(value)?)
    }
}

/// Moderation state of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[serde(alias = "Accepted")]
    Approved,
    #[serde(alias = "Under Review")]
    Pending,
    Rejected,
}

/// A client review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub project_name: String,
    pub author: String,
    pub rating: Rating,
    pub comment: String,
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,
    pub status: ReviewStatus,
}

/// Current filter selections on the reviews page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFilters {
    pub rating: Filter<Rating>,
    pub search: String,
}

/// Reviews plus the active filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewStore {
    pub reviews: Vec<Review>,
    pub filters: ReviewFilters,
}

impl ReviewStore {
    pub fn with_reviews(reviews: Vec<Review>) -> Self {
        Self {
            reviews,
            filters: ReviewFilters::default(),
        }
    }

    /// Reviews passing the current filters.
    pub fn visible(&self) -> Vec<&Review> {
        filtered_reviews(&self.reviews, &self.filters)
    }

    /// Review with the given id, if any.
    pub fn get(&self, id: &str) -> Option<&Review> {
        self.reviews.iter().find(|r| r.id == id)
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Commands accepted by the [`ReviewStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReviewCommand {
    Add(Review),
    Delete { id: String },
    SetRatingFilter { rating: Filter<Rating> },
    SetSearchFilter { search: String },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Domain events produced by the [`ReviewStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReviewEvent {
    Added(Review),
    Deleted { id: String },
    RatingFilterSet { rating: Filter<Rating> },
    SearchFilterSet { search: String },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from [`ReviewCommand`] handling.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("review {0} already exists")]
    DuplicateId(String),
}

// ---------------------------------------------------------------------------
// Store impl
// ---------------------------------------------------------------------------

impl Store for ReviewStore {
    const STORE_NAME: &'static str = "reviews";
    type Command = ReviewCommand;
    type DomainEvent = ReviewEvent;
    type Error = ReviewError;

    fn handle(
        &self,
        cmd: ReviewCommand,
        _ctx: &CommandContext,
    ) -> Result<Vec<ReviewEvent>, ReviewError> {
        match cmd {
            ReviewCommand::Add(review) => {
                if self.get(&review.id).is_some() {
                    return Err(ReviewError::DuplicateId(review.id));
                }
                Ok(vec![ReviewEvent::Added(review)])
            }
            ReviewCommand::Delete { id } => {
                if self.get(&id).is_none() {
                    tracing::debug!(%id, "delete ignored: review not found");
                    return Ok(vec![]);
                }
                Ok(vec![ReviewEvent::Deleted { id }])
            }
            ReviewCommand::SetRatingFilter { rating } => {
                Ok(vec![ReviewEvent::RatingFilterSet { rating }])
            }
            ReviewCommand::SetSearchFilter { search } => {
                Ok(vec![ReviewEvent::SearchFilterSet { search }])
            }
        }
    }

    fn apply(mut self, event: &ReviewEvent) -> Self {
        match event {
            ReviewEvent::Added(review) => self.reviews.push(review.clone()),
            ReviewEvent::Deleted { id } => self.reviews.retain(|r| r.id != *id),
            ReviewEvent::RatingFilterSet { rating } => self.filters.rating = *rating,
            ReviewEvent::SearchFilterSet { search } => self.filters.search = search.clone(),
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Reviews matching the rating filter whose project name, comment or author
/// contains the search text (case-sensitive).
pub fn filtered_reviews<'a>(reviews: &'a [Review], filters: &ReviewFilters) -> Vec<&'a Review> {
    let needle = filters.search.as_str();
    reviews
        .iter()
        .filter(|r| filters.rating.matches(&r.rating))
        .filter(|r| {
            contains(&r.project_name, needle)
                || contains(&r.comment, needle)
                || contains(&r.author, needle)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, project: &str, author: &str, stars: u8) -> Review {
        Review {
            id: id.into(),
            project_name: project.into(),
            author: author.into(),
            rating: Rating::new(stars).expect("valid rating"),
            comment: "Integration went smoothly".into(),
            date: "2024-01-10".into(),
            status: ReviewStatus::Approved,
        }
    }

    fn sample() -> Vec<Review> {
        vec![
            review("1", "Mobile App Development", "Sara Khater", 4),
            review("2", "Digital Marketing Campaign", "Ahmed Mohamed", 5),
            review("3", "Website Handover", "Mohamed Ali", 3),
            review("4", "API Setup", "Fatima Ibrahim", 4),
        ]
    }

    fn run(store: ReviewStore, cmd: ReviewCommand) -> ReviewStore {
        let events = store
            .handle(cmd, &CommandContext::default())
            .expect("command should succeed");
        events.into_iter().fold(store, |s, e| s.apply(&e))
    }

    #[test]
    fn rating_filter_selects_exact_stars() {
        let reviews = sample();
        let filters = ReviewFilters {
            rating: "4".parse().expect("valid filter"),
            search: String::new(),
        };
        let visible = filtered_reviews(&reviews, &filters);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|r| r.rating.stars() == 4));
    }

    #[test]
    fn default_filters_show_everything() {
        let reviews = sample();
        assert_eq!(filtered_reviews(&reviews, &ReviewFilters::default()).len(), 4);
    }

    #[test]
    fn search_is_case_sensitive_across_three_fields() {
        let reviews = sample();
        let by = |search: &str| {
            filtered_reviews(
                &reviews,
                &ReviewFilters {
                    rating: Filter::All,
                    search: search.into(),
                },
            )
            .len()
        };
        assert_eq!(by("Mohamed"), 2); // two authors
        assert_eq!(by("mohamed"), 0);
        assert_eq!(by("API"), 1); // project name
        assert_eq!(by("smoothly"), 4); // comment
    }

    #[test]
    fn search_and_rating_combine_with_and() {
        let reviews = sample();
        let filters = ReviewFilters {
            rating: Filter::Only(Rating::new(5).expect("valid")),
            search: "Mohamed".into(),
        };
        let visible = filtered_reviews(&reviews, &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "2");
    }

    #[test]
    fn search_text_is_not_a_pattern() {
        let mut reviews = sample();
        reviews[0].comment = "costs went up by 10%.".into();
        let filters = ReviewFilters {
            rating: Filter::All,
            search: "10%.".into(),
        };
        assert_eq!(filtered_reviews(&reviews, &filters).len(), 1);
        let filters = ReviewFilters {
            rating: Filter::All,
            search: ".*".into(),
        };
        assert!(filtered_reviews(&reviews, &filters).is_empty());
    }

    #[test]
    fn setters_replace_filters_and_visible_follows() {
        let store = ReviewStore::with_reviews(sample());
        let store = run(
            store,
            ReviewCommand::SetRatingFilter {
                rating: Filter::Only(Rating::new(3).expect("valid")),
            },
        );
        assert_eq!(store.visible().len(), 1);

        let store = run(store, ReviewCommand::SetRatingFilter { rating: Filter::All });
        let store = run(
            store,
            ReviewCommand::SetSearchFilter {
                search: "Sara".into(),
            },
        );
        assert_eq!(store.visible().len(), 1);
        assert_eq!(store.filters.search, "Sara");
    }

    #[test]
    fn delete_removes_and_unknown_is_noop() {
        let store = run(ReviewStore::with_reviews(sample()), ReviewCommand::Delete { id: "2".into() });
        assert_eq!(store.reviews.len(), 3);
        let events = store
            .handle(ReviewCommand::Delete { id: "2".into() }, &CommandContext::default())
            .expect("not found is not an error");
        assert!(events.is_empty());
    }

    #[test]
    fn add_rejects_duplicate() {
        let store = ReviewStore::with_reviews(sample());
        let err = store
            .handle(
                ReviewCommand::Add(review("1", "X", "Y", 1)),
                &CommandContext::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ReviewError::DuplicateId(_)));
    }

    #[test]
    fn rating_bounds() {
        assert!(Rating::new(0).is_err());
        assert!(Rating::new(6).is_err());
        assert!("7".parse::<Rating>().is_err());
        assert!("x".parse::<Rating>().is_err());
        assert!(serde_json::from_str::<Rating>("0").is_err());
        assert_eq!("5".parse::<Rating>().map(Rating::stars), Ok(5));
    }

    #[test]
    fn rating_filter_wire_form() {
        let cmd: ReviewCommand = serde_json::from_value(serde_json::json!({
            "type": "SetRatingFilter",
            "data": {"rating": "all"}
        }))
        .expect("valid command");
        assert!(matches!(cmd, ReviewCommand::SetRatingFilter { rating: Filter::All }));
    }
}
