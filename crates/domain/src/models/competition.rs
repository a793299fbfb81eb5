//! Competition and participant models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::search::SearchTerms;
use super::user::UserPublic;

/// Lifecycle of a competition. Only moves forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionStatus {
    #[default]
    Planning,
    Active,
    Completed,
}

impl CompetitionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompetitionStatus::Planning => "planning",
            CompetitionStatus::Active => "active",
            CompetitionStatus::Completed => "completed",
        }
    }

    /// Forward moves only; skipping `active` is allowed.
    pub fn can_transition_to(&self, next: CompetitionStatus) -> bool {
        next > *self
    }
}

impl FromStr for CompetitionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(CompetitionStatus::Planning),
            "active" => Ok(CompetitionStatus::Active),
            "completed" => Ok(CompetitionStatus::Completed),
            _ => Err(format!("Invalid competition status: {}", s)),
        }
    }
}

impl fmt::Display for CompetitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Competition {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CompetitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A user's entry in a competition. Unique per (competition, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Participant {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_date_range", skip_on_field_errors = false))]
pub struct CreateCompetitionRequest {
    pub group_id: Uuid,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_date_range(request: &CreateCompetitionRequest) -> Result<(), ValidationError> {
    if request.end_date < request.start_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some("end_date must not be before start_date".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UpdateStatusRequest {
    pub status: CompetitionStatus,
}

/// Query parameters for listing competitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCompetitionsQuery {
    pub group_id: Option<Uuid>,
    pub status: Option<CompetitionStatus>,
    /// Matched against name and description.
    pub search: Option<String>,
    pub creator: Option<Uuid>,
}

impl ListCompetitionsQuery {
    pub fn into_filter(self, member_id: Uuid) -> CompetitionFilter {
        CompetitionFilter {
            member_id,
            group_id: self.group_id,
            status: self.status,
            search: SearchTerms::parse(self.search.as_deref()),
            creator: self.creator,
        }
    }
}

/// Explicit filter passed to the store. Only competitions of active groups
/// `member_id` belongs to are ever listed.
#[derive(Debug, Clone, Default)]
pub struct CompetitionFilter {
    pub member_id: Uuid,
    pub group_id: Option<Uuid>,
    pub status: Option<CompetitionStatus>,
    pub search: SearchTerms,
    pub creator: Option<Uuid>,
}

impl CompetitionFilter {
    pub fn for_member(member_id: Uuid) -> Self {
        Self {
            member_id,
            ..Default::default()
        }
    }
}

/// Competition with participant and restaurant counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CompetitionSummary {
    #[serde(flatten)]
    pub competition: Competition,
    pub participant_count: i64,
    pub restaurant_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListCompetitionsResponse {
    pub data: Vec<CompetitionSummary>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ParticipantResponse {
    pub id: Uuid,
    pub user: UserPublic,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListParticipantsResponse {
    pub data: Vec<ParticipantResponse>,
    pub count: usize,
}
