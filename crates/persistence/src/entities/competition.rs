//! Competition and participant entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::competition::{
    Competition, CompetitionStatus, CompetitionSummary, Participant,
};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for competition_status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "competition_status", rename_all = "lowercase")]
pub enum CompetitionStatusDb {
    Planning,
    Active,
    Completed,
}

impl From<CompetitionStatusDb> for CompetitionStatus {
    fn from(db: CompetitionStatusDb) -> Self {
        match db {
            CompetitionStatusDb::Planning => CompetitionStatus::Planning,
            CompetitionStatusDb::Active => CompetitionStatus::Active,
            CompetitionStatusDb::Completed => CompetitionStatus::Completed,
        }
    }
}

impl From<CompetitionStatus> for CompetitionStatusDb {
    fn from(status: CompetitionStatus) -> Self {
        match status {
            CompetitionStatus::Planning => CompetitionStatusDb::Planning,
            CompetitionStatus::Active => CompetitionStatusDb::Active,
            CompetitionStatus::Completed => CompetitionStatusDb::Completed,
        }
    }
}

/// Database row mapping for the competitions table.
#[derive(Debug, Clone, FromRow)]
pub struct CompetitionEntity {
    pub id: Uuid,
    pub group_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: CompetitionStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CompetitionEntity> for Competition {
    fn from(entity: CompetitionEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            created_by: entity.created_by,
            name: entity.name,
            description: entity.description,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Competition row with participant and restaurant counts.
#[derive(Debug, Clone, FromRow)]
pub struct CompetitionSummaryEntity {
    #[sqlx(flatten)]
    pub competition: CompetitionEntity,
    pub participant_count: i64,
    pub restaurant_count: i64,
}

impl From<CompetitionSummaryEntity> for CompetitionSummary {
    fn from(entity: CompetitionSummaryEntity) -> Self {
        Self {
            competition: entity.competition.into(),
            participant_count: entity.participant_count,
            restaurant_count: entity.restaurant_count,
        }
    }
}

/// Database row mapping for the participants table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantEntity {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl From<ParticipantEntity> for Participant {
    fn from(entity: ParticipantEntity) -> Self {
        Self {
            id: entity.id,
            competition_id: entity.competition_id,
            user_id: entity.user_id,
            joined_at: entity.joined_at,
        }
    }
}
