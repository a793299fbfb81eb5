//! Competition repository: competitions and participants.

use async_trait::async_trait;
use domain::models::competition::{
    Competition, CompetitionFilter, CompetitionStatus, CompetitionSummary, NewCompetition,
    Participant,
};
use domain::stores::{CompetitionStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    CompetitionEntity, CompetitionStatusDb, CompetitionSummaryEntity, ParticipantEntity,
};
use crate::error::store_error;
use crate::metrics::QueryTimer;

const COMPETITION_COLUMNS: &str = "id, group_id, created_by, name, description, start_date, \
                                   end_date, status, created_at, updated_at";

/// Competition columns under the `c` alias. Every read joins `groups` so that
/// competitions of soft-deleted groups stay hidden.
const VISIBLE_COMPETITION_COLUMNS: &str = "c.id, c.group_id, c.created_by, c.name, \
                                           c.description, c.start_date, c.end_date, c.status, \
                                           c.created_at, c.updated_at";

#[derive(Clone)]
pub struct CompetitionRepository {
    pool: PgPool,
}

impl CompetitionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CompetitionStore for CompetitionRepository {
    async fn insert_competition(&self, competition: NewCompetition) -> StoreResult<Competition> {
        let timer = QueryTimer::new("insert_competition");
        let result = sqlx::query_as::<_, CompetitionEntity>(&format!(
            r#"
            INSERT INTO competitions (group_id, created_by, name, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COMPETITION_COLUMNS}
            "#
        ))
        .bind(competition.group_id)
        .bind(competition.created_by)
        .bind(&competition.name)
        .bind(&competition.description)
        .bind(competition.start_date)
        .bind(competition.end_date)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(Into::into).map_err(store_error)
    }

    async fn find_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>> {
        let timer = QueryTimer::new("find_competition");
        let result = sqlx::query_as::<_, CompetitionEntity>(&format!(
            r#"
            SELECT {VISIBLE_COMPETITION_COLUMNS}
            FROM competitions c
            JOIN groups g ON g.id = c.group_id AND g.is_active = true
            WHERE c.id = $1
            "#
        ))
        .bind(competition_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn update_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<Option<Competition>> {
        let timer = QueryTimer::new("update_competition_status");
        let result = sqlx::query_as::<_, CompetitionEntity>(&format!(
            r#"
            UPDATE competitions c
            SET status = $2, updated_at = NOW()
            FROM groups g
            WHERE c.id = $1 AND g.id = c.group_id AND g.is_active = true
            RETURNING {VISIBLE_COMPETITION_COLUMNS}
            "#
        ))
        .bind(competition_id)
        .bind(CompetitionStatusDb::from(status))
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn list_competitions(
        &self,
        filter: CompetitionFilter,
    ) -> StoreResult<Vec<CompetitionSummary>> {
        let timer = QueryTimer::new("list_competitions");
        let result = sqlx::query_as::<_, CompetitionSummaryEntity>(&format!(
            r#"
            SELECT
                {VISIBLE_COMPETITION_COLUMNS},
                (SELECT COUNT(*) FROM participants p WHERE p.competition_id = c.id)
                    AS participant_count,
                (SELECT COUNT(*) FROM restaurants r WHERE r.competition_id = c.id)
                    AS restaurant_count
            FROM competitions c
            JOIN groups g ON g.id = c.group_id AND g.is_active = true
            JOIN group_memberships gm ON gm.group_id = c.group_id AND gm.user_id = $1
            WHERE ($2::uuid IS NULL OR c.group_id = $2)
              AND ($3::competition_status IS NULL OR c.status = $3)
              AND ($4::uuid IS NULL OR c.created_by = $4)
              AND NOT EXISTS (
                  SELECT 1 FROM unnest($5::text[]) AS term
                  WHERE NOT (c.name ILIKE term OR c.description ILIKE term)
              )
            ORDER BY c.start_date DESC, c.created_at DESC
            "#
        ))
        .bind(filter.member_id)
        .bind(filter.group_id)
        .bind(filter.status.map(CompetitionStatusDb::from))
        .bind(filter.creator)
        .bind(filter.search.like_patterns())
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn insert_participant(
        &self,
        competition_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Participant> {
        let timer = QueryTimer::new("insert_participant");
        let result = sqlx::query_as::<_, ParticipantEntity>(
            r#"
            INSERT INTO participants (competition_id, user_id)
            VALUES ($1, $2)
            RETURNING id, competition_id, user_id, joined_at
            "#,
        )
        .bind(competition_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(Into::into).map_err(store_error)
    }

    async fn list_participants(&self, competition_id: Uuid) -> StoreResult<Vec<Participant>> {
        let timer = QueryTimer::new("list_participants");
        let result = sqlx::query_as::<_, ParticipantEntity>(
            r#"
            SELECT id, competition_id, user_id, joined_at
            FROM participants
            WHERE competition_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}
