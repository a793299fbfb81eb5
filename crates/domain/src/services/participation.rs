//! Competitions and who takes part in them.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::errors::{DomainError, StoreError};
use crate::models::competition::{
    Competition, CompetitionFilter, CompetitionStatus, CompetitionSummary, NewCompetition,
    Participant,
};
use crate::stores::{CompetitionStore, GroupStore};

/// Loads a competition and checks that the user belongs to its group.
pub async fn require_competition_member(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    competition_id: Uuid,
    user_id: Uuid,
) -> Result<Competition, DomainError> {
    let competition = competitions
        .find_competition(competition_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Competition not found"))?;

    if groups
        .find_membership(competition.group_id, user_id)
        .await?
        .is_none()
    {
        return Err(DomainError::forbidden(
            "Only members of the competition's group can do this",
        ));
    }
    Ok(competition)
}

#[allow(clippy::too_many_arguments)]
pub async fn create_competition(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    group_id: Uuid,
    creator: Uuid,
    name: String,
    description: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Competition, DomainError> {
    groups
        .find_group(group_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Group not found"))?;
    if groups.find_membership(group_id, creator).await?.is_none() {
        return Err(DomainError::forbidden(
            "Only group members can create competitions",
        ));
    }

    if end_date < start_date {
        return Err(DomainError::validation(
            "end_date must not be before start_date",
        ));
    }

    let competition = competitions
        .insert_competition(NewCompetition {
            group_id,
            created_by: creator,
            name,
            description,
            start_date,
            end_date,
        })
        .await?;

    info!(
        competition_id = %competition.id,
        group_id = %group_id,
        user_id = %creator,
        "Competition created"
    );
    Ok(competition)
}

pub async fn get_competition(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    competition_id: Uuid,
    user_id: Uuid,
) -> Result<Competition, DomainError> {
    let competition = competitions
        .find_competition(competition_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Competition not found"))?;
    // Outsiders cannot tell a hidden competition from a missing one.
    if groups
        .find_membership(competition.group_id, user_id)
        .await?
        .is_none()
    {
        return Err(DomainError::not_found("Competition not found"));
    }
    Ok(competition)
}

/// Competitions of the member's active groups, narrowed by group, status,
/// creator and search text.
pub async fn list_competitions(
    competitions: &dyn CompetitionStore,
    filter: CompetitionFilter,
) -> Result<Vec<CompetitionSummary>, DomainError> {
    Ok(competitions.list_competitions(filter).await?)
}

/// Moves the competition forward. Only its creator or a group admin may.
pub async fn update_status(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    competition_id: Uuid,
    actor: Uuid,
    status: CompetitionStatus,
) -> Result<Competition, DomainError> {
    let competition = get_competition(groups, competitions, competition_id, actor).await?;

    let is_admin = groups
        .find_membership(competition.group_id, actor)
        .await?
        .is_some_and(|m| m.role.can_manage_group());
    if competition.created_by != actor && !is_admin {
        return Err(DomainError::forbidden(
            "Only the creator or a group admin can change the status",
        ));
    }

    if !competition.status.can_transition_to(status) {
        return Err(DomainError::validation(format!(
            "Cannot move competition from {} to {}",
            competition.status, status
        )));
    }

    let updated = competitions
        .update_competition_status(competition_id, status)
        .await?
        .ok_or_else(|| DomainError::not_found("Competition not found"))?;

    info!(
        competition_id = %competition_id,
        user_id = %actor,
        status = %status,
        "Competition status changed"
    );
    Ok(updated)
}

/// Enters the user into the competition. A second entry fails with
/// `AlreadyParticipant`. Completed competitions are not blocked.
pub async fn join_competition(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    competition_id: Uuid,
    user_id: Uuid,
) -> Result<Participant, DomainError> {
    let competition =
        require_competition_member(groups, competitions, competition_id, user_id).await?;

    match competitions.insert_participant(competition.id, user_id).await {
        Ok(participant) => {
            info!(competition_id = %competition_id, user_id = %user_id, "Joined competition");
            Ok(participant)
        }
        Err(StoreError::UniqueViolation) => Err(DomainError::AlreadyParticipant),
        Err(e) => Err(e.into()),
    }
}

pub async fn list_participants(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    competition_id: Uuid,
    user_id: Uuid,
) -> Result<Vec<Participant>, DomainError> {
    let competition = get_competition(groups, competitions, competition_id, user_id).await?;
    Ok(competitions.list_participants(competition.id).await?)
}
