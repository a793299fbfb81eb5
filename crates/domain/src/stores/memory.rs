//! In-memory store backing the service tests.
//!
//! Enforces the same uniqueness rules as the database schema: one membership
//! per (group, user), one participant per (competition, user), one favorite
//! per (group, user) and one rating per (restaurant, user). Competitions of
//! soft-deleted groups are hidden the same way the SQL joins hide them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{
    CompetitionStore, FavoriteStore, GroupStore, InvitationStore, RestaurantStore, StoreResult,
};
use crate::errors::StoreError;
use crate::models::competition::{
    Competition, CompetitionFilter, CompetitionStatus, CompetitionSummary, NewCompetition,
    Participant,
};
use crate::models::group::{
    Group, GroupChanges, GroupListFilter, GroupRole, GroupSummary, Membership, NewGroup,
};
use crate::models::invitation::{GroupInvitation, InvitationState, NewInvitation};
use crate::models::restaurant::{
    NewRating, NewRestaurant, Rating, RatingFilter, Restaurant, RestaurantFilter,
};

#[derive(Debug, Default)]
struct State {
    groups: HashMap<Uuid, Group>,
    memberships: Vec<Membership>,
    invitations: HashMap<Uuid, GroupInvitation>,
    favorites: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    competitions: HashMap<Uuid, Competition>,
    participants: Vec<Participant>,
    restaurants: HashMap<Uuid, Restaurant>,
    ratings: Vec<Rating>,
}

/// Store backed by process memory. Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    fail_membership_inserts: bool,
    lose_insert_races: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose membership inserts always fail with a database error.
    pub fn failing_membership_inserts() -> Self {
        Self {
            fail_membership_inserts: true,
            ..Self::default()
        }
    }

    /// A store where a concurrent writer always commits the same membership
    /// or favorite row first: the row is stored and the insert reports a
    /// unique violation.
    pub fn losing_insert_races() -> Self {
        Self {
            lose_insert_races: true,
            ..Self::default()
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of groups ever stored, active or not.
    pub fn group_count(&self) -> usize {
        self.lock().groups.len()
    }

    /// Number of competitions ever stored, visible or not.
    pub fn competitions_stored(&self) -> usize {
        self.lock().competitions.len()
    }

    /// Number of membership rows for the pair.
    pub fn membership_rows(&self, group_id: Uuid, user_id: Uuid) -> usize {
        self.lock()
            .memberships
            .iter()
            .filter(|m| m.group_id == group_id && m.user_id == user_id)
            .count()
    }

    /// Number of favorite rows for the pair.
    pub fn favorite_rows(&self, group_id: Uuid, user_id: Uuid) -> usize {
        self.lock()
            .favorites
            .iter()
            .filter(|(g, u, _)| *g == group_id && *u == user_id)
            .count()
    }

    /// Looks up an invitation in any state.
    pub fn invitation(&self, token: Uuid) -> Option<GroupInvitation> {
        self.lock().invitations.get(&token).cloned()
    }

    /// Overwrites an invitation's expiry.
    pub fn set_invitation_expiry(&self, token: Uuid, expires_at: Option<DateTime<Utc>>) {
        if let Some(invitation) = self.lock().invitations.get_mut(&token) {
            invitation.expires_at = expires_at;
        }
    }
}

fn push_membership(
    state: &mut State,
    group_id: Uuid,
    user_id: Uuid,
    role: GroupRole,
) -> StoreResult<Membership> {
    if state
        .memberships
        .iter()
        .any(|m| m.group_id == group_id && m.user_id == user_id)
    {
        return Err(StoreError::UniqueViolation);
    }
    let membership = Membership {
        id: Uuid::new_v4(),
        group_id,
        user_id,
        role,
        joined_at: Utc::now(),
    };
    state.memberships.push(membership.clone());
    Ok(membership)
}

fn active_group<'a>(state: &'a State, group_id: &Uuid) -> Option<&'a Group> {
    state.groups.get(group_id).filter(|g| g.is_active)
}

#[async_trait]
impl GroupStore for InMemoryStore {
    async fn create_group_with_admin(&self, group: NewGroup) -> StoreResult<(Group, Membership)> {
        let mut state = self.lock();
        let now = Utc::now();
        let record = Group {
            id: Uuid::new_v4(),
            name: group.name,
            description: group.description,
            privacy: group.privacy,
            created_by: group.created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        // Nothing is written until both rows are known to be valid.
        if self.fail_membership_inserts {
            return Err(StoreError::Database("membership insert failed".into()));
        }
        let membership = Membership {
            id: Uuid::new_v4(),
            group_id: record.id,
            user_id: record.created_by,
            role: GroupRole::Admin,
            joined_at: now,
        };

        state.groups.insert(record.id, record.clone());
        state.memberships.push(membership.clone());
        Ok((record, membership))
    }

    async fn find_group(&self, group_id: Uuid) -> StoreResult<Option<Group>> {
        Ok(active_group(&self.lock(), &group_id).cloned())
    }

    async fn update_group(
        &self,
        group_id: Uuid,
        changes: GroupChanges,
    ) -> StoreResult<Option<Group>> {
        let mut state = self.lock();
        let Some(group) = state.groups.get_mut(&group_id).filter(|g| g.is_active) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            group.name = name;
        }
        if let Some(description) = changes.description {
            group.description = description;
        }
        if let Some(privacy) = changes.privacy {
            group.privacy = privacy;
        }
        group.updated_at = Utc::now();
        Ok(Some(group.clone()))
    }

    async fn deactivate_group(&self, group_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        match state.groups.get_mut(&group_id).filter(|g| g.is_active) {
            Some(group) => {
                group.is_active = false;
                group.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> StoreResult<Membership> {
        if self.fail_membership_inserts {
            return Err(StoreError::Database("membership insert failed".into()));
        }
        let mut state = self.lock();
        let membership = push_membership(&mut state, group_id, user_id, role)?;
        if self.lose_insert_races {
            return Err(StoreError::UniqueViolation);
        }
        Ok(membership)
    }

    async fn find_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        Ok(self
            .lock()
            .memberships
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn delete_membership(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(state.memberships.len() < before)
    }

    async fn count_members(&self, group_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .lock()
            .memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .count() as i64)
    }

    async fn list_members(&self, group_id: Uuid) -> StoreResult<Vec<Membership>> {
        let mut members: Vec<Membership> = self
            .lock()
            .memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    async fn list_groups_for_user(
        &self,
        filter: GroupListFilter,
    ) -> StoreResult<Vec<GroupSummary>> {
        let state = self.lock();
        let user_id = filter.member_id;
        let mut summaries: Vec<GroupSummary> = state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                let group = active_group(&state, &m.group_id).filter(|g| {
                    filter.creator.map_or(true, |c| g.created_by == c)
                        && filter.search.matches(&[&g.name, &g.description])
                })?;
                Some(GroupSummary {
                    id: group.id,
                    name: group.name.clone(),
                    description: group.description.clone(),
                    privacy: group.privacy,
                    member_count: state
                        .memberships
                        .iter()
                        .filter(|other| other.group_id == group.id)
                        .count() as i64,
                    competition_count: state
                        .competitions
                        .values()
                        .filter(|c| c.group_id == group.id)
                        .count() as i64,
                    is_favorite: state
                        .favorites
                        .iter()
                        .any(|(g, u, _)| *g == group.id && *u == user_id),
                    your_role: m.role,
                    joined_at: m.joined_at,
                })
            })
            .collect();
        summaries.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(summaries)
    }
}

#[async_trait]
impl InvitationStore for InMemoryStore {
    async fn insert_invitation(&self, invitation: NewInvitation) -> StoreResult<GroupInvitation> {
        let mut state = self.lock();
        if state.invitations.contains_key(&invitation.token) {
            return Err(StoreError::UniqueViolation);
        }
        let record = GroupInvitation {
            token: invitation.token,
            group_id: invitation.group_id,
            created_by: invitation.created_by,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            is_active: true,
        };
        state.invitations.insert(record.token, record.clone());
        Ok(record)
    }

    async fn find_active_invitation(&self, token: Uuid) -> StoreResult<Option<GroupInvitation>> {
        let state = self.lock();
        Ok(state
            .invitations
            .get(&token)
            .filter(|inv| inv.is_active && active_group(&state, &inv.group_id).is_some())
            .cloned())
    }

    async fn deactivate_invitation(&self, token: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        match state.invitations.get_mut(&token).filter(|inv| inv.is_active) {
            Some(invitation) => {
                invitation.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active_invitations(
        &self,
        group_id: Uuid,
        now: DateTime<Utc>,
    ) -> StoreResult<Vec<GroupInvitation>> {
        let mut invitations: Vec<GroupInvitation> = self
            .lock()
            .invitations
            .values()
            .filter(|inv| inv.group_id == group_id && inv.state(now) == InvitationState::Active)
            .cloned()
            .collect();
        invitations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(invitations)
    }
}

#[async_trait]
impl CompetitionStore for InMemoryStore {
    async fn insert_competition(&self, competition: NewCompetition) -> StoreResult<Competition> {
        let now = Utc::now();
        let record = Competition {
            id: Uuid::new_v4(),
            group_id: competition.group_id,
            created_by: competition.created_by,
            name: competition.name,
            description: competition.description,
            start_date: competition.start_date,
            end_date: competition.end_date,
            status: CompetitionStatus::Planning,
            created_at: now,
            updated_at: now,
        };
        self.lock().competitions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>> {
        let state = self.lock();
        Ok(state
            .competitions
            .get(&competition_id)
            .filter(|c| active_group(&state, &c.group_id).is_some())
            .cloned())
    }

    async fn update_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<Option<Competition>> {
        let mut state = self.lock();
        let Some(group_id) = state.competitions.get(&competition_id).map(|c| c.group_id) else {
            return Ok(None);
        };
        if active_group(&state, &group_id).is_none() {
            return Ok(None);
        }
        Ok(state.competitions.get_mut(&competition_id).map(|c| {
            c.status = status;
            c.updated_at = Utc::now();
            c.clone()
        }))
    }

    async fn list_competitions(
        &self,
        filter: CompetitionFilter,
    ) -> StoreResult<Vec<CompetitionSummary>> {
        let state = self.lock();
        let mut summaries: Vec<CompetitionSummary> = state
            .competitions
            .values()
            .filter(|c| {
                active_group(&state, &c.group_id).is_some()
                    && state
                        .memberships
                        .iter()
                        .any(|m| m.group_id == c.group_id && m.user_id == filter.member_id)
                    && filter.group_id.map_or(true, |g| c.group_id == g)
                    && filter.status.map_or(true, |s| c.status == s)
                    && filter.creator.map_or(true, |u| c.created_by == u)
                    && filter.search.matches(&[&c.name, &c.description])
            })
            .map(|c| CompetitionSummary {
                competition: c.clone(),
                participant_count: state
                    .participants
                    .iter()
                    .filter(|p| p.competition_id == c.id)
                    .count() as i64,
                restaurant_count: state
                    .restaurants
                    .values()
                    .filter(|r| r.competition_id == c.id)
                    .count() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| b.competition.start_date.cmp(&a.competition.start_date));
        Ok(summaries)
    }

    async fn insert_participant(
        &self,
        competition_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Participant> {
        let mut state = self.lock();
        if state
            .participants
            .iter()
            .any(|p| p.competition_id == competition_id && p.user_id == user_id)
        {
            return Err(StoreError::UniqueViolation);
        }
        let participant = Participant {
            id: Uuid::new_v4(),
            competition_id,
            user_id,
            joined_at: Utc::now(),
        };
        state.participants.push(participant.clone());
        Ok(participant)
    }

    async fn list_participants(&self, competition_id: Uuid) -> StoreResult<Vec<Participant>> {
        Ok(self
            .lock()
            .participants
            .iter()
            .filter(|p| p.competition_id == competition_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RestaurantStore for InMemoryStore {
    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant> {
        let record = Restaurant {
            id: Uuid::new_v4(),
            competition_id: restaurant.competition_id,
            suggested_by: restaurant.suggested_by,
            name: restaurant.name,
            address: restaurant.address,
            cuisine_type: restaurant.cuisine_type,
            visit_date: restaurant.visit_date,
            image_url: restaurant.image_url,
            created_at: Utc::now(),
        };
        self.lock().restaurants.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>> {
        Ok(self.lock().restaurants.get(&restaurant_id).cloned())
    }

    async fn list_restaurants(&self, filter: RestaurantFilter) -> StoreResult<Vec<Restaurant>> {
        let mut restaurants: Vec<Restaurant> = self
            .lock()
            .restaurants
            .values()
            .filter(|r| {
                r.competition_id == filter.competition_id
                    && filter.suggested_by.map_or(true, |u| r.suggested_by == u)
                    && filter.search.matches(&[&r.name, &r.address, &r.cuisine_type])
            })
            .cloned()
            .collect();
        restaurants.sort_by_key(|r| r.created_at);
        Ok(restaurants)
    }

    async fn insert_rating(&self, rating: NewRating) -> StoreResult<Rating> {
        let mut state = self.lock();
        if state
            .ratings
            .iter()
            .any(|r| r.restaurant_id == rating.restaurant_id && r.user_id == rating.user_id)
        {
            return Err(StoreError::UniqueViolation);
        }
        let record = Rating {
            id: Uuid::new_v4(),
            restaurant_id: rating.restaurant_id,
            user_id: rating.user_id,
            scores: rating.scores,
            comment: rating.comment,
            created_at: Utc::now(),
        };
        state.ratings.push(record.clone());
        Ok(record)
    }

    async fn list_ratings(&self, filter: RatingFilter) -> StoreResult<Vec<Rating>> {
        Ok(self
            .lock()
            .ratings
            .iter()
            .filter(|r| {
                r.restaurant_id == filter.restaurant_id
                    && filter.user_id.map_or(true, |u| r.user_id == u)
            })
            .cloned()
            .collect())
    }

    async fn list_ratings_for_competition(
        &self,
        competition_id: Uuid,
    ) -> StoreResult<Vec<Rating>> {
        let state = self.lock();
        Ok(state
            .ratings
            .iter()
            .filter(|r| {
                state
                    .restaurants
                    .get(&r.restaurant_id)
                    .is_some_and(|rest| rest.competition_id == competition_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FavoriteStore for InMemoryStore {
    async fn delete_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut state = self.lock();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|(g, u, _)| !(*g == group_id && *u == user_id));
        Ok(state.favorites.len() < before)
    }

    async fn insert_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut state = self.lock();
        if state
            .favorites
            .iter()
            .any(|(g, u, _)| *g == group_id && *u == user_id)
        {
            return Err(StoreError::UniqueViolation);
        }
        state.favorites.push((group_id, user_id, Utc::now()));
        if self.lose_insert_races {
            return Err(StoreError::UniqueViolation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::group::GroupPrivacy;

    fn new_group(created_by: Uuid) -> NewGroup {
        NewGroup {
            name: "Brunch Club".to_string(),
            description: String::new(),
            privacy: GroupPrivacy::Private,
            created_by,
        }
    }

    #[tokio::test]
    async fn test_membership_unique_per_pair() {
        let store = InMemoryStore::new();
        let group_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        store
            .insert_membership(group_id, user_id, GroupRole::Member)
            .await
            .unwrap();
        let second = store
            .insert_membership(group_id, user_id, GroupRole::Admin)
            .await;

        assert_eq!(second, Err(StoreError::UniqueViolation));
        assert_eq!(store.membership_rows(group_id, user_id), 1);
    }

    #[tokio::test]
    async fn test_failed_admin_insert_leaves_no_group() {
        let store = InMemoryStore::failing_membership_inserts();
        let result = store.create_group_with_admin(new_group(Uuid::new_v4())).await;

        assert!(matches!(result, Err(StoreError::Database(_))));
        assert_eq!(store.group_count(), 0);
    }

    #[tokio::test]
    async fn test_deactivate_invitation_is_one_shot() {
        let store = InMemoryStore::new();
        let creator = Uuid::new_v4();
        let (group, _) = store.create_group_with_admin(new_group(creator)).await.unwrap();
        let token = Uuid::new_v4();
        store
            .insert_invitation(NewInvitation {
                token,
                group_id: group.id,
                created_by: creator,
                created_at: Utc::now(),
                expires_at: None,
            })
            .await
            .unwrap();

        assert!(store.deactivate_invitation(token).await.unwrap());
        assert!(!store.deactivate_invitation(token).await.unwrap());
        assert!(store.find_active_invitation(token).await.unwrap().is_none());
        assert!(store.invitation(token).is_some());
    }

    #[tokio::test]
    async fn test_inactive_group_hides_competitions() {
        let store = InMemoryStore::new();
        let creator = Uuid::new_v4();
        let (group, _) = store.create_group_with_admin(new_group(creator)).await.unwrap();
        let competition = store
            .insert_competition(NewCompetition {
                group_id: group.id,
                created_by: creator,
                name: "Dumpling Derby".to_string(),
                description: String::new(),
                start_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                end_date: chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            })
            .await
            .unwrap();

        store.deactivate_group(group.id).await.unwrap();

        assert!(store.find_competition(competition.id).await.unwrap().is_none());
        let updated = store
            .update_competition_status(competition.id, CompetitionStatus::Active)
            .await
            .unwrap();
        assert!(updated.is_none());
        assert_eq!(
            store.competitions_stored(),
            1,
            "the competition row itself is retained"
        );
    }

    #[tokio::test]
    async fn test_lost_race_stores_row_and_reports_conflict() {
        let store = InMemoryStore::losing_insert_races();
        let (group_id, user_id) = (Uuid::new_v4(), Uuid::new_v4());

        let result = store
            .insert_membership(group_id, user_id, GroupRole::Member)
            .await;
        assert_eq!(result, Err(StoreError::UniqueViolation));
        assert_eq!(store.membership_rows(group_id, user_id), 1);

        assert_eq!(
            store.insert_favorite(group_id, user_id).await,
            Err(StoreError::UniqueViolation)
        );
        assert_eq!(store.favorite_rows(group_id, user_id), 1);
    }

    #[tokio::test]
    async fn test_inactive_group_hides_invitations() {
        let store = InMemoryStore::new();
        let creator = Uuid::new_v4();
        let (group, _) = store.create_group_with_admin(new_group(creator)).await.unwrap();
        let token = Uuid::new_v4();
        store
            .insert_invitation(NewInvitation {
                token,
                group_id: group.id,
                created_by: creator,
                created_at: Utc::now(),
                expires_at: None,
            })
            .await
            .unwrap();

        store.deactivate_group(group.id).await.unwrap();
        assert!(store.find_active_invitation(token).await.unwrap().is_none());
    }
}
