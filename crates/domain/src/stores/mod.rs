//! Store traits implemented by the persistence layer.
//!
//! Every query takes explicit parameters and returns typed records. Writes
//! that hit a uniqueness constraint fail with [`StoreError::UniqueViolation`];
//! services translate that into the matching domain error.

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::competition::{
    Competition, CompetitionFilter, CompetitionStatus, CompetitionSummary, NewCompetition,
    Participant,
};
use crate::models::group::{
    Group, GroupChanges, GroupListFilter, GroupRole, GroupSummary, Membership, NewGroup,
};
use crate::models::invitation::{GroupInvitation, NewInvitation};
use crate::models::restaurant::{
    NewRating, NewRestaurant, Rating, RatingFilter, Restaurant, RestaurantFilter,
};

#[cfg(test)]
pub use memory::InMemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Inserts the group and the creator's admin membership as one unit of
    /// work. Neither row exists if either insert fails.
    async fn create_group_with_admin(&self, group: NewGroup) -> StoreResult<(Group, Membership)>;

    /// Finds an active group.
    async fn find_group(&self, group_id: Uuid) -> StoreResult<Option<Group>>;

    /// Applies the changes to an active group.
    async fn update_group(&self, group_id: Uuid, changes: GroupChanges)
        -> StoreResult<Option<Group>>;

    /// Soft-deletes the group. Returns false if it was already inactive.
    async fn deactivate_group(&self, group_id: Uuid) -> StoreResult<bool>;

    async fn insert_membership(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        role: GroupRole,
    ) -> StoreResult<Membership>;

    async fn find_membership(&self, group_id: Uuid, user_id: Uuid)
        -> StoreResult<Option<Membership>>;

    async fn delete_membership(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn count_members(&self, group_id: Uuid) -> StoreResult<i64>;

    /// Members ordered by join time.
    async fn list_members(&self, group_id: Uuid) -> StoreResult<Vec<Membership>>;

    /// Active groups the filter's member belongs to, newest membership first.
    async fn list_groups_for_user(&self, filter: GroupListFilter)
        -> StoreResult<Vec<GroupSummary>>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    async fn insert_invitation(&self, invitation: NewInvitation) -> StoreResult<GroupInvitation>;

    /// Finds an invitation that is flagged active and whose group is active.
    /// Expiry is not checked here.
    async fn find_active_invitation(&self, token: Uuid) -> StoreResult<Option<GroupInvitation>>;

    /// Flips `is_active` to false if it is still true. Returns whether this
    /// call performed the flip.
    async fn deactivate_invitation(&self, token: Uuid) -> StoreResult<bool>;

    /// Active, unexpired invitations of a group as of `now`.
    async fn list_active_invitations(
        &self,
        group_id: Uuid,
        now: chrono::DateTime<chrono::Utc>,
    ) -> StoreResult<Vec<GroupInvitation>>;
}

#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn insert_competition(&self, competition: NewCompetition) -> StoreResult<Competition>;

    /// Finds a competition whose group is active.
    async fn find_competition(&self, competition_id: Uuid) -> StoreResult<Option<Competition>>;

    /// Updates a competition whose group is active.
    async fn update_competition_status(
        &self,
        competition_id: Uuid,
        status: CompetitionStatus,
    ) -> StoreResult<Option<Competition>>;

    async fn list_competitions(
        &self,
        filter: CompetitionFilter,
    ) -> StoreResult<Vec<CompetitionSummary>>;

    async fn insert_participant(
        &self,
        competition_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Participant>;

    async fn list_participants(&self, competition_id: Uuid) -> StoreResult<Vec<Participant>>;
}

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant>;

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>>;

    /// Restaurants matching the filter, oldest suggestion first.
    async fn list_restaurants(&self, filter: RestaurantFilter) -> StoreResult<Vec<Restaurant>>;

    async fn insert_rating(&self, rating: NewRating) -> StoreResult<Rating>;

    /// Ratings matching the filter, oldest first.
    async fn list_ratings(&self, filter: RatingFilter) -> StoreResult<Vec<Rating>>;

    /// Ratings of every restaurant in the competition.
    async fn list_ratings_for_competition(&self, competition_id: Uuid)
        -> StoreResult<Vec<Rating>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Returns true if a row was deleted.
    async fn delete_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    async fn insert_favorite(&self, group_id: Uuid, user_id: Uuid) -> StoreResult<()>;
}
