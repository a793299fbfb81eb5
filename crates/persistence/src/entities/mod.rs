//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod competition;
pub mod group;
pub mod invitation;
pub mod restaurant;
pub mod user;

pub use competition::{
    CompetitionEntity, CompetitionStatusDb, CompetitionSummaryEntity, ParticipantEntity,
};
pub use group::{
    GroupEntity, GroupMembershipEntity, GroupPrivacyDb, GroupRoleDb, GroupSummaryEntity,
};
pub use invitation::GroupInvitationEntity;
pub use restaurant::{RatingEntity, RestaurantEntity};
pub use user::UserEntity;
