//! Domain models for Foodfight.

pub mod competition;
pub mod favorite;
pub mod group;
pub mod invitation;
pub mod restaurant;
pub mod search;
pub mod user;

pub use competition::{Competition, CompetitionStatus, Participant};
pub use favorite::FavoriteToggle;
pub use group::{Group, GroupPrivacy, GroupRole, Membership};
pub use invitation::{GroupInvitation, InvitationState, INVITATION_TTL_DAYS};
pub use restaurant::{CriterionScores, Rating, Restaurant};
pub use search::SearchTerms;
pub use user::{User, UserPublic};
