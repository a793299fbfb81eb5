//! Domain services for Foodfight.
//!
//! Services hold the business rules and talk to storage only through the
//! traits in [`crate::stores`]. Time-dependent operations take `now`
//! explicitly.

pub mod favorite;
pub mod invitation;
pub mod membership;
pub mod participation;
pub mod rating;
pub mod scoring;

pub use favorite::toggle_favorite;
pub use invitation::{InvitationJoin, VerifiedInvitation};
pub use rating::RestaurantDetails;
pub use scoring::{average_rating, overall_score};
