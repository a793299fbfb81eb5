//! Repository implementations for database operations.
//!
//! Group, invitation, competition, restaurant and favorite repositories
//! implement the domain store traits. Users are read and written directly by
//! the API layer.

pub mod competition;
pub mod favorite;
pub mod group;
pub mod invitation;
pub mod restaurant;
pub mod user;

pub use competition::CompetitionRepository;
pub use favorite::FavoriteRepository;
pub use group::GroupRepository;
pub use invitation::InvitationRepository;
pub use restaurant::RestaurantRepository;
pub use user::{ProfileUpdate, UserRepository};
