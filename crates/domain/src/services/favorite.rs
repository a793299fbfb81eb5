//! Per-user group favorites.

use tracing::debug;
use uuid::Uuid;

use super::membership::require_membership;
use crate::errors::{DomainError, StoreError};
use crate::models::favorite::FavoriteToggle;
use crate::stores::{FavoriteStore, GroupStore};

/// Flips the favorite flag for (group, user).
///
/// Deletes first and only inserts when nothing was deleted, so concurrent
/// toggles never leave two rows behind.
pub async fn toggle_favorite(
    groups: &dyn GroupStore,
    favorites: &dyn FavoriteStore,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<FavoriteToggle, DomainError> {
    require_membership(groups, group_id, user_id).await?;

    let outcome = if favorites.delete_favorite(group_id, user_id).await? {
        FavoriteToggle::Removed
    } else {
        match favorites.insert_favorite(group_id, user_id).await {
            // A concurrent toggle inserted the same row; the flag is set either way.
            Ok(()) | Err(StoreError::UniqueViolation) => FavoriteToggle::Added,
            Err(e) => return Err(e.into()),
        }
    };

    debug!(group_id = %group_id, user_id = %user_id, outcome = ?outcome, "Favorite toggled");
    Ok(outcome)
}
