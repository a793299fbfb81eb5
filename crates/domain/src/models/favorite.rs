//! Group favorites.

use serde::Serialize;
use uuid::Uuid;

/// Outcome of flipping a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl FavoriteToggle {
    pub fn is_favorite(&self) -> bool {
        matches!(self, FavoriteToggle::Added)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ToggleFavoriteResponse {
    pub group_id: Uuid,
    pub status: FavoriteToggle,
    pub is_favorite: bool,
}

impl ToggleFavoriteResponse {
    pub fn new(group_id: Uuid, status: FavoriteToggle) -> Self {
        Self {
            group_id,
            status,
            is_favorite: status.is_favorite(),
        }
    }
}
