//! Restaurant and rating entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::restaurant::{CriterionScores, Rating, Restaurant};
use domain::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the restaurants table.
#[derive(Debug, Clone, FromRow)]
pub struct RestaurantEntity {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub suggested_by: Uuid,
    pub name: String,
    pub address: String,
    pub cuisine_type: String,
    pub visit_date: NaiveDate,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RestaurantEntity> for Restaurant {
    fn from(entity: RestaurantEntity) -> Self {
        Self {
            id: entity.id,
            competition_id: entity.competition_id,
            suggested_by: entity.suggested_by,
            name: entity.name,
            address: entity.address,
            cuisine_type: entity.cuisine_type,
            visit_date: entity.visit_date,
            image_url: entity.image_url,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the ratings table.
#[derive(Debug, Clone, FromRow)]
pub struct RatingEntity {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub food_score: i32,
    pub service_score: i32,
    pub ambiance_score: i32,
    pub value_score: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RatingEntity> for Rating {
    type Error = StoreError;

    fn try_from(entity: RatingEntity) -> Result<Self, Self::Error> {
        let scores = CriterionScores::new(
            entity.food_score,
            entity.service_score,
            entity.ambiance_score,
            entity.value_score,
        )
        .map_err(|e| StoreError::Database(format!("rating {}: {}", entity.id, e)))?;

        Ok(Self {
            id: entity.id,
            restaurant_id: entity.restaurant_id,
            user_id: entity.user_id,
            scores,
            comment: entity.comment,
            created_at: entity.created_at,
        })
    }
}
