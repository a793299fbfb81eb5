//! Restaurant repository: restaurants and ratings.

use async_trait::async_trait;
use domain::models::restaurant::{
    NewRating, NewRestaurant, Rating, RatingFilter, Restaurant, RestaurantFilter,
};
use domain::stores::{RestaurantStore, StoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RatingEntity, RestaurantEntity};
use crate::error::store_error;
use crate::metrics::QueryTimer;

const RESTAURANT_COLUMNS: &str = "id, competition_id, suggested_by, name, address, \
                                  cuisine_type, visit_date, image_url, created_at";

const RATING_COLUMNS: &str = "id, restaurant_id, user_id, food_score, service_score, \
                              ambiance_score, value_score, comment, created_at";

#[derive(Clone)]
pub struct RestaurantRepository {
    pool: PgPool,
}

impl RestaurantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_ratings(rows: Vec<RatingEntity>) -> StoreResult<Vec<Rating>> {
    rows.into_iter().map(Rating::try_from).collect()
}

#[async_trait]
impl RestaurantStore for RestaurantRepository {
    async fn insert_restaurant(&self, restaurant: NewRestaurant) -> StoreResult<Restaurant> {
        let timer = QueryTimer::new("insert_restaurant");
        let result = sqlx::query_as::<_, RestaurantEntity>(&format!(
            r#"
            INSERT INTO restaurants
                (competition_id, suggested_by, name, address, cuisine_type, visit_date, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(restaurant.competition_id)
        .bind(restaurant.suggested_by)
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(&restaurant.cuisine_type)
        .bind(restaurant.visit_date)
        .bind(&restaurant.image_url)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map(Into::into).map_err(store_error)
    }

    async fn find_restaurant(&self, restaurant_id: Uuid) -> StoreResult<Option<Restaurant>> {
        let timer = QueryTimer::new("find_restaurant");
        let result = sqlx::query_as::<_, RestaurantEntity>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
        ))
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result.map_err(store_error)?.map(Into::into))
    }

    async fn list_restaurants(&self, filter: RestaurantFilter) -> StoreResult<Vec<Restaurant>> {
        let timer = QueryTimer::new("list_restaurants");
        let result = sqlx::query_as::<_, RestaurantEntity>(&format!(
            r#"
            SELECT {RESTAURANT_COLUMNS}
            FROM restaurants
            WHERE competition_id = $1
              AND ($2::uuid IS NULL OR suggested_by = $2)
              AND NOT EXISTS (
                  SELECT 1 FROM unnest($3::text[]) AS term
                  WHERE NOT (name ILIKE term OR address ILIKE term OR cuisine_type ILIKE term)
              )
            ORDER BY created_at ASC
            "#
        ))
        .bind(filter.competition_id)
        .bind(filter.suggested_by)
        .bind(filter.search.like_patterns())
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        Ok(result
            .map_err(store_error)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn insert_rating(&self, rating: NewRating) -> StoreResult<Rating> {
        let timer = QueryTimer::new("insert_rating");
        let result = sqlx::query_as::<_, RatingEntity>(&format!(
            r#"
            INSERT INTO ratings
                (restaurant_id, user_id, food_score, service_score, ambiance_score, value_score, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {RATING_COLUMNS}
            "#
        ))
        .bind(rating.restaurant_id)
        .bind(rating.user_id)
        .bind(rating.scores.food())
        .bind(rating.scores.service())
        .bind(rating.scores.ambiance())
        .bind(rating.scores.value())
        .bind(&rating.comment)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result.is_ok());
        result.map_err(store_error)?.try_into()
    }

    async fn list_ratings(&self, filter: RatingFilter) -> StoreResult<Vec<Rating>> {
        let timer = QueryTimer::new("list_ratings");
        let result = sqlx::query_as::<_, RatingEntity>(&format!(
            r#"
            SELECT {RATING_COLUMNS}
            FROM ratings
            WHERE restaurant_id = $1
              AND ($2::uuid IS NULL OR user_id = $2)
            ORDER BY created_at ASC
            "#
        ))
        .bind(filter.restaurant_id)
        .bind(filter.user_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        into_ratings(result.map_err(store_error)?)
    }

    async fn list_ratings_for_competition(
        &self,
        competition_id: Uuid,
    ) -> StoreResult<Vec<Rating>> {
        let timer = QueryTimer::new("list_ratings_for_competition");
        let result = sqlx::query_as::<_, RatingEntity>(
            r#"
            SELECT ra.id, ra.restaurant_id, ra.user_id, ra.food_score, ra.service_score,
                   ra.ambiance_score, ra.value_score, ra.comment, ra.created_at
            FROM ratings ra
            JOIN restaurants r ON r.id = ra.restaurant_id
            WHERE r.competition_id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result.is_ok());
        into_ratings(result.map_err(store_error)?)
    }
}
