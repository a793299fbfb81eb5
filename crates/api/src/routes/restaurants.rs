//! Restaurant suggestion and rating routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::restaurant::{
    CriterionScores, ListRatingsQuery, ListRatingsResponse, ListRestaurantsQuery,
    ListRestaurantsResponse, RatingResponse, RestaurantResponse, SubmitRatingRequest,
    SuggestRestaurantRequest,
};
use domain::services::{rating, RestaurantDetails};
use persistence::repositories::{CompetitionRepository, GroupRepository, RestaurantRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_rating_submitted;

struct Repositories {
    groups: GroupRepository,
    competitions: CompetitionRepository,
    restaurants: RestaurantRepository,
}

impl Repositories {
    fn new(state: &AppState) -> Self {
        Self {
            groups: GroupRepository::new(state.pool.clone()),
            competitions: CompetitionRepository::new(state.pool.clone()),
            restaurants: RestaurantRepository::new(state.pool.clone()),
        }
    }
}

/// Suggest a restaurant for a competition. Group members only.
///
/// POST /api/v1/competitions/:competition_id/restaurants
pub async fn suggest_restaurant(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
    Json(request): Json<SuggestRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantResponse>), ApiError> {
    request.validate()?;

    let repos = Repositories::new(&state);
    let restaurant = rating::suggest_restaurant(
        &repos.groups,
        &repos.competitions,
        &repos.restaurants,
        competition_id,
        user_auth.user_id,
        RestaurantDetails {
            name: request.name,
            address: request.address.unwrap_or_default(),
            cuisine_type: request.cuisine_type.unwrap_or_default(),
            visit_date: request.visit_date,
            image_url: request.image_url,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RestaurantResponse::with_ratings(restaurant, &[])),
    ))
}

/// Restaurants of a competition, filtered by `search` and `suggested_by`.
///
/// GET /api/v1/competitions/:competition_id/restaurants
pub async fn list_restaurants(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(competition_id): Path<Uuid>,
    Query(query): Query<ListRestaurantsQuery>,
) -> Result<Json<ListRestaurantsResponse>, ApiError> {
    let repos = Repositories::new(&state);
    let data = rating::list_restaurants(
        &repos.groups,
        &repos.competitions,
        &repos.restaurants,
        query.into_filter(competition_id),
        user_auth.user_id,
    )
    .await?;

    let count = data.len();
    Ok(Json(ListRestaurantsResponse { data, count }))
}

/// GET /api/v1/restaurants/:restaurant_id
pub async fn get_restaurant(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<RestaurantResponse>, ApiError> {
    let repos = Repositories::new(&state);
    let restaurant = rating::get_restaurant(
        &repos.groups,
        &repos.competitions,
        &repos.restaurants,
        restaurant_id,
        user_auth.user_id,
    )
    .await?;
    Ok(Json(restaurant))
}

/// Rate a restaurant on four 0-10 criteria. One rating per user.
///
/// POST /api/v1/restaurants/:restaurant_id/ratings
pub async fn submit_rating(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(restaurant_id): Path<Uuid>,
    Json(request): Json<SubmitRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), ApiError> {
    request.validate()?;
    let scores = CriterionScores::new(
        request.food_score,
        request.service_score,
        request.ambiance_score,
        request.value_score,
    )?;

    let repos = Repositories::new(&state);
    let submitted = rating::submit_rating(
        &repos.groups,
        &repos.competitions,
        &repos.restaurants,
        restaurant_id,
        user_auth.user_id,
        scores,
        request.comment.unwrap_or_default(),
    )
    .await?;

    record_rating_submitted();
    Ok((StatusCode::CREATED, Json(submitted.into())))
}

/// Ratings of a restaurant, optionally only those by `user`.
///
/// GET /api/v1/restaurants/:restaurant_id/ratings
pub async fn list_ratings(
    State(state): State<AppState>,
    user_auth: UserAuth,
    Path(restaurant_id): Path<Uuid>,
    Query(query): Query<ListRatingsQuery>,
) -> Result<Json<ListRatingsResponse>, ApiError> {
    let repos = Repositories::new(&state);
    let ratings = rating::list_ratings(
        &repos.groups,
        &repos.competitions,
        &repos.restaurants,
        query.into_filter(restaurant_id),
        user_auth.user_id,
    )
    .await?;

    let data: Vec<RatingResponse> = ratings.into_iter().map(RatingResponse::from).collect();
    let count = data.len();
    Ok(Json(ListRatingsResponse { data, count }))
}
