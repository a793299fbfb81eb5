//! Restaurant suggestions and ratings.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use super::participation::{get_competition, require_competition_member};
use super::scoring::{average_rating, overall_score};
use crate::errors::{DomainError, StoreError};
use crate::models::restaurant::{
    CriterionScores, NewRating, NewRestaurant, Rating, RatingFilter, RatingResponse, Restaurant,
    RestaurantFilter, RestaurantResponse,
};
use crate::stores::{CompetitionStore, GroupStore, RestaurantStore};

/// Restaurant fields supplied by the suggesting user.
#[derive(Debug, Clone)]
pub struct RestaurantDetails {
    pub name: String,
    pub address: String,
    pub cuisine_type: String,
    pub visit_date: NaiveDate,
    pub image_url: Option<String>,
}

impl RestaurantResponse {
    /// Attaches the aggregate computed from `ratings`.
    pub fn with_ratings(restaurant: Restaurant, ratings: &[Rating]) -> Self {
        Self {
            restaurant,
            average_rating: average_rating(ratings.iter().map(|r| &r.scores)),
            rating_count: ratings.len(),
        }
    }
}

impl From<Rating> for RatingResponse {
    fn from(rating: Rating) -> Self {
        Self {
            id: rating.id,
            restaurant_id: rating.restaurant_id,
            user_id: rating.user_id,
            food_score: rating.scores.food(),
            service_score: rating.scores.service(),
            ambiance_score: rating.scores.ambiance(),
            value_score: rating.scores.value(),
            overall_score: overall_score(&rating.scores),
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

pub async fn suggest_restaurant(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    competition_id: Uuid,
    user_id: Uuid,
    details: RestaurantDetails,
) -> Result<Restaurant, DomainError> {
    let competition =
        require_competition_member(groups, competitions, competition_id, user_id).await?;
    if details.name.trim().is_empty() {
        return Err(DomainError::validation("Restaurant name must not be empty"));
    }

    let restaurant = restaurants
        .insert_restaurant(NewRestaurant {
            competition_id: competition.id,
            suggested_by: user_id,
            name: details.name,
            address: details.address,
            cuisine_type: details.cuisine_type,
            visit_date: details.visit_date,
            image_url: details.image_url,
        })
        .await?;

    info!(
        restaurant_id = %restaurant.id,
        competition_id = %competition_id,
        user_id = %user_id,
        "Restaurant suggested"
    );
    Ok(restaurant)
}

/// Restaurants of a competition with averages computed from current ratings,
/// narrowed by search text and suggesting user.
pub async fn list_restaurants(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    filter: RestaurantFilter,
    user_id: Uuid,
) -> Result<Vec<RestaurantResponse>, DomainError> {
    let competition =
        get_competition(groups, competitions, filter.competition_id, user_id).await?;

    let mut by_restaurant: HashMap<Uuid, Vec<Rating>> = HashMap::new();
    for rating in restaurants
        .list_ratings_for_competition(competition.id)
        .await?
    {
        by_restaurant
            .entry(rating.restaurant_id)
            .or_default()
            .push(rating);
    }

    Ok(restaurants
        .list_restaurants(filter)
        .await?
        .into_iter()
        .map(|restaurant| {
            let ratings = by_restaurant.remove(&restaurant.id).unwrap_or_default();
            RestaurantResponse::with_ratings(restaurant, &ratings)
        })
        .collect())
}

/// Loads a restaurant the user may see, with its competition's group checked.
async fn visible_restaurant(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    restaurant_id: Uuid,
    user_id: Uuid,
) -> Result<Restaurant, DomainError> {
    let restaurant = restaurants
        .find_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Restaurant not found"))?;
    get_competition(groups, competitions, restaurant.competition_id, user_id)
        .await
        .map_err(|e| match e {
            DomainError::NotFound(_) => DomainError::not_found("Restaurant not found"),
            other => other,
        })?;
    Ok(restaurant)
}

pub async fn get_restaurant(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    restaurant_id: Uuid,
    user_id: Uuid,
) -> Result<RestaurantResponse, DomainError> {
    let restaurant =
        visible_restaurant(groups, competitions, restaurants, restaurant_id, user_id).await?;
    let ratings = restaurants
        .list_ratings(RatingFilter::for_restaurant(restaurant.id))
        .await?;
    Ok(RestaurantResponse::with_ratings(restaurant, &ratings))
}

/// Records the user's rating. One rating per user and restaurant.
pub async fn submit_rating(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    restaurant_id: Uuid,
    user_id: Uuid,
    scores: CriterionScores,
    comment: String,
) -> Result<Rating, DomainError> {
    let restaurant = restaurants
        .find_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Restaurant not found"))?;
    require_competition_member(groups, competitions, restaurant.competition_id, user_id).await?;

    match restaurants
        .insert_rating(NewRating {
            restaurant_id,
            user_id,
            scores,
            comment,
        })
        .await
    {
        Ok(rating) => {
            info!(
                restaurant_id = %restaurant_id,
                user_id = %user_id,
                overall_score = overall_score(&rating.scores),
                "Rating submitted"
            );
            Ok(rating)
        }
        Err(StoreError::UniqueViolation) => Err(DomainError::validation(
            "You have already rated this restaurant",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Ratings of a visible restaurant, optionally only those by one user.
pub async fn list_ratings(
    groups: &dyn GroupStore,
    competitions: &dyn CompetitionStore,
    restaurants: &dyn RestaurantStore,
    filter: RatingFilter,
    user_id: Uuid,
) -> Result<Vec<Rating>, DomainError> {
    visible_restaurant(
        groups,
        competitions,
        restaurants,
        filter.restaurant_id,
        user_id,
    )
    .await?;
    Ok(restaurants.list_ratings(filter).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::competition::Competition;
    use crate::models::group::{GroupPrivacy, GroupRole};
    use crate::services::membership::{add_member, create_group_with_admin};
    use crate::services::participation::create_competition;
    use crate::models::restaurant::ListRestaurantsQuery;
    use crate::stores::InMemoryStore;
    use fake::faker::name::en::Name;
    use fake::Fake;

    struct Fixture {
        store: InMemoryStore,
        admin: Uuid,
        member: Uuid,
        competition: Competition,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let admin = Uuid::new_v4();
        let member = Uuid::new_v4();
        let (group, _) = create_group_with_admin(
            &store,
            admin,
            "Pizza Panel".to_string(),
            String::new(),
            GroupPrivacy::Private,
        )
        .await
        .unwrap();
        add_member(&store, group.id, member, GroupRole::Member)
            .await
            .unwrap();
        let competition = create_competition(
            &store,
            &store,
            group.id,
            admin,
            "Slice of life".to_string(),
            String::new(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .await
        .unwrap();
        Fixture {
            store,
            admin,
            member,
            competition,
        }
    }

    fn details(name: &str, cuisine_type: &str) -> RestaurantDetails {
        RestaurantDetails {
            name: name.to_string(),
            address: String::new(),
            cuisine_type: cuisine_type.to_string(),
            visit_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            image_url: None,
        }
    }

    async fn suggest(f: &Fixture) -> Restaurant {
        let name: String = Name().fake();
        suggest_restaurant(
            &f.store,
            &f.store,
            &f.store,
            f.competition.id,
            f.member,
            details(&format!("Chez {}", name), "French"),
        )
        .await
        .unwrap()
    }

    async fn list_for_member(f: &Fixture, query: ListRestaurantsQuery) -> Vec<RestaurantResponse> {
        list_restaurants(
            &f.store,
            &f.store,
            &f.store,
            query.into_filter(f.competition.id),
            f.member,
        )
        .await
        .unwrap()
    }

    fn scores(food: i32, service: i32, ambiance: i32, value: i32) -> CriterionScores {
        CriterionScores::new(food, service, ambiance, value).unwrap()
    }

    #[tokio::test]
    async fn test_unrated_restaurant_averages_zero() {
        let f = fixture().await;
        let restaurant = suggest(&f).await;

        let detail = get_restaurant(&f.store, &f.store, &f.store, restaurant.id, f.admin)
            .await
            .unwrap();
        assert_eq!(detail.average_rating, 0.0);
        assert_eq!(detail.rating_count, 0);
    }

    #[tokio::test]
    async fn test_average_tracks_current_ratings() {
        let f = fixture().await;
        let restaurant = suggest(&f).await;

        submit_rating(
            &f.store,
            &f.store,
            &f.store,
            restaurant.id,
            f.member,
            scores(7, 6, 6, 6),
            String::new(),
        )
        .await
        .unwrap();
        let one = get_restaurant(&f.store, &f.store, &f.store, restaurant.id, f.member)
            .await
            .unwrap();
        assert_eq!(one.average_rating, 6.3);

        submit_rating(
            &f.store,
            &f.store,
            &f.store,
            restaurant.id,
            f.admin,
            scores(7, 7, 7, 6),
            "Great crust".to_string(),
        )
        .await
        .unwrap();
        let listed = list_restaurants(
            &f.store,
            &f.store,
            &f.store,
            RestaurantFilter::for_competition(f.competition.id),
            f.member,
        )
        .await
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].average_rating, 6.6);
        assert_eq!(listed[0].rating_count, 2);
    }

    #[tokio::test]
    async fn test_second_rating_by_same_user_is_rejected() {
        let f = fixture().await;
        let restaurant = suggest(&f).await;

        submit_rating(
            &f.store,
            &f.store,
            &f.store,
            restaurant.id,
            f.member,
            scores(5, 5, 5, 5),
            String::new(),
        )
        .await
        .unwrap();
        let again = submit_rating(
            &f.store,
            &f.store,
            &f.store,
            restaurant.id,
            f.member,
            scores(9, 9, 9, 9),
            String::new(),
        )
        .await;

        assert!(matches!(again, Err(DomainError::Validation(_))));
        let ratings = list_ratings(
            &f.store,
            &f.store,
            &f.store,
            RatingFilter::for_restaurant(restaurant.id),
            f.member,
        )
        .await
        .unwrap();
        assert_eq!(ratings.len(), 1);
    }

    #[tokio::test]
    async fn test_list_ratings_by_user() {
        let f = fixture().await;
        let restaurant = suggest(&f).await;
        for (user, food) in [(f.member, 4), (f.admin, 9)] {
            submit_rating(
                &f.store,
                &f.store,
                &f.store,
                restaurant.id,
                user,
                scores(food, 5, 5, 5),
                String::new(),
            )
            .await
            .unwrap();
        }

        let mine = list_ratings(
            &f.store,
            &f.store,
            &f.store,
            RatingFilter {
                restaurant_id: restaurant.id,
                user_id: Some(f.admin),
            },
            f.member,
        )
        .await
        .unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].scores.food(), 9);
    }

    #[tokio::test]
    async fn test_list_restaurants_search_and_suggested_by() {
        let f = fixture().await;
        suggest(&f).await;
        let by_admin = suggest_restaurant(
            &f.store,
            &f.store,
            &f.store,
            f.competition.id,
            f.admin,
            RestaurantDetails {
                address: "12 Harbour Street".to_string(),
                ..details("Golden Dragon", "Cantonese")
            },
        )
        .await
        .unwrap();

        let by_cuisine = list_for_member(&f, ListRestaurantsQuery {
            search: Some("cantonese".to_string()),
            suggested_by: None,
        })
        .await;
        assert_eq!(by_cuisine.len(), 1);
        assert_eq!(by_cuisine[0].restaurant.id, by_admin.id);

        let by_address = list_for_member(&f, ListRestaurantsQuery {
            search: Some("harbour".to_string()),
            suggested_by: None,
        })
        .await;
        assert_eq!(by_address.len(), 1);

        let by_member = list_for_member(&f, ListRestaurantsQuery {
            search: None,
            suggested_by: Some(f.member),
        })
        .await;
        assert_eq!(by_member.len(), 1);
        assert_ne!(by_member[0].restaurant.id, by_admin.id);
    }

    #[tokio::test]
    async fn test_outsiders_cannot_rate_or_suggest() {
        let f = fixture().await;
        let restaurant = suggest(&f).await;
        let outsider = Uuid::new_v4();

        let rating = submit_rating(
            &f.store,
            &f.store,
            &f.store,
            restaurant.id,
            outsider,
            scores(1, 2, 3, 4),
            String::new(),
        )
        .await;
        assert!(matches!(rating, Err(DomainError::Forbidden(_))));

        let suggestion = suggest_restaurant(
            &f.store,
            &f.store,
            &f.store,
            f.competition.id,
            outsider,
            details("Sneaky Snacks", ""),
        )
        .await;
        assert!(matches!(suggestion, Err(DomainError::Forbidden(_))));

        let hidden = get_restaurant(&f.store, &f.store, &f.store, restaurant.id, outsider).await;
        assert!(matches!(hidden, Err(DomainError::NotFound(_))));
    }

    #[test]
    fn test_rating_response_includes_overall_score() {
        let rating = Rating {
            id: Uuid::nil(),
            restaurant_id: Uuid::nil(),
            user_id: Uuid::nil(),
            scores: scores(7, 6, 6, 6),
            comment: String::new(),
            created_at: chrono::Utc::now(),
        };
        let response = RatingResponse::from(rating);
        assert_eq!(response.overall_score, 6.3);
        assert_eq!(response.food_score, 7);
    }
}
