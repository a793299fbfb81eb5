//! Restaurant and rating models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::search::SearchTerms;
use crate::errors::DomainError;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;

/// The four per-criterion scores of a rating, each within
/// [`MIN_SCORE`, `MAX_SCORE`]. Deserializing checks the range too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScores")]
pub struct CriterionScores {
    food: i32,
    service: i32,
    ambiance: i32,
    value: i32,
}

#[derive(Deserialize)]
struct RawScores {
    food: i32,
    service: i32,
    ambiance: i32,
    value: i32,
}

impl TryFrom<RawScores> for CriterionScores {
    type Error = DomainError;

    fn try_from(raw: RawScores) -> Result<Self, Self::Error> {
        Self::new(raw.food, raw.service, raw.ambiance, raw.value)
    }
}

impl CriterionScores {
    pub fn new(food: i32, service: i32, ambiance: i32, value: i32) -> Result<Self, DomainError> {
        for (name, score) in [
            ("food", food),
            ("service", service),
            ("ambiance", ambiance),
            ("value", value),
        ] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(DomainError::validation(format!(
                    "{} score must be between {} and {}, got {}",
                    name, MIN_SCORE, MAX_SCORE, score
                )));
            }
        }
        Ok(Self {
            food,
            service,
            ambiance,
            value,
        })
    }

    pub fn food(&self) -> i32 {
        self.food
    }

    pub fn service(&self) -> i32 {
        self.service
    }

    pub fn ambiance(&self) -> i32 {
        self.ambiance
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn sum(&self) -> i32 {
        self.food + self.service + self.ambiance + self.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Restaurant {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub suggested_by: Uuid,
    pub name: String,
    pub address: String,
    pub cuisine_type: String,
    pub visit_date: NaiveDate,
    /// Opaque object-storage URL.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub competition_id: Uuid,
    pub suggested_by: Uuid,
    pub name: String,
    pub address: String,
    pub cuisine_type: String,
    pub visit_date: NaiveDate,
    pub image_url: Option<String>,
}

/// Which restaurants of a competition to list.
#[derive(Debug, Clone)]
pub struct RestaurantFilter {
    pub competition_id: Uuid,
    /// Matched against name, address and cuisine type.
    pub search: SearchTerms,
    pub suggested_by: Option<Uuid>,
}

impl RestaurantFilter {
    pub fn for_competition(competition_id: Uuid) -> Self {
        Self {
            competition_id,
            search: SearchTerms::default(),
            suggested_by: None,
        }
    }
}

/// Query parameters for listing a competition's restaurants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRestaurantsQuery {
    pub search: Option<String>,
    pub suggested_by: Option<Uuid>,
}

impl ListRestaurantsQuery {
    pub fn into_filter(self, competition_id: Uuid) -> RestaurantFilter {
        RestaurantFilter {
            competition_id,
            search: SearchTerms::parse(self.search.as_deref()),
            suggested_by: self.suggested_by,
        }
    }
}

/// A user's rating of a restaurant. Unique per (restaurant, user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rating {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub scores: CriterionScores,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub scores: CriterionScores,
    pub comment: String,
}

/// Which ratings of a restaurant to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingFilter {
    pub restaurant_id: Uuid,
    pub user_id: Option<Uuid>,
}

impl RatingFilter {
    pub fn for_restaurant(restaurant_id: Uuid) -> Self {
        Self {
            restaurant_id,
            user_id: None,
        }
    }
}

/// Query parameters for listing a restaurant's ratings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRatingsQuery {
    pub user: Option<Uuid>,
}

impl ListRatingsQuery {
    pub fn into_filter(self, restaurant_id: Uuid) -> RatingFilter {
        RatingFilter {
            restaurant_id,
            user_id: self.user,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SuggestRestaurantRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,

    #[validate(length(max = 255))]
    pub address: Option<String>,

    #[validate(length(max = 50, message = "Cuisine type must be at most 50 characters"))]
    pub cuisine_type: Option<String>,

    pub visit_date: NaiveDate,

    #[validate(url(message = "Image must be a URL"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct SubmitRatingRequest {
    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub food_score: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub service_score: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub ambiance_score: i32,

    #[validate(range(min = 0, max = 10, message = "Score must be between 0 and 10"))]
    pub value_score: i32,

    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

/// Restaurant with its aggregate rating, recomputed per read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RestaurantResponse {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub average_rating: f64,
    pub rating_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRestaurantsResponse {
    pub data: Vec<RestaurantResponse>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RatingResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub user_id: Uuid,
    pub food_score: i32,
    pub service_score: i32,
    pub ambiance_score: i32,
    pub value_score: i32,
    pub overall_score: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListRatingsResponse {
    pub data: Vec<RatingResponse>,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores_accept_bounds() {
        let low = CriterionScores::new(0, 0, 0, 0).unwrap();
        let high = CriterionScores::new(10, 10, 10, 10).unwrap();
        assert_eq!(low.sum(), 0);
        assert_eq!(high.sum(), 40);
    }

    #[test]
    fn test_scores_reject_out_of_range() {
        assert!(matches!(
            CriterionScores::new(11, 5, 5, 5),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            CriterionScores::new(5, 5, -1, 5),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_submit_rating_request_range() {
        let request = SubmitRatingRequest {
            food_score: 10,
            service_score: 0,
            ambiance_score: 5,
            value_score: 11,
            comment: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_suggest_request_cuisine_length() {
        let request = SuggestRestaurantRequest {
            name: "Noodle Bar".to_string(),
            address: None,
            cuisine_type: Some("x".repeat(51)),
            visit_date: NaiveDate::from_ymd_opt(2024, 4, 12).unwrap(),
            image_url: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_suggest_request_requires_visit_date() {
        let missing = serde_json::from_str::<SuggestRestaurantRequest>(r#"{"name": "Noodle Bar"}"#);
        assert!(missing.is_err());

        let present = serde_json::from_str::<SuggestRestaurantRequest>(
            r#"{"name": "Noodle Bar", "visit_date": "2024-04-12"}"#,
        )
        .unwrap();
        assert_eq!(present.visit_date, NaiveDate::from_ymd_opt(2024, 4, 12).unwrap());
    }

    #[test]
    fn test_deserialized_scores_are_range_checked() {
        let ok: CriterionScores =
            serde_json::from_str(r#"{"food": 10, "service": 0, "ambiance": 5, "value": 7}"#)
                .unwrap();
        assert_eq!(ok.sum(), 22);

        let too_high = serde_json::from_str::<CriterionScores>(
            r#"{"food": 11, "service": 0, "ambiance": 5, "value": 7}"#,
        );
        let err = too_high.unwrap_err().to_string();
        assert!(err.contains("food score must be between 0 and 10"));
    }

    #[test]
    fn test_rating_query_filters_by_user() {
        let restaurant_id = Uuid::new_v4();
        let user = Uuid::new_v4();
        let filter = ListRatingsQuery { user: Some(user) }.into_filter(restaurant_id);
        assert_eq!(
            filter,
            RatingFilter {
                restaurant_id,
                user_id: Some(user)
            }
        );
        assert_eq!(
            ListRatingsQuery::default().into_filter(restaurant_id),
            RatingFilter::for_restaurant(restaurant_id)
        );
    }
}
