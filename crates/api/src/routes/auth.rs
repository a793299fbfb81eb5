//! Authentication routes for registration and login.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{AuthResponse, LoginRequest, RegisterRequest};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_user_registered;
use crate::services::AuthService;

/// Register a new user with email and password.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let response = AuthService::new(state.pool.clone(), state.jwt.clone())
        .register(
            &request.email,
            &request.username,
            &request.password,
            request.first_name.as_deref().unwrap_or_default(),
            request.last_name.as_deref().unwrap_or_default(),
        )
        .await?;

    record_user_registered();
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let response = AuthService::new(state.pool.clone(), state.jwt.clone())
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn register_request(password: &str) -> RegisterRequest {
        RegisterRequest {
            email: SafeEmail().fake(),
            username: "burger_boss".to_string(),
            password: password.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register_request("longenough").validate().is_ok());
        assert!(register_request("short").validate().is_err());
    }

    #[test]
    fn test_login_request_requires_password() {
        let request = LoginRequest {
            email: SafeEmail().fake(),
            password: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
