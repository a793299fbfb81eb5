//! User JWT authentication extractor.
//!
//! Handlers that take a [`UserAuth`] argument reject requests without a valid
//! Bearer token. Domain services receive only the resolved `user_id`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information from JWT.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) for log correlation.
    pub jti: String,
}

impl UserAuth {
    /// Validates an access token and returns the authenticated identity.
    pub fn validate(jwt: &JwtConfig, token: &str) -> Result<Self, ApiError> {
        let rejected = |e: shared::jwt::JwtError| {
            tracing::debug!(error = %e, "Rejected bearer token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        };
        let claims = jwt.verify(token).map_err(rejected)?;
        let user_id = claims.user_id().map_err(rejected)?;

        Ok(Self {
            user_id,
            jti: claims.jti,
        })
    }
}

/// Returns the token part of a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        Self::validate(&state.jwt, token)
    }
}
