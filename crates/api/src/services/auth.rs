//! Registration and password login.

use std::sync::Arc;

use chrono::Utc;
use domain::models::user::{AuthResponse, TokenResponse};
use domain::models::User;
use persistence::error::is_unique_violation;
use persistence::repositories::UserRepository;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => {
                ApiError::Conflict("Email already registered".to_string())
            }
            AuthError::UsernameTaken => ApiError::Conflict("Username already taken".to_string()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::DatabaseError(e) => ApiError::from(e),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Creates the account and issues an access token.
    pub async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthResponse, AuthError> {
        let email = email.trim().to_lowercase();
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let user = match self
            .users
            .create_user(&email, username.trim(), &password_hash, first_name, last_name)
            .await
        {
            Ok(user) => user,
            // A concurrent registration can still win the race to the constraint.
            Err(e) if is_unique_violation(&e) => return Err(duplicate_kind(&e)),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User registered");
        self.authenticated(user.into())
    }

    /// Verifies the password and issues an access token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = self
            .users
            .find_by_email(email.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.authenticated(user.into())
    }

    fn authenticated(&self, user: User) -> Result<AuthResponse, AuthError> {
        let tokens = self.issue_tokens(user.id)?;
        Ok(AuthResponse { user, tokens })
    }

    fn issue_tokens(&self, user_id: Uuid) -> Result<TokenResponse, AuthError> {
        let issued = self.jwt.issue(user_id, Utc::now())?;
        Ok(TokenResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_secs,
        })
    }
}

/// Tells which of the users table's unique constraints was violated.
fn duplicate_kind(err: &sqlx::Error) -> AuthError {
    match err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some("users_username_unique") => {
            AuthError::UsernameTaken
        }
        _ => AuthError::EmailAlreadyExists,
    }
}
