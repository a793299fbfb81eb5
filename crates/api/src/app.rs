use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{auth, competitions, groups, health, invitations, restaurants, users};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Parses the configured RS256 key pair once for the process lifetime.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let (private_key, public_key) = config.jwt.normalized_keys();
        let jwt = JwtConfig::from_rsa_pem(
            &private_key,
            &public_key,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
        })
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    Ok(router(AppState::new(config, pool)?))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Builds the full router around an existing state.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    // Handlers authenticate through the `UserAuth` extractor.
    let api_routes = Router::new()
        // Auth
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/users", get(users::list_users))
        .route(
            "/api/v1/users/me",
            get(users::get_current_user).patch(users::update_current_user),
        )
        // Groups
        .route(
            "/api/v1/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route(
            "/api/v1/groups/:group_id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/api/v1/groups/:group_id/members", get(groups::list_members))
        .route(
            "/api/v1/groups/:group_id/members/:user_id",
            delete(groups::remove_member),
        )
        .route("/api/v1/groups/:group_id/join", post(groups::join_group))
        .route(
            "/api/v1/groups/:group_id/favorite",
            post(groups::toggle_favorite),
        )
        // Invitations
        .route(
            "/api/v1/groups/:group_id/invitations",
            post(invitations::create_invitation).get(invitations::list_invitations),
        )
        .route(
            "/api/v1/groups/:group_id/invitations/:token",
            delete(invitations::revoke_invitation),
        )
        .route(
            "/api/v1/invitations/:token",
            get(invitations::verify_invitation),
        )
        .route(
            "/api/v1/invitations/:token/join",
            post(invitations::join_invitation),
        )
        // Competitions
        .route(
            "/api/v1/competitions",
            post(competitions::create_competition).get(competitions::list_competitions),
        )
        .route(
            "/api/v1/competitions/:competition_id",
            get(competitions::get_competition),
        )
        .route(
            "/api/v1/competitions/:competition_id/status",
            put(competitions::update_status),
        )
        .route(
            "/api/v1/competitions/:competition_id/join",
            post(competitions::join_competition),
        )
        .route(
            "/api/v1/competitions/:competition_id/participants",
            get(competitions::list_participants),
        )
        // Restaurants and ratings
        .route(
            "/api/v1/competitions/:competition_id/restaurants",
            post(restaurants::suggest_restaurant).get(restaurants::list_restaurants),
        )
        .route(
            "/api/v1/restaurants/:restaurant_id",
            get(restaurants::get_restaurant),
        )
        .route(
            "/api/v1/restaurants/:restaurant_id/ratings",
            post(restaurants::submit_rating).get(restaurants::list_ratings),
        );

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Global middleware (order matters: bottom layers run first)
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
