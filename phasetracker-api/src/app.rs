/// Application state and router builder
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                                  # public
/// ├── /auth/                                   # public
/// │   ├── POST /admin/signup
/// │   ├── POST /admin/verify-account
/// │   ├── POST /admin/login
/// │   ├── POST /client/request-code
/// │   └── POST /client/verify-code
/// ├── /projects/...                            # admin JWT
/// │   └── .../phases/...                       # lifecycle operations
/// ├── /clients                                 # admin JWT
/// └── /client/projects                         # client JWT (timeline)
/// ```
///
/// # Middleware stack
///
/// Applied to every route: request tracing, CORS, security headers.
/// Authentication is per route group — admin routes and the client portal
/// each get a role-checking JWT layer.

use crate::{config::Config, error::ApiError, middleware::security::security_headers};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use phasetracker_shared::{
    auth::{
        jwt::{self, JwtError, Role},
        middleware::AuthContext,
    },
    mailer::{HttpMailer, LogMailer, Mailer},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request via Axum's `State` extractor; Arc keeps the clones
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound email seam
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates application state with an explicit mailer (tests inject
    /// their own)
    pub fn new(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Creates application state, picking the mailer from configuration
    ///
    /// A configured provider URL + key selects the HTTP mailer; anything
    /// less falls back to the log mailer.
    pub fn from_config(db: PgPool, config: Config) -> Self {
        let mailer: Arc<dyn Mailer> = match (&config.email.provider_url, &config.email.api_key) {
            (Some(url), Some(key)) => Arc::new(HttpMailer::new(
                url.clone(),
                key.clone(),
                config.email.from_address.clone(),
            )),
            _ => {
                tracing::warn!("No email provider configured; codes will be logged");
                Arc::new(LogMailer)
            }
        };

        Self::new(db, config, mailer)
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth endpoints
    let auth_routes = Router::new()
        .route("/admin/signup", post(routes::auth::admin_signup))
        .route(
            "/admin/verify-account",
            post(routes::auth::admin_verify_account),
        )
        .route("/admin/login", post(routes::auth::admin_login))
        .route(
            "/client/request-code",
            post(routes::auth::client_request_code),
        )
        .route(
            "/client/verify-code",
            post(routes::auth::client_verify_code),
        );

    // Project management + phase lifecycle (admin only)
    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:project_id",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:project_id/clients",
            post(routes::projects::assign_client).get(routes::projects::list_project_clients),
        )
        .route(
            "/:project_id/clients/:client_id",
            delete(routes::projects::remove_client),
        )
        .route(
            "/:project_id/phases",
            post(routes::phases::create_phase).get(routes::phases::list_phases),
        )
        .route(
            "/:project_id/phases/reorder",
            put(routes::phases::reorder_phases),
        )
        .route(
            "/:project_id/phases/:phase_id",
            put(routes::phases::update_phase).delete(routes::phases::delete_phase),
        )
        .route(
            "/:project_id/phases/:phase_id/set-active",
            post(routes::phases::set_active_phase),
        )
        .route(
            "/:project_id/phases/:phase_id/complete",
            post(routes::phases::complete_phase),
        )
        .route(
            "/:project_id/phases/:phase_id/reopen",
            post(routes::phases::reopen_phase),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_layer,
        ));

    // Client account management (admin only)
    let client_admin_routes = Router::new()
        .route(
            "/",
            post(routes::clients::create_client).get(routes::clients::list_clients),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_layer,
        ));

    // Client portal (client only, read-only)
    let client_portal_routes = Router::new()
        .route("/projects", get(routes::clients::my_projects))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            client_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .nest("/projects", project_routes)
        .nest("/clients", client_admin_routes)
        .nest("/client", client_portal_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            security_headers,
        ))
        .with_state(state)
}

/// Validates the Bearer token on a request and requires the given role
fn authenticate(state: &AppState, req: &Request, role: Role) -> Result<AuthContext, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims =
        jwt::validate_token_for_role(token, state.jwt_secret(), role).map_err(|e| match e {
            JwtError::WrongRole => {
                ApiError::Forbidden("Token role not permitted here".to_string())
            }
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            other => ApiError::Unauthorized(other.to_string()),
        })?;

    Ok(AuthContext::from_claims(&claims))
}

/// JWT layer for admin route groups
async fn admin_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(&state, &req, Role::Admin)?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// JWT layer for the client portal
async fn client_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authenticate(&state, &req, Role::Client)?;
    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}
