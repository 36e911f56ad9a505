//! FinanceFlow Web Server
//!
//! Axum-based REST API for the FinanceFlow personal finance tracker.
//!
//! Security features:
//! - JWT bearer authentication (secure by default, use --no-auth for local dev)
//! - Single-use refresh tokens tracked in the database
//! - Restrictive CORS policy
//! - Input validation (pagination limits, month ranges)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use financeflow_core::db::{Database, DEMO_USER_EMAIL, DEMO_USER_ID};
use financeflow_core::models::UserProfile;

pub mod auth;
mod handlers;

pub use auth::JwtConfig;

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Default page size for transaction listings
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Longest window accepted by the spending trend endpoint
pub const MAX_TREND_DAYS: u32 = 90;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only in production)
    pub allowed_origins: Vec<String>,
    /// Token signing secrets; required when `require_auth` is set
    pub jwt: Option<JwtConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            jwt: None,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

impl AppState {
    /// Token secrets, or a 500 if the server was started without them
    pub(crate) fn jwt(&self) -> Result<&JwtConfig, AppError> {
        self.config
            .jwt
            .as_ref()
            .ok_or_else(|| AppError::internal("Token signing is not configured"))
    }
}

/// The user a request acts on behalf of (inserted by [`auth_middleware`])
#[derive(Clone, Debug)]
pub struct CurrentUser(pub UserProfile);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }

    fn demo() -> Self {
        Self(UserProfile {
            id: DEMO_USER_ID.to_string(),
            email: DEMO_USER_EMAIL.to_string(),
            name: "Demo User".to_string(),
        })
    }
}

/// Authentication middleware - validates the bearer access token
///
/// With authentication disabled every request acts as the seeded demo user.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        request.extensions_mut().insert(CurrentUser::demo());
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split_whitespace().nth(1))
        .map(str::to_string);

    let Some(token) = token else {
        warn!(path = %path, "Unauthorized request - no access token");
        return AppError::unauthorized("Access token required").into_response();
    };

    let claims = match state.jwt().and_then(|jwt| {
        jwt.verify_access_token(&token)
            .map_err(|e| {
                debug!(error = %e, path = %path, "Rejected access token");
                AppError::forbidden("Invalid or expired token")
            })
    }) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    match state.db.get_user(&claims.user_id) {
        Ok(Some(user)) => {
            debug!(user = %user.id, path = %path, "Authenticated via access token");
            request.extensions_mut().insert(CurrentUser(user.profile()));
            next.run(request).await
        }
        Ok(None) => {
            warn!(user = %claims.user_id, path = %path, "Token for unknown user");
            AppError::forbidden("User not found").into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    // Token-issuing endpoints are reachable without a token
    let public_routes = Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout));

    let protected_routes = Router::new()
        .route("/auth/profile", get(handlers::get_profile))
        // Categories
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/:id", delete(handlers::delete_category))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        // Goals
        .route(
            "/goals",
            get(handlers::list_goals).post(handlers::create_goal),
        )
        .route(
            "/goals/:id",
            put(handlers::update_goal).delete(handlers::delete_goal),
        )
        .route("/goals/:id/progress", post(handlers::update_goal_progress))
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            put(handlers::update_budget).delete(handlers::delete_budget),
        )
        // Analytics
        .route(
            "/analytics/monthly-summary",
            get(handlers::get_monthly_summary),
        )
        .route(
            "/analytics/category-breakdown",
            get(handlers::get_category_breakdown),
        )
        .route("/analytics/health-score", get(handlers::get_health_score))
        .route("/analytics/predictions", get(handlers::get_predictions))
        .route(
            "/analytics/recommendations",
            get(handlers::get_recommendations),
        )
        .route(
            "/analytics/spending-trend",
            get(handlers::get_spending_trend),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        // Allow specified origins
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    // Outermost first
    let layers = ServiceBuilder::new()
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors);

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        // Innermost layer; applied separately so its body type is boxed
        // into axum's `Body` before CORS wraps it.
        .layer(TraceLayer::new_for_http())
        .layer(layers);

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - every request acts as {}", DEMO_USER_ID);
    } else if config.jwt.is_none() {
        anyhow::bail!("Authentication is enabled but no JWT secrets are configured");
    }

    match db.purge_expired_refresh_tokens() {
        Ok(count) if count > 0 => info!("Purged {} expired refresh token(s)", count),
        Ok(_) => {}
        Err(e) => warn!("Failed to purge expired refresh tokens: {}", e),
    }

    let app = create_router(db, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    fn with_status(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn forbidden(msg: &str) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, msg)
    }

    pub fn conflict(msg: &str) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    pub fn internal(msg: &str) -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Map a core error onto the matching client status
    ///
    /// Validation, lookup and uniqueness failures keep their message; anything
    /// else is logged and returned as a generic 500.
    pub fn from_core(err: financeflow_core::Error) -> Self {
        use financeflow_core::Error;

        match err {
            Error::InvalidData(msg) => Self::bad_request(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            Error::Conflict(msg) => Self::conflict(&msg),
            other => Self::from(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}

#[cfg(test)]
mod tests;
