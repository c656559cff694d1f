//! BudgetBook Web Server
//!
//! Axum-based REST API for the BudgetBook personal finance backend.
//!
//! Security features:
//! - Bearer token authentication (secure by default, use --no-auth for local dev)
//! - Per-user data isolation (a token only grants access to its own user's data)
//! - Restrictive CORS policy
//! - Upload size and type limits
//! - Sanitized error responses

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use budgetbook_core::db::Database;

mod handlers;
pub mod token;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Environment variable holding the token signing secret
pub const JWT_SECRET_ENV: &str = "BUDGETBOOK_JWT_SECRET";

/// Environment variable overriding the token lifetime (seconds)
pub const TOKEN_TTL_ENV: &str = "BUDGETBOOK_TOKEN_TTL";

/// Default token lifetime: one day
pub const DEFAULT_TOKEN_TTL: i64 = 60 * 60 * 24;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// HMAC secret used to sign and verify login tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens in seconds
    pub token_ttl_secs: i64,
    /// Where uploaded receipts are written (served under /uploads)
    pub uploads_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            jwt_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL,
            uploads_dir: PathBuf::from("uploads"),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// The user a verified bearer token belongs to
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Authentication middleware - verifies the `Authorization: Bearer <token>` header
///
/// On success the token's [`AuthUser`] is attached to the request extensions.
/// With auth disabled every request passes through without a user.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    let Some(token) = token else {
        warn!(path = %request.uri().path(), "Unauthorized request - no bearer token");
        return AppError::unauthorized("Authentication required").into_response();
    };

    match token::verify_token(&state.config.jwt_secret, &token) {
        Ok(claims) => {
            debug!(user_id = claims.sub, path = %request.uri().path(), "Authenticated via bearer token");
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
                email: claims.email,
            });
            next.run(request).await
        }
        Err(e) => {
            warn!(error = %e, path = %request.uri().path(), "Invalid bearer token");
            AppError::unauthorized("Invalid or expired token").into_response()
        }
    }
}

/// Reject requests for another user's data when the request is authenticated
pub(crate) fn ensure_same_user(auth: Option<&AuthUser>, user_id: i64) -> Result<(), AppError> {
    match auth {
        Some(user) if user.user_id != user_id => {
            warn!(
                token_user = user.user_id,
                requested_user = user_id,
                "Cross-user access denied"
            );
            Err(AppError::forbidden("Access to another user's data is not allowed"))
        }
        _ => Ok(()),
    }
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let uploads_dir = config.uploads_dir.clone();

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
    });

    let public_routes = Router::new()
        .route("/users/register", post(handlers::register))
        .route("/users/login", post(handlers::login))
        .route("/health", get(handlers::health));

    let protected_routes = Router::new()
        // Budget worksheet
        .route("/worksheet/save_items", post(handlers::save_items))
        .route("/worksheet/retrieve_items", get(handlers::retrieve_items))
        // Giving tool
        .route("/gifts/retrieve_gift_items", get(handlers::retrieve_gift_items))
        .route("/gifts/retrieve_orgs", get(handlers::retrieve_orgs))
        .route("/gifts/update_gift_items", post(handlers::update_gift_items))
        .route("/gifts/upload_receipt", post(handlers::upload_receipt))
        .route(
            "/gifts/delete_gift",
            post(handlers::delete_gift).delete(handlers::delete_gift),
        )
        // Statement import
        .route("/upload", post(handlers::upload_statement))
        .route("/upload_2", post(handlers::upload_raw_csv))
        .route("/transform", post(handlers::transform_summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = public_routes.merge(protected_routes);

    // Build CORS layer
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
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

    let mut app = Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve the client build if a directory is provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if config.require_auth && config.jwt_secret.is_empty() {
        anyhow::bail!(
            "Authentication requires a token secret. Set {} or use --no-auth for local development.",
            JWT_SECRET_ENV
        );
    }
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }

    std::fs::create_dir_all(&config.uploads_dir)?;

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
