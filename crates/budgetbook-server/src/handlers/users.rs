//! User registration and login handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{token, AppError, AppState};
use budgetbook_core::{password, Error as CoreError};

/// Email and password, as sent by the register and login forms
#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Credentials {
    fn require(self) -> Result<(String, String), AppError> {
        let email = self.email.map(|e| e.trim().to_string()).unwrap_or_default();
        let password = self.password.unwrap_or_default();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::bad_request(
                "Request body incomplete - email and password required.",
            ));
        }
        Ok((email, password))
    }
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub token_type: &'static str,
    pub token: String,
    pub expires_in: i64,
    pub message: String,
}

/// POST /api/users/register - Create a user account
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (email, password) = body.require()?;

    if state.db.user_exists(&email)? {
        return Err(AppError::conflict("User already exists"));
    }

    // CPU-bound, run off the async workers
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password)).await??;
    // A concurrent registration can still win the insert
    let user_id = state.db.create_user(&email, &hash).map_err(|e| match e {
        CoreError::AlreadyExists(_) => AppError::conflict("User already exists"),
        other => AppError::from(other),
    })?;

    info!(user_id, "Registered user");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User successfully created!".to_string(),
        }),
    ))
}

/// POST /api/users/login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = body.require()?;

    let Some(user) = state.db.get_user_by_email(&email)? else {
        warn!("Login failed: unknown email");
        return Err(AppError::unauthorized("Invalid email or password"));
    };

    let hash = user.hash.clone();
    let matches =
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash)).await??;
    if !matches {
        warn!(user_id = user.user_id, "Login failed: wrong password");
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    let expires_in = state.config.token_ttl_secs;
    let token = token::issue_token(&state.config.jwt_secret, user.user_id, &user.email, expires_in)?;

    info!(user_id = user.user_id, "User logged in");
    Ok(Json(LoginResponse {
        user_id: user.user_id,
        token_type: "Bearer",
        token,
        expires_in,
        message: "Successful login.".to_string(),
    }))
}
