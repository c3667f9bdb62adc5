// handlers/public/auth.rs - Token acquisition against the Sankhya login endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::sankhya::{LoginResponse, SankhyaError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/login - Exchange Sankhya credentials for the upstream JWT
///
/// The token is returned unchanged; clients send it back as a bearer token.
///
/// Expected Output:
/// ```json
/// { "access_token": "eyJhbGciOi...", "token_type": "Bearer", "expires_in": 3600 }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    match state.gateway.authenticate(body.username.trim(), &body.password).await {
        Ok(response) => Ok(Json(response)),
        Err(SankhyaError::Authentication(msg)) => Err(ApiError::unauthorized(msg)),
        Err(e) => Err(ApiError::unauthorized(e.to_string())),
    }
}

/// POST /auth/refresh - Not supported by the upstream
pub async fn refresh() -> ApiError {
    ApiError::not_implemented("Refresh token is not implemented")
}
