use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{decode_unverified, format_time_left, token_preview, Claims};
use crate::error::ApiError;
use crate::sankhya::SankhyaSession;
use crate::state::AppState;

/// Caller identity taken from a pass-through upstream token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub token: String,
    pub expiry: DateTime<Utc>,
    pub claims: Claims,
}

impl AuthUser {
    pub fn session(&self) -> SankhyaSession {
        SankhyaSession::new(self.user_id.clone(), Some(self.token.clone()), Some(self.expiry))
    }

    pub fn display_user(&self) -> String {
        self.claims.display_user()
    }
}

/// Guard for protected routes: checks the bearer token's shape and expiry,
/// then hands the caller identity to handlers as an [`AuthUser`] extension.
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authorize_bearer(&headers, state.config.security.min_token_length, Utc::now())?;

    debug!(
        "Access granted: user {} token {} valid for {}",
        user.display_user(),
        token_preview(&user.token),
        format_time_left((user.expiry - Utc::now()).num_seconds())
    );

    state.gateway.remember(&user.session()).await;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Validate the `Authorization` header without touching the network.
pub fn authorize_bearer(headers: &HeaderMap, min_token_length: usize, now: DateTime<Utc>) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            warn!("Access denied: Authorization header missing or malformed");
            ApiError::access_denied(
                "Access denied: Authorization header missing or malformed",
                "AUTH_HEADER_MISSING_OR_INVALID",
                "The Authorization header must be present and start with Bearer",
            )
        })?
        .trim();

    if token.len() < min_token_length {
        warn!("Access denied: token too short");
        return Err(ApiError::access_denied(
            "Access denied: token invalid or too short",
            "TOKEN_TOO_SHORT_OR_INVALID",
            "The token must be a valid JWT of sufficient length",
        ));
    }

    let claims = decode_unverified(token).map_err(|e| {
        warn!("Access denied: {} ({})", e, token_preview(token));
        ApiError::access_denied(
            format!("Error validating token: {}", e),
            "TOKEN_MALFORMED",
            "The token must be a JWT with three segments and a JSON payload",
        )
    })?;

    let user_label = claims.display_user();
    let Some(expiry) = claims.expiry() else {
        warn!("Access denied: token for {} has no expiry", user_label);
        return Err(ApiError::access_denied(
            format!("Token without expiry for user {}", user_label),
            "TOKEN_NO_EXP",
            "The JWT must carry an exp claim",
        ));
    };

    let seconds_left = (expiry - now).num_seconds();
    if expiry <= now {
        warn!("Access denied: token expired for user {}", user_label);
        return Err(ApiError::access_denied(
            format!("Token expired for user {}", user_label),
            "TOKEN_EXPIRED",
            "The JWT has expired. Log in again.",
        )
        .with_details(json!({
            "user": user_label,
            "exp": claims.exp,
            "exp_human": format_time_left(seconds_left.min(0)),
        })));
    }

    Ok(AuthUser {
        user_id: claims.user_id(),
        username: claims.username.clone(),
        token: token.to_string(),
        expiry,
        claims,
    })
}
