//! Pass-through JWT handling.
//!
//! Tokens are issued by the Sankhya ERP and only relayed by this service, so
//! their signature is never verified here. We decode the payload to learn
//! who the token belongs to and when it expires.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed JWT: expected three dot-separated segments")]
    Malformed,

    #[error("Failed to decode token payload: {0}")]
    Payload(String),
}

/// Claims carried by an upstream-issued token. Every field is optional
/// because the issuer is outside our control.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// `sub` rendered as a string (it is numeric for some issuers), else `username`.
    pub fn user_id(&self) -> Option<String> {
        let sub = match &self.sub {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        sub.or_else(|| self.username.clone().filter(|u| !u.is_empty()))
    }

    /// Best label for logs and error messages.
    pub fn display_user(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.user_id())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| Utc.timestamp_opt(exp, 0).single())
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| Utc.timestamp_opt(iat, 0).single())
    }

    /// Seconds until expiry relative to `now`; negative once expired.
    pub fn seconds_left(&self, now: DateTime<Utc>) -> Option<i64> {
        self.exp.map(|exp| exp - now.timestamp())
    }
}

/// Decode a token's claims without verifying its signature.
pub fn decode_unverified(token: &str) -> Result<Claims, TokenError> {
    if token.split('.').count() != 3 {
        return Err(TokenError::Malformed);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| TokenError::Payload(e.to_string()))
}

/// First 40 characters of a token, for logs.
pub fn token_preview(token: &str) -> String {
    let preview: String = token.chars().take(40).collect();
    if token.chars().count() > 40 {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Human readable time left, e.g. `1d 2h 5m`, `45s`, `Expired`.
pub fn format_time_left(seconds: i64) -> String {
    if seconds <= 0 {
        return "Expired".to_string();
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 && parts.is_empty() {
        parts.push(format!("{}s", secs));
    }

    if parts.is_empty() {
        "< 1s".to_string()
    } else {
        parts.join(" ")
    }
}
