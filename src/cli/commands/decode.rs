use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::auth::{decode_unverified, format_time_left, Claims};
use crate::cli::{output, OutputFormat};

pub fn handle(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let claims = decode_unverified(token.trim())?;
    let summary = summarize(&claims, Utc::now());

    output::print(output_format, &summary, || {
        let mut lines = vec![format!("User:       {}", claims.display_user())];
        if let Some(iat) = claims.issued_at() {
            lines.push(format!("Issued at:  {}", iat.to_rfc3339()));
        }
        if let Some(exp) = claims.expiry() {
            lines.push(format!("Expires at: {}", exp.to_rfc3339()));
        }
        lines.push(format!("Time left:  {}", summary["timeLeft"].as_str().unwrap_or_default()));
        lines.join("\n")
    })
}

fn summarize(claims: &Claims, now: DateTime<Utc>) -> Value {
    let time_left = claims
        .seconds_left(now)
        .map(format_time_left)
        .unwrap_or_else(|| "no exp claim".to_string());

    json!({
        "user": claims.user_id(),
        "username": claims.username,
        "issuedAt": claims.issued_at(),
        "expiresAt": claims.expiry(),
        "timeLeft": time_left,
        "claims": claims,
    })
}
