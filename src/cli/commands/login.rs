use chrono::Utc;
use serde_json::json;

use crate::auth::{decode_unverified, format_time_left, token_preview};
use crate::cli::{output, OutputFormat};
use crate::config::config;

pub async fn handle(username: &str, password: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let gateway = super::gateway(config())?;
    let response = gateway.authenticate(username, password).await?;

    let time_left = decode_unverified(&response.access_token)
        .ok()
        .and_then(|claims| claims.seconds_left(Utc::now()))
        .unwrap_or(response.expires_in as i64);

    let summary = json!({
        "access_token": response.access_token,
        "token_type": response.token_type,
        "expires_in": response.expires_in,
    });

    output::print(output_format, &summary, || {
        format!(
            "✓ Logged in as {}\nToken:      {}\nTime left:  {}",
            username,
            token_preview(&response.access_token),
            format_time_left(time_left)
        )
    })
}
