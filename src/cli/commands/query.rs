use serde_json::Value;

use crate::cli::{output, OutputFormat};
use crate::config::config;
use crate::sankhya::SankhyaSession;

pub async fn handle(sql: &str, token: &str, params: &[String], output_format: OutputFormat) -> anyhow::Result<()> {
    let gateway = super::gateway(config())?;
    let session = SankhyaSession::from_token(token.trim())?;

    let params: Vec<Value> = params.iter().map(|raw| parse_param(raw)).collect();
    let rows = gateway.execute_query(&session, sql, &params).await?;

    output::print(output_format, &rows, || output::render_rows(&rows))
}

/// `42` and `true` stay typed, anything that is not JSON is sent as a string.
fn parse_param(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn params_keep_json_types() {
        assert_eq!(parse_param("42"), json!(42));
        assert_eq!(parse_param("\"X\""), json!("X"));
        assert_eq!(parse_param("PARAFUSO"), json!("PARAFUSO"));
    }
}
