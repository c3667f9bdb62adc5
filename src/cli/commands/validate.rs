use serde_json::json;

use crate::cli::{output, OutputFormat};
use crate::sankhya::validate_query;

pub fn handle(sql: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    match validate_query(sql) {
        Ok(()) => output::print(output_format, &json!({ "valid": true }), || "✓ Query is allowed".to_string()),
        Err(e) => {
            let reason = e.to_string();
            output::print(output_format, &json!({ "valid": false, "reason": reason }), || {
                format!("✗ {}", reason)
            })?;
            anyhow::bail!("query rejected")
        }
    }
}
