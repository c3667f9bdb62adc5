use std::sync::Arc;

use crate::cli::{output, OutputFormat};
use crate::config::config;
use crate::sankhya::{extract_module_info, SankhyaSession, TableInspector};

pub async fn handle(table: &str, token: &str, module: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let gateway = Arc::new(super::gateway(config)?);
    let inspector = TableInspector::new(gateway, config.inspection.cache_ttl_secs);
    let session = SankhyaSession::from_token(token.trim())?;

    let info = inspector.get_table_info(&session, table).await?;

    if module {
        let summary = extract_module_info(&info);
        return output::print(output_format, &summary, || {
            let mut lines = vec![format!("{} ({} fields)", summary.table_name, summary.fields.len())];
            for field in &summary.fields {
                lines.push(format!("  {:<24} {}", field.name, field.field_type));
            }
            lines.join("\n")
        });
    }

    output::print(output_format, &info, || {
        format!(
            "{}\nPrimary keys: {}\n{}",
            info.name,
            info.primary_key_names().join(", "),
            serde_json::to_string_pretty(&info.schema).unwrap_or_default()
        )
    })
}
