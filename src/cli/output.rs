use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

/// Print a serializable value: pretty JSON in `--json` mode, the text
/// rendering otherwise.
pub fn print<T: Serialize>(output_format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text()),
    }
    Ok(())
}

/// Rows as an aligned text table. Column order follows the first row.
pub fn render_rows(rows: &[Value]) -> String {
    let columns: Vec<String> = match rows.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return format!("{} row(s)", rows.len()),
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(row.get(c))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| cells.iter().map(|r| r[i].chars().count()).max().unwrap_or(0).max(c.len()))
        .collect();

    let mut out = String::new();
    out.push_str(&join_padded(&columns, &widths));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in &cells {
        out.push('\n');
        out.push_str(&join_padded(row, &widths));
    }
    out.push_str(&format!("\n({} row(s))", rows.len()));
    out
}

fn join_padded(values: &[String], widths: &[usize]) -> String {
    values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{:<width$}", v, width = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![
            json!({ "CODPROD": 1, "DESCRPROD": "PARAFUSO" }),
            json!({ "CODPROD": 20, "DESCRPROD": null }),
        ];
        let text = render_rows(&rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "CODPROD  DESCRPROD");
        assert_eq!(lines[2], "1        PARAFUSO");
        assert_eq!(lines[3], "20");
        assert_eq!(lines[4], "(2 row(s))");
    }

    #[test]
    fn empty_result_is_a_count() {
        assert_eq!(render_rows(&[]), "0 row(s)");
    }
}
