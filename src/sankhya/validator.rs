//! Read-only allow-list applied to every statement before it is forwarded.

use once_cell::sync::Lazy;
use regex::Regex;

use super::SankhyaError;

const FORBIDDEN_COMMANDS: &[&str] = &[
    "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "ALTER", "TRUNCATE", "MERGE", "EXEC", "EXECUTE", "BULK",
    "BACKUP", "RESTORE", "GRANT", "REVOKE", "DENY",
];

/// Large binary columns the upstream chokes on.
const FORBIDDEN_FIELDS: &[&str] = &["IMAGEM", "FOTO", "PHOTO", "PICTURE", "IMAGE", "BLOB", "BINARY", "VARBINARY"];

static READ_ONLY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(SELECT|WITH)\b").unwrap());

static SELECT_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bSELECT\s+\*").unwrap());

static COMMAND_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FORBIDDEN_COMMANDS
        .iter()
        .map(|cmd| (*cmd, Regex::new(&format!(r"\b{}\b", cmd)).unwrap()))
        .collect()
});

/// Accepts only `SELECT`/`WITH` statements free of write/DDL keywords,
/// `SELECT *` projections and binary columns.
pub fn validate_query(query: &str) -> Result<(), SankhyaError> {
    let normalized = query.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(SankhyaError::InvalidQuery("Query cannot be empty".to_string()));
    }

    for command in FORBIDDEN_COMMANDS {
        if normalized.starts_with(&format!("{} ", command)) {
            return Err(SankhyaError::InvalidQuery(format!(
                "Command '{}' is not allowed. Only SELECT queries are authorized.",
                command
            )));
        }
    }

    if !READ_ONLY_PREFIX.is_match(&normalized) {
        return Err(SankhyaError::InvalidQuery("Only SELECT queries are allowed".to_string()));
    }

    // catches commands in subqueries and stacked statements (`; DROP ...`)
    for (command, pattern) in COMMAND_PATTERNS.iter() {
        if pattern.is_match(&normalized) {
            return Err(SankhyaError::InvalidQuery(format!(
                "Command '{}' detected in query. Only SELECT is allowed.",
                command
            )));
        }
    }

    if SELECT_STAR.is_match(&normalized) {
        return Err(SankhyaError::InvalidQuery(
            "SELECT * is not allowed. List the desired columns explicitly.".to_string(),
        ));
    }

    for field in FORBIDDEN_FIELDS {
        if normalized.contains(&format!(" {},", field))
            || normalized.contains(&format!(",{} ", field))
            || normalized.contains(&format!(" {} ", field))
            || normalized.ends_with(&format!(" {}", field))
        {
            return Err(SankhyaError::InvalidQuery(format!(
                "Column '{}' is not allowed. Large binary columns are forbidden.",
                field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(query: &str) -> String {
        match validate_query(query) {
            Err(SankhyaError::InvalidQuery(msg)) => msg,
            other => panic!("expected rejection for {:?}, got {:?}", query, other),
        }
    }

    #[test]
    fn accepts_plain_selects_and_ctes() {
        assert!(validate_query("SELECT CODPROD, DESCRPROD FROM TGFPRO").is_ok());
        assert!(validate_query("  select codprod from tgfpro where ativo = 'S'  ").is_ok());
        assert!(validate_query("SELECT\nCODPROD\nFROM TGFPRO").is_ok());
        assert!(validate_query("WITH X AS (SELECT CODPROD FROM TGFPRO) SELECT CODPROD FROM X").is_ok());
        assert!(validate_query("SELECT COUNT(*) AS TOTAL FROM TGFPRO").is_ok());
    }

    #[test]
    fn rejects_empty_queries() {
        assert_eq!(rejection(""), "Query cannot be empty");
        assert_eq!(rejection("   \n "), "Query cannot be empty");
    }

    #[test]
    fn rejects_leading_write_commands() {
        assert!(rejection("DELETE FROM TGFPRO").contains("'DELETE' is not allowed"));
        assert!(rejection("update tgfpro set ativo = 'N'").contains("'UPDATE' is not allowed"));
        assert!(rejection("EXEC sp_who").contains("'EXEC' is not allowed"));
    }

    #[test]
    fn rejects_non_select_statements() {
        assert_eq!(rejection("SHOW TABLES"), "Only SELECT queries are allowed");
        assert_eq!(rejection("SELECTX FROM T"), "Only SELECT queries are allowed");
    }

    #[test]
    fn rejects_embedded_commands() {
        assert!(rejection("SELECT CODPROD FROM TGFPRO; DROP TABLE TGFPRO").contains("'DROP' detected"));
        assert!(rejection("SELECT CODPROD FROM TGFPRO WHERE X IN (DELETE FROM Y)").contains("'DELETE' detected"));
    }

    #[test]
    fn keyword_fragments_inside_identifiers_are_fine() {
        // DHALTER contains ALTER, CODPROJ contains nothing forbidden
        assert!(validate_query("SELECT DHALTER, CODPROJ, DTALTER FROM TGFGRU").is_ok());
        assert!(validate_query("SELECT UPDATED_BY FROM AD_LOG").is_ok());
    }

    #[test]
    fn rejects_select_star() {
        assert!(rejection("SELECT * FROM TGFPRO").starts_with("SELECT * is not allowed"));
        assert!(rejection("SELECT\n  *\nFROM TGFPRO").starts_with("SELECT * is not allowed"));
        assert!(rejection("WITH X AS (SELECT * FROM T) SELECT A FROM X").starts_with("SELECT * is not allowed"));
    }

    #[test]
    fn rejects_binary_columns() {
        assert!(rejection("SELECT CODUSU, FOTO FROM TSIUSU").contains("'FOTO'"));
        assert!(rejection("SELECT IMAGEM, CODPROD FROM TGFPRO").contains("'IMAGEM'"));
        assert!(rejection("SELECT CODPROD,IMAGEM FROM TGFPRO").contains("'IMAGEM'"));
        assert!(validate_query("SELECT CODPROD, TEMIMAGEM FROM TGFPRO").is_ok());
    }
}
