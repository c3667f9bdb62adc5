use super::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn parse(s: &str) -> Result<Self, QueryError> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(QueryError::InvalidSortDirection(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderInfo {
    /// Qualified column expression, always one of the table's known columns
    pub column: String,
    pub sort: SortDirection,
}

impl OrderInfo {
    pub fn new(column: impl Into<String>, sort: SortDirection) -> Self {
        Self {
            column: column.into(),
            sort,
        }
    }
}

/// Parse `"COL [ASC|DESC], ..."` against the allowed column set.
///
/// Columns match either their qualified form (`TGFPRO.CODPROD`) or the bare
/// column name, case-insensitively. Unknown columns and directions fail.
pub fn parse_sort(input: &str, allowed: &[&str]) -> Result<Vec<OrderInfo>, QueryError> {
    let mut out = Vec::new();
    for part in input.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut it = trimmed.split_whitespace();
        let Some(col) = it.next() else { continue };
        let column = resolve_column(col, allowed).ok_or_else(|| QueryError::InvalidColumn(col.to_string()))?;
        let sort = match it.next() {
            Some(dir) => SortDirection::parse(dir)?,
            None => SortDirection::Asc,
        };
        if let Some(extra) = it.next() {
            return Err(QueryError::InvalidSortDirection(extra.to_string()));
        }

        out.push(OrderInfo::new(column, sort));
    }
    Ok(out)
}

fn resolve_column(col: &str, allowed: &[&str]) -> Option<String> {
    allowed
        .iter()
        .find(|candidate| {
            candidate.eq_ignore_ascii_case(col) || bare_name(candidate).eq_ignore_ascii_case(col)
        })
        .map(|candidate| candidate.to_string())
}

/// Column name without its table qualifier.
pub fn bare_name(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

pub fn generate(infos: &[OrderInfo]) -> String {
    if infos.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = infos
        .iter()
        .map(|i| format!("{} {}", i.column, i.sort.to_sql()))
        .collect();
    format!("ORDER BY {}", parts.join(", "))
}
