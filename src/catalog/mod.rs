//! Declarative per-table resources served under `/sankhya/:route`.

pub mod service;
pub mod tables;

use chrono::NaiveDate;
use serde_json::{json, Value};
use thiserror::Error;

use crate::query::{QueryError, SelectBuilder};
use crate::sankhya::SankhyaError;

pub use service::TableService;
pub use tables::TABLES;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown table resource: {0}")]
    UnknownTable(String),

    #[error("{table} record {id} not found")]
    RecordNotFound { table: String, id: String },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Sankhya(#[from] SankhyaError),
}

/// How a query parameter turns into a WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterKind {
    /// `LIKE '%value%'`, wildcards in the value escaped
    Contains,
    Equals,
    Integer,
    /// `S`/`N` flag columns
    Flag,
    /// `>= 'YYYY-MM-DD'`
    DateFrom,
    /// `<= 'YYYY-MM-DD 23:59:59'`
    DateTo,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterDef {
    pub param: &'static str,
    pub column: &'static str,
    pub kind: FilterKind,
}

impl FilterDef {
    pub const fn new(param: &'static str, column: &'static str, kind: FilterKind) -> Self {
        Self { param, column, kind }
    }

    pub fn apply(&self, builder: SelectBuilder, raw: &str) -> Result<SelectBuilder, QueryError> {
        let value = raw.trim();
        let invalid = |expected| QueryError::InvalidFilter {
            param: self.param.to_string(),
            value: value.to_string(),
            expected,
        };

        Ok(match self.kind {
            FilterKind::Contains => builder.where_contains(self.column, value),
            FilterKind::Equals => builder.where_eq_text(self.column, value),
            FilterKind::Integer => {
                let n = value.parse::<i64>().map_err(|_| invalid("an integer"))?;
                builder.where_eq_int(self.column, n)
            }
            FilterKind::Flag => {
                let flag = value.to_uppercase();
                if flag != "S" && flag != "N" {
                    return Err(invalid("S or N"));
                }
                builder.where_eq_text(self.column, &flag)
            }
            FilterKind::DateFrom => {
                let date = parse_date(value).ok_or_else(|| invalid("a YYYY-MM-DD date"))?;
                builder.condition(format!("{} >= '{}'", self.column, date))
            }
            FilterKind::DateTo => {
                let date = parse_date(value).ok_or_else(|| invalid("a YYYY-MM-DD date"))?;
                builder.condition(format!("{} <= '{} 23:59:59'", self.column, date))
            }
        })
    }
}

fn parse_date(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

/// One Sankhya table exposed as a REST resource.
#[derive(Debug)]
pub struct TableDef {
    pub route: &'static str,
    pub table: &'static str,
    pub description: &'static str,
    /// Qualified integer key column used by find-by-id
    pub primary_key: &'static str,
    /// Explicit projection; rows come back keyed by the lower-cased bare names
    pub columns: &'static [&'static str],
    pub joins: &'static [&'static str],
    pub filters: &'static [FilterDef],
    pub default_sort: &'static str,
    /// Page size cap tighter than the global one
    pub max_per_page: Option<u32>,
    /// Columns the upstream cannot sort by; such sorts fall back to `default_sort`
    pub unsortable: &'static [&'static str],
}

impl TableDef {
    pub fn summary(&self) -> Value {
        json!({
            "route": self.route,
            "table": self.table,
            "description": self.description,
            "primaryKey": self.primary_key,
            "columns": self.columns,
            "filters": self.filters.iter().map(|f| f.param).collect::<Vec<_>>(),
            "defaultSort": self.default_sort,
            "maxPerPage": self.max_per_page,
        })
    }
}

/// Look up a table by its route segment, case-insensitively.
pub fn find(route: &str) -> Result<&'static TableDef, CatalogError> {
    TABLES
        .iter()
        .find(|def| def.route.eq_ignore_ascii_case(route))
        .ok_or_else(|| CatalogError::UnknownTable(route.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::order::{bare_name, parse_sort};
    use crate::sankhya::validate_query;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find("TGFPRO").unwrap().table, "TGFPRO");
        assert_eq!(find("ad_gig_log").unwrap().max_per_page, Some(20));
        assert!(matches!(find("tddcam"), Err(CatalogError::UnknownTable(_))));
    }

    #[test]
    fn every_table_builds_valid_read_only_sql() {
        for def in TABLES {
            let mut builder = SelectBuilder::new(def.table).columns(def.columns.iter().copied());
            for join in def.joins {
                builder = builder.join(*join);
            }
            for filter in def.filters {
                let sample = match filter.kind {
                    FilterKind::Integer => "1",
                    FilterKind::Flag => "S",
                    FilterKind::DateFrom | FilterKind::DateTo => "2024-01-31",
                    FilterKind::Contains | FilterKind::Equals => "abc",
                };
                builder = filter.apply(builder, sample).unwrap();
            }
            let order = parse_sort(def.default_sort, def.columns).unwrap();
            assert!(!order.is_empty(), "{} default sort", def.route);

            let sql = builder
                .order_by(order)
                .paginate(crate::query::PageRequest::new(1, 10))
                .to_sql()
                .unwrap();
            validate_query(&sql).unwrap_or_else(|e| panic!("{}: {} -> {}", def.route, sql, e));
            validate_query(&builder_count(def)).unwrap();

            assert!(def.columns.contains(&def.primary_key), "{} primary key projected", def.route);
        }
    }

    #[test]
    fn column_names_are_unique_per_table() {
        for def in TABLES {
            let mut names: Vec<&str> = def.columns.iter().map(|c| bare_name(c)).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(before, names.len(), "{} has duplicate column names", def.route);
        }
    }

    fn builder_count(def: &TableDef) -> String {
        let mut builder = SelectBuilder::new(def.table).columns(def.columns.iter().copied());
        for join in def.joins {
            builder = builder.join(*join);
        }
        builder.to_count_sql()
    }

    #[test]
    fn typed_filters_reject_bad_values() {
        let int = FilterDef::new("codprod", "TGFPRO.CODPROD", FilterKind::Integer);
        assert!(matches!(
            int.apply(SelectBuilder::new("TGFPRO"), "1 OR 1=1"),
            Err(QueryError::InvalidFilter { .. })
        ));

        let flag = FilterDef::new("ativo", "ATIVO", FilterKind::Flag);
        assert!(flag.apply(SelectBuilder::new("TGFPRO"), "x").is_err());

        let date = FilterDef::new("dtini", "DTCAD", FilterKind::DateFrom);
        assert!(date.apply(SelectBuilder::new("TGFPAR"), "31/01/2024").is_err());
    }

    #[test]
    fn filters_render_typed_conditions() {
        let builder = SelectBuilder::new("TGFPAR").columns(["CODPARC"]);
        let builder = FilterDef::new("ativo", "ATIVO", FilterKind::Flag).apply(builder, "s").unwrap();
        let builder = FilterDef::new("dtfim", "DTCAD", FilterKind::DateTo)
            .apply(builder, "2024-02-01")
            .unwrap();
        let builder = FilterDef::new("nome", "NOMEPARC", FilterKind::Equals)
            .apply(builder, "D'AVILA")
            .unwrap();

        assert_eq!(
            builder.to_count_sql(),
            "SELECT COUNT(*) AS TOTAL FROM TGFPAR WHERE ATIVO = 'S' AND DTCAD <= '2024-02-01 23:59:59' AND NOMEPARC = 'D''AVILA'"
        );
    }
}
