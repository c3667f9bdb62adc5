use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{CatalogError, TableDef};
use crate::query::order::parse_sort;
use crate::query::{PageRequest, Paginated, QueryError, SelectBuilder};
use crate::sankhya::trim::lowercase_keys;
use crate::sankhya::{SankhyaGateway, SankhyaSession};

/// List, lookup and probe operations shared by every catalog table.
#[derive(Clone)]
pub struct TableService {
    gateway: Arc<SankhyaGateway>,
    default_per_page: u32,
    max_per_page: u32,
}

impl TableService {
    pub fn new(gateway: Arc<SankhyaGateway>, default_per_page: u32, max_per_page: u32) -> Self {
        Self {
            gateway,
            default_per_page,
            max_per_page,
        }
    }

    fn base_query(def: &TableDef) -> SelectBuilder {
        def.joins.iter().fold(
            SelectBuilder::new(def.table).columns(def.columns.iter().copied()),
            |builder, join| builder.join(*join),
        )
    }

    fn sort_for(def: &TableDef, requested: Option<&str>) -> Result<Vec<crate::query::OrderInfo>, QueryError> {
        let requested = requested.map(str::trim).filter(|s| !s.is_empty());
        let sort = match requested {
            Some(s) if def.unsortable.iter().any(|col| s.to_uppercase().contains(col)) => {
                debug!("Sort '{}' not supported on {}, using default", s, def.table);
                def.default_sort
            }
            Some(s) => s,
            None => def.default_sort,
        };

        let order = parse_sort(sort, def.columns)?;
        if order.is_empty() {
            return parse_sort(def.default_sort, def.columns);
        }
        Ok(order)
    }

    /// Filtered, sorted page of rows plus the total row count.
    pub async fn list(
        &self,
        session: &SankhyaSession,
        def: &TableDef,
        params: &HashMap<String, String>,
    ) -> Result<Paginated<Value>, CatalogError> {
        let max = def.max_per_page.map_or(self.max_per_page, |m| m.min(self.max_per_page));
        let page = PageRequest::from_params(params, self.default_per_page.min(max), max)?;
        let order = Self::sort_for(def, params.get("sort").map(String::as_str))?;

        let mut builder = Self::base_query(def);
        for filter in def.filters {
            if let Some(raw) = params.get(filter.param).filter(|v| !v.trim().is_empty()) {
                builder = filter.apply(builder, raw)?;
            }
        }

        let count_sql = builder.to_count_sql();
        let data_sql = builder.order_by(order).paginate(page).to_sql()?;

        let (rows, count_rows) = futures::try_join!(
            self.gateway.execute_query(session, &data_sql, &[]),
            self.gateway.execute_query(session, &count_sql, &[]),
        )?;

        let total = read_total(&count_rows);
        let data: Vec<Value> = rows.into_iter().map(lowercase_keys).collect();
        info!(
            "{}: page {} ({} rows of {})",
            def.table,
            page.page,
            data.len(),
            total
        );

        Ok(Paginated::new(data, total, page))
    }

    pub async fn find_by_id(&self, session: &SankhyaSession, def: &TableDef, id: &str) -> Result<Value, CatalogError> {
        let key = id.trim().parse::<i64>().map_err(|_| QueryError::InvalidFilter {
            param: "id".to_string(),
            value: id.to_string(),
            expected: "an integer",
        })?;

        let sql = Self::base_query(def).where_eq_int(def.primary_key, key).to_sql()?;
        let rows = self.gateway.execute_query(session, &sql, &[]).await?;

        rows.into_iter()
            .next()
            .map(lowercase_keys)
            .ok_or_else(|| CatalogError::RecordNotFound {
                table: def.table.to_string(),
                id: id.to_string(),
            })
    }

    /// Cheap end-to-end check that the table is reachable upstream.
    pub async fn probe(&self, session: &SankhyaSession, def: &TableDef) -> Result<Value, CatalogError> {
        let sql = Self::base_query(def).to_count_sql();
        let rows = self.gateway.execute_query(session, &sql, &[]).await?;

        Ok(json!({
            "message": format!("{} module is working", def.table),
            "timestamp": Utc::now().to_rfc3339(),
            "total": read_total(&rows),
            "status": "OK",
        }))
    }
}

/// `TOTAL` from a count query, whatever case the upstream used for the key.
fn read_total(rows: &[Value]) -> u64 {
    let Some(Value::Object(row)) = rows.first() else {
        return 0;
    };
    row.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("total"))
        .and_then(|(_, v)| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find;

    #[test]
    fn reads_total_in_any_case() {
        assert_eq!(read_total(&[json!({ "TOTAL": 42 })]), 42);
        assert_eq!(read_total(&[json!({ "total": "7" })]), 7);
        assert_eq!(read_total(&[]), 0);
        assert_eq!(read_total(&[json!({ "other": 1 })]), 0);
    }

    #[test]
    fn unsortable_columns_fall_back_to_default() {
        let log = find("ad_gig_log").unwrap();
        let order = TableService::sort_for(log, Some("DTCREATED DESC")).unwrap();
        assert_eq!(order[0].column, "AD_GIG_LOG.ID");

        let pro = find("tgfpro").unwrap();
        let order = TableService::sort_for(pro, Some("codprod desc")).unwrap();
        assert_eq!(order[0].column, "TGFPRO.CODPROD");
        assert!(TableService::sort_for(pro, Some("SENHA")).is_err());
        assert_eq!(TableService::sort_for(pro, None).unwrap()[0].column, "TGFPRO.DESCRPROD");
    }
}
