use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{SankhyaError, SankhyaGateway, SankhyaSession};

/// Schema, relations and primary keys of one table, fetched together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub name: String,
    pub schema: Value,
    pub relations: Value,
    pub primary_keys: Value,
    pub last_updated: DateTime<Utc>,
    pub cached: bool,
}

impl TableInfo {
    /// Primary key column names, whatever shape the upstream used.
    pub fn primary_key_names(&self) -> Vec<String> {
        let items = match &self.primary_keys {
            Value::Array(items) => items.clone(),
            Value::Object(obj) => match obj.get("primaryKeys").or_else(|| obj.get("data")) {
                Some(Value::Array(items)) => items.clone(),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("COLUMN_NAME")
                    .or_else(|| obj.get("columnName"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleInfo {
    pub table_name: String,
    pub primary_key: String,
    pub fields: Vec<FieldInfo>,
    pub relations: Vec<RelationInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: &'static str,
    pub nullable: bool,
    pub max_length: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationInfo {
    pub table: Option<String>,
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub action: Option<String>,
}

struct CacheEntry {
    info: TableInfo,
    stored_at: DateTime<Utc>,
}

/// Cached, combined view over the inspection endpoints.
pub struct TableInspector {
    gateway: Arc<SankhyaGateway>,
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl TableInspector {
    pub fn new(gateway: Arc<SankhyaGateway>, ttl_secs: i64) -> Self {
        Self {
            gateway,
            cache: RwLock::new(HashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    fn cache_key(table: &str) -> String {
        format!("table_info_{}", table.to_uppercase())
    }

    pub async fn get_table_info(&self, session: &SankhyaSession, table: &str) -> Result<TableInfo, SankhyaError> {
        let key = Self::cache_key(table);
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&key) {
                if Utc::now() - entry.stored_at < self.ttl {
                    debug!("Table info for {} served from cache", table);
                    return Ok(TableInfo {
                        cached: true,
                        ..entry.info.clone()
                    });
                }
            }
        }

        info!("Fetching table info for {} from Sankhya", table);
        let (schema, relations, primary_keys) = futures::try_join!(
            self.gateway.table_schema(session, table),
            self.gateway.table_relations(session, table),
            self.gateway.primary_keys(session, table),
        )
        .map_err(|e| {
            warn!("Failed to inspect table {}: {}", table, e);
            e
        })?;

        let now = Utc::now();
        let info = TableInfo {
            name: table.to_string(),
            schema,
            relations,
            primary_keys,
            last_updated: now,
            cached: false,
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            key,
            CacheEntry {
                info: info.clone(),
                stored_at: now,
            },
        );
        info!("Table info for {} fetched and cached", table);

        Ok(info)
    }

    /// Fetch several tables, skipping the ones that fail.
    pub async fn get_multiple_tables_info(&self, session: &SankhyaSession, tables: &[&str]) -> Vec<TableInfo> {
        let mut results = Vec::with_capacity(tables.len());
        for table in tables {
            match self.get_table_info(session, table).await {
                Ok(info) => results.push(info),
                Err(e) => warn!("Skipping table {}: {}", table, e),
            }
        }
        info!("Fetched {}/{} tables", results.len(), tables.len());
        results
    }

    pub async fn invalidate_table(&self, table: &str) -> bool {
        let removed = self.cache.write().await.remove(&Self::cache_key(table)).is_some();
        info!("Table info cache invalidated for {}", table);
        removed
    }

    pub async fn invalidate_all(&self) -> usize {
        let mut cache = self.cache.write().await;
        let count = cache.len();
        cache.clear();
        info!("Table info cache cleared ({} entries)", count);
        count
    }
}

/// Structured field and relation summary of a table.
pub fn extract_module_info(info: &TableInfo) -> ModuleInfo {
    let primary_key = info
        .primary_key_names()
        .into_iter()
        .next()
        .unwrap_or_else(|| "id".to_string());

    let columns: &[Value] = match info.schema.get("columns") {
        Some(Value::Array(columns)) => columns.as_slice(),
        _ => &[],
    };
    let fields = columns
        .iter()
        .map(|col| FieldInfo {
            name: col.get("COLUMN_NAME").and_then(Value::as_str).unwrap_or_default().to_string(),
            field_type: map_sql_type(col.get("DATA_TYPE").and_then(Value::as_str).unwrap_or_default()),
            nullable: col.get("IS_NULLABLE").and_then(Value::as_str) == Some("YES"),
            max_length: col.get("CHARACTER_MAXIMUM_LENGTH").and_then(Value::as_i64),
        })
        .collect();

    let relations = match &info.relations {
        Value::Array(items) => items
            .iter()
            .map(|rel| RelationInfo {
                table: text(rel, "ReferencedTable"),
                field: text(rel, "ReferencedColumn"),
                action: text(rel, "DeleteAction"),
            })
            .collect(),
        _ => Vec::new(),
    };

    ModuleInfo {
        table_name: info.name.clone(),
        primary_key,
        fields,
        relations,
    }
}

fn text(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// JSON-side type for a SQL Server column type.
pub fn map_sql_type(sql_type: &str) -> &'static str {
    match sql_type.to_lowercase().as_str() {
        "int" | "smallint" | "bigint" | "float" | "decimal" | "numeric" | "money" => "number",
        "char" | "varchar" | "text" | "nchar" | "nvarchar" => "string",
        "date" | "datetime" | "timestamp" => "date",
        "bit" => "boolean",
        "binary" | "varbinary" => "binary",
        _ => "any",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> TableInfo {
        TableInfo {
            name: "TGFPRO".into(),
            schema: json!({
                "columns": [
                    { "COLUMN_NAME": "CODPROD", "DATA_TYPE": "int", "IS_NULLABLE": "NO", "CHARACTER_MAXIMUM_LENGTH": null },
                    { "COLUMN_NAME": "DESCRPROD", "DATA_TYPE": "VARCHAR", "IS_NULLABLE": "YES", "CHARACTER_MAXIMUM_LENGTH": 100 },
                    { "COLUMN_NAME": "DTALTER", "DATA_TYPE": "datetime", "IS_NULLABLE": "YES" },
                    { "COLUMN_NAME": "XML", "DATA_TYPE": "xml", "IS_NULLABLE": "YES" }
                ]
            }),
            relations: json!([
                { "ReferencedTable": "TGFGRU", "ReferencedColumn": "CODGRUPOPROD", "DeleteAction": "NO_ACTION" }
            ]),
            primary_keys: json!([{ "COLUMN_NAME": "CODPROD" }]),
            last_updated: Utc::now(),
            cached: false,
        }
    }

    #[test]
    fn maps_sql_types() {
        assert_eq!(map_sql_type("numeric"), "number");
        assert_eq!(map_sql_type("NVARCHAR"), "string");
        assert_eq!(map_sql_type("timestamp"), "date");
        assert_eq!(map_sql_type("bit"), "boolean");
        assert_eq!(map_sql_type("varbinary"), "binary");
        assert_eq!(map_sql_type("geography"), "any");
    }

    #[test]
    fn extracts_module_info() {
        let module = extract_module_info(&info());
        assert_eq!(module.table_name, "TGFPRO");
        assert_eq!(module.primary_key, "CODPROD");
        assert_eq!(module.fields.len(), 4);
        assert_eq!(module.fields[0].field_type, "number");
        assert!(!module.fields[0].nullable);
        assert_eq!(module.fields[1].max_length, Some(100));
        assert_eq!(module.fields[3].field_type, "any");
        assert_eq!(module.relations[0].table.as_deref(), Some("TGFGRU"));
        assert_eq!(module.relations[0].action.as_deref(), Some("NO_ACTION"));
    }

    #[test]
    fn primary_key_defaults_to_id() {
        let mut bare = info();
        bare.primary_keys = json!({});
        assert_eq!(extract_module_info(&bare).primary_key, "id");

        bare.primary_keys = json!(["CODPROD", "CODLOCAL"]);
        assert_eq!(bare.primary_key_names(), vec!["CODPROD", "CODLOCAL"]);
    }

    mod cached {
        use std::sync::atomic::{AtomicUsize, Ordering};

        use async_trait::async_trait;
        use serde_json::json;

        use super::super::*;
        use crate::sankhya::{LoginResponse, SankhyaUpstream, TokenCache, UpstreamFailure};

        /// Upstream whose schema endpoint fails for `TABMISSING`.
        #[derive(Default)]
        struct SchemaUpstream {
            schema_calls: AtomicUsize,
        }

        #[async_trait]
        impl SankhyaUpstream for SchemaUpstream {
            async fn login(&self, _: &str, _: &str) -> Result<LoginResponse, SankhyaError> {
                Err(SankhyaError::Configuration("no login in this test".into()))
            }

            async fn execute_query(&self, _: &str, _: &str, _: &[Value]) -> Result<Vec<Value>, SankhyaError> {
                Ok(vec![])
            }

            async fn table_schema(&self, _: &str, table: &str) -> Result<Value, SankhyaError> {
                self.schema_calls.fetch_add(1, Ordering::SeqCst);
                if table == "TABMISSING" {
                    return Err(SankhyaError::Upstream(UpstreamFailure::new(
                        Some(404),
                        "Table not found",
                        "HTTP 404",
                        None,
                    )));
                }
                Ok(json!({ "columns": [{ "COLUMN_NAME": "ID", "DATA_TYPE": "int" }] }))
            }

            async fn table_relations(&self, _: &str, _: &str) -> Result<Value, SankhyaError> {
                Ok(json!([]))
            }

            async fn primary_keys(&self, _: &str, _: &str) -> Result<Value, SankhyaError> {
                Ok(json!([{ "COLUMN_NAME": "ID" }]))
            }
        }

        fn inspector() -> (Arc<SchemaUpstream>, TableInspector, SankhyaSession) {
            let upstream = Arc::new(SchemaUpstream::default());
            let gateway = Arc::new(SankhyaGateway::new(upstream.clone(), TokenCache::new(300), None));
            let session = SankhyaSession::new(
                Some("42".into()),
                Some("upstream-token".into()),
                Some(Utc::now() + Duration::hours(1)),
            );
            (upstream, TableInspector::new(gateway, 3600), session)
        }

        #[tokio::test]
        async fn multiple_tables_skip_failures() {
            let (_, inspector, session) = inspector();

            let infos = inspector
                .get_multiple_tables_info(&session, &["TGFPRO", "TABMISSING", "TGFGRU"])
                .await;

            let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names, vec!["TGFPRO", "TGFGRU"]);
        }

        #[tokio::test]
        async fn invalidate_all_clears_and_forces_refetch() {
            let (upstream, inspector, session) = inspector();

            inspector.get_table_info(&session, "TGFPRO").await.unwrap();
            inspector.get_table_info(&session, "TGFGRU").await.unwrap();
            assert!(inspector.get_table_info(&session, "tgfpro").await.unwrap().cached);
            assert_eq!(upstream.schema_calls.load(Ordering::SeqCst), 2);

            assert_eq!(inspector.invalidate_all().await, 2);
            assert_eq!(inspector.invalidate_all().await, 0);

            let info = inspector.get_table_info(&session, "TGFPRO").await.unwrap();
            assert!(!info.cached);
            assert_eq!(upstream.schema_calls.load(Ordering::SeqCst), 3);
        }

        #[tokio::test]
        async fn invalidate_table_reports_whether_cached() {
            let (_, inspector, session) = inspector();

            assert!(!inspector.invalidate_table("TGFPRO").await);
            inspector.get_table_info(&session, "TGFPRO").await.unwrap();
            assert!(inspector.invalidate_table("tgfpro").await);
        }
    }
}
