// handlers/protected/inspection.rs - Schema inspection and raw read-only queries

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::sankhya::{extract_module_info, ModuleInfo, TableInfo};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNameQuery {
    pub table_name: Option<String>,
}

impl TableNameQuery {
    fn required(self) -> Result<String, ApiError> {
        self.table_name
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::bad_request("tableName query parameter is required"))
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// GET /inspection/table-schema?tableName= - Column definitions
pub async fn table_schema(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TableNameQuery>,
) -> Result<Json<Value>, ApiError> {
    let table = query.required()?;
    Ok(Json(state.gateway.table_schema(&user.session(), &table).await?))
}

/// GET /inspection/table-relations?tableName= - Foreign keys
pub async fn table_relations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<TableNameQuery>,
) -> Result<Json<Value>, ApiError> {
    let table = query.required()?;
    Ok(Json(state.gateway.table_relations(&user.session(), &table).await?))
}

/// GET /inspection/primary-keys/:tableName
pub async fn primary_keys(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(table_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.gateway.primary_keys(&user.session(), &table_name).await?))
}

/// POST /inspection/query - Run a validated read-only statement
///
/// Expected Input:
/// ```json
/// { "query": "SELECT CODPROD, DESCRPROD FROM TGFPRO", "params": [] }
/// ```
///
/// Returns the trimmed rows as a JSON array.
pub async fn query(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let Json(body) = payload?;
    let rows = state
        .gateway
        .execute_query(&user.session(), &body.query, &body.params)
        .await?;
    Ok(Json(rows))
}

/// GET /inspection/table-info/:tableName - Schema, relations and keys in one call (cached)
pub async fn table_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(table_name): Path<String>,
) -> Result<Json<TableInfo>, ApiError> {
    Ok(Json(state.inspector.get_table_info(&user.session(), &table_name).await?))
}

/// DELETE /inspection/table-info/:tableName - Drop the cached table info
pub async fn invalidate_table_info(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> Json<Value> {
    let removed = state.inspector.invalidate_table(&table_name).await;
    Json(json!({
        "message": format!("Cache invalidated for table {}", table_name),
        "removed": removed,
    }))
}

/// GET /inspection/table-info/:tableName/module - Field and relation summary
pub async fn module_info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(table_name): Path<String>,
) -> Result<Json<ModuleInfo>, ApiError> {
    let info = state.inspector.get_table_info(&user.session(), &table_name).await?;
    Ok(Json(extract_module_info(&info)))
}
