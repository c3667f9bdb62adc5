use std::collections::HashMap;

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::catalog::{self, TABLES};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::query::Paginated;
use crate::state::AppState;

/// GET /sankhya/tables - Tables exposed by this service
pub async fn catalog() -> Json<Value> {
    Json(json!({
        "tables": TABLES.iter().map(|def| def.summary()).collect::<Vec<_>>(),
        "total": TABLES.len(),
    }))
}

/// GET /sankhya/:route - Filtered, sorted, paginated rows
///
/// Query parameters: `page`, `perPage`, `sort` (e.g. `DESCRPROD ASC`) plus the
/// table's own filters.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(route): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<Value>>, ApiError> {
    let def = catalog::find(&route)?;
    Ok(Json(state.tables.list(&user.session(), def, &params).await?))
}

/// GET /sankhya/:route/:id - One row by primary key
pub async fn find_by_id(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((route, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let def = catalog::find(&route)?;
    Ok(Json(state.tables.find_by_id(&user.session(), def, &id).await?))
}

/// GET /sankhya/:route/admin/test - Reachability probe
pub async fn probe(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(route): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let def = catalog::find(&route)?;
    Ok(Json(state.tables.probe(&user.session(), def).await?))
}
