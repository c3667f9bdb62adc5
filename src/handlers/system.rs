use axum::{extract::State, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service description and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Sankhya Center API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Read-only gateway over the Sankhya ERP query API",
        "endpoints": {
            "auth": "/auth/login, /auth/refresh (public), /auth/me (protected)",
            "inspection": "/inspection/* (protected)",
            "tables": "/sankhya/tables, /sankhya/:route[/:id] (protected)",
            "health": "/health (public)",
        }
    }))
}

/// GET /health - Liveness plus token cache and upstream settings
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "cachedTokens": state.gateway.cache().len().await,
        "tokenRefresh": state.gateway.has_fallback(),
    }))
}
