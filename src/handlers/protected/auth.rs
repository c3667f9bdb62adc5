use axum::{extract::Extension, response::Json};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /auth/me - Identity carried by the caller's token
pub async fn me(Extension(user): Extension<AuthUser>) -> Json<Value> {
    let id = user
        .user_id
        .clone()
        .or_else(|| user.username.clone())
        .unwrap_or_default();
    let username = user.username.clone().unwrap_or_else(|| id.clone());

    Json(json!({
        "id": id,
        "username": username,
        "email": username,
        "name": username,
        "role": "user",
    }))
}
