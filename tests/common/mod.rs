#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use sankhya_center_api::config::{AppConfig, Environment};
use sankhya_center_api::{app, AppState};

pub const VALID_PASSWORD: &str = "secret";

/// Requests seen by the fake Sankhya API.
#[derive(Default)]
pub struct UpstreamLog {
    pub logins: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
    pub inspections: AtomicUsize,
}

impl UpstreamLog {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn inspections(&self) -> usize {
        self.inspections.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub upstream: Arc<UpstreamLog>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_as(&self, path: &str, token: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }
}

/// Upstream-style JWT for `user`, expiring `ttl_secs` from now.
pub fn make_token(user: &str, ttl_secs: i64) -> String {
    let claims = json!({
        "sub": user,
        "username": user,
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + ttl_secs,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"sankhya-erp"))
        .expect("token encodes")
}

/// Fake upstream plus the application pointed at it, each on its own port.
pub async fn spawn_app() -> Result<TestServer> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut AppConfig)) -> Result<TestServer> {
    let upstream = Arc::new(UpstreamLog::default());
    let upstream_url = serve(mock_upstream(upstream.clone())).await?;

    let mut config = AppConfig::for_environment(Environment::Development);
    config.sankhya.base_url = upstream_url;
    config.sankhya.request_timeout_secs = 5;
    config.api.enable_rate_limiting = false;
    config.api.enable_request_logging = false;
    customize(&mut config);

    let state = AppState::new(&config).context("failed to build state")?;
    let base_url = serve(app(state)).await?;

    Ok(TestServer {
        base_url,
        upstream,
        client: reqwest::Client::new(),
    })
}

async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await;
    });

    let base_url = format!("http://{}", addr);
    wait_ready(&addr, Duration::from_secs(5)).await?;
    Ok(base_url)
}

async fn wait_ready(addr: &SocketAddr, timeout: Duration) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    anyhow::bail!("server on {} did not become ready within {:?}", addr, timeout)
}

fn mock_upstream(log: Arc<UpstreamLog>) -> Router {
    Router::new()
        .route("/auth/login", post(mock_login))
        .route("/inspection/query", post(mock_query))
        .route("/inspection/table-schema", get(mock_schema))
        .route("/inspection/table-relations", get(mock_relations))
        .route("/inspection/primary-keys/:table", get(mock_primary_keys))
        .with_state(log)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))).into_response()
}

fn has_bearer(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v.len() > 7)
}

async fn mock_login(State(log): State<Arc<UpstreamLog>>, Json(body): Json<Value>) -> Response {
    log.logins.fetch_add(1, Ordering::SeqCst);

    let username = body["username"].as_str().unwrap_or_default();
    if body["password"] != VALID_PASSWORD {
        return unauthorized();
    }
    Json(json!({ "access_token": make_token(username, 3600) })).into_response()
}

async fn mock_query(State(log): State<Arc<UpstreamLog>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }

    let query = body["query"].as_str().unwrap_or_default().to_string();
    if let Ok(mut queries) = log.queries.lock() {
        queries.push(query.clone());
    }

    if query.contains("NAO_EXISTE") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "message": "Query failed",
                "sqlMessage": "Invalid object name 'NAO_EXISTE'.",
                "number": 208
            })),
        )
            .into_response();
    }

    let rows = if query.contains("COUNT(*)") {
        json!([{ "TOTAL": 2 }])
    } else if query.contains("= 999") {
        json!([])
    } else if query.contains("TGFPRO") {
        json!([
            { "CODPROD": 1, "DESCRPROD": "PARAFUSO SEXTAVADO   ", "ATIVO": "S" },
            { "CODPROD": 2, "DESCRPROD": "  PORCA 1/2 ", "ATIVO": "S" }
        ])
    } else {
        json!([{ "VALUE": " x " }])
    };

    Json(json!({ "query": query, "data": rows })).into_response()
}

async fn mock_schema(
    State(log): State<Arc<UpstreamLog>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }
    log.inspections.fetch_add(1, Ordering::SeqCst);

    let table = params.get("tableName").cloned().unwrap_or_default();
    Json(json!({
        "tableName": table,
        "columns": [
            { "COLUMN_NAME": "CODPROD", "DATA_TYPE": "int", "IS_NULLABLE": "NO" },
            { "COLUMN_NAME": "DESCRPROD", "DATA_TYPE": "varchar", "IS_NULLABLE": "YES", "CHARACTER_MAXIMUM_LENGTH": 40 },
            { "COLUMN_NAME": "CODGRUPOPROD", "DATA_TYPE": "int", "IS_NULLABLE": "YES" }
        ]
    }))
    .into_response()
}

async fn mock_relations(headers: HeaderMap) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "ReferencedTable": "TGFGRU", "ReferencedColumn": "CODGRUPOPROD", "DeleteAction": "NO_ACTION" }
    ]))
    .into_response()
}

async fn mock_primary_keys(headers: HeaderMap, Path(table): Path<String>) -> Response {
    if !has_bearer(&headers) {
        return unauthorized();
    }
    let column = if table.eq_ignore_ascii_case("TGFPRO") { "CODPROD" } else { "ID" };
    Json(json!([{ "COLUMN_NAME": column }])).into_response()
}
