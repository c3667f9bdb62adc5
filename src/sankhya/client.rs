use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};
use url::Url;

use super::{SankhyaError, UpstreamFailure};
use crate::config::SankhyaConfig;

/// Successful upstream login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> u64 {
    3600
}

/// Operations this service consumes from the Sankhya HTTP API.
#[async_trait]
pub trait SankhyaUpstream: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, SankhyaError>;

    /// Run a read-only statement, returning the raw rows.
    async fn execute_query(&self, token: &str, query: &str, params: &[Value]) -> Result<Vec<Value>, SankhyaError>;

    async fn table_schema(&self, token: &str, table: &str) -> Result<Value, SankhyaError>;

    async fn table_relations(&self, token: &str, table: &str) -> Result<Value, SankhyaError>;

    async fn primary_keys(&self, token: &str, table: &str) -> Result<Value, SankhyaError>;
}

/// `reqwest` implementation against a live Sankhya API.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: Url,
}

impl HttpUpstream {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SankhyaError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SankhyaError::Configuration(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SankhyaError::Configuration(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SankhyaError::Configuration(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &SankhyaConfig) -> Result<Self, SankhyaError> {
        Self::new(&config.base_url, config.request_timeout_secs)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and parse its JSON body, mapping failures.
    async fn send(&self, request: RequestBuilder, query: Option<&str>) -> Result<Value, SankhyaError> {
        let response = request
            .send()
            .await
            .map_err(|e| SankhyaError::Upstream(failure_from_transport(&e, query)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SankhyaError::Upstream(failure_from_transport(&e, query)))?;

        if !status.is_success() {
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Err(SankhyaError::Upstream(failure_from_response(status.as_u16(), &body, query)));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SankhyaError::InvalidResponse(e.to_string()))
    }

    async fn inspection_get(&self, token: &str, url: Url) -> Result<Value, SankhyaError> {
        debug!("GET {}", url);
        self.send(self.client.get(url).bearer_auth(token), None).await
    }
}

#[async_trait]
impl SankhyaUpstream for HttpUpstream {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, SankhyaError> {
        let url = self.endpoint(&["auth", "login"]);
        debug!("POST {} (user {})", url, username);

        let body = self
            .send(
                self.client.post(url).json(&json!({ "username": username, "password": password })),
                None,
            )
            .await?;

        serde_json::from_value(body).map_err(|e| SankhyaError::InvalidResponse(format!("login response: {}", e)))
    }

    async fn execute_query(&self, token: &str, query: &str, params: &[Value]) -> Result<Vec<Value>, SankhyaError> {
        let url = self.endpoint(&["inspection", "query"]);
        let request = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "query": query, "params": params }));

        let body = match self.send(request, Some(query)).await {
            Ok(body) => body,
            Err(SankhyaError::Upstream(failure)) => {
                error!(
                    user_message = %failure.user_message,
                    developer_info = %failure.developer_info,
                    query = %failure.query,
                    "Query execution failed"
                );
                return Err(SankhyaError::Upstream(failure));
            }
            Err(e) => return Err(e),
        };

        // rows travel in `data`, next to the echoed query and rowCount
        match body.get("data") {
            Some(Value::Array(rows)) => Ok(rows.clone()),
            _ => Ok(Vec::new()),
        }
    }

    async fn table_schema(&self, token: &str, table: &str) -> Result<Value, SankhyaError> {
        let mut url = self.endpoint(&["inspection", "table-schema"]);
        url.query_pairs_mut().append_pair("tableName", table);
        self.inspection_get(token, url).await
    }

    async fn table_relations(&self, token: &str, table: &str) -> Result<Value, SankhyaError> {
        let mut url = self.endpoint(&["inspection", "table-relations"]);
        url.query_pairs_mut().append_pair("tableName", table);
        self.inspection_get(token, url).await
    }

    async fn primary_keys(&self, token: &str, table: &str) -> Result<Value, SankhyaError> {
        let url = self.endpoint(&["inspection", "primary-keys", table]);
        self.inspection_get(token, url).await
    }
}

/// Build an [`UpstreamFailure`] from a non-2xx upstream response.
pub fn failure_from_response(status: u16, body: &Value, query: Option<&str>) -> UpstreamFailure {
    let user_message = match status {
        401 => "Invalid credentials - check username and password".to_string(),
        403 => "Access forbidden - user lacks permissions".to_string(),
        429 => "Too many attempts - wait before trying again".to_string(),
        s if s >= 500 => "Sankhya server internal error".to_string(),
        s if s >= 400 => field_text(body, "message")
            .or_else(|| field_text(body, "error"))
            .or_else(|| body.as_str().filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| "Invalid request".to_string()),
        _ => "Error executing operation".to_string(),
    };

    let mut details = vec![format!("HTTP {}", status)];
    let labelled = [
        ("message", "Message"),
        ("error", "Error"),
        ("sqlMessage", "SQL"),
        ("number", "ErrorNumber"),
        ("lineNumber", "Line"),
        ("procName", "Procedure"),
        ("class", "Class"),
        ("state", "State"),
    ];
    for (field, label) in labelled {
        if let Some(text) = field_text(body, field) {
            details.push(format!("{}: {}", label, text));
        }
    }
    if let Some(stack) = field_text(body, "stack") {
        details.push(format!("Stack: {}", stack.chars().take(500).collect::<String>()));
    }
    if let Some(original) = body.get("originalError") {
        if let Some(message) = field_text(original, "message") {
            details.push(format!("OriginalError: {}", message));
        }
        if let Some(code) = field_text(original, "code") {
            details.push(format!("Code: {}", code));
        }
    }

    UpstreamFailure::new(Some(status), user_message, details.join(" | "), query)
}

/// Build an [`UpstreamFailure`] for a request that never got a response.
pub fn failure_from_transport(err: &reqwest::Error, query: Option<&str>) -> UpstreamFailure {
    let (user_message, developer_info) = if err.is_timeout() {
        ("Timeout connecting to Sankhya API", "Connection timeout".to_string())
    } else if err.is_connect() {
        ("Could not connect to Sankhya API", "Connection refused".to_string())
    } else {
        ("Connection error", err.to_string())
    };
    UpstreamFailure::new(None, user_message, developer_info, query)
}

fn field_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
