use serde::Serialize;
use thiserror::Error;

use crate::auth::TokenError;

#[derive(Debug, Error)]
pub enum SankhyaError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("{0}")]
    TokenUnavailable(String),

    #[error("Invalid Sankhya client configuration: {0}")]
    Configuration(String),

    #[error("Unexpected response from Sankhya API: {0}")]
    InvalidResponse(String),

    #[error("{}", .0.full_message)]
    Upstream(UpstreamFailure),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Failure reported by (or while reaching) the upstream API, split into a
/// message fit for end users and details for developers.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamFailure {
    /// HTTP status, `None` when the request never got a response
    pub status: Option<u16>,
    pub user_message: String,
    pub developer_info: String,
    /// First 200 characters of the query, or `N/A`
    pub query: String,
    pub full_message: String,
}

impl UpstreamFailure {
    pub fn new(
        status: Option<u16>,
        user_message: impl Into<String>,
        developer_info: impl Into<String>,
        query: Option<&str>,
    ) -> Self {
        let user_message = user_message.into();
        let developer_info = developer_info.into();
        let query = query
            .map(|q| q.chars().take(200).collect::<String>())
            .unwrap_or_else(|| "N/A".to_string());
        let full_message = format!("{} | DEV: {} | QUERY: {}", user_message, developer_info, query);

        Self {
            status,
            user_message,
            developer_info,
            query,
            full_message,
        }
    }
}
