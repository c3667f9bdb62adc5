use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::trim::trim_strings;
use super::validator::validate_query;
use super::{LoginResponse, SankhyaError, SankhyaUpstream, TokenCache};
use crate::auth::{decode_unverified, token_preview, Claims};

/// Upstream token and identity carried by one request.
#[derive(Debug, Clone, Default)]
pub struct SankhyaSession {
    pub user_id: Option<String>,
    pub token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl SankhyaSession {
    pub fn new(user_id: Option<String>, token: Option<String>, expiry: Option<DateTime<Utc>>) -> Self {
        Self { user_id, token, expiry }
    }

    /// Build a session from an upstream token by decoding its claims.
    pub fn from_token(token: &str) -> Result<Self, SankhyaError> {
        let claims = decode_unverified(token)?;
        Ok(Self::from_claims(token, &claims))
    }

    pub fn from_claims(token: &str, claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id(),
            token: Some(token.to_string()),
            expiry: claims.expiry(),
        }
    }

    /// Session for a known user with no token of its own; resolved from the cache.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    fn live_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.token, self.expiry) {
            (Some(token), Some(expiry)) if now < expiry => Some(token.as_str()),
            _ => None,
        }
    }
}

/// Credential used to re-login when a user's token runs out.
#[derive(Clone)]
pub struct FallbackCredential {
    pub username: String,
    password: String,
}

impl FallbackCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }
}

impl fmt::Debug for FallbackCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FallbackCredential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Single entry point for everything that talks to the upstream API.
///
/// Every statement is validated before it leaves the process, every call
/// carries a fresh token, and every response is whitespace-trimmed.
pub struct SankhyaGateway {
    upstream: Arc<dyn SankhyaUpstream>,
    cache: TokenCache,
    fallback: Option<FallbackCredential>,
    refresh_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    log_queries: bool,
}

impl SankhyaGateway {
    pub fn new(upstream: Arc<dyn SankhyaUpstream>, cache: TokenCache, fallback: Option<FallbackCredential>) -> Self {
        Self {
            upstream,
            cache,
            fallback,
            refresh_locks: Mutex::new(HashMap::new()),
            log_queries: false,
        }
    }

    pub fn with_query_logging(mut self, enabled: bool) -> Self {
        self.log_queries = enabled;
        self
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Log in upstream and cache the issued token under its owner.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<LoginResponse, SankhyaError> {
        let response = match self.upstream.login(username, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Sankhya login failed for {}: {}", username, e);
                return Err(SankhyaError::Authentication("Invalid credentials".to_string()));
            }
        };

        if let Err(e) = self.remember_token(&response.access_token).await {
            warn!("Login token for {} could not be decoded: {}", username, e);
        }
        info!("Sankhya login succeeded for {}", username);
        Ok(response)
    }

    /// Cache a request's own token so later calls for the same user can reuse it.
    pub async fn remember(&self, session: &SankhyaSession) {
        if let (Some(user), Some(token), Some(expiry)) = (&session.user_id, &session.token, session.expiry) {
            self.cache.set_token(user, token, expiry).await;
        }
    }

    async fn remember_token(&self, token: &str) -> Result<SankhyaSession, SankhyaError> {
        let session = SankhyaSession::from_token(token)?;
        self.remember(&session).await;
        Ok(session)
    }

    /// Resolve a usable upstream token for `session`.
    ///
    /// Order: the request's own unexpired token, then a cached token outside
    /// the refresh margin, then one re-login per user with the fallback
    /// credential. A cached token that is close to expiry but still valid is
    /// served when the re-login is impossible or fails.
    pub async fn valid_token(&self, session: &SankhyaSession) -> Result<String, SankhyaError> {
        if let Some(token) = session.live_token(Utc::now()) {
            return Ok(token.to_string());
        }

        let Some(user) = session.user_id.as_deref() else {
            return Err(SankhyaError::TokenUnavailable(
                "Sankhya token expired or not found. Please log in again.".to_string(),
            ));
        };

        if !self.cache.needs_refresh(user).await {
            if let Some(token) = self.cache.get_valid_token(user).await {
                return Ok(token);
            }
        }

        let lock = self.refresh_lock(user).await;
        let result = {
            let _guard = lock.lock().await;
            self.refresh_or_cached(user).await
        };
        self.release_refresh_lock(user, lock).await;
        result
    }

    async fn refresh_or_cached(&self, user: &str) -> Result<String, SankhyaError> {
        // someone else may have refreshed while we waited
        if !self.cache.needs_refresh(user).await {
            if let Some(token) = self.cache.get_valid_token(user).await {
                debug!("Token for user {} refreshed by a concurrent request", user);
                return Ok(token);
            }
        }

        match self.refresh(user).await {
            Ok(token) => Ok(token),
            Err(e) => {
                if let Some(token) = self.cache.get_valid_token(user).await {
                    warn!("Token refresh for user {} failed ({}), serving cached token", user, e);
                    return Ok(token);
                }
                Err(e)
            }
        }
    }

    async fn refresh_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut locks = self.refresh_locks.lock().await;
        locks.entry(user.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Forget a user's refresh lock once no other task holds or waits on it.
    async fn release_refresh_lock(&self, user: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.refresh_locks.lock().await;
        if let Some(current) = locks.get(user) {
            // one count for the map, one for `lock`
            if Arc::ptr_eq(current, &lock) && Arc::strong_count(&lock) == 2 {
                locks.remove(user);
            }
        }
    }

    /// Number of users with a refresh in flight.
    pub async fn pending_refreshes(&self) -> usize {
        self.refresh_locks.lock().await.len()
    }

    /// Drop expired cached tokens; run periodically by the server.
    pub async fn purge_expired_tokens(&self) -> usize {
        let removed = self.cache.purge_expired().await;
        if removed > 0 {
            debug!("Purged {} expired Sankhya tokens", removed);
        }
        removed
    }

    async fn refresh(&self, user: &str) -> Result<String, SankhyaError> {
        let Some(fallback) = &self.fallback else {
            return Err(SankhyaError::TokenUnavailable(
                "Sankhya token expired or not found. Please log in again.".to_string(),
            ));
        };

        info!("Refreshing Sankhya token for user {}", user);
        let response = self
            .upstream
            .login(&fallback.username, &fallback.password)
            .await
            .map_err(|e| {
                warn!("Token refresh for user {} failed: {}", user, e);
                SankhyaError::TokenUnavailable(
                    "Sankhya token expired and refresh failed. Please log in again.".to_string(),
                )
            })?;

        let token = response.access_token;
        let expiry = decode_unverified(&token)
            .ok()
            .and_then(|claims| claims.expiry())
            .unwrap_or_else(|| Utc::now() + Duration::seconds(response.expires_in as i64));
        self.cache.set_token(user, &token, expiry).await;
        info!("Token refreshed for user {} ({})", user, token_preview(&token));
        Ok(token)
    }

    /// Validate, authorize and run a read-only statement; rows come back trimmed.
    pub async fn execute_query(
        &self,
        session: &SankhyaSession,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Value>, SankhyaError> {
        validate_query(query)?;
        if self.log_queries {
            debug!("Executing query: {}", query.chars().take(100).collect::<String>());
        }

        let token = self.valid_token(session).await?;
        let rows = self.upstream.execute_query(&token, query, params).await?;
        Ok(rows.into_iter().map(trim_strings).collect())
    }

    pub async fn table_schema(&self, session: &SankhyaSession, table: &str) -> Result<Value, SankhyaError> {
        check_table_name(table)?;
        let token = self.valid_token(session).await?;
        Ok(trim_strings(self.upstream.table_schema(&token, table).await?))
    }

    pub async fn table_relations(&self, session: &SankhyaSession, table: &str) -> Result<Value, SankhyaError> {
        check_table_name(table)?;
        let token = self.valid_token(session).await?;
        Ok(trim_strings(self.upstream.table_relations(&token, table).await?))
    }

    pub async fn primary_keys(&self, session: &SankhyaSession, table: &str) -> Result<Value, SankhyaError> {
        check_table_name(table)?;
        let token = self.valid_token(session).await?;
        Ok(trim_strings(self.upstream.primary_keys(&token, table).await?))
    }
}

fn check_table_name(table: &str) -> Result<(), SankhyaError> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(SankhyaError::InvalidTableName(table.to_string()))
    }
}
