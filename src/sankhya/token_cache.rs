use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Token stored for a user together with its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct CachedToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl CachedToken {
    pub fn seconds_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry - now).num_seconds()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }
}

/// Per-user cache of upstream-issued tokens.
///
/// Entries live until their JWT expiry. Tokens inside the refresh margin are
/// still served; callers decide when to re-login via [`TokenCache::needs_refresh`].
#[derive(Clone)]
pub struct TokenCache {
    entries: Arc<RwLock<HashMap<String, CachedToken>>>,
    refresh_margin: Duration,
}

impl TokenCache {
    pub fn new(refresh_margin_secs: i64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            refresh_margin: Duration::seconds(refresh_margin_secs.max(0)),
        }
    }

    fn cache_key(user_id: &str) -> String {
        format!("sankhya_token_{}", user_id)
    }

    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }

    pub async fn set_token(&self, user_id: &str, token: &str, expiry: DateTime<Utc>) {
        self.set_token_at(user_id, token, expiry, Utc::now()).await
    }

    pub(crate) async fn set_token_at(&self, user_id: &str, token: &str, expiry: DateTime<Utc>, now: DateTime<Utc>) {
        let ttl = (expiry - now).num_milliseconds().max(0);
        if ttl == 0 {
            debug!("Skipping cache of already expired token for user {}", user_id);
            return;
        }

        let mut entries = self.entries.write().await;
        entries.insert(
            Self::cache_key(user_id),
            CachedToken {
                token: token.to_string(),
                expiry,
            },
        );
        info!("Token cached for user {} (ttl: {}ms)", user_id, ttl);
    }

    pub async fn get_valid_token(&self, user_id: &str) -> Option<String> {
        self.get_valid_token_at(user_id, Utc::now()).await
    }

    pub(crate) async fn get_valid_token_at(&self, user_id: &str, now: DateTime<Utc>) -> Option<String> {
        let key = Self::cache_key(user_id);

        let cached = {
            let entries = self.entries.read().await;
            entries.get(&key).cloned()
        };

        let Some(cached) = cached else {
            debug!("No cached token for user {}", user_id);
            return None;
        };

        if cached.is_expired(now) {
            warn!("Token expired for user {}, evicting", user_id);
            let mut entries = self.entries.write().await;
            // another writer may have stored a fresh token meanwhile
            if entries.get(&key).map(|e| e.is_expired(now)).unwrap_or(false) {
                entries.remove(&key);
            }
            return None;
        }

        let left = cached.seconds_left(now);
        if cached.expiry - now <= self.refresh_margin {
            warn!("Token for user {} is about to expire ({}s left)", user_id, left);
        }
        debug!("Valid token returned for user {} (expires in {}s)", user_id, left);

        Some(cached.token)
    }

    pub async fn remove_token(&self, user_id: &str) {
        let mut entries = self.entries.write().await;
        if entries.remove(&Self::cache_key(user_id)).is_some() {
            info!("Token removed from cache for user {}", user_id);
        }
    }

    pub async fn token_info(&self, user_id: &str) -> Option<CachedToken> {
        let entries = self.entries.read().await;
        entries.get(&Self::cache_key(user_id)).cloned()
    }

    /// True when there is no usable token or it expires within the margin.
    pub async fn needs_refresh(&self, user_id: &str) -> bool {
        self.needs_refresh_at(user_id, Utc::now()).await
    }

    pub(crate) async fn needs_refresh_at(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        match self.token_info(user_id).await {
            Some(cached) if !cached.is_expired(now) => cached.expiry - now <= self.refresh_margin,
            _ => true,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| !cached.is_expired(now));
        before - entries.len()
    }
}
