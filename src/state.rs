use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::catalog::TableService;
use crate::config::AppConfig;
use crate::middleware::RateLimiter;
use crate::sankhya::{
    FallbackCredential, HttpUpstream, SankhyaError, SankhyaGateway, SankhyaUpstream, TableInspector, TokenCache,
};

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<SankhyaGateway>,
    pub inspector: Arc<TableInspector>,
    pub tables: TableService,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub started_at: Instant,
}

impl AppState {
    /// State wired to the live Sankhya API described by `config`.
    pub fn new(config: &AppConfig) -> Result<Self, SankhyaError> {
        let upstream = HttpUpstream::from_config(&config.sankhya)?;
        Ok(Self::with_upstream(config, Arc::new(upstream)))
    }

    pub fn with_upstream(config: &AppConfig, upstream: Arc<dyn SankhyaUpstream>) -> Self {
        let fallback = FallbackCredential::from_parts(
            config.sankhya.fallback_username.clone(),
            config.sankhya.fallback_password.clone(),
        );

        let gateway = Arc::new(
            SankhyaGateway::new(upstream, TokenCache::new(config.token_cache.refresh_margin_secs), fallback)
                .with_query_logging(config.query.log_queries),
        );
        let inspector = Arc::new(TableInspector::new(gateway.clone(), config.inspection.cache_ttl_secs));
        let tables = TableService::new(gateway.clone(), config.query.default_per_page, config.query.max_per_page);

        let rate_limiter = config.api.enable_rate_limiting.then(|| {
            Arc::new(RateLimiter::new(
                config.api.rate_limit_requests,
                Duration::from_secs(config.api.rate_limit_window_secs),
            ))
        });

        Self {
            config: Arc::new(config.clone()),
            gateway,
            inspector,
            tables,
            rate_limiter,
            started_at: Instant::now(),
        }
    }
}
