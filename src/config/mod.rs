use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

/// Upstream used when `SANKHYA_API_BASE_URL` is not set.
pub const DEFAULT_SANKHYA_BASE_URL: &str = "https://api-nestjs-sankhya-read-producao.gigantao.net";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub sankhya: SankhyaConfig,
    pub token_cache: TokenCacheConfig,
    pub inspection: InspectionConfig,
    pub query: QueryConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankhyaConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Credential used to re-login when a user's token has expired.
    /// Refresh is disabled when either half is missing.
    pub fallback_username: Option<String>,
    #[serde(skip_serializing)]
    pub fallback_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCacheConfig {
    pub refresh_margin_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionConfig {
    pub cache_ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_per_page: u32,
    pub max_per_page: u32,
    pub log_queries: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,
    pub enable_request_logging: bool,
    /// Key rate limits on `X-Forwarded-For`; only safe behind a trusted proxy
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub min_token_length: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        Self::for_environment(environment).with_env_overrides()
    }

    /// Defaults for an environment, without reading any override variables.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("SANKHYA_CENTER_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SANKHYA_CENTER_HOST") {
            self.server.host = v;
        }

        // Upstream overrides
        if let Ok(v) = env::var("SANKHYA_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.sankhya.base_url = v.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(v) = env::var("SANKHYA_REQUEST_TIMEOUT_SECS") {
            self.sankhya.request_timeout_secs = v.parse().unwrap_or(self.sankhya.request_timeout_secs);
        }
        if let Ok(v) = env::var("SANKHYA_FALLBACK_USERNAME") {
            self.sankhya.fallback_username = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SANKHYA_FALLBACK_PASSWORD") {
            self.sankhya.fallback_password = Some(v).filter(|s| !s.is_empty());
        }

        // Cache overrides
        if let Ok(v) = env::var("TOKEN_REFRESH_MARGIN_SECS") {
            self.token_cache.refresh_margin_secs = v.parse().unwrap_or(self.token_cache.refresh_margin_secs);
        }
        if let Ok(v) = env::var("INSPECTION_CACHE_TTL_SECS") {
            self.inspection.cache_ttl_secs = v.parse().unwrap_or(self.inspection.cache_ttl_secs);
        }

        // Query overrides
        if let Ok(v) = env::var("QUERY_DEFAULT_PER_PAGE") {
            self.query.default_per_page = v.parse().unwrap_or(self.query.default_per_page);
        }
        if let Ok(v) = env::var("QUERY_MAX_PER_PAGE") {
            self.query.max_per_page = v.parse().unwrap_or(self.query.max_per_page);
        }
        if let Ok(v) = env::var("QUERY_LOG_QUERIES") {
            self.query.log_queries = v.parse().unwrap_or(self.query.log_queries);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_REQUESTS") {
            self.api.rate_limit_requests = v.parse().unwrap_or(self.api.rate_limit_requests);
        }
        if let Ok(v) = env::var("API_RATE_LIMIT_WINDOW_SECS") {
            self.api.rate_limit_window_secs = v.parse().unwrap_or(self.api.rate_limit_window_secs);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_TRUST_FORWARDED_FOR") {
            self.api.trust_forwarded_for = v.parse().unwrap_or(self.api.trust_forwarded_for);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECURITY_MIN_TOKEN_LENGTH") {
            self.security.min_token_length = v.parse().unwrap_or(self.security.min_token_length);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            sankhya: SankhyaConfig {
                base_url: DEFAULT_SANKHYA_BASE_URL.to_string(),
                request_timeout_secs: 60,
                fallback_username: None,
                fallback_password: None,
            },
            token_cache: TokenCacheConfig {
                refresh_margin_secs: 5 * 60,
            },
            inspection: InspectionConfig {
                cache_ttl_secs: 24 * 60 * 60,
            },
            query: QueryConfig {
                default_per_page: 10,
                max_per_page: 500,
                log_queries: true,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                rate_limit_requests: 1000,
                rate_limit_window_secs: 60,
                enable_request_logging: true,
                trust_forwarded_for: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                // empty list means any origin
                cors_origins: vec![],
                min_token_length: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            sankhya: SankhyaConfig {
                base_url: DEFAULT_SANKHYA_BASE_URL.to_string(),
                request_timeout_secs: 30,
                fallback_username: None,
                fallback_password: None,
            },
            token_cache: TokenCacheConfig {
                refresh_margin_secs: 5 * 60,
            },
            inspection: InspectionConfig {
                cache_ttl_secs: 24 * 60 * 60,
            },
            query: QueryConfig {
                default_per_page: 10,
                max_per_page: 200,
                log_queries: true,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 60,
                enable_request_logging: true,
                trust_forwarded_for: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
                min_token_length: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            sankhya: SankhyaConfig {
                base_url: DEFAULT_SANKHYA_BASE_URL.to_string(),
                request_timeout_secs: 30,
                fallback_username: None,
                fallback_password: None,
            },
            token_cache: TokenCacheConfig {
                refresh_margin_secs: 5 * 60,
            },
            inspection: InspectionConfig {
                cache_ttl_secs: 24 * 60 * 60,
            },
            query: QueryConfig {
                default_per_page: 10,
                max_per_page: 100,
                log_queries: false,
            },
            api: ApiConfig {
                enable_rate_limiting: true,
                rate_limit_requests: 100,
                rate_limit_window_secs: 60,
                enable_request_logging: false,
                trust_forwarded_for: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec![],
                min_token_length: 10,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
