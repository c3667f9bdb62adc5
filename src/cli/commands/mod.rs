pub mod decode;
pub mod inspect;
pub mod login;
pub mod query;
pub mod validate;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::sankhya::{FallbackCredential, HttpUpstream, SankhyaGateway, TokenCache};

/// Gateway against the upstream configured in the environment.
pub(crate) fn gateway(config: &AppConfig) -> anyhow::Result<SankhyaGateway> {
    let upstream = HttpUpstream::from_config(&config.sankhya)?;
    let fallback = FallbackCredential::from_parts(
        config.sankhya.fallback_username.clone(),
        config.sankhya.fallback_password.clone(),
    );
    Ok(SankhyaGateway::new(
        Arc::new(upstream),
        TokenCache::new(config.token_cache.refresh_margin_secs),
        fallback,
    ))
}
