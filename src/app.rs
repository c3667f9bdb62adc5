use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers;
use crate::middleware::{rate_limit_middleware, token_auth_middleware};
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(auth_public_routes())
        // Protected (token guard)
        .merge(
            Router::new()
                .merge(auth_routes())
                .merge(inspection_routes())
                .merge(table_routes())
                .route_layer(middleware::from_fn_with_state(state.clone(), token_auth_middleware)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}

fn auth_public_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
}

fn auth_routes() -> Router<AppState> {
    use handlers::protected::auth;

    Router::new().route("/auth/me", get(auth::me))
}

fn inspection_routes() -> Router<AppState> {
    use handlers::protected::inspection;

    Router::new()
        .route("/inspection/table-schema", get(inspection::table_schema))
        .route("/inspection/table-relations", get(inspection::table_relations))
        .route("/inspection/primary-keys/:table_name", get(inspection::primary_keys))
        .route("/inspection/query", post(inspection::query))
        .route(
            "/inspection/table-info/:table_name",
            get(inspection::table_info).delete(inspection::invalidate_table_info),
        )
        .route("/inspection/table-info/:table_name/module", get(inspection::module_info))
}

fn table_routes() -> Router<AppState> {
    use handlers::protected::tables;

    Router::new()
        .route("/sankhya/tables", get(tables::catalog))
        .route("/sankhya/:route", get(tables::list))
        .route("/sankhya/:route/admin/test", get(tables::probe))
        .route("/sankhya/:route/:id", get(tables::find_by_id))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::sankhya::{LoginResponse, SankhyaError, SankhyaUpstream};

    struct Offline;

    #[async_trait]
    impl SankhyaUpstream for Offline {
        async fn login(&self, _: &str, _: &str) -> Result<LoginResponse, SankhyaError> {
            Err(SankhyaError::Configuration("offline".into()))
        }
        async fn execute_query(&self, _: &str, _: &str, _: &[Value]) -> Result<Vec<Value>, SankhyaError> {
            Err(SankhyaError::Configuration("offline".into()))
        }
        async fn table_schema(&self, _: &str, _: &str) -> Result<Value, SankhyaError> {
            Err(SankhyaError::Configuration("offline".into()))
        }
        async fn table_relations(&self, _: &str, _: &str) -> Result<Value, SankhyaError> {
            Err(SankhyaError::Configuration("offline".into()))
        }
        async fn primary_keys(&self, _: &str, _: &str) -> Result<Value, SankhyaError> {
            Err(SankhyaError::Configuration("offline".into()))
        }
    }

    fn router() -> Router {
        let mut config = AppConfig::for_environment(Environment::Development);
        config.api.enable_request_logging = false;
        app(AppState::with_upstream(&config, Arc::new(Offline)))
    }

    async fn call(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn root_is_public() {
        let (status, body) = call("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Sankhya Center API");
    }

    #[tokio::test]
    async fn table_routes_require_a_token() {
        for uri in ["/sankhya/tables", "/sankhya/tgfpro", "/sankhya/tgfpro/1", "/inspection/primary-keys/TGFPRO"] {
            let (status, body) = call(uri).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
            assert_eq!(body["reason"], "AUTH_HEADER_MISSING_OR_INVALID");
        }
    }

    #[tokio::test]
    async fn unknown_paths_are_404() {
        let (status, _) = call("/api/data/users").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
