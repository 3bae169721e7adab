use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{RemoteTokenValidator, TokenValidator};
use crate::config::{AppConfig, SecurityConfig, StorageBackend};
use crate::database::{DatabaseManager, MemoryProgressStore, PgProgressStore, ProgressStore};
use crate::handlers;
use crate::middleware::auth_gate_middleware;

/// Long-lived clients shared read-only by every request
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<dyn TokenValidator>,
    pub store: Arc<dyn ProgressStore>,
}

impl AppState {
    pub fn new(validator: Arc<dyn TokenValidator>, store: Arc<dyn ProgressStore>) -> Self {
        Self { validator, store }
    }

    /// Build the validator client and the store once, at startup
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let validator = RemoteTokenValidator::from_config(&config.auth)?;

        let store: Arc<dyn ProgressStore> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory progress store; data is lost on restart");
                Arc::new(MemoryProgressStore::new())
            }
            StorageBackend::Postgres => {
                let pool = DatabaseManager::connect(&config.storage).await?;
                Arc::new(PgProgressStore::new(pool, &config.storage.table_name)?)
            }
        };

        Ok(Self::new(Arc::new(validator), store))
    }
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Protected API
        .merge(progress_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors_layer(&config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn progress_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/progress",
            get(handlers::progress_get).post(handlers::progress_post),
        )
        .route_layer(from_fn_with_state(state, auth_gate_middleware))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
    )
}
