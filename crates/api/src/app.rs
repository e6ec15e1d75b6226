use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{gift_records, health, statistics};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production: only allow specified origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Ledger routes (v1)
    let ledger_routes = Router::new()
        .route(
            "/api/v1/ledgers/:ledger_id/records",
            post(gift_records::create_gift_record).get(gift_records::list_gift_records),
        )
        .route(
            "/api/v1/ledgers/:ledger_id/records/:record_id",
            get(gift_records::get_gift_record)
                .put(gift_records::update_gift_record)
                .delete(gift_records::delete_gift_record),
        )
        .route(
            "/api/v1/ledgers/:ledger_id/records/:record_id/ack",
            patch(gift_records::update_ack_status),
        )
        .route(
            "/api/v1/ledgers/:ledger_id/statistics",
            get(statistics::get_full_statistics),
        )
        .route(
            "/api/v1/ledgers/:ledger_id/statistics/summary",
            get(statistics::get_summary_statistics),
        )
        .route(
            "/api/v1/ledgers/:ledger_id/statistics/recompute",
            post(statistics::recompute_statistics),
        );

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(ledger_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
