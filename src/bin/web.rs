//! Bloom HTTP 入口
//!
//! 启动: cargo run --bin bloom-web --features web
//! - POST /api/analyze：请求体为分析请求 JSON，返回成功 / 失败信封
//! - GET  /api/health ：各档位可用性与整体健康度

#![cfg(feature = "web")]

use std::sync::Arc;

use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::{header::HeaderName, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::limit::ConcurrencyLimitLayer;

use bloom::config::{load_config, AppConfig};
use bloom::core::{OrchestratorBuilder, RenderedResponse, ReportOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bloom::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let bind = cfg.server.bind.clone();
    let max_concurrency = cfg.server.max_concurrency.max(1);
    let orchestrator = Arc::new(OrchestratorBuilder::new(cfg).build());

    let app = Router::new()
        .route("/api/analyze", post(api_analyze))
        .route("/api/health", get(api_health))
        .layer(ConcurrencyLimitLayer::new(max_concurrency))
        .with_state(orchestrator);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!("Bloom API: http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

/// POST /api/analyze
async fn api_analyze(State(orchestrator): State<Arc<ReportOrchestrator>>, body: String) -> Response {
    into_response(orchestrator.respond_json(&body).await)
}

/// GET /api/health
async fn api_health(State(orchestrator): State<Arc<ReportOrchestrator>>) -> Response {
    into_response(orchestrator.health_response())
}

fn into_response(rendered: RenderedResponse) -> Response {
    let headers = rendered.headers();
    let mut res = Response::new(Body::from(rendered.body));
    *res.status_mut() =
        StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            res.headers_mut().insert(HeaderName::from_static(name), value);
        }
    }
    res
}
