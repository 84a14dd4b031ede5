use axum::{
    extract::State,
    http::{header, Method, Request},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use hyper::Server;
use std::net::{SocketAddr, TcpListener};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::metrics;

/// Health check endpoint
async fn health(State(app): State<&'static str>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": app,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
}

/// Logs every request and feeds the request counters.
async fn track_requests<B>(
    State(app): State<&'static str>,
    req: Request<B>,
    next: Next<B>,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        warn!(app, %method, %path, status = status.as_u16(), ?elapsed, "request failed");
    } else {
        info!(app, %method, %path, status = status.as_u16(), ?elapsed, "request");
    }
    metrics::record_request(app, method.as_str(), status.as_u16(), elapsed);
    response
}

/// Permissive CORS: any origin, the methods the browser clients use.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Add the routes and middleware both apps share.
pub fn with_service_routes(router: Router, app: &'static str) -> Router {
    let service_routes = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .with_state(app);

    router
        .merge(service_routes)
        .layer(middleware::from_fn_with_state(app, track_requests))
}

/// Start the HTTP server on the specified address; returns after Ctrl-C.
pub async fn start_server(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    info!("HTTP server running on http://{addr}");
    info!("Health check: http://{addr}/health");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

/// Serve on an already bound listener. Tests bind port 0 and read the address back.
pub async fn serve_listener(app: Router, listener: TcpListener) -> anyhow::Result<()> {
    Server::from_tcp(listener)?
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
