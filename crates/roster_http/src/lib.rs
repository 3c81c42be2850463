//! HTTP surface for the roster service.
//!
//! # Responsibility
//! - Route resource URLs onto `roster_core` services.
//! - Map service results onto status codes and JSON bodies.
//!
//! # Invariants
//! - Each request runs as one synchronous unit of work against the store.
//! - Handlers never hold the store lock across an `.await`.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use state::AppState;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, patch};
use axum::Router;
use handlers::{groups, people};
use log::{error, info, warn};
use std::net::SocketAddr;
use std::time::Instant;

/// Builds the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::api_root))
        .route("/people/", get(people::list).post(people::create))
        .route(
            "/people/:id/",
            get(people::retrieve)
                .put(people::update)
                .patch(people::partial_update)
                .delete(people::destroy),
        )
        .route("/groups/", get(groups::list).post(groups::create))
        .route(
            "/groups/:id/",
            get(groups::retrieve)
                .put(groups::update)
                .patch(groups::partial_update)
                .delete(groups::destroy),
        )
        .route("/groups/:id/add_persons/", patch(groups::add_persons))
        .route("/groups/:id/remove_persons/", delete(groups::remove_persons))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=http_listen module=http status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=http_shutdown module=http status=error error={err}");
        return;
    }
    info!("event=http_shutdown module=http status=ok");
}

async fn log_requests(request: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let code = response.status();
    let duration_ms = started_at.elapsed().as_millis();
    if code.is_server_error() {
        error!(
            "event=http_request module=http status=error method={method} path={path} code={} duration_ms={duration_ms}",
            code.as_u16()
        );
    } else if code.is_client_error() {
        warn!(
            "event=http_request module=http status=rejected method={method} path={path} code={} duration_ms={duration_ms}",
            code.as_u16()
        );
    } else {
        info!(
            "event=http_request module=http status=ok method={method} path={path} code={} duration_ms={duration_ms}",
            code.as_u16()
        );
    }
    response
}
