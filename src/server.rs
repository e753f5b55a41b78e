// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! HTTP server for metrics and Kubernetes probes.
//!
//! - `/metrics` - Prometheus metrics in text format
//! - `/healthz` - liveness, always 200
//! - `/readyz` - readiness, 200 once every informer has completed its initial list

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::constants::METRICS_SERVER_PATH;
use crate::metrics::gather_metrics;
use crate::processor::SyncStatus;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Routes served by the controller.
pub fn router(sync_status: SyncStatus) -> Router {
    Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route("/healthz", get(healthz_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(sync_status)
}

/// Serve [`router`] on `addr` until the task is dropped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, sync_status: SyncStatus) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, path = METRICS_SERVER_PATH, "Metrics server listening");
    axum::serve(listener, router(sync_status)).await
}

async fn metrics_handler() -> impl IntoResponse {
    match gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            body,
        ),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {e}"),
            )
        }
    }
}

async fn healthz_handler() -> StatusCode {
    StatusCode::OK
}

async fn readyz_handler(State(sync_status): State<SyncStatus>) -> StatusCode {
    if sync_status.is_synced() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod server_tests;
