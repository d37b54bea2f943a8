//! HTTP API server for the RPC explorer

mod endpoints;
mod error;
mod index;
pub mod rate_limit;

use std::sync::Arc;

use axum::{Router, http::Uri, routing::get};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::catalog::Catalog;
use crate::rpc::CommandInterface;

pub use endpoints::{
    FALLBACK_MODE_FLAG, FALLBACK_ONLY, endpoint_path, handle, resolve, uses_structured_call,
};
pub use error::ApiError;
pub use index::{BlockRow, list_blocks, render_blocks};

/// Shared state for API handlers
///
/// Built once before serving and never mutated afterwards.
#[derive(Clone)]
pub struct GatewayState {
    /// Command interface handed to each handler
    pub rpc: Arc<dyn CommandInterface>,
    /// Commands exposed as endpoints
    pub catalog: Arc<Catalog>,
    pub rate_limiter: Option<rate_limit::GatewayLimiter>,
}

impl GatewayState {
    #[must_use]
    pub fn new(rpc: Arc<dyn CommandInterface>, catalog: Catalog) -> Self {
        Self {
            rpc,
            catalog: Arc::new(catalog),
            rate_limiter: None,
        }
    }
}

/// Build the router: one route per cataloged command, `/`, and a 404 fallback
pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .merge(endpoints::router(&state.catalog))
        .route("/", get(index::index))
        .fallback(unknown_endpoint)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .with_state(state)
}

async fn unknown_endpoint(uri: Uri) -> ApiError {
    tracing::debug!(path = %uri.path(), "unknown endpoint");
    ApiError::UnknownEndpoint(uri.path().to_string())
}

/// Configuration for building an API server
pub struct ApiServerBuilder {
    rpc: Arc<dyn CommandInterface>,
    catalog: Catalog,
    host: String,
    port: u16,
    rate_limit_per_minute: Option<u32>,
}

impl ApiServerBuilder {
    /// Create a new API server builder
    #[must_use]
    pub fn new(rpc: Arc<dyn CommandInterface>, catalog: Catalog) -> Self {
        Self {
            rpc,
            catalog,
            host: "127.0.0.1".to_string(),
            port: 5000,
            rate_limit_per_minute: None,
        }
    }

    /// Set the address to bind
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port to listen on
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Enable global rate limiting
    #[must_use]
    pub const fn rate_limit(mut self, requests_per_minute: Option<u32>) -> Self {
        self.rate_limit_per_minute = requests_per_minute;
        self
    }

    /// Build the API server
    #[must_use]
    pub fn build(self) -> ApiServer {
        let mut state = GatewayState::new(self.rpc, self.catalog);
        state.rate_limiter = self.rate_limit_per_minute.map(rate_limit::limiter_per_minute);

        ApiServer {
            state: Arc::new(state),
            host: self.host,
            port: self.port,
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<GatewayState>,
    host: String,
    port: u16,
}

impl ApiServer {
    /// Build the router with all routes and layers
    fn router(&self) -> Router {
        // CORS layer for cross-origin requests from browser tooling
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if server fails to bind or run
    pub async fn run(self) -> Result<()> {
        if self.state.rate_limiter.is_some() {
            tracing::info!("rate limiting active");
        }

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server on {addr}: {e}")))?;

        tracing::info!(
            addr = %addr,
            endpoints = self.state.catalog.len(),
            "API server listening"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
