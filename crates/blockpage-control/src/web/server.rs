//! Axum HTTP server for the reference layout backend

use axum::{
    extract::Request,
    http::{header, Method},
    middleware::{self, Next},
    response::Response,
};
use blockpage_core::BlockLayoutRecord;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use super::routes::{build_router, LayoutDb};
use crate::{error::StoreError, Result};

/// Layout server configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayoutServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for LayoutServerConfig {
    fn default() -> Self {
        Self {
            // Bind to localhost unless told otherwise
            host: "127.0.0.1".to_string(),
            port: 8080,
            enable_cors: true,
        }
    }
}

impl LayoutServerConfig {
    /// Create a config for a port (0 = any free port)
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the host address
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set CORS enabled/disabled
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }
}

/// In-memory layout service
pub struct LayoutServer {
    config: LayoutServerConfig,
    db: LayoutDb,
}

impl LayoutServer {
    /// Create a server with an empty record list
    pub fn new(config: LayoutServerConfig) -> Self {
        Self {
            config,
            db: LayoutDb::default(),
        }
    }

    /// Seed the record list
    pub fn with_records(mut self, records: Vec<BlockLayoutRecord>) -> Self {
        self.db = LayoutDb::with_records(records);
        self
    }

    /// Handle to the backing records
    pub fn db(&self) -> LayoutDb {
        self.db.clone()
    }

    fn app(&self) -> axum::Router {
        let app = build_router()
            .layer(middleware::from_fn(log_requests))
            .with_state(self.db.clone());

        if self.config.enable_cors {
            app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE])
                    .allow_origin(Any),
            )
        } else {
            app
        }
    }

    async fn bind(&self) -> Result<tokio::net::TcpListener> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| StoreError::Server(format!("Invalid address: {}", e)))?;

        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| StoreError::Server(format!("Failed to bind {}: {}", addr, e)))
    }

    /// Run the server until it fails
    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        tracing::info!(
            "Layout server listening on {}",
            listener
                .local_addr()
                .map_err(|e| StoreError::Server(e.to_string()))?
        );
        serve(listener, self.app()).await
    }

    /// Bind, then serve in a background task. Returns the bound address.
    pub async fn spawn(self) -> Result<(SocketAddr, JoinHandle<Result<()>>)> {
        let listener = self.bind().await?;
        let addr = listener
            .local_addr()
            .map_err(|e| StoreError::Server(e.to_string()))?;
        let app = self.app();
        tracing::info!("Layout server listening on {}", addr);
        Ok((addr, tokio::spawn(serve(listener, app))))
    }
}

async fn serve(listener: tokio::net::TcpListener, app: axum::Router) -> Result<()> {
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| StoreError::Server(format!("Server error: {}", e)))
}

/// Request logging middleware
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    tracing::debug!("{} {} -> {}", method, uri, response.status());
    response
}
