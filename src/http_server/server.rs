//! # HTTP Server
//!
//! Combines the endpoint routers under `/api/v1` and serves them.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::admin_routes::admin_routes;
use super::amenity_routes::amenity_routes;
use super::auth_routes::auth_routes;
use super::config::HttpServerConfig;
use super::health_routes::health_routes;
use super::place_routes::place_routes;
use super::review_routes::review_routes;
use super::state::AppState;
use super::user_routes::user_routes;

/// API prefix
pub const API_PREFIX: &str = "/api/v1";

/// HTTP Server for the HBnB API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: AppState) -> Self {
        let router = build_router(&config, state);
        Self { config, router }
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process is stopped
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, prefix = API_PREFIX, "HBnB API listening");

        axum::serve(listener, self.router).await?;
        Ok(())
    }
}

fn cors_layer(config: &HttpServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the full application router
pub fn build_router(config: &HttpServerConfig, state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(amenity_routes())
        .merge(place_routes())
        .merge(review_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest(API_PREFIX, api)
        .merge(health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}
