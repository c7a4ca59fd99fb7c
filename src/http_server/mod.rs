//! # HBnB HTTP Server Module
//!
//! JSON REST API over the facade, served with axum.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/auth/*` - Login and token echo
//! - `/api/v1/users`, `/amenities`, `/places`, `/reviews` - Resources
//! - `/api/v1/admin/*` - Admin-only operations

pub mod config;
pub mod error;
pub mod extract;
pub mod server;
pub mod state;
pub mod admin_routes;
pub mod amenity_routes;
pub mod auth_routes;
pub mod health_routes;
pub mod place_routes;
pub mod review_routes;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use server::{build_router, HttpServer, API_PREFIX};
pub use state::AppState;
