//! hbnb - accommodation listings: users, places, amenities and reviews
//! behind a JWT-authenticated REST API.
//!
//! Layers, bottom up: `model` (validated entities), `repository`
//! (in-memory or checksummed file tables), `services` (the facade that
//! owns cross-entity rules), `auth` and `http_server` (the `/api/v1`
//! surface), `cli` (process entry).

pub mod auth;
pub mod cli;
pub mod http_server;
pub mod model;
pub mod observability;
pub mod repository;
pub mod services;
