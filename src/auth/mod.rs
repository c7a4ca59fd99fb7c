//! # HBnB Auth Module
//!
//! Password hashing, JWT access tokens and the per-request caller context.
//!
//! Tokens are stateless: the caller's id and admin flag are taken from the
//! verified claims, with no lookup per request.

pub mod errors;
pub mod crypto;
pub mod jwt;
pub mod context;
pub mod api;

pub use api::{AuthService, LoginRequest};
pub use context::{bearer_token, Caller};
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager, TokenResponse};
