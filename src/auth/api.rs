//! # Auth Service
//!
//! Login and token-to-caller resolution on top of the facade's user store.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::context::{bearer_token, Caller};
use super::crypto::verify_dummy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager, TokenResponse};
use crate::services::HbnbFacade;

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Auth service combining the user store and token issuing
pub struct AuthService {
    facade: Arc<HbnbFacade>,
    jwt_manager: JwtManager,
}

impl AuthService {
    pub fn new(facade: Arc<HbnbFacade>, jwt_config: JwtConfig) -> Self {
        Self {
            facade,
            jwt_manager: JwtManager::new(jwt_config),
        }
    }

    /// Authenticate a user and issue an access token.
    ///
    /// Unknown email and wrong password fail identically.
    pub fn login(&self, request: &LoginRequest) -> AuthResult<TokenResponse> {
        let user = self
            .facade
            .get_user_by_email(&request.email)
            .map_err(|e| AuthError::StorageError(e.to_string()))?;

        let Some(user) = user else {
            verify_dummy(&request.password);
            warn!("login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !user.verify_password(&request.password) {
            warn!(user_id = %user.record.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self
            .jwt_manager
            .generate_access_token(user.record.id, user.is_admin)?;
        info!(user_id = %user.record.id, is_admin = user.is_admin, "login succeeded");

        Ok(TokenResponse::bearer(
            access_token,
            self.jwt_manager.expires_in(),
        ))
    }

    /// Resolve a raw access token into a caller
    pub fn caller_from_token(&self, token: &str) -> AuthResult<Caller> {
        let claims = self.jwt_manager.validate_token(token)?;
        let subject_id = JwtManager::get_user_id(&claims)?;
        Ok(Caller::new(subject_id, claims.is_admin))
    }

    /// Resolve the caller from request headers
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<Caller> {
        self.caller_from_token(bearer_token(headers)?)
    }

    /// Resolve the caller and require the admin flag
    pub fn authenticate_admin(&self, headers: &HeaderMap) -> AuthResult<Caller> {
        let caller = self.authenticate(headers)?;
        caller.require_admin()?;
        Ok(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StorageConfig;
    use crate::services::CreateUser;
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    fn service() -> (AuthService, Arc<HbnbFacade>) {
        let facade = Arc::new(HbnbFacade::new(&StorageConfig::Memory).unwrap());
        facade
            .create_user(CreateUser {
                first_name: "Ada".to_string(),
                last_name: "Admin".to_string(),
                email: "admin@hbnb.io".to_string(),
                password: "admin1234".to_string(),
                is_admin: true,
            })
            .unwrap();
        (AuthService::new(facade.clone(), JwtConfig::default()), facade)
    }

    fn login(service: &AuthService, email: &str, password: &str) -> AuthResult<TokenResponse> {
        service.login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    #[test]
    fn test_login_issues_admin_token() {
        let (service, facade) = service();
        let tokens = login(&service, "admin@hbnb.io", "admin1234").unwrap();
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, 3600);

        let caller = service.caller_from_token(&tokens.access_token).unwrap();
        let admin = facade.get_user_by_email("admin@hbnb.io").unwrap().unwrap();
        assert_eq!(caller.subject_id, admin.record.id);
        assert!(caller.is_admin);
    }

    #[test]
    fn test_login_failures_are_indistinguishable() {
        let (service, _) = service();
        assert_eq!(
            login(&service, "admin@hbnb.io", "wrong"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            login(&service, "nobody@hbnb.io", "admin1234"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_authenticate_from_headers() {
        let (service, _) = service();
        let tokens = login(&service, "admin@hbnb.io", "admin1234").unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(
            service.authenticate(&headers),
            Err(AuthError::AuthenticationRequired)
        );

        let value = HeaderValue::from_str(&format!("Bearer {}", tokens.access_token)).unwrap();
        headers.insert(AUTHORIZATION, value);
        assert!(service.authenticate_admin(&headers).is_ok());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert_eq!(service.authenticate(&headers), Err(AuthError::MalformedToken));
    }
}
