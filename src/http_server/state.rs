//! Shared handler state.

use std::sync::Arc;

use crate::auth::{AuthService, JwtConfig};
use crate::services::HbnbFacade;

/// Services handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub facade: Arc<HbnbFacade>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(facade: Arc<HbnbFacade>, jwt_config: JwtConfig) -> Self {
        let auth = Arc::new(AuthService::new(facade.clone(), jwt_config));
        Self { facade, auth }
    }
}
