//! Startup wiring: storage adapter → service, plus the token issuer.

use std::sync::Arc;

use secrecy::ExposeSecret;

use pvz_auth::Hs256Jwt;
use pvz_infra::{PvzService, StorageError};

use crate::config::AppConfig;

/// Everything handlers need, built once at startup.
#[derive(Debug, Clone)]
pub struct AppServices {
    pub pvz: PvzService,
    pub jwt: Arc<Hs256Jwt>,
}

impl AppServices {
    pub fn new(pvz: PvzService, jwt: Arc<Hs256Jwt>) -> Self {
        Self { pvz, jwt }
    }
}

/// Connect the configured storage and wire the service over it.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StorageError> {
    let storage = pvz_infra::connect(&config.storage).await?;
    let jwt = Hs256Jwt::new(config.jwt_secret.expose_secret().as_bytes(), config.jwt_ttl);

    Ok(AppServices::new(PvzService::new(storage), Arc::new(jwt)))
}
