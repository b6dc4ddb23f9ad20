//! Lending client
//!
//! Client-side session and request orchestration for a library-lending REST
//! API: authentication, credential persistence, typed REST calls and the
//! borrow/return workflow with confirmation and post-transaction refresh.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{ApiError, AppResult};

use api::{ApiGateway, ReqwestTransport, Transport};
use credentials::{CredentialStore, FileCredentialStore};
use services::Services;

/// Process-wide client context handed to presentation collaborators
#[derive(Clone)]
pub struct LendingClient {
    pub config: Arc<AppConfig>,
    pub services: Arc<Services>,
}

impl LendingClient {
    /// Build the production client: reqwest transport and file credential store
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config.api.timeout())?;
        let credentials = FileCredentialStore::new(config.credentials.path.clone());
        Self::with_parts(config, Arc::new(transport), Arc::new(credentials))
    }

    /// Build a client around any transport and credential store.
    ///
    /// The session is bootstrapped from the store before returning.
    pub fn with_parts(
        config: AppConfig,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
    ) -> AppResult<Self> {
        let gateway = ApiGateway::new(&config.api.base_url, transport, credentials.clone())?;
        let services = Services::new(gateway, credentials);
        services.session.bootstrap();

        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
