//! Application state.

use std::sync::Arc;

use jobgrid_engine::Pipeline;
use jobgrid_store::{MemoryStore, Store};

use crate::auth::{GoogleVerifier, TokenIssuer};
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn Store>,
    pub pipeline: Pipeline,
    pub tokens: Arc<TokenIssuer>,
    /// Present only when a Google client id is configured.
    pub google: Option<Arc<GoogleVerifier>>,
}

impl AppState {
    /// Create application state over the bundled in-memory store.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create application state over an explicit store, used by tests.
    pub fn with_store(config: ApiConfig, store: Arc<dyn Store>) -> Result<Self, ApiError> {
        let tokens = Arc::new(TokenIssuer::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        ));
        let google = match &config.google_client_id {
            Some(client_id) => Some(Arc::new(GoogleVerifier::new(client_id.clone())?)),
            None => None,
        };
        let pipeline = Pipeline::new(Arc::clone(&store));

        Ok(Self {
            config,
            store,
            pipeline,
            tokens,
            google,
        })
    }
}
