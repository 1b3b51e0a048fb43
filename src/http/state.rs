//! Application state for the HTTP server.

use crate::services::BeerService;
use std::sync::Arc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Catalog service backing every endpoint
    pub service: Arc<BeerService>,
}

impl AppState {
    /// Create a new application state with the given service.
    pub fn new(service: Arc<BeerService>) -> Self {
        Self { service }
    }
}
