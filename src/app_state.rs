//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::FleetService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Fleet service for all business logic.
    pub fleet_service: Arc<FleetService>,
}

impl AppState {
    /// Wraps a service for sharing across handlers.
    #[must_use]
    pub fn new(fleet_service: FleetService) -> Self {
        Self {
            fleet_service: Arc::new(fleet_service),
        }
    }
}
