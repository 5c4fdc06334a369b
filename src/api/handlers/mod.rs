//! REST endpoint handlers organized by resource.

pub mod alert;
pub mod dashboard;
pub mod device;
pub mod system;
pub mod user;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(device::routes())
        .merge(alert::routes())
        .merge(dashboard::routes())
        .merge(user::routes())
}
