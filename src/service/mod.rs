//! Service layer: business logic orchestration.
//!
//! [`FleetService`] validates input, calls the shared
//! [`Storage`](crate::persistence::Storage) and maps its outcomes to
//! [`TrackerError`](crate::error::TrackerError). [`DashboardStats`] is the
//! read-side summary behind the dashboard landing page.

pub mod dashboard;
pub mod fleet_service;

pub use dashboard::DashboardStats;
pub use fleet_service::FleetService;
