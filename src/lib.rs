//! # fleet-tracker
//!
//! REST service that tracks a fleet of devices, the alerts raised against
//! them and an append-only audit trail of every change.
//!
//! Every device or alert mutation is written together with its audit
//! entry. Deleting a device cascades to its alerts, and each cascaded
//! alert delete is audited on its own.
//!
//! ## Architecture
//!
//! ```text
//! Clients (dashboard, HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── FleetService (service/)
//!     │
//!     ├── Storage trait (persistence/)
//!     │     ├── MemStorage
//!     │     └── PgStorage ── PostgreSQL
//!     │
//!     └── Entity model (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
