//! Domain layer: entity model for devices, alerts, users and the audit trail.
//!
//! Each entity comes with its insertable projection (the fields a caller
//! may supply) and, where updates exist, a patch type with all fields
//! optional. Ids and server-side timestamps are never caller-supplied.

pub mod alert;
pub mod audit_log;
pub mod device;
pub mod user;
pub mod validation;

pub use alert::{Alert, AlertPatch, AlertType, NewAlert};
pub use audit_log::{AuditAction, AuditLog, NewAuditLog};
pub use device::{Device, DevicePatch, DeviceStatus, NewDevice};
pub use user::{Credentials, NewUser, User};
pub use validation::ValidationError;
