//! Persistence layer: the storage contract and its two backends.
//!
//! [`Storage`] is the single interface the service layer talks to. It
//! covers user lookup/creation, device and alert CRUD, and the audit trail.
//! Every successful device or alert mutation writes its audit entry inside
//! the same atomic unit as the entity write, so callers never observe one
//! without the other.
//!
//! Two interchangeable backends implement it:
//!
//! - [`MemStorage`] keeps keyed tables behind one async lock.
//! - [`PgStorage`] runs each mutation in a PostgreSQL transaction.
//!
//! The backend is chosen once at start-up by [`open`] and shared as an
//! `Arc<dyn Storage>` for the lifetime of the process.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;

use crate::config::{StorageBackend, TrackerConfig};
use crate::domain::{
    Alert, AlertPatch, AuditLog, Device, DevicePatch, NewAlert, NewAuditLog, NewDevice, NewUser,
    User,
};

pub use memory::MemStorage;
pub use postgres::PgStorage;

/// Unexpected persistence failure.
///
/// Business outcomes (missing rows, missing related device, taken
/// username) are never reported through this type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The database rejected or failed a statement.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying the schema failed at start-up.
    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt row in {table}: {reason}")]
    Corrupt {
        /// Table the row came from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Result of an alert create or update that passed the existence check on
/// the alert itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertWrite {
    /// The alert was written and audited.
    Saved(Alert),
    /// The referenced device does not exist; nothing was written.
    DeviceNotFound(i64),
}

/// Result of a user registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserWrite {
    /// The user was stored.
    Created(User),
    /// Another user already holds this username; nothing was written.
    UsernameTaken(String),
}

/// Storage facade shared by every backend.
///
/// Reads are side-effect free. Mutations accept the acting user as
/// `performed_by`; `None` or a blank name is recorded as `"system"`.
#[async_trait]
pub trait Storage: Send + Sync + fmt::Debug {
    /// Looks up a user by id.
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError>;

    /// Looks up a user by exact username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Stores a new user unless the username is taken. Not audited.
    async fn create_user(&self, user: NewUser) -> Result<UserWrite, StorageError>;

    /// Returns all devices, newest first.
    async fn list_devices(&self) -> Result<Vec<Device>, StorageError>;

    /// Looks up a device by id.
    async fn get_device(&self, id: i64) -> Result<Option<Device>, StorageError>;

    /// Stores a new device and audits `devices/create`.
    async fn create_device(
        &self,
        device: NewDevice,
        performed_by: Option<&str>,
    ) -> Result<Device, StorageError>;

    /// Merges `patch` onto an existing device and audits `devices/update`.
    /// Returns `None` if the device does not exist.
    async fn update_device(
        &self,
        id: i64,
        patch: DevicePatch,
        performed_by: Option<&str>,
    ) -> Result<Option<Device>, StorageError>;

    /// Deletes a device together with all of its alerts.
    ///
    /// Each cascaded alert is audited as `alerts/delete` before the device's
    /// own `devices/delete` entry. Returns `false` if the device does not
    /// exist.
    async fn delete_device(&self, id: i64, performed_by: Option<&str>)
    -> Result<bool, StorageError>;

    /// Returns all alerts, newest first.
    async fn list_alerts(&self) -> Result<Vec<Alert>, StorageError>;

    /// Returns the alerts of one device, newest first.
    async fn list_alerts_by_device(&self, device_id: i64) -> Result<Vec<Alert>, StorageError>;

    /// Looks up an alert by id.
    async fn get_alert(&self, id: i64) -> Result<Option<Alert>, StorageError>;

    /// Stores a new alert if its device exists and audits `alerts/create`.
    async fn create_alert(
        &self,
        alert: NewAlert,
        performed_by: Option<&str>,
    ) -> Result<AlertWrite, StorageError>;

    /// Merges `patch` onto an existing alert and audits `alerts/update`.
    ///
    /// Returns `None` if the alert does not exist, and
    /// [`AlertWrite::DeviceNotFound`] if the patch moves it to a device
    /// that does not exist.
    async fn update_alert(
        &self,
        id: i64,
        patch: AlertPatch,
        performed_by: Option<&str>,
    ) -> Result<Option<AlertWrite>, StorageError>;

    /// Deletes an alert and audits `alerts/delete`. Returns `false` if the
    /// alert does not exist.
    async fn delete_alert(&self, id: i64, performed_by: Option<&str>)
    -> Result<bool, StorageError>;

    /// Returns every audit entry in the order it was written.
    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, StorageError>;

    /// Appends one audit entry.
    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, StorageError>;
}

/// Opens the backend selected by `config`.
///
/// For PostgreSQL this connects the pool and applies the bundled schema
/// migrations before returning.
///
/// # Errors
///
/// Returns a [`StorageError`] if the database is unreachable or the schema
/// cannot be applied.
pub async fn open(config: &TrackerConfig) -> Result<Arc<dyn Storage>, StorageError> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Ok(Arc::new(MemStorage::new()))
        }
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .min_connections(config.database_min_connections)
                .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
                .connect(&config.database_url)
                .await?;
            let storage = PgStorage::new(pool);
            storage.migrate().await?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "using postgres storage"
            );
            Ok(Arc::new(storage))
        }
    }
}
