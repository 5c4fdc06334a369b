//! Fleet service: the operations the HTTP layer calls.

use std::sync::Arc;

use chrono::Utc;

use super::dashboard::DashboardStats;
use crate::domain::{
    Alert, AlertPatch, AuditLog, Credentials, Device, DevicePatch, NewAlert, NewDevice, NewUser,
    User,
};
use crate::error::TrackerError;
use crate::persistence::{AlertWrite, Storage, UserWrite};

/// Orchestration layer over the shared [`Storage`].
///
/// Validates input, turns storage outcomes (absent rows, missing related
/// device, taken username) into [`TrackerError`] variants and logs every
/// mutation. Audit entries are written by the storage itself.
#[derive(Debug, Clone)]
pub struct FleetService {
    storage: Arc<dyn Storage>,
    password_cost: u32,
}

impl FleetService {
    /// Creates a service hashing new passwords with bcrypt `password_cost`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, password_cost: u32) -> Self {
        Self {
            storage,
            password_cost,
        }
    }

    /// Lists all devices, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] on storage failure.
    pub async fn list_devices(&self) -> Result<Vec<Device>, TrackerError> {
        let devices = self.storage.list_devices().await?;
        tracing::debug!(count = devices.len(), "listed devices");
        Ok(devices)
    }

    /// Fetches one device.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DeviceNotFound`] if no device has `id`.
    pub async fn get_device(&self, id: i64) -> Result<Device, TrackerError> {
        tracing::debug!(device_id = id, "loading device");
        self.storage
            .get_device(id)
            .await?
            .ok_or(TrackerError::DeviceNotFound(id))
    }

    /// Validates and stores a new device.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for a blank field.
    pub async fn create_device(
        &self,
        device: NewDevice,
        performed_by: Option<&str>,
    ) -> Result<Device, TrackerError> {
        device.validate()?;
        let created = self.storage.create_device(device, performed_by).await?;
        tracing::info!(device_id = created.id, status = %created.status, "device created");
        Ok(created)
    }

    /// Validates and applies a partial device update.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for an empty patch or blank
    /// field, [`TrackerError::DeviceNotFound`] if no device has `id`.
    pub async fn update_device(
        &self,
        id: i64,
        patch: DevicePatch,
        performed_by: Option<&str>,
    ) -> Result<Device, TrackerError> {
        patch.validate()?;
        let Some(updated) = self.storage.update_device(id, patch, performed_by).await? else {
            tracing::warn!(device_id = id, "update of unknown device");
            return Err(TrackerError::DeviceNotFound(id));
        };
        tracing::info!(device_id = id, "device updated");
        Ok(updated)
    }

    /// Deletes a device and every alert that references it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::DeviceNotFound`] if no device has `id`.
    pub async fn delete_device(
        &self,
        id: i64,
        performed_by: Option<&str>,
    ) -> Result<(), TrackerError> {
        if !self.storage.delete_device(id, performed_by).await? {
            tracing::warn!(device_id = id, "delete of unknown device");
            return Err(TrackerError::DeviceNotFound(id));
        }
        tracing::info!(device_id = id, "device deleted");
        Ok(())
    }

    /// Lists alerts newest first, optionally only those of one device.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] on storage failure.
    pub async fn list_alerts(&self, device_id: Option<i64>) -> Result<Vec<Alert>, TrackerError> {
        let alerts = match device_id {
            Some(device_id) => self.storage.list_alerts_by_device(device_id).await?,
            None => self.storage.list_alerts().await?,
        };
        tracing::debug!(?device_id, count = alerts.len(), "listed alerts");
        Ok(alerts)
    }

    /// Fetches one alert.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AlertNotFound`] if no alert has `id`.
    pub async fn get_alert(&self, id: i64) -> Result<Alert, TrackerError> {
        tracing::debug!(alert_id = id, "loading alert");
        self.storage
            .get_alert(id)
            .await?
            .ok_or(TrackerError::AlertNotFound(id))
    }

    /// Validates and stores a new alert against an existing device.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for a short message and
    /// [`TrackerError::RelatedDeviceNotFound`] if the device is missing.
    pub async fn create_alert(
        &self,
        alert: NewAlert,
        performed_by: Option<&str>,
    ) -> Result<Alert, TrackerError> {
        alert.validate()?;
        match self.storage.create_alert(alert, performed_by).await? {
            AlertWrite::Saved(created) => {
                tracing::info!(
                    alert_id = created.id,
                    device_id = created.device_id,
                    alert_type = %created.alert_type,
                    "alert created"
                );
                Ok(created)
            }
            AlertWrite::DeviceNotFound(device_id) => {
                tracing::warn!(device_id, "alert rejected: device not found");
                Err(TrackerError::RelatedDeviceNotFound(device_id))
            }
        }
    }

    /// Validates and applies a partial alert update.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AlertNotFound`] if no alert has `id`, and
    /// [`TrackerError::RelatedDeviceNotFound`] if the patch moves the alert
    /// to a missing device.
    pub async fn update_alert(
        &self,
        id: i64,
        patch: AlertPatch,
        performed_by: Option<&str>,
    ) -> Result<Alert, TrackerError> {
        patch.validate()?;
        match self.storage.update_alert(id, patch, performed_by).await? {
            Some(AlertWrite::Saved(updated)) => {
                tracing::info!(alert_id = id, device_id = updated.device_id, "alert updated");
                Ok(updated)
            }
            Some(AlertWrite::DeviceNotFound(device_id)) => {
                tracing::warn!(alert_id = id, device_id, "alert update rejected: device not found");
                Err(TrackerError::RelatedDeviceNotFound(device_id))
            }
            None => {
                tracing::warn!(alert_id = id, "update of unknown alert");
                Err(TrackerError::AlertNotFound(id))
            }
        }
    }

    /// Deletes one alert.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AlertNotFound`] if no alert has `id`.
    pub async fn delete_alert(&self, id: i64, performed_by: Option<&str>) -> Result<(), TrackerError> {
        if !self.storage.delete_alert(id, performed_by).await? {
            tracing::warn!(alert_id = id, "delete of unknown alert");
            return Err(TrackerError::AlertNotFound(id));
        }
        tracing::info!(alert_id = id, "alert deleted");
        Ok(())
    }

    /// Returns the audit trail newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] on storage failure.
    pub async fn audit_logs(&self) -> Result<Vec<AuditLog>, TrackerError> {
        let mut logs = self.storage.list_audit_logs().await?;
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        tracing::debug!(count = logs.len(), "listed audit entries");
        Ok(logs)
    }

    /// Computes the dashboard summary.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Storage`] on storage failure.
    pub async fn stats(&self) -> Result<DashboardStats, TrackerError> {
        let devices = self.storage.list_devices().await?;
        let alerts = self.storage.list_alerts().await?;
        let logs = self.storage.list_audit_logs().await?;
        tracing::debug!("computing dashboard stats");
        Ok(DashboardStats::compute(&devices, alerts, &logs, Utc::now()))
    }

    /// Registers a user, storing only a bcrypt hash of the password.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Validation`] for bad credentials,
    /// [`TrackerError::UsernameTaken`] if the name is in use, and
    /// [`TrackerError::Internal`] if hashing fails.
    pub async fn register_user(&self, credentials: Credentials) -> Result<User, TrackerError> {
        credentials.validate()?;
        let Credentials { username, password } = credentials;
        let cost = self.password_cost;
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| TrackerError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| TrackerError::Internal(format!("password hashing failed: {e}")))?;

        match self
            .storage
            .create_user(NewUser {
                username,
                password_hash,
            })
            .await?
        {
            UserWrite::Created(user) => {
                tracing::info!(user_id = user.id, username = %user.username, "user registered");
                Ok(user)
            }
            UserWrite::UsernameTaken(username) => {
                tracing::warn!(%username, "registration rejected: username taken");
                Err(TrackerError::UsernameTaken(username))
            }
        }
    }

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UserNotFound`] if no user has `id`.
    pub async fn get_user(&self, id: i64) -> Result<User, TrackerError> {
        tracing::debug!(user_id = id, "loading user");
        self.storage
            .get_user(id)
            .await?
            .ok_or_else(|| TrackerError::UserNotFound(id.to_string()))
    }

    /// Fetches a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::UserNotFound`] if nobody holds `username`.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, TrackerError> {
        tracing::debug!(%username, "loading user by name");
        self.storage
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| TrackerError::UserNotFound(username.to_string()))
    }
}
