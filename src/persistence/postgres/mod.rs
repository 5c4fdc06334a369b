//! PostgreSQL storage backend.
//!
//! Every mutation runs in one transaction that covers its relational
//! checks, the entity write and the audit insert. Rows about to be changed
//! are locked with `FOR UPDATE`; a device referenced by an alert write is
//! locked with `FOR SHARE` so a concurrent cascade delete cannot slip in
//! between the check and the insert.

mod alerts;
mod audit;
mod devices;
mod users;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;

use super::{AlertWrite, Storage, StorageError, UserWrite};
use crate::domain::audit_log::{ALERTS_TABLE, DEVICES_TABLE};
use crate::domain::{
    Alert, AlertPatch, AuditAction, AuditLog, Device, DevicePatch, NewAlert, NewAuditLog,
    NewDevice, NewUser, User,
};

/// Current time truncated to the microsecond precision of `TIMESTAMPTZ`.
fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// PostgreSQL-backed storage using a shared `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Wraps an already connected pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::find(&mut conn, id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        users::find_by_username(&mut conn, username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<UserWrite, StorageError> {
        let mut conn = self.pool.acquire().await?;
        match users::insert(&mut conn, &user).await? {
            Some(created) => Ok(UserWrite::Created(created)),
            None => Ok(UserWrite::UsernameTaken(user.username)),
        }
    }

    async fn list_devices(&self) -> Result<Vec<Device>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        devices::list(&mut conn).await
    }

    async fn get_device(&self, id: i64) -> Result<Option<Device>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        devices::find(&mut conn, id).await
    }

    async fn create_device(
        &self,
        device: NewDevice,
        performed_by: Option<&str>,
    ) -> Result<Device, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        let created = devices::insert(&mut tx, &device, now).await?;
        audit::record(
            &mut tx,
            &NewAuditLog::new(DEVICES_TABLE, AuditAction::Create, created.id)
                .performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_device(
        &self,
        id: i64,
        patch: DevicePatch,
        performed_by: Option<&str>,
    ) -> Result<Option<Device>, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        let Some(mut device) = devices::find_for_update(&mut tx, id).await? else {
            return Ok(None);
        };
        device.apply(patch, now);
        devices::save(&mut tx, &device).await?;
        audit::record(
            &mut tx,
            &NewAuditLog::new(DEVICES_TABLE, AuditAction::Update, id).performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        Ok(Some(device))
    }

    async fn delete_device(
        &self,
        id: i64,
        performed_by: Option<&str>,
    ) -> Result<bool, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        if devices::find_for_update(&mut tx, id).await?.is_none() {
            return Ok(false);
        }
        for alert_id in alerts::ids_for_device_locked(&mut tx, id).await? {
            alerts::delete(&mut tx, alert_id).await?;
            audit::record(
                &mut tx,
                &NewAuditLog::new(ALERTS_TABLE, AuditAction::Delete, alert_id)
                    .performed_by(performed_by),
                now,
            )
            .await?;
        }
        devices::delete(&mut tx, id).await?;
        audit::record(
            &mut tx,
            &NewAuditLog::new(DEVICES_TABLE, AuditAction::Delete, id).performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        tracing::debug!(device_id = id, "device deleted with its alerts");
        Ok(true)
    }

    async fn list_alerts(&self) -> Result<Vec<Alert>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        alerts::list(&mut conn).await
    }

    async fn list_alerts_by_device(&self, device_id: i64) -> Result<Vec<Alert>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        alerts::list_by_device(&mut conn, device_id).await
    }

    async fn get_alert(&self, id: i64) -> Result<Option<Alert>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        alerts::find(&mut conn, id).await
    }

    async fn create_alert(
        &self,
        alert: NewAlert,
        performed_by: Option<&str>,
    ) -> Result<AlertWrite, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        if !devices::exists_locked(&mut tx, alert.device_id).await? {
            return Ok(AlertWrite::DeviceNotFound(alert.device_id));
        }
        let created = alerts::insert(&mut tx, &alert, now).await?;
        audit::record(
            &mut tx,
            &NewAuditLog::new(ALERTS_TABLE, AuditAction::Create, created.id)
                .performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        Ok(AlertWrite::Saved(created))
    }

    async fn update_alert(
        &self,
        id: i64,
        patch: AlertPatch,
        performed_by: Option<&str>,
    ) -> Result<Option<AlertWrite>, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        let Some(mut alert) = alerts::find_for_update(&mut tx, id).await? else {
            return Ok(None);
        };
        if let Some(target) = patch.device_change(alert.device_id)
            && !devices::exists_locked(&mut tx, target).await?
        {
            return Ok(Some(AlertWrite::DeviceNotFound(target)));
        }
        alert.apply(patch);
        alerts::save(&mut tx, &alert).await?;
        audit::record(
            &mut tx,
            &NewAuditLog::new(ALERTS_TABLE, AuditAction::Update, id).performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        Ok(Some(AlertWrite::Saved(alert)))
    }

    async fn delete_alert(
        &self,
        id: i64,
        performed_by: Option<&str>,
    ) -> Result<bool, StorageError> {
        let now = db_now();
        let mut tx = self.pool.begin().await?;
        if !alerts::delete(&mut tx, id).await? {
            return Ok(false);
        }
        audit::record(
            &mut tx,
            &NewAuditLog::new(ALERTS_TABLE, AuditAction::Delete, id).performed_by(performed_by),
            now,
        )
        .await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn list_audit_logs(&self) -> Result<Vec<AuditLog>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        audit::list(&mut conn).await
    }

    async fn record_audit(&self, entry: NewAuditLog) -> Result<AuditLog, StorageError> {
        let mut conn = self.pool.acquire().await?;
        audit::record(&mut conn, &entry, db_now()).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn db_now_has_microsecond_precision() {
        let now = db_now();
        assert_eq!(now.nanosecond() % 1_000, 0);
        assert!(now <= Utc::now());
    }
}
