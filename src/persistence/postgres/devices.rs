//! `devices` table access.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::domain::{Device, NewDevice};
use crate::persistence::StorageError;
use crate::persistence::models::DeviceRow;

/// Loads all devices, newest first.
pub(super) async fn list(conn: &mut PgConnection) -> Result<Vec<Device>, StorageError> {
    sqlx::query_as::<_, DeviceRow>(
        "SELECT id, name, os, status, location, created_at, updated_at FROM devices \
         ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Device::try_from)
    .collect()
}

/// Loads one device.
pub(super) async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Device>, StorageError> {
    sqlx::query_as::<_, DeviceRow>(
        "SELECT id, name, os, status, location, created_at, updated_at FROM devices WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .map(Device::try_from)
    .transpose()
}

/// Loads one device and locks its row until the transaction ends.
pub(super) async fn find_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<Device>, StorageError> {
    sqlx::query_as::<_, DeviceRow>(
        "SELECT id, name, os, status, location, created_at, updated_at FROM devices \
         WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .map(Device::try_from)
    .transpose()
}

/// Returns `true` if the device exists, holding a share lock on it so a
/// concurrent delete waits for the caller's transaction.
pub(super) async fn exists_locked(conn: &mut PgConnection, id: i64) -> Result<bool, StorageError> {
    let row = sqlx::query_scalar::<_, i64>("SELECT id FROM devices WHERE id = $1 FOR SHARE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// Inserts a device with both timestamps set to `now`.
pub(super) async fn insert(
    conn: &mut PgConnection,
    device: &NewDevice,
    now: DateTime<Utc>,
) -> Result<Device, StorageError> {
    let row = sqlx::query_as::<_, DeviceRow>(
        "INSERT INTO devices (name, os, status, location, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $5) \
         RETURNING id, name, os, status, location, created_at, updated_at",
    )
    .bind(&device.name)
    .bind(&device.os)
    .bind(device.status.as_str())
    .bind(&device.location)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Device::try_from(row)
}

/// Writes every mutable column of `device` back to its row.
pub(super) async fn save(conn: &mut PgConnection, device: &Device) -> Result<(), StorageError> {
    sqlx::query(
        "UPDATE devices SET name = $2, os = $3, status = $4, location = $5, updated_at = $6 \
         WHERE id = $1",
    )
    .bind(device.id)
    .bind(&device.name)
    .bind(&device.os)
    .bind(device.status.as_str())
    .bind(&device.location)
    .bind(device.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Deletes one device row. Returns `true` if a row was removed.
pub(super) async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM devices WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
