//! `alerts` table access.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::domain::{Alert, NewAlert};
use crate::persistence::StorageError;
use crate::persistence::models::AlertRow;

/// Loads all alerts, newest first.
pub(super) async fn list(conn: &mut PgConnection) -> Result<Vec<Alert>, StorageError> {
    sqlx::query_as::<_, AlertRow>(
        r#"SELECT id, device_id, "type", message, created_at FROM alerts
           ORDER BY created_at DESC, id DESC"#,
    )
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Alert::try_from)
    .collect()
}

/// Loads the alerts of one device, newest first.
pub(super) async fn list_by_device(
    conn: &mut PgConnection,
    device_id: i64,
) -> Result<Vec<Alert>, StorageError> {
    sqlx::query_as::<_, AlertRow>(
        r#"SELECT id, device_id, "type", message, created_at FROM alerts
           WHERE device_id = $1 ORDER BY created_at DESC, id DESC"#,
    )
    .bind(device_id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(Alert::try_from)
    .collect()
}

/// Loads one alert.
pub(super) async fn find(conn: &mut PgConnection, id: i64) -> Result<Option<Alert>, StorageError> {
    sqlx::query_as::<_, AlertRow>(
        r#"SELECT id, device_id, "type", message, created_at FROM alerts WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .map(Alert::try_from)
    .transpose()
}

/// Loads one alert and locks its row until the transaction ends.
pub(super) async fn find_for_update(
    conn: &mut PgConnection,
    id: i64,
) -> Result<Option<Alert>, StorageError> {
    sqlx::query_as::<_, AlertRow>(
        r#"SELECT id, device_id, "type", message, created_at FROM alerts
           WHERE id = $1 FOR UPDATE"#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .map(Alert::try_from)
    .transpose()
}

/// Locks and returns the ids of every alert referencing `device_id`,
/// newest first.
pub(super) async fn ids_for_device_locked(
    conn: &mut PgConnection,
    device_id: i64,
) -> Result<Vec<i64>, StorageError> {
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM alerts WHERE device_id = $1 ORDER BY created_at DESC, id DESC FOR UPDATE",
    )
    .bind(device_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}

/// Inserts an alert stamped with `now`.
pub(super) async fn insert(
    conn: &mut PgConnection,
    alert: &NewAlert,
    now: DateTime<Utc>,
) -> Result<Alert, StorageError> {
    let row = sqlx::query_as::<_, AlertRow>(
        r#"INSERT INTO alerts (device_id, "type", message, created_at) VALUES ($1, $2, $3, $4)
           RETURNING id, device_id, "type", message, created_at"#,
    )
    .bind(alert.device_id)
    .bind(alert.alert_type.as_str())
    .bind(&alert.message)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    Alert::try_from(row)
}

/// Writes the mutable columns of `alert` back to its row. `created_at` is
/// never written.
pub(super) async fn save(conn: &mut PgConnection, alert: &Alert) -> Result<(), StorageError> {
    sqlx::query(r#"UPDATE alerts SET device_id = $2, "type" = $3, message = $4 WHERE id = $1"#)
        .bind(alert.id)
        .bind(alert.device_id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.message)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Deletes one alert row. Returns `true` if a row was removed.
pub(super) async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
