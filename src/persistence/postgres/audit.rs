//! `audit_logs` table access. Rows are only ever inserted.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;

use crate::domain::{AuditLog, NewAuditLog};
use crate::persistence::StorageError;
use crate::persistence::models::AuditLogRow;

/// Appends an entry stamped with `now`.
pub(super) async fn record(
    conn: &mut PgConnection,
    entry: &NewAuditLog,
    now: DateTime<Utc>,
) -> Result<AuditLog, StorageError> {
    let row = sqlx::query_as::<_, AuditLogRow>(
        r#"INSERT INTO audit_logs (table_name, action, record_id, performed_by, "timestamp")
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, table_name, action, record_id, performed_by, "timestamp""#,
    )
    .bind(&entry.table_name)
    .bind(entry.action.as_str())
    .bind(entry.record_id)
    .bind(&entry.performed_by)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    AuditLog::try_from(row)
}

/// Loads every entry in write order.
pub(super) async fn list(conn: &mut PgConnection) -> Result<Vec<AuditLog>, StorageError> {
    sqlx::query_as::<_, AuditLogRow>(
        r#"SELECT id, table_name, action, record_id, performed_by, "timestamp" FROM audit_logs
           ORDER BY id ASC"#,
    )
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .map(AuditLog::try_from)
    .collect()
}
