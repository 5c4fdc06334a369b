//! Append-only audit trail entries.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::ValidationError;

/// Actor recorded when the caller does not identify one.
pub const SYSTEM_ACTOR: &str = "system";

/// Collection name recorded for device mutations.
pub const DEVICES_TABLE: &str = "devices";

/// Collection name recorded for alert mutations.
pub const ALERTS_TABLE: &str = "alerts";

/// Kind of mutation an audit entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// A record was inserted.
    Create,
    /// A record was modified.
    Update,
    /// A record was removed.
    Delete,
}

impl AuditAction {
    /// Every accepted wire spelling, in declaration order.
    pub const ALL: [&'static str; 3] = ["create", "update", "delete"];

    /// Returns the wire spelling of this action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(ValidationError::unknown_variant("action", other, &Self::ALL)),
        }
    }
}

/// One immutable record of a mutating operation.
///
/// `record_id` is not a foreign key: the row it names may since have been
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuditLog {
    /// Store-assigned identifier.
    pub id: i64,
    /// Entity collection the mutation touched (e.g. `"alerts"`).
    pub table_name: String,
    /// What happened.
    pub action: AuditAction,
    /// Id of the affected row.
    pub record_id: i64,
    /// Who performed it; `"system"` when unknown.
    pub performed_by: String,
    /// When the entry was written.
    pub timestamp: DateTime<Utc>,
}

impl AuditLog {
    /// Materializes an entry stamped with `now`.
    #[must_use]
    pub fn from_new(id: i64, new: NewAuditLog, now: DateTime<Utc>) -> Self {
        Self {
            id,
            table_name: new.table_name,
            action: new.action,
            record_id: new.record_id,
            performed_by: new.performed_by,
            timestamp: now,
        }
    }
}

/// An audit entry before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditLog {
    /// Entity collection name.
    pub table_name: String,
    /// What happened.
    pub action: AuditAction,
    /// Id of the affected row.
    pub record_id: i64,
    /// Who performed it.
    pub performed_by: String,
}

impl NewAuditLog {
    /// Builds an entry attributed to [`SYSTEM_ACTOR`].
    #[must_use]
    pub fn new(table_name: impl Into<String>, action: AuditAction, record_id: i64) -> Self {
        Self {
            table_name: table_name.into(),
            action,
            record_id,
            performed_by: SYSTEM_ACTOR.to_string(),
        }
    }

    /// Attributes the entry to `actor`; blank or missing actors fall back
    /// to [`SYSTEM_ACTOR`].
    #[must_use]
    pub fn performed_by(mut self, actor: Option<&str>) -> Self {
        self.performed_by = actor
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(SYSTEM_ACTOR)
            .to_string();
        self
    }
}
