//! Alert entity raised against a device.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, require_min_chars};

/// Minimum message length accepted from callers.
pub const MIN_MESSAGE_CHARS: usize = 3;

/// Severity of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// Needs immediate attention.
    Critical,
}

impl AlertType {
    /// Every accepted wire spelling, in declaration order.
    pub const ALL: [&'static str; 3] = ["info", "warning", "critical"];

    /// Returns the wire spelling of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            other => Err(ValidationError::unknown_variant("type", other, &Self::ALL)),
        }
    }
}

/// An alert raised against a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Alert {
    /// Store-assigned identifier.
    pub id: i64,
    /// Device the alert refers to.
    pub device_id: i64,
    /// Severity.
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Free-form message.
    pub message: String,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Materializes a new alert stamped with `now`.
    #[must_use]
    pub fn from_new(id: i64, new: NewAlert, now: DateTime<Utc>) -> Self {
        Self {
            id,
            device_id: new.device_id,
            alert_type: new.alert_type,
            message: new.message,
            created_at: now,
        }
    }

    /// Merges `patch` onto this alert. `created_at` is never touched.
    pub fn apply(&mut self, patch: AlertPatch) {
        if let Some(device_id) = patch.device_id {
            self.device_id = device_id;
        }
        if let Some(alert_type) = patch.alert_type {
            self.alert_type = alert_type;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
    }
}

/// Fields a caller may supply when raising an alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    /// Device the alert refers to; must exist.
    pub device_id: i64,
    /// Severity.
    pub alert_type: AlertType,
    /// Message, at least [`MIN_MESSAGE_CHARS`] characters.
    pub message: String,
}

impl NewAlert {
    /// Checks the message length.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the message is too short.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars("message", &self.message, MIN_MESSAGE_CHARS)
    }
}

/// Partial alert update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertPatch {
    /// Re-point the alert at another device; that device must exist.
    pub device_id: Option<i64>,
    /// New severity.
    pub alert_type: Option<AlertType>,
    /// New message.
    pub message: Option<String>,
}

impl AlertPatch {
    /// Returns `true` when the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.device_id.is_none() && self.alert_type.is_none() && self.message.is_none()
    }

    /// Validates the fields the patch carries.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty patch or a short message.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("body", "no fields to update"));
        }
        if let Some(message) = &self.message {
            require_min_chars("message", message, MIN_MESSAGE_CHARS)?;
        }
        Ok(())
    }

    /// Returns the device id this patch moves the alert to, if it differs
    /// from `current`.
    #[must_use]
    pub fn device_change(&self, current: i64) -> Option<i64> {
        self.device_id.filter(|&id| id != current)
    }
}
