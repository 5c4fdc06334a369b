//! Device entity, its insertable projection and partial update.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, require_non_empty};

/// Reported health of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Reachable and healthy.
    Online,
    /// Not reachable.
    Offline,
    /// Reachable but degraded.
    Warning,
    /// Reporting a fault.
    Error,
}

impl DeviceStatus {
    /// Every accepted wire spelling, in declaration order.
    pub const ALL: [&'static str; 4] = ["online", "offline", "warning", "error"];

    /// Returns the wire spelling of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(ValidationError::unknown_variant("status", other, &Self::ALL)),
        }
    }
}

/// A tracked device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Device {
    /// Store-assigned identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Operating-system label.
    pub os: String,
    /// Current status.
    pub status: DeviceStatus,
    /// Physical or logical location.
    pub location: String,
    /// Creation timestamp (immutable).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Materializes a new device with both timestamps set to `now`.
    #[must_use]
    pub fn from_new(id: i64, new: NewDevice, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            os: new.os,
            status: new.status,
            location: new.location,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `patch` onto this device.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn apply(&mut self, patch: DevicePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(os) = patch.os {
            self.os = os;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        self.updated_at = now.max(self.updated_at);
    }
}

/// Fields a caller may supply when creating a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDevice {
    /// Display name.
    pub name: String,
    /// Operating-system label.
    pub os: String,
    /// Initial status.
    pub status: DeviceStatus,
    /// Location.
    pub location: String,
}

impl NewDevice {
    /// Checks that every text field is non-empty.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("os", &self.os)?;
        require_non_empty("location", &self.location)
    }
}

/// Partial device update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DevicePatch {
    /// New display name.
    pub name: Option<String>,
    /// New operating-system label.
    pub os: Option<String>,
    /// New status.
    pub status: Option<DeviceStatus>,
    /// New location.
    pub location: Option<String>,
}

impl DevicePatch {
    /// Returns `true` when the patch carries no field at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.os.is_none() && self.status.is_none() && self.location.is_none()
    }

    /// Validates the fields the patch carries.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty patch or a blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::new("body", "no fields to update"));
        }
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(os) = &self.os {
            require_non_empty("os", os)?;
        }
        if let Some(location) = &self.location {
            require_non_empty("location", location)?;
        }
        Ok(())
    }
}
