//! Dashboard user accounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{ValidationError, require_min_chars, require_non_empty};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_CHARS: usize = 8;

/// A registered user. The password hash never leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct User {
    /// Store-assigned identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// bcrypt hash of the password.
    #[serde(skip)]
    pub password_hash: String,
}

/// A user before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Unique login name.
    pub username: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
}

/// Registration input as supplied by a caller.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    /// Desired login name.
    pub username: String,
    /// Plain-text password; hashed before it reaches storage.
    pub password: String,
}

impl Credentials {
    /// Checks the username and password shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a blank username or short password.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("username", &self.username)?;
        require_min_chars("password", &self.password, MIN_PASSWORD_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            password_hash: "$2b$04$secret".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap_or_default();
        assert!(json.contains("admin"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn credentials_shape_is_checked() {
        let ok = Credentials {
            username: "admin".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(ok.validate().is_ok());

        let short = Credentials {
            username: "admin".to_string(),
            password: "1234".to_string(),
        };
        assert!(short.validate().is_err());

        let blank = Credentials {
            username: " ".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(blank.validate().is_err());
    }
}
