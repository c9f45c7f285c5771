//! Login credentials and token grants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Login values accepted by `POST /login`.
///
/// Which fields matter depends on the deployment profile: the standard
/// profile looks the phone number up (or matches the superuser pair), the
/// registration profile exchanges `phone_number` + `code`.
#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq, Validate)]
#[serde(default)]
pub struct Credentials {
    #[validate(length(max = 64))]
    pub username: String,
    #[validate(length(max = 128))]
    pub password: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(max = 16))]
    pub code: String,
}

impl Credentials {
    pub fn phone_and_code(phone_number: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    pub fn username_and_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Non-empty fields as query parameters.
    pub fn to_query(&self) -> Vec<(&'static str, &str)> {
        [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("phone_number", self.phone_number.as_str()),
            ("code", self.code.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("phone_number", &self.phone_number)
            .field("password", &"<redacted>")
            .field("code", &"<redacted>")
            .finish()
    }
}

/// Accepts an empty value, otherwise an optional `+` followed by 5-20 digits.
pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.is_empty() {
        return Ok(());
    }
    let digits = phone_number.strip_prefix('+').unwrap_or(phone_number);
    let valid = (5..=20).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_number");
        err.message = Some("phone_number is invalid".into());
        Err(err)
    }
}

/// Body returned by the login and refresh endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub code: i64,
    pub token: String,
    pub expire: DateTime<Utc>,
}
