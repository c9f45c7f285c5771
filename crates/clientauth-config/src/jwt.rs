use std::env;

use crate::{ConfigError, non_empty};

/// Default token lifetime and refresh window: 24 hours.
pub const DEFAULT_TIMEOUT_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_MAX_REFRESH_SECS: i64 = 24 * 60 * 60;
pub const DEFAULT_REALM: &str = "unknown";
/// Upper bound for both durations: ten years.
pub const MAX_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Lifetime of a freshly minted token.
    pub timeout_secs: i64,
    /// How long after the original issuance a token may still be refreshed.
    pub max_refresh_secs: i64,
    pub realm: String,
    /// Also return minted tokens in an `Authorization` response header.
    pub send_authorization: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_refresh_secs: DEFAULT_MAX_REFRESH_SECS,
            realm: DEFAULT_REALM.to_string(),
            send_authorization: false,
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            secret: get("JWT_SECRET").unwrap_or_default(),
            timeout_secs: get("JWT_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            max_refresh_secs: get("JWT_MAX_REFRESH")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_refresh_secs),
            realm: non_empty(&get, "AUTH_REALM").unwrap_or(defaults.realm),
            send_authorization: get("JWT_SEND_AUTHORIZATION")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.send_authorization),
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.timeout_secs <= 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.timeout_secs > MAX_DURATION_SECS {
            return Err(ConfigError::InvalidValue {
                key: "JWT_TIMEOUT",
                value: self.timeout_secs.to_string(),
            });
        }
        if !(0..=MAX_DURATION_SECS).contains(&self.max_refresh_secs) {
            return Err(ConfigError::InvalidValue {
                key: "JWT_MAX_REFRESH",
                value: self.max_refresh_secs.to_string(),
            });
        }
        Ok(())
    }
}
