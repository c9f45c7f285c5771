use std::env;
use std::fmt;

use crate::{ConfigError, non_empty};

/// Password of the superuser, either in clear or as a bcrypt hash.
#[derive(Clone, PartialEq, Eq)]
pub enum SuperuserPassword {
    Plain(String),
    Bcrypt(String),
}

impl SuperuserPassword {
    /// Values starting with `$2` are treated as bcrypt hashes.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with("$2") {
            SuperuserPassword::Bcrypt(raw)
        } else {
            SuperuserPassword::Plain(raw)
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            SuperuserPassword::Plain(p) | SuperuserPassword::Bcrypt(p) => p.is_empty(),
        }
    }
}

impl fmt::Debug for SuperuserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuperuserPassword::Plain(_) => f.write_str("Plain(<redacted>)"),
            SuperuserPassword::Bcrypt(_) => f.write_str("Bcrypt(<redacted>)"),
        }
    }
}

/// Escape-hatch account that authenticates without the identity resolver.
///
/// Tokens minted for it carry `phone_number`; verification maps that claim
/// straight back to the superuser identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperuserConfig {
    pub username: String,
    pub password: SuperuserPassword,
    pub phone_number: String,
}

impl SuperuserConfig {
    pub fn new(
        username: impl Into<String>,
        password: SuperuserPassword,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            phone_number: phone_number.into(),
        }
    }

    /// Returns `None` unless a username, a password and a phone number are
    /// all configured.
    pub fn from_env() -> Option<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let username = non_empty(&get, "SUPERUSER_USERNAME")?;
        let password = non_empty(&get, "SUPERUSER_PASSWORD_HASH")
            .map(SuperuserPassword::Bcrypt)
            .or_else(|| non_empty(&get, "SUPERUSER_PASSWORD").map(SuperuserPassword::Plain))?;
        let phone_number = non_empty(&get, "SUPERUSER_PHONE_NUMBER")?;
        Some(Self {
            username,
            password,
            phone_number,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::IncompleteSuperuser("username"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::IncompleteSuperuser("password"));
        }
        if self.phone_number.is_empty() {
            return Err(ConfigError::IncompleteSuperuser("phone number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_without_all_parts() {
        let partial = SuperuserConfig::from_source(|key| match key {
            "SUPERUSER_USERNAME" => Some("admin".to_string()),
            _ => None,
        });
        assert!(partial.is_none());
    }

    #[test]
    fn test_hash_preferred_over_plain() {
        let config = SuperuserConfig::from_source(|key| match key {
            "SUPERUSER_USERNAME" => Some("admin".to_string()),
            "SUPERUSER_PASSWORD" => Some("plain".to_string()),
            "SUPERUSER_PASSWORD_HASH" => Some("$2b$04$abc".to_string()),
            "SUPERUSER_PHONE_NUMBER" => Some("18888888888".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(
            config.password,
            SuperuserPassword::Bcrypt("$2b$04$abc".to_string())
        );
    }

    #[test]
    fn test_parse_detects_bcrypt() {
        assert!(matches!(
            SuperuserPassword::parse("$2y$10$xyz"),
            SuperuserPassword::Bcrypt(_)
        ));
        assert!(matches!(
            SuperuserPassword::parse("admin@123456"),
            SuperuserPassword::Plain(_)
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = SuperuserConfig::new(
            "admin",
            SuperuserPassword::Plain("admin@123456".to_string()),
            "18888888888",
        );
        let printed = format!("{:?}", config);
        assert!(!printed.contains("admin@123456"));
    }

    #[test]
    fn test_validate_rejects_blank_phone() {
        let config = SuperuserConfig::new("admin", SuperuserPassword::parse("pw"), "");
        assert_eq!(
            config.validate(),
            Err(ConfigError::IncompleteSuperuser("phone number"))
        );
    }
}
