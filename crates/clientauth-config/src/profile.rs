use std::fmt;
use std::str::FromStr;

use crate::ConfigError;

/// Deployment profile shared by the gateway and the middleware.
///
/// `Standard` requires a bearer token on user CRUD and resolves logins by
/// looking the phone number up. `Registration` leaves CRUD open and lets the
/// login step itself register-or-login with a phone number and code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Profile {
    #[default]
    Standard,
    Registration,
}

impl Profile {
    /// Whether user CRUD calls must carry the stored bearer token.
    pub fn requires_bearer_crud(self) -> bool {
        matches!(self, Profile::Standard)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Standard => "standard",
            Profile::Registration => "registration",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Profile::Standard),
            "registration" => Ok(Profile::Registration),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}
