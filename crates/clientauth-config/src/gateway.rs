use std::env;
use std::time::Duration;

use crate::{ConfigError, Profile, non_empty};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11100";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Base URL of the remote user service, without a trailing slash.
    pub endpoint: String,
    pub request_timeout: Duration,
    pub profile: Profile,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            profile: Profile::Standard,
        }
    }
}

impl GatewayConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = non_empty(&get, "GATEWAY_ENDPOINT")
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let request_timeout = match non_empty(&get, "GATEWAY_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    key: "GATEWAY_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let profile = match non_empty(&get, "AUTH_PROFILE") {
            Some(raw) => raw.parse()?,
            None => Profile::default(),
        };

        let config = Self {
            request_timeout,
            profile,
            ..Self::new(endpoint)
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rest = self
            .endpoint
            .strip_prefix("http://")
            .or_else(|| self.endpoint.strip_prefix("https://"));
        match rest {
            Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
            _ => Err(ConfigError::InvalidEndpoint(self.endpoint.clone())),
        }
    }

    /// Joins a service path such as `/user` onto the endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}
