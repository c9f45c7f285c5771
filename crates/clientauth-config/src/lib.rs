//! # Clientauth Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: session token signing, lifetime and refresh window
//! - [`gateway`]: remote user service endpoint, timeout and [`Profile`]
//! - [`superuser`]: the optional superuser escape hatch
//! - [`cors`]: CORS settings for the demo host
//!
//! # Example
//!
//! ```ignore
//! use clientauth_config::{GatewayConfig, JwtConfig, SuperuserConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! jwt_config.validate()?;
//! let gateway_config = GatewayConfig::from_env()?;
//! let superuser = SuperuserConfig::from_env();
//! ```

pub mod cors;
pub mod error;
pub mod gateway;
pub mod jwt;
pub mod profile;
pub mod superuser;

pub use cors::CorsConfig;
pub use error::ConfigError;
pub use gateway::GatewayConfig;
pub use jwt::JwtConfig;
pub use profile::Profile;
pub use superuser::{SuperuserConfig, SuperuserPassword};

/// Reads a variable, treating blank values as unset.
pub(crate) fn non_empty(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
