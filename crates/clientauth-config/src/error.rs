/// Configuration problems detected at startup.
///
/// Any of these is fatal: the middleware refuses to mount rather than serve
/// with a misconfigured signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("token timeout must be greater than zero")]
    ZeroTimeout,

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("gateway endpoint must be an absolute http(s) URL, got '{0}'")]
    InvalidEndpoint(String),

    #[error("unknown deployment profile '{0}' (expected 'standard' or 'registration')")]
    UnknownProfile(String),

    #[error("superuser {0} must not be empty")]
    IncompleteSuperuser(&'static str),

    #[error("no identity resolver configured and no gateway to default to")]
    MissingIdentityResolver,
}
