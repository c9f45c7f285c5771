//! The `{code, data, message}` wrapper around remote service results.

use serde::{Deserialize, Serialize};

/// Envelope code meaning success. Anything else is a domain failure.
pub const CODE_SUCCESS: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// A non-zero envelope code together with the service's message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct EnvelopeError {
    pub code: i64,
    pub message: String,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            data: Some(data),
            message: String::new(),
        }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_SUCCESS
    }

    /// Splits the envelope into its payload or a domain error.
    ///
    /// The HTTP status is irrelevant here: a 200 response can still carry a
    /// failure code.
    pub fn into_result(self) -> Result<Option<T>, EnvelopeError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(EnvelopeError {
                code: self.code,
                message: self.message,
            })
        }
    }
}

impl Envelope<()> {
    pub fn ok() -> Self {
        Self {
            code: CODE_SUCCESS,
            data: None,
            message: String::new(),
        }
    }
}
