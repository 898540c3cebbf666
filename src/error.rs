//! Unified error type for the public API
//!
//! Each module keeps its own error enum for precise handling. [`CookieError`]
//! wraps them so callers of [`crate::CookieParser`] deal with a single type.
//!
//! Only caller mistakes surface as errors. Malformed pairs, undecodable
//! values, bad signatures and broken JSON envelopes in a request header are
//! ordinary outcomes and never produce an error.
//!
//! # Example
//!
//! ```
//! use cookie_parser::{codec, CookieError};
//!
//! fn set_cookie(name: &str) -> Result<String, CookieError> {
//!     Ok(codec::serialize(name, "value")?)
//! }
//!
//! let err = set_cookie("foo;bar").unwrap_err();
//! assert!(err.is_codec_error());
//! ```

use thiserror::Error;

/// Unified error type for all cookie operations
///
/// # Error Categories
///
/// - **Codec**: invalid cookie names, values or attributes on serialization
/// - **Signature**: MAC computation failures
/// - **Config**: missing secrets or unreadable configuration
#[derive(Debug, Error)]
pub enum CookieError {
    /// Header parsing or serialization error
    #[error("Codec error: {0}")]
    Codec(#[from] crate::codec::CodecError),

    /// Signing or verification error
    #[error("Signature error: {0}")]
    Signature(#[from] crate::signature::SignatureError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl CookieError {
    /// Returns a suggestion for resolving this error
    pub fn suggestion(&self) -> Option<&str> {
        use crate::codec::CodecError;
        use crate::config::ConfigError;

        match self {
            Self::Codec(CodecError::InvalidName { .. }) => Some(
                "Cookie names may only contain tabs, printable ASCII and Latin-1 characters",
            ),
            Self::Codec(CodecError::InvalidValue { .. }) => {
                Some("Use an encode function that escapes control characters")
            }
            Self::Codec(CodecError::InvalidSameSite { .. }) => {
                Some("Use one of: Strict, Lax, None")
            }
            Self::Config(ConfigError::NoSecrets) => {
                Some("Configure at least one secret before signing cookies")
            }
            _ => None,
        }
    }

    /// Returns true if this is a codec error
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    /// Returns true if this is a signature error
    pub fn is_signature_error(&self) -> bool {
        matches!(self, Self::Signature(_))
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::config::ConfigError;

    #[test]
    fn test_error_categories() {
        let codec_err = CookieError::from(CodecError::InvalidMaxAge);
        assert!(codec_err.is_codec_error());
        assert!(!codec_err.is_signature_error());
        assert!(!codec_err.is_config_error());

        let config_err = CookieError::from(ConfigError::NoSecrets);
        assert!(config_err.is_config_error());
        assert!(!config_err.is_codec_error());
    }

    #[test]
    fn test_error_display() {
        let err = CookieError::from(CodecError::InvalidMaxAge);
        let msg = err.to_string();
        assert!(msg.contains("Codec error"));
        assert!(msg.contains("maxAge should be a Number"));
    }

    #[test]
    fn test_suggestion() {
        let err = CookieError::from(ConfigError::NoSecrets);
        assert!(err.suggestion().is_some());

        let err = CookieError::from(CodecError::InvalidMaxAge);
        assert!(err.suggestion().is_none());
    }
}
