//! Secret lists and parser configuration

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no signing secret configured")]
    NoSecrets,

    #[error("invalid configuration: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Ordered list of candidate signing secrets, most preferred first
///
/// Verification tries every secret in order; signing always uses the first.
/// Keeping retired secrets at the end of the list lets cookies signed before
/// a rotation keep verifying.
///
/// A single empty string means "no secrets". Deserializes from either a
/// string or an array of strings. Never serialized, so secrets only leave
/// the process as signatures.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SecretsRepr")]
pub struct Secrets(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SecretsRepr {
    One(String),
    Many(Vec<String>),
}

impl From<SecretsRepr> for Secrets {
    fn from(repr: SecretsRepr) -> Self {
        match repr {
            SecretsRepr::One(secret) => Secrets::from(secret),
            SecretsRepr::Many(secrets) => Secrets(secrets),
        }
    }
}

impl Secrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The secret used for signing
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Secret material stays out of logs and panic messages
impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secrets([REDACTED; {}])", self.0.len())
    }
}

impl From<String> for Secrets {
    fn from(secret: String) -> Self {
        if secret.is_empty() {
            Secrets::default()
        } else {
            Secrets(vec![secret])
        }
    }
}

impl From<&str> for Secrets {
    fn from(secret: &str) -> Self {
        Secrets::from(secret.to_string())
    }
}

impl From<Vec<String>> for Secrets {
    fn from(secrets: Vec<String>) -> Self {
        Secrets(secrets)
    }
}

impl From<Vec<&str>> for Secrets {
    fn from(secrets: Vec<&str>) -> Self {
        secrets.into_iter().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Secrets {
    fn from(secrets: [&str; N]) -> Self {
        secrets.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for Secrets {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Secrets(iter.into_iter().map(Into::into).collect())
    }
}

/// Serializable configuration for [`crate::CookieParser`]
///
/// ```
/// use cookie_parser::CookieParserConfig;
///
/// let config = CookieParserConfig::from_json(r#"{"secrets": ["new", "old"]}"#)?;
/// assert_eq!(config.secrets.first(), Some("new"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieParserConfig {
    pub secrets: Secrets,
}

impl CookieParserConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
