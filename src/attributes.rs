//! `Set-Cookie` attributes
//!
//! [`CookieAttributes`] describes the optional attributes appended after the
//! `name=value` pair when serializing an outgoing cookie. Every attribute is
//! optional and an absent attribute is omitted from the output.

use crate::codec::{is_field_content, CodecError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// Date format produced for the `Expires` attribute (RFC 1123, always GMT)
pub const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// The `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Attribute value as it appears in the header
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive parse of `strict`, `lax` or `none`
impl FromStr for SameSite {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            _ => Err(CodecError::InvalidSameSite {
                value: s.to_string(),
            }),
        }
    }
}

/// Accepts a string, `true`, `false` or `null`. The legacy `true` form means
/// `Strict`; `false` and `null` leave the attribute unset.
fn deserialize_same_site<'de, D>(deserializer: D) -> Result<Option<SameSite>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Name(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None | Some(Repr::Flag(false)) => Ok(None),
        Some(Repr::Flag(true)) => Ok(Some(SameSite::Strict)),
        Some(Repr::Name(name)) => name
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Optional attributes of an outgoing cookie
///
/// Deserializes from the camelCase option names (`maxAge`, `httpOnly`,
/// `sameSite`, ...), so attribute sets can live in configuration files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieAttributes {
    /// Lifetime in seconds, floored when serialized
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    pub http_only: bool,
    pub secure: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_same_site"
    )]
    pub same_site: Option<SameSite>,
}

impl CookieAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_age(mut self, seconds: f64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Append the attributes to `header` in their fixed order:
    /// Max-Age, Domain, Path, Expires, HttpOnly, Secure, SameSite.
    ///
    /// Empty `domain` and `path` strings are treated as absent.
    pub fn append_to(&self, header: &mut String) -> Result<(), CodecError> {
        if let Some(max_age) = self.max_age {
            if !max_age.is_finite() {
                return Err(CodecError::InvalidMaxAge);
            }
            // Adding zero turns -0 into 0. Writing to a String cannot fail
            let _ = write!(header, "; Max-Age={:.0}", max_age.floor() + 0.0);
        }

        if let Some(domain) = self.domain.as_deref().filter(|d| !d.is_empty()) {
            if !is_field_content(domain) {
                return Err(CodecError::InvalidDomain {
                    domain: domain.to_string(),
                });
            }
            header.push_str("; Domain=");
            header.push_str(domain);
        }

        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            if !is_field_content(path) {
                return Err(CodecError::InvalidPath {
                    path: path.to_string(),
                });
            }
            header.push_str("; Path=");
            header.push_str(path);
        }

        if let Some(expires) = &self.expires {
            let _ = write!(header, "; Expires={}", expires.format(EXPIRES_FORMAT));
        }

        if self.http_only {
            header.push_str("; HttpOnly");
        }

        if self.secure {
            header.push_str("; Secure");
        }

        if let Some(same_site) = self.same_site {
            header.push_str("; SameSite=");
            header.push_str(same_site.as_str());
        }

        Ok(())
    }
}
