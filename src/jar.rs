//! Request-level cookie resolution
//!
//! [`CookieParser`] takes the raw `Cookie` header of a request and produces
//! two maps: plain cookies and signed cookies. Values prefixed with `s:` are
//! verified against the configured secrets and moved to the signed map,
//! values prefixed with `j:` are decoded as JSON.
//!
//! # Example
//!
//! ```
//! use cookie_parser::{CookieParser, CookieValue};
//!
//! let parser = CookieParser::new(["new-secret", "old-secret"]);
//! let session = parser.sign_value("user-42")?;
//! let header = format!("theme=dark; session={}", cookie_parser::codec::percent_encode(&session));
//!
//! let resolved = parser.resolve(Some(&header))?;
//! assert_eq!(resolved.cookies["theme"], CookieValue::Text("dark".into()));
//! assert_eq!(resolved.signed_cookies["session"], CookieValue::Text("user-42".into()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::codec::{parse_with, CodecError, CookieMap, ParseOptions};
use crate::config::{ConfigError, CookieParserConfig, Secrets};
use crate::error::CookieError;
use crate::signature::{self, SignatureError};
use serde_json::Value;
use tracing::debug;

/// Marker prefix of a signed cookie value
pub const SIGNED_PREFIX: &str = "s:";

/// Marker prefix of a JSON cookie value
pub const JSON_PREFIX: &str = "j:";

/// A resolved cookie value
#[derive(Debug, Clone, PartialEq)]
pub enum CookieValue {
    /// Plain string value
    Text(String),
    /// Value decoded from a `j:` envelope
    Json(Value),
    /// Signed value that failed verification against every secret
    Tampered,
}

impl CookieValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            CookieValue::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_tampered(&self) -> bool {
        matches!(self, CookieValue::Tampered)
    }
}

impl From<String> for CookieValue {
    fn from(value: String) -> Self {
        CookieValue::Text(value)
    }
}

/// Outcome of checking a single value for a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// No `s:` marker, the value is not a signed cookie
    NotSigned,
    /// Signature verified, holds the unwrapped value
    Verified(String),
    /// Carries the marker but no secret verifies it
    Tampered,
}

/// Check one cookie value against the candidate secrets
///
/// Secrets are tried in order and the first match wins. A value with the
/// `s:` marker and no configured secrets is [`Verification::Tampered`].
pub fn signed_cookie(value: &str, secrets: &Secrets) -> Result<Verification, SignatureError> {
    let Some(signed) = value.strip_prefix(SIGNED_PREFIX) else {
        return Ok(Verification::NotSigned);
    };

    for secret in secrets.iter() {
        if let Some(unsigned) = signature::unsign(signed, secret)? {
            return Ok(Verification::Verified(unsigned));
        }
    }

    Ok(Verification::Tampered)
}

/// Move every signed-looking entry of `cookies` into a new map
///
/// Verified entries carry their unwrapped value, failed ones become
/// [`CookieValue::Tampered`]. Either way the entry leaves `cookies`.
pub fn signed_cookies(
    cookies: &mut CookieMap<String>,
    secrets: &Secrets,
) -> Result<CookieMap<CookieValue>, SignatureError> {
    let mut signed = CookieMap::new();

    let names: Vec<String> = cookies.keys().cloned().collect();

    for name in names {
        let Some(value) = cookies.get(&name) else {
            continue;
        };

        let resolved = match signed_cookie(value, secrets)? {
            Verification::NotSigned => continue,
            Verification::Verified(unsigned) => CookieValue::Text(unsigned),
            Verification::Tampered => {
                debug!(cookie = %name, "signed cookie failed verification");
                CookieValue::Tampered
            }
        };

        cookies.remove(&name);
        signed.insert(name, resolved);
    }

    Ok(signed)
}

/// Decode a `j:` JSON envelope
///
/// Returns `None` without the marker, on invalid JSON, and when the JSON is
/// falsy (`false`, `null`, `0` or `""`); callers keep the raw string then.
pub fn json_cookie(value: &str) -> Option<Value> {
    let json = value.strip_prefix(JSON_PREFIX)?;
    serde_json::from_str::<Value>(json).ok().filter(is_truthy)
}

/// Apply [`json_cookie`] to every text value of a map
pub fn json_cookies<V>(cookies: CookieMap<V>) -> CookieMap<CookieValue>
where
    V: Into<CookieValue>,
{
    cookies
        .into_iter()
        .map(|(name, value)| {
            let value: CookieValue = value.into();
            let value = match value {
                CookieValue::Text(text) => match json_cookie(&text) {
                    Some(json) => CookieValue::Json(json),
                    None => CookieValue::Text(text),
                },
                other => other,
            };
            (name, value)
        })
        .collect()
}

/// Wrap a JSON value in a `j:` envelope for an outgoing cookie
pub fn json_value(value: &Value) -> String {
    format!("{}{}", JSON_PREFIX, value)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Cookies resolved from one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCookies {
    /// Unsigned cookies
    pub cookies: CookieMap<CookieValue>,
    /// Cookies that carried the `s:` marker
    pub signed_cookies: CookieMap<CookieValue>,
    /// Preferred secret, for signing outgoing cookies
    pub secret: Option<String>,
}

/// Resolve a raw `Cookie` header into plain and signed cookies
///
/// With no secrets the signed map stays empty and `s:` values are returned
/// as plain text.
pub fn resolve_cookies(
    raw_header: &str,
    secrets: &Secrets,
    options: &ParseOptions,
) -> Result<ResolvedCookies, SignatureError> {
    let mut raw = parse_with(raw_header, options);

    let signed = if secrets.is_empty() {
        CookieMap::new()
    } else {
        json_cookies(signed_cookies(&mut raw, secrets)?)
    };

    let resolved = ResolvedCookies {
        cookies: json_cookies(raw),
        signed_cookies: signed,
        secret: secrets.first().map(str::to_string),
    };

    debug!(
        cookies = resolved.cookies.len(),
        signed = resolved.signed_cookies.len(),
        "resolved request cookies"
    );

    Ok(resolved)
}

/// Cookie parsing middleware core
///
/// Holds the secret list and parse options shared by every request. The
/// parser is immutable once built and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct CookieParser {
    secrets: Secrets,
    options: ParseOptions,
}

impl CookieParser {
    pub fn new(secrets: impl Into<Secrets>) -> Self {
        Self {
            secrets: secrets.into(),
            options: ParseOptions::default(),
        }
    }

    pub fn builder() -> CookieParserBuilder {
        CookieParserBuilder::default()
    }

    pub fn from_config(config: CookieParserConfig) -> Self {
        Self::new(config.secrets)
    }

    pub fn secrets(&self) -> &Secrets {
        &self.secrets
    }

    /// Resolve the `Cookie` header of a request
    ///
    /// A missing or empty header yields empty maps.
    pub fn resolve(&self, header: Option<&str>) -> Result<ResolvedCookies, CookieError> {
        match header.filter(|h| !h.is_empty()) {
            Some(header) => Ok(resolve_cookies(header, &self.secrets, &self.options)?),
            None => Ok(ResolvedCookies {
                secret: self.secrets.first().map(str::to_string),
                ..ResolvedCookies::default()
            }),
        }
    }

    /// Sign a value with the preferred secret, producing `s:<value>.<mac>`
    pub fn sign_value(&self, value: &str) -> Result<String, CookieError> {
        let secret = self.secrets.first().ok_or(ConfigError::NoSecrets)?;
        Ok(format!("{}{}", SIGNED_PREFIX, signature::sign(value, secret)?))
    }
}

/// Builder for [`CookieParser`]
#[derive(Debug, Default)]
pub struct CookieParserBuilder {
    secrets: Vec<String>,
    options: ParseOptions,
}

impl CookieParserBuilder {
    /// Append one secret; earlier secrets are preferred
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secrets.push(secret.into());
        self
    }

    pub fn secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.secrets.extend(secrets.into_iter().map(Into::into));
        self
    }

    /// Replace the default percent-decoding of values
    pub fn decode<F>(mut self, decode: F) -> Self
    where
        F: Fn(&str) -> Result<String, CodecError> + Send + Sync + 'static,
    {
        self.options = self.options.decode(decode);
        self
    }

    pub fn build(self) -> CookieParser {
        CookieParser {
            secrets: Secrets::from(self.secrets),
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signed(value: &str, secret: &str) -> String {
        format!("{}{}", SIGNED_PREFIX, signature::sign(value, secret).unwrap())
    }

    #[test]
    fn test_signed_cookie_not_signed() {
        let secrets = Secrets::from("secret");
        assert_eq!(
            signed_cookie("plain", &secrets).unwrap(),
            Verification::NotSigned
        );
    }

    #[test]
    fn test_signed_cookie_verified() {
        let secrets = Secrets::from("secret");
        assert_eq!(
            signed_cookie(&signed("hello", "secret"), &secrets).unwrap(),
            Verification::Verified("hello".to_string())
        );
    }

    #[test]
    fn test_signed_cookie_rotation() {
        let secrets = Secrets::from(["new", "old"]);
        assert_eq!(
            signed_cookie(&signed("hello", "old"), &secrets).unwrap(),
            Verification::Verified("hello".to_string())
        );
    }

    #[test]
    fn test_signed_cookie_tampered() {
        let secrets = Secrets::from(["new", "old"]);
        assert_eq!(
            signed_cookie(&signed("hello", "other"), &secrets).unwrap(),
            Verification::Tampered
        );
        assert_eq!(
            signed_cookie(&signed("hello", "new"), &Secrets::new()).unwrap(),
            Verification::Tampered
        );
    }

    #[test]
    fn test_signed_cookies_moves_entries() {
        let mut cookies = CookieMap::new();
        cookies.insert("plain".to_string(), "value".to_string());
        cookies.insert("good".to_string(), signed("ok", "secret"));
        cookies.insert("bad".to_string(), signed("ok", "wrong"));

        let signed = signed_cookies(&mut cookies, &Secrets::from("secret")).unwrap();

        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["plain"], "value");
        assert_eq!(signed.len(), 2);
        assert_eq!(signed["good"], CookieValue::Text("ok".to_string()));
        assert!(signed["bad"].is_tampered());
    }

    #[test]
    fn test_signed_cookies_leaves_unmarked_values() {
        let mut cookies = CookieMap::new();
        cookies.insert("plain".to_string(), "value".to_string());
        cookies.insert("inner".to_string(), format!("x{}", signed("ok", "secret")));
        cookies.insert("empty".to_string(), String::new());

        let signed = signed_cookies(&mut cookies, &Secrets::from("secret")).unwrap();

        assert!(signed.is_empty());
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies["plain"], "value");
        assert_eq!(cookies["empty"], "");
    }

    #[test]
    fn test_json_cookie() {
        assert_eq!(json_cookie(r#"j:{"x":1}"#), Some(json!({"x": 1})));
        assert_eq!(json_cookie("j:[1,2]"), Some(json!([1, 2])));
        assert_eq!(json_cookie(r#"{"x":1}"#), None);
        assert_eq!(json_cookie("j:{broken"), None);
    }

    #[test]
    fn test_json_cookie_falsy_values() {
        assert_eq!(json_cookie("j:false"), None);
        assert_eq!(json_cookie("j:null"), None);
        assert_eq!(json_cookie("j:0"), None);
        assert_eq!(json_cookie("j:\"\""), None);
        assert_eq!(json_cookie("j:true"), Some(json!(true)));
        assert_eq!(json_cookie("j:\"text\""), Some(json!("text")));
    }

    #[test]
    fn test_json_cookies_keeps_non_json() {
        let mut cookies = CookieMap::new();
        cookies.insert("obj".to_string(), r#"j:{"x":1}"#.to_string());
        cookies.insert("text".to_string(), "j:nope".to_string());
        cookies.insert("plain".to_string(), "hello".to_string());

        let decoded = json_cookies(cookies);
        assert_eq!(decoded["obj"], CookieValue::Json(json!({"x": 1})));
        assert_eq!(decoded["text"], CookieValue::Text("j:nope".to_string()));
        assert_eq!(decoded["plain"], CookieValue::Text("hello".to_string()));
    }

    #[test]
    fn test_json_cookies_preserves_tampered() {
        let mut cookies = CookieMap::new();
        cookies.insert("bad".to_string(), CookieValue::Tampered);
        assert!(json_cookies(cookies)["bad"].is_tampered());
    }

    #[test]
    fn test_json_value() {
        assert_eq!(json_value(&json!({"x": 1})), r#"j:{"x":1}"#);
    }

    #[test]
    fn test_resolve_without_secrets() {
        let header = format!("a=1; s={}", signed("v", "secret"));
        let resolved = resolve_cookies(&header, &Secrets::new(), &ParseOptions::default()).unwrap();

        assert!(resolved.signed_cookies.is_empty());
        assert_eq!(resolved.cookies.len(), 2);
        assert!(resolved.cookies["s"].as_str().unwrap().starts_with("s:v."));
        assert_eq!(resolved.secret, None);
    }

    #[test]
    fn test_resolve_signed_json() {
        let signed_json = signed(r#"j:{"user":7}"#, "secret");
        let header = format!("prefs=j:[1]; session={}", signed_json);
        let resolved =
            resolve_cookies(&header, &Secrets::from("secret"), &ParseOptions::default()).unwrap();

        assert_eq!(resolved.cookies["prefs"], CookieValue::Json(json!([1])));
        assert_eq!(
            resolved.signed_cookies["session"],
            CookieValue::Json(json!({"user": 7}))
        );
        assert!(!resolved.cookies.contains_key("session"));
        assert_eq!(resolved.secret.as_deref(), Some("secret"));
    }

    #[test]
    fn test_parser_missing_header() {
        let parser = CookieParser::new("secret");
        let resolved = parser.resolve(None).unwrap();
        assert!(resolved.cookies.is_empty());
        assert!(resolved.signed_cookies.is_empty());
        assert_eq!(resolved.secret.as_deref(), Some("secret"));

        assert!(parser.resolve(Some("")).unwrap().cookies.is_empty());
    }

    #[test]
    fn test_parser_sign_value() {
        let parser = CookieParser::new(["new", "old"]);
        let value = parser.sign_value("hello").unwrap();
        assert_eq!(value, signed("hello", "new"));
    }

    #[test]
    fn test_parser_sign_value_without_secret() {
        let parser = CookieParser::default();
        let err = parser.sign_value("hello").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_builder() {
        let parser = CookieParser::builder()
            .secret("new")
            .secrets(["old", "older"])
            .decode(|v| Ok(v.to_string()))
            .build();

        let collected: Vec<&str> = parser.secrets().iter().collect();
        assert_eq!(collected, vec!["new", "old", "older"]);

        let resolved = parser.resolve(Some("a=%20")).unwrap();
        assert_eq!(resolved.cookies["a"], CookieValue::Text("%20".to_string()));
    }

    #[test]
    fn test_from_config() {
        let config = CookieParserConfig::from_json(r#"{"secrets": ["a", "b"]}"#).unwrap();
        let parser = CookieParser::from_config(config);
        assert_eq!(parser.secrets().len(), 2);
    }
}
