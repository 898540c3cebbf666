//! Cookie header codec
//!
//! [`parse`] turns a `Cookie` request header into a [`CookieMap`] and
//! [`serialize`] builds a `Set-Cookie` header value from a name, a value and
//! a set of [`CookieAttributes`].
//!
//! # Example
//!
//! ```
//! use cookie_parser::codec::{parse, serialize_with, SerializeOptions};
//! use cookie_parser::CookieAttributes;
//!
//! let cookies = parse("foo=bar; cat=meow; dog=ruff");
//! assert_eq!(cookies["cat"], "meow");
//!
//! let options = SerializeOptions::new()
//!     .attributes(CookieAttributes::new().max_age(1000.0).http_only(true));
//! let header = serialize_with("foo", "bar", &options)?;
//! assert_eq!(header, "foo=bar; Max-Age=1000; HttpOnly");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::attributes::CookieAttributes;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

/// Cookie name to value mapping, one entry per distinct name
pub type CookieMap<V> = HashMap<String, V>;

/// Value transform applied to every parsed cookie value
pub type DecodeFn = Arc<dyn Fn(&str) -> Result<String, CodecError> + Send + Sync>;

/// Value transform applied to the value of a serialized cookie
pub type EncodeFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Everything except the characters `encodeURIComponent` leaves alone
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("argument name is invalid: {name:?}")]
    InvalidName { name: String },

    #[error("argument val is invalid: {value:?}")]
    InvalidValue { value: String },

    #[error("maxAge should be a Number")]
    InvalidMaxAge,

    #[error("option domain is invalid: {domain:?}")]
    InvalidDomain { domain: String },

    #[error("option path is invalid: {path:?}")]
    InvalidPath { path: String },

    #[error("option sameSite is invalid: {value:?}")]
    InvalidSameSite { value: String },

    #[error("malformed percent escape in {value:?}")]
    MalformedEscape { value: String },

    #[error("decoded value is not valid UTF-8: {0}")]
    Decode(#[from] std::str::Utf8Error),
}

/// Header field-content check (RFC 7230 section 3.2)
///
/// True when `s` is non-empty and every character is HTAB, printable ASCII
/// or in the Latin-1 supplement (U+0080 to U+00FF).
pub fn is_field_content(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| matches!(c, '\u{09}' | '\u{20}'..='\u{7e}' | '\u{80}'..='\u{ff}'))
}

/// Cookie name check: field content without `;` or `=` and no surrounding
/// whitespace, since [`parse`] trims names
pub fn is_valid_name(name: &str) -> bool {
    is_field_content(name) && !name.contains([';', '=']) && name.trim() == name
}

/// Default value decoder, equivalent to `decodeURIComponent`
///
/// Fails when any `%` is not followed by two hex digits or when the decoded
/// bytes are not valid UTF-8. Nothing is partially decoded.
pub fn percent_decode(value: &str) -> Result<String, CodecError> {
    let bytes = value.as_bytes();
    let malformed = bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    });
    if malformed {
        return Err(CodecError::MalformedEscape {
            value: value.to_string(),
        });
    }

    Ok(percent_decode_str(value).decode_utf8()?.into_owned())
}

/// Default value encoder, equivalent to `encodeURIComponent`
pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Options for [`parse_with`]
#[derive(Clone)]
pub struct ParseOptions {
    decode: DecodeFn,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default percent-decoding
    pub fn decode<F>(mut self, decode: F) -> Self
    where
        F: Fn(&str) -> Result<String, CodecError> + Send + Sync + 'static,
    {
        self.decode = Arc::new(decode);
        self
    }

    fn try_decode(&self, value: &str) -> String {
        match (self.decode)(value) {
            Ok(decoded) => decoded,
            Err(err) => {
                trace!(error = %err, "cookie value could not be decoded, keeping raw value");
                value.to_string()
            }
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            decode: Arc::new(percent_decode),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions").finish_non_exhaustive()
    }
}

/// Options for [`serialize_with`]
#[derive(Clone)]
pub struct SerializeOptions {
    encode: EncodeFn,
    pub attributes: CookieAttributes,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the default percent-encoding
    pub fn encode<F>(mut self, encode: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.encode = Arc::new(encode);
        self
    }

    pub fn attributes(mut self, attributes: CookieAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            encode: Arc::new(percent_encode),
            attributes: CookieAttributes::default(),
        }
    }
}

impl fmt::Debug for SerializeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializeOptions")
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// Parse a `Cookie` header with the default options
pub fn parse(header: &str) -> CookieMap<String> {
    parse_with(header, &ParseOptions::default())
}

/// Parse a `Cookie` header
///
/// - Pairs are separated by `;` followed by any number of spaces.
/// - Segments without `=` are skipped.
/// - Names and values are trimmed; a value starting with `"` loses its first
///   and last character.
/// - Values go through the decode function; a failed decode keeps the raw value.
/// - The first occurrence of a name wins.
pub fn parse_with(header: &str, options: &ParseOptions) -> CookieMap<String> {
    let mut cookies = CookieMap::new();

    for pair in header.split(';').map(|p| p.trim_start_matches(' ')) {
        let Some((name, value)) = pair.split_once('=') else {
            trace!("skipping cookie segment without '='");
            continue;
        };

        let name = name.trim();
        if cookies.contains_key(name) {
            continue;
        }

        let mut value = value.trim();
        if value.starts_with('"') {
            value = unquote(value);
        }

        cookies.insert(name.to_string(), options.try_decode(value));
    }

    cookies
}

/// Drop the leading quote and whatever the last character is
fn unquote(value: &str) -> &str {
    let inner = &value[1..];
    match inner.char_indices().next_back() {
        Some((last, _)) => &inner[..last],
        None => inner,
    }
}

/// Serialize a cookie with the default options
pub fn serialize(name: &str, value: &str) -> Result<String, CodecError> {
    serialize_with(name, value, &SerializeOptions::default())
}

/// Serialize a cookie into a `Set-Cookie` header value
///
/// The name must pass [`is_valid_name`]. The encoded value must be empty or
/// valid field content. Attributes follow in the order documented on
/// [`CookieAttributes::append_to`].
pub fn serialize_with(
    name: &str,
    value: &str,
    options: &SerializeOptions,
) -> Result<String, CodecError> {
    if !is_valid_name(name) {
        return Err(CodecError::InvalidName {
            name: name.to_string(),
        });
    }

    let encoded = (options.encode)(value);
    if !encoded.is_empty() && !is_field_content(&encoded) {
        return Err(CodecError::InvalidValue { value: encoded });
    }

    let mut header = String::with_capacity(name.len() + 1 + encoded.len());
    header.push_str(name);
    header.push('=');
    header.push_str(&encoded);

    options.attributes.append_to(&mut header)?;

    Ok(header)
}
