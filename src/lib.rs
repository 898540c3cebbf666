//! Cookie header parsing, serialization and signing
//!
//! - [`codec`] parses `Cookie` request headers and serializes `Set-Cookie`
//!   header values.
//! - [`signature`] signs values with HMAC-SHA256 and verifies them.
//! - [`jar`] resolves a request header into plain and signed cookies, trying
//!   an ordered list of secrets so older secrets keep verifying after a
//!   rotation, and decodes `j:` JSON envelopes.
//!
//! Signing proves integrity, not secrecy: signed values are readable by the
//! client.
//!
//! # Example
//!
//! ```
//! use cookie_parser::{codec, CookieAttributes, CookieParser, CookieValue, SerializeOptions};
//!
//! let parser = CookieParser::new("keyboard cat");
//!
//! // Outgoing: sign, then serialize
//! let options = SerializeOptions::new().attributes(CookieAttributes::new().http_only(true));
//! let set_cookie = codec::serialize_with("sid", &parser.sign_value("abc")?, &options)?;
//! assert!(set_cookie.starts_with("sid=s%3Aabc."));
//!
//! // Incoming: the client sends the pair back
//! let pair = set_cookie.split(';').next().unwrap_or_default();
//! let resolved = parser.resolve(Some(pair))?;
//! assert_eq!(resolved.signed_cookies["sid"], CookieValue::Text("abc".into()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attributes;
pub mod codec;
pub mod config;
pub mod error;
pub mod jar;
pub mod prelude;
pub mod signature;

pub use attributes::{CookieAttributes, SameSite};
pub use codec::{
    parse, parse_with, serialize, serialize_with, CodecError, CookieMap, ParseOptions,
    SerializeOptions,
};
pub use config::{ConfigError, CookieParserConfig, Secrets};
pub use error::CookieError;
pub use jar::{
    resolve_cookies, CookieParser, CookieParserBuilder, CookieValue, ResolvedCookies, Verification,
};
pub use signature::{sign, unsign, SignatureError};
