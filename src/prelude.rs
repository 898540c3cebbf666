//! Prelude
//!
//! ```rust
//! use cookie_parser::prelude::*;
//!
//! let parser = CookieParser::new(["current", "previous"]);
//! let resolved = parser.resolve(Some("a=1"))?;
//! assert_eq!(resolved.cookies["a"], CookieValue::Text("1".into()));
//! # Ok::<(), CookieError>(())
//! ```

pub use crate::attributes::{CookieAttributes, SameSite};
pub use crate::codec::{
    parse, parse_with, serialize, serialize_with, CodecError, CookieMap, ParseOptions,
    SerializeOptions,
};
pub use crate::config::{ConfigError, CookieParserConfig, Secrets};
pub use crate::error::CookieError;
pub use crate::jar::{
    json_cookie, json_cookies, json_value, signed_cookie, signed_cookies, CookieParser,
    CookieValue, ResolvedCookies, Verification,
};
pub use crate::signature::{sign, unsign, SignatureError};
