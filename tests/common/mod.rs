//! Common test utilities for cookie-parser integration tests

#![allow(dead_code)]

use cookie_parser::{codec, CookieParser, SerializeOptions};

/// Secret currently used for signing
pub const CURRENT_SECRET: &str = "correct horse battery staple";

/// Secret retired by the last rotation
pub const PREVIOUS_SECRET: &str = "keyboard cat";

/// Parser that accepts both the current and the previous secret
pub fn rotating_parser() -> CookieParser {
    CookieParser::new([CURRENT_SECRET, PREVIOUS_SECRET])
}

/// Turn `Set-Cookie` values into the `Cookie` header a browser would send back
///
/// Only the leading `name=value` pair of each value is kept.
pub fn cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .filter_map(|set_cookie| set_cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serialize a signed cookie the way a response handler would
pub fn signed_set_cookie(parser: &CookieParser, name: &str, value: &str) -> String {
    let signed = parser.sign_value(value).expect("parser has a secret");
    codec::serialize_with(name, &signed, &SerializeOptions::default())
        .expect("valid cookie name")
}
