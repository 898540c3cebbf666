//! HMAC signing for cookie values
//!
//! A signed value has the form `<value>.<mac>`, where `mac` is the standard
//! base64 encoding of HMAC-SHA256(secret, value) with the trailing `=`
//! padding removed. The MAC is always appended, so verification splits on
//! the last `.` and values are free to contain dots themselves.
//!
//! Verification recomputes the signed string and compares SHA-256 digests of
//! both strings in constant time, so the comparison cost does not depend on
//! where a mismatch occurs or on the length of the supplied input.

use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Separator between a value and its MAC
pub const MAC_SEPARATOR: char = '.';

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("HMAC initialization failed")]
    InitFailed,
}

/// Calculate HMAC-SHA256 over data
pub fn calculate_mac(secret: &[u8], data: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InitFailed)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Sign `value` with `secret`, returning `<value>.<mac>`
///
/// Deterministic: the same inputs always produce the same output.
///
/// # Example
///
/// ```
/// use cookie_parser::signature::sign;
///
/// let signed = sign("hello", "tobiiscool")?;
/// assert_eq!(signed, "hello.DGDUkGlIkCzPz+C0B064FNgHdEjox7ch8tOBGslZ5QI");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn sign(value: &str, secret: &str) -> Result<String, SignatureError> {
    let mac = calculate_mac(secret.as_bytes(), value.as_bytes())?;

    // STANDARD_NO_PAD drops the trailing '=' padding
    let mut signed = String::with_capacity(value.len() + 1 + 43);
    signed.push_str(value);
    signed.push(MAC_SEPARATOR);
    signed.push_str(&BASE64.encode(mac));
    Ok(signed)
}

/// Verify a `<value>.<mac>` string against `secret`
///
/// Returns `Ok(Some(value))` when the MAC matches and `Ok(None)` when it does
/// not. An invalid signature is a normal outcome for untrusted input, not an
/// error. A string without any `.` can never verify.
pub fn unsign(signed: &str, secret: &str) -> Result<Option<String>, SignatureError> {
    let Some((value, _)) = signed.rsplit_once(MAC_SEPARATOR) else {
        return Ok(None);
    };

    let expected = sign(value, secret)?;

    if digests_match(expected.as_bytes(), signed.as_bytes()) {
        Ok(Some(value.to_string()))
    } else {
        Ok(None)
    }
}

/// Compare two byte strings through fixed-length digests in constant time
fn digests_match(expected: &[u8], supplied: &[u8]) -> bool {
    let expected = Sha256::digest(expected);
    let supplied = Sha256::digest(supplied);
    expected.as_slice().ct_eq(supplied.as_slice()).into()
}
