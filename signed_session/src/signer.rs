//! Signing and verification of session cookie tokens.
//!
//! A token binds a session id to an HMAC-SHA256 signature so tampering is
//! detectable without storing session data client-side. The wire format is
//! `s:<value>.<signature>` with the signature base64url encoded, unpadded.
//! Verification tries every secret in the configured [`SecretSet`], so
//! tokens signed under a retired secret remain valid until natural expiry.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::utils::{base64url_decode, base64url_encode};

type HmacSha256 = Hmac<Sha256>;

pub(crate) const TOKEN_PREFIX: &str = "s:";
pub(crate) const FIELD_SEPARATOR: char = '.';

/// An ordered set of signing secrets.
///
/// The first entry is active and signs new tokens; the remaining entries
/// are retired secrets that are still accepted during verification.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretSet {
    keys: Vec<Vec<u8>>,
}

impl SecretSet {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// The secret used to sign new tokens, if any.
    pub fn active(&self) -> Option<&[u8]> {
        self.keys.first().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.keys.iter().map(Vec::as_slice)
    }
}

impl fmt::Debug for SecretSet {
    // Key material must never end up in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretSet(len={})", self.keys.len())
    }
}

impl From<&str> for SecretSet {
    fn from(secret: &str) -> Self {
        Self::new([secret])
    }
}

impl From<Vec<String>> for SecretSet {
    fn from(secrets: Vec<String>) -> Self {
        Self::new(secrets)
    }
}

fn hmac_sha256(value: &str, secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(value.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Sign `value` with `secret`, producing an `s:<value>.<sig>` token.
///
/// `value` must not contain the `.` separator; session ids minted by this
/// crate never do.
pub fn sign(value: &str, secret: &[u8]) -> String {
    let signature = base64url_encode(&hmac_sha256(value, secret));
    format!("{TOKEN_PREFIX}{value}{FIELD_SEPARATOR}{signature}")
}

/// Verify `token` against every secret in `secrets`, returning the signed
/// value on the first match.
///
/// Malformed input is a normal outcome, not an error: anything that does not
/// parse as `s:<value>.<sig>`, or whose signature matches no secret, yields
/// `None`.
pub fn verify(token: &str, secrets: &SecretSet) -> Option<String> {
    let unprefixed = token.strip_prefix(TOKEN_PREFIX)?;
    let (value, signature) = unprefixed.rsplit_once(FIELD_SEPARATOR)?;
    let provided = base64url_decode(signature).ok()?;

    for secret in secrets.iter() {
        let expected = hmac_sha256(value, secret);
        if bool::from(expected.as_slice().ct_eq(provided.as_slice())) {
            return Some(value.to_string());
        }
    }
    None
}
