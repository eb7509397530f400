//! HMAC-SHA256 signing of license payloads.
//!
//! The signature is the first 16 characters of the uppercase hex HMAC digest,
//! computed over the base64 payload text.

use std::fmt;

use ring::hmac;
use subtle::ConstantTimeEq;

/// Length of the hex signature carried in a token.
pub const SIGNATURE_LEN: usize = 16;

/// The shared secret used by both the generator and the verifier.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey(<{} bytes redacted>)", self.0.len())
    }
}

/// Signs and checks payload text with a fixed secret.
///
/// Built once at startup and shared read-only; cloning is cheap.
#[derive(Clone, Debug)]
pub struct LicenseSigner {
    key: hmac::Key,
}

impl LicenseSigner {
    pub fn new(secret: &SecretKey) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        }
    }

    /// Computes the truncated uppercase hex signature for `payload_str`.
    pub fn sign(&self, payload_str: &str) -> String {
        let tag = hmac::sign(&self.key, payload_str.as_bytes());
        let mut signature = hex::encode_upper(tag.as_ref());
        signature.truncate(SIGNATURE_LEN);
        signature
    }

    /// Returns `true` if `signature` is the signature of `payload_str`.
    ///
    /// The comparison is exact (case-sensitive) and constant-time.
    pub fn verify(&self, payload_str: &str, signature: &str) -> bool {
        let expected = self.sign(payload_str);
        expected.as_bytes().ct_eq(signature.as_bytes()).into()
    }
}
