//! License key generation and validation.
//!
//! A license key (token) has the form `<payload>.<signature>`:
//!
//! - `payload` is `base64(json({"mid", "name", "exp"}))`, see [`crate::payload`]
//! - `signature` is 16 uppercase hex characters of HMAC-SHA256 over `payload`
//!
//! Generation is pure: the same inputs and secret always give the same key.
//! There is no nonce, so a key stays usable until it expires.
//!
//! # Example
//!
//! ```rust
//! use licensegate::license_key::{generate_license_key, verify_license_key};
//! use licensegate::signing::{LicenseSigner, SecretKey};
//!
//! let signer = LicenseSigner::new(&SecretKey::from("my-secret"));
//! let key = generate_license_key(&signer, "AAAA-BBBB-CCCC-DDDD", "Acme", None);
//! let payload = verify_license_key(&signer, &key, "AAAA-BBBB-CCCC-DDDD").unwrap();
//! assert_eq!(payload.client_name, "Acme");
//! ```

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::clock::{Clock, SystemClock};
use crate::errors::VerificationError;
use crate::payload::{decode_payload, encode_payload, LicensePayload};
use crate::signing::LicenseSigner;

/// Separator between payload and signature.
pub const TOKEN_SEPARATOR: char = '.';

/// Client name used when the operator does not supply one.
pub const DEFAULT_CLIENT_NAME: &str = "User";

/// A license key split into its two parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseToken {
    /// Base64 payload text, exactly as signed.
    pub payload: String,
    /// Hex signature as supplied.
    pub signature: String,
}

impl LicenseToken {
    /// Splits a key on its first `.`.
    ///
    /// Surrounding whitespace is ignored. Nothing else is validated here.
    pub fn parse(key: &str) -> Result<Self, VerificationError> {
        let (payload, signature) = key
            .trim()
            .split_once(TOKEN_SEPARATOR)
            .ok_or(VerificationError::Format)?;

        Ok(Self {
            payload: payload.to_string(),
            signature: signature.to_string(),
        })
    }
}

impl fmt::Display for LicenseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.payload, TOKEN_SEPARATOR, self.signature)
    }
}

/// Builds a signed token from its parts.
pub fn sign_payload(signer: &LicenseSigner, payload: &LicensePayload) -> LicenseToken {
    let payload_str = encode_payload(payload);
    let signature = signer.sign(&payload_str);
    LicenseToken {
        payload: payload_str,
        signature,
    }
}

/// Generates a license key bound to `machine_id`.
///
/// `expiration_date` of `None` yields a lifetime license.
pub fn generate_license_key(
    signer: &LicenseSigner,
    machine_id: &str,
    client_name: &str,
    expiration_date: Option<NaiveDate>,
) -> String {
    let payload = LicensePayload::new(machine_id, client_name, expiration_date);
    sign_payload(signer, &payload).to_string()
}

/// Verifies `key` for `machine_id` against the system clock.
pub fn verify_license_key(
    signer: &LicenseSigner,
    key: &str,
    machine_id: &str,
) -> Result<LicensePayload, VerificationError> {
    verify_license_key_at(signer, key, machine_id, SystemClock.now())
}

/// Verifies `key` for `machine_id` as of `now`.
///
/// Checks run in a fixed order and the first failure wins: format, signature,
/// payload decoding, machine binding, expiration.
pub fn verify_license_key_at(
    signer: &LicenseSigner,
    key: &str,
    machine_id: &str,
    now: NaiveDateTime,
) -> Result<LicensePayload, VerificationError> {
    let token = LicenseToken::parse(key)?;

    if !signer.verify(&token.payload, &token.signature) {
        return Err(VerificationError::Signature);
    }

    let payload = decode_payload(&token.payload)?;

    if payload.machine_id != machine_id {
        return Err(VerificationError::MachineMismatch);
    }

    payload.check_expiration(now)?;

    Ok(payload)
}
