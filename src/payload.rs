//! The signed license payload and its textual encoding.
//!
//! The payload travels as `base64(json)` where the JSON is written exactly the
//! way previously issued keys were written:
//!
//! ```text
//! {"mid": "AAAA-BBBB-CCCC-DDDD", "name": "Acme", "exp": "2099-01-01"}
//! ```
//!
//! `", "` and `": "` separators, fixed key order, `null` for a lifetime license,
//! and ASCII-only output with `\uXXXX` escapes. Signatures cover the base64
//! text, so the encoding must be byte-for-byte reproducible.

use std::io;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::ser::Formatter;

use crate::errors::VerificationError;

/// Date format of the `exp` field.
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d";

/// The data a license token vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Fingerprint of the machine the license is bound to.
    #[serde(rename = "mid")]
    pub machine_id: String,
    /// Customer name, informational only.
    #[serde(rename = "name", default)]
    pub client_name: String,
    /// Last day of validity as `YYYY-MM-DD`; `None` for a lifetime license.
    #[serde(rename = "exp", default)]
    pub expiration_date: Option<String>,
}

impl LicensePayload {
    pub fn new(machine_id: &str, client_name: &str, expiration_date: Option<NaiveDate>) -> Self {
        Self {
            machine_id: machine_id.to_string(),
            client_name: client_name.to_string(),
            expiration_date: expiration_date.map(|d| d.format(EXPIRATION_FORMAT).to_string()),
        }
    }

    /// Parses the expiration date.
    ///
    /// An absent or empty `exp` means the license never expires.
    pub fn expiration(&self) -> Result<Option<NaiveDate>, VerificationError> {
        match self.expiration_date.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, EXPIRATION_FORMAT)
                .map(Some)
                .map_err(|e| {
                    VerificationError::Decode(format!("invalid expiration date '{raw}': {e}"))
                }),
        }
    }

    /// Checks the expiration date against `now`.
    ///
    /// A license dated `D` expires at the first instant after midnight that
    /// starts day `D`.
    pub fn check_expiration(&self, now: NaiveDateTime) -> Result<(), VerificationError> {
        if let Some(date) = self.expiration()? {
            let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            if now > midnight {
                return Err(VerificationError::Expired(date));
            }
        }
        Ok(())
    }

    /// Returns `true` for a license with no expiration date.
    pub fn is_lifetime(&self) -> bool {
        matches!(self.expiration_date.as_deref(), None | Some(""))
    }
}

/// JSON formatter producing `", "` / `": "` separators and ASCII-only strings.
struct CompatFormatter;

impl Formatter for CompatFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if ch.is_ascii() && ch != '\x7f' {
                let mut buf = [0u8; 1];
                writer.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Serializes the payload to its canonical JSON text.
pub fn to_json(payload: &LicensePayload) -> String {
    let mut out = Vec::with_capacity(96);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, CompatFormatter);
    if payload.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Encodes the payload as the base64 text that gets signed.
pub fn encode_payload(payload: &LicensePayload) -> String {
    B64.encode(to_json(payload))
}

/// Decodes base64 payload text back into a [`LicensePayload`].
pub fn decode_payload(payload_str: &str) -> Result<LicensePayload, VerificationError> {
    let bytes = B64
        .decode(payload_str)
        .map_err(|e| VerificationError::Decode(format!("base64 decode failed: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| VerificationError::Decode(format!("invalid payload JSON: {e}")))
}
