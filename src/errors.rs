//! Error types for license generation, verification, and storage.
//!
//! Verification failures are ordinary outcomes, not faults: every way a token
//! can be rejected maps to exactly one [`VerificationError`] variant whose
//! `Display` text is suitable for an end user looking at an activation screen.

use chrono::NaiveDate;
use thiserror::Error;

/// Why a license token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The token has no `.` separating payload and signature.
    #[error("Invalid key format")]
    Format,

    /// The payload is not valid base64, JSON, or a readable date.
    #[error("Invalid license data: {0}")]
    Decode(String),

    /// The signature does not match the payload.
    #[error("Invalid signature")]
    Signature,

    /// The token was issued for a different machine.
    #[error("License not for this machine")]
    MachineMismatch,

    /// The expiration date has passed.
    #[error("License expired on {0}")]
    Expired(NaiveDate),
}

impl VerificationError {
    /// Stable machine-readable code for this rejection.
    pub fn code(&self) -> &'static str {
        match self {
            VerificationError::Format => "FORMAT_ERROR",
            VerificationError::Decode(_) => "DECODE_ERROR",
            VerificationError::Signature => "SIGNATURE_ERROR",
            VerificationError::MachineMismatch => "MACHINE_MISMATCH",
            VerificationError::Expired(_) => "LICENSE_EXPIRED",
        }
    }
}

/// Errors surfaced by the licensing subsystem outside of pure verification.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Writing the license file failed.
    #[error("storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Interactive operator input ended or could not be read.
    #[error("input error: {0}")]
    InputError(String),

    /// A token offered for activation was rejected.
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

/// Result type for licensing operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let all = [
            VerificationError::Format,
            VerificationError::Decode("x".to_string()),
            VerificationError::Signature,
            VerificationError::MachineMismatch,
            VerificationError::Expired(date),
        ];
        let mut codes: Vec<&str> = all.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn expired_message_names_the_date() {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert_eq!(
            VerificationError::Expired(date).to_string(),
            "License expired on 2000-01-01"
        );
    }

    #[test]
    fn verification_error_is_transparent_in_license_error() {
        let err: LicenseError = VerificationError::MachineMismatch.into();
        assert_eq!(err.to_string(), "License not for this machine");
    }
}
