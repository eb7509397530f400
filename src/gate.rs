//! The activation gate consumed by the host application.
//!
//! [`Licensing`] bundles everything a running application needs: the signer
//! built from the configured secret, the license store, and a clock. Build it
//! once at startup and share it (it is `Send + Sync`); every request handler
//! can then call [`Licensing::check_license`].
//!
//! ```text
//! UNACTIVATED --activate(valid key)--> ACTIVATED --clock passes exp--> EXPIRED
//! ```
//!
//! `EXPIRED` behaves like `UNACTIVATED` for gating purposes. The only way back
//! to `UNACTIVATED` is deleting the license file.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::config::LicensingConfig;
use crate::errors::{LicenseResult, VerificationError};
use crate::fingerprint::get_machine_id;
use crate::license_key::verify_license_key_at;
use crate::payload::LicensePayload;
use crate::signing::LicenseSigner;
use crate::storage::LicenseStore;

/// Where this installation stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationStatus {
    /// No license is stored.
    Unactivated,
    /// A valid license is stored.
    Activated(LicensePayload),
    /// The stored license has passed its expiration date.
    Expired { expired_on: NaiveDate },
    /// The stored license is rejected for another reason.
    Invalid(VerificationError),
}

impl ActivationStatus {
    pub fn is_activated(&self) -> bool {
        matches!(self, ActivationStatus::Activated(_))
    }

    /// Reason to show on the activation screen, if activation is required.
    pub fn reason(&self) -> Option<String> {
        match self {
            ActivationStatus::Activated(_) => None,
            ActivationStatus::Unactivated => Some("No license installed".to_string()),
            ActivationStatus::Expired { expired_on } => {
                Some(VerificationError::Expired(*expired_on).to_string())
            }
            ActivationStatus::Invalid(e) => Some(e.to_string()),
        }
    }
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationStatus::Activated(payload) => match &payload.expiration_date {
                Some(exp) if !payload.is_lifetime() => {
                    write!(f, "Activated for {} until {}", payload.client_name, exp)
                }
                _ => write!(f, "Activated for {} (lifetime)", payload.client_name),
            },
            other => write!(f, "Activation required: {}", other.reason().unwrap_or_default()),
        }
    }
}

/// The licensing context of a running application.
pub struct Licensing {
    signer: LicenseSigner,
    store: LicenseStore,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Licensing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Licensing")
            .field("signer", &self.signer)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl Licensing {
    pub fn new(signer: LicenseSigner, store: LicenseStore) -> Self {
        Self {
            signer,
            store,
            clock: Box::new(SystemClock),
        }
    }

    /// Builds the context from loaded configuration.
    ///
    /// Fails only when no secret is available (production without a secret).
    pub fn from_config(config: &LicensingConfig) -> LicenseResult<Self> {
        let secret = config.secret_key()?;
        Ok(Self::new(
            LicenseSigner::new(&secret),
            LicenseStore::from_config(&config.storage),
        ))
    }

    /// Replaces the clock used for expiration checks.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn signer(&self) -> &LicenseSigner {
        &self.signer
    }

    pub fn store(&self) -> &LicenseStore {
        &self.store
    }

    /// Fingerprint of the machine this process runs on.
    pub fn machine_id(&self) -> String {
        get_machine_id()
    }

    /// Verifies `key` for this machine at the current time.
    pub fn verify(&self, key: &str) -> Result<LicensePayload, VerificationError> {
        verify_license_key_at(&self.signer, key, &self.machine_id(), self.clock.now())
    }

    /// Inspects the stored license.
    pub fn status(&self) -> ActivationStatus {
        let Some(key) = self.store.load() else {
            return ActivationStatus::Unactivated;
        };

        match self.verify(&key) {
            Ok(payload) => ActivationStatus::Activated(payload),
            Err(VerificationError::Expired(expired_on)) => ActivationStatus::Expired { expired_on },
            Err(e) => {
                log::debug!("Stored license rejected: {}", e);
                ActivationStatus::Invalid(e)
            }
        }
    }

    /// Returns `true` iff a stored license is valid for this machine right now.
    pub fn check_license(&self) -> bool {
        self.status().is_activated()
    }

    /// Verifies `key` for this machine and stores it on success.
    ///
    /// A rejected key leaves the store untouched.
    pub fn activate(&self, key: &str) -> LicenseResult<LicensePayload> {
        let key = key.trim();
        let payload = self.verify(key)?;
        let path = self.store.save(key)?;
        log::info!(
            "License activated for '{}' ({})",
            payload.client_name,
            path.display()
        );
        Ok(payload)
    }

    /// Stores `key` without verifying it.
    pub fn save_license(&self, key: &str) -> LicenseResult<PathBuf> {
        self.store.save(key)
    }

    /// Returns the stored key, if any.
    pub fn load_license(&self) -> Option<String> {
        self.store.load()
    }
}
