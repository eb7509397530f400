//! Licensegate - offline, machine-bound license activation
//!
//! A license key is a signed token binding a customer license to one machine
//! fingerprint, with an optional expiration date. Keys are issued by an
//! operator with `license_keygen`, delivered out-of-band, and activated on
//! the customer machine where the host application gates access on
//! [`gate::Licensing::check_license`].
//!
//! # Example
//!
//! ```rust,no_run
//! use licensegate::config::LicensingConfig;
//! use licensegate::gate::Licensing;
//!
//! let config = LicensingConfig::load()?;
//! let licensing = Licensing::from_config(&config)?;
//!
//! if !licensing.check_license() {
//!     println!("Activation required for machine {}", licensing.machine_id());
//! }
//! # Ok::<(), licensegate::errors::LicenseError>(())
//! ```

pub mod clock;
pub mod config;
pub mod errors;
pub mod fingerprint;
pub mod gate;
pub mod hardware;
pub mod keygen;
pub mod license_key;
pub mod logging;
pub mod payload;
pub mod signing;
pub mod storage;

pub use errors::{LicenseError, LicenseResult, VerificationError};
pub use fingerprint::get_machine_id;
pub use gate::{ActivationStatus, Licensing};
pub use license_key::{generate_license_key, verify_license_key, verify_license_key_at};
pub use payload::LicensePayload;
pub use signing::{LicenseSigner, SecretKey};
pub use storage::{LicenseLocation, LicenseStore};
