//! Machine fingerprinting.
//!
//! A fingerprint is `SHA-256("{mac}-{hostname}-{os_family}")`, truncated to its
//! first 64 bits and rendered as uppercase hex in four hyphenated groups:
//! `XXXX-XXXX-XXXX-XXXX`. The MAC address is written as a decimal integer.
//!
//! Changing the hostname or the primary network adapter changes the
//! fingerprint and therefore invalidates every token issued for the machine.

use std::sync::OnceLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::hardware::HardwareInfo;

/// Number of hex characters kept from the digest.
const FINGERPRINT_HEX_LEN: usize = 16;

/// Characters per hyphen-separated group.
const GROUP_LEN: usize = 4;

/// Returns the fingerprint of the current machine.
pub fn get_machine_id() -> String {
    let info = HardwareInfo::collect();
    fingerprint_from_parts(info.mac_address, &info.hostname, &info.os_family)
}

/// Computes a fingerprint from explicit machine characteristics.
pub fn fingerprint_from_parts(mac_address: u64, hostname: &str, os_family: &str) -> String {
    let machine_info = format!("{}-{}-{}", mac_address, hostname, os_family);
    let digest = Sha256::digest(machine_info.as_bytes());
    let hex = hex::encode_upper(&digest[..FINGERPRINT_HEX_LEN / 2]);

    hex.as_bytes()
        .chunks(GROUP_LEN)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("-")
}

fn fingerprint_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9A-F]{4}(-[0-9A-F]{4}){3}$").expect("fingerprint pattern is valid")
    })
}

/// Returns `true` if `value` has the `XXXX-XXXX-XXXX-XXXX` uppercase hex shape.
pub fn is_valid_fingerprint(value: &str) -> bool {
    fingerprint_regex().is_match(value)
}

/// Normalizes operator input: surrounding whitespace removed, letters uppercased.
pub fn normalize_fingerprint(input: &str) -> String {
    input.trim().to_uppercase()
}
