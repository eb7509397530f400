//! Raw machine characteristics used to derive the machine fingerprint.
//!
//! Each supported platform lists its network interfaces in its own submodule;
//! this module picks the primary hardware address and combines it with the
//! hostname and OS family name.

use std::sync::OnceLock;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

/// A network interface name paired with its hardware address text.
pub type InterfaceAddress = (String, String);

/// The characteristics a fingerprint is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareInfo {
    /// Primary hardware (MAC) address as a 48-bit integer, `0` if none was found.
    pub mac_address: u64,
    /// Network hostname, empty if it cannot be determined.
    pub hostname: String,
    /// OS family name: `Linux`, `Windows`, `Darwin`, ...
    pub os_family: String,
}

impl HardwareInfo {
    /// Collects the characteristics of the current machine.
    pub fn collect() -> Self {
        Self {
            mac_address: primary_mac_address(),
            hostname: get_hostname(),
            os_family: os_family().to_string(),
        }
    }
}

/// Returns the primary hardware address of this machine as an integer.
///
/// Interfaces are listed once per process; later calls reuse the result.
pub fn primary_mac_address() -> u64 {
    static PRIMARY_MAC: OnceLock<u64> = OnceLock::new();
    *PRIMARY_MAC.get_or_init(read_primary_mac_address)
}

fn read_primary_mac_address() -> u64 {
    match list_interfaces() {
        Ok(interfaces) => select_primary(&interfaces).unwrap_or(0),
        Err(e) => {
            log::debug!("Could not list network interfaces: {}", e);
            0
        }
    }
}

/// Returns the hostname, or an empty string when unavailable.
pub fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}

/// Returns the OS family name in the conventional capitalized form.
pub fn os_family() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "windows" => "Windows",
        "macos" => "Darwin",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "android" => "Android",
        "ios" => "iOS",
        other => other,
    }
}

fn list_interfaces() -> Result<Vec<InterfaceAddress>, Box<dyn std::error::Error>> {
    #[cfg(target_os = "linux")]
    {
        linux::list_interfaces()
    }
    #[cfg(target_os = "macos")]
    {
        macos::list_interfaces()
    }
    #[cfg(target_os = "windows")]
    {
        windows::list_interfaces()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        Ok(Vec::new())
    }
}

/// Parses a hardware address written as six hex octets separated by `:` or `-`.
pub fn parse_mac(text: &str) -> Option<u64> {
    let octets: Vec<&str> = text.trim().split([':', '-']).collect();
    if octets.len() != 6 {
        return None;
    }

    octets.iter().try_fold(0u64, |acc, octet| {
        if octet.len() != 2 {
            return None;
        }
        u8::from_str_radix(octet, 16)
            .ok()
            .map(|b| (acc << 8) | u64::from(b))
    })
}

/// Picks the primary address among the listed interfaces.
///
/// Loopback, all-zero, and broadcast addresses are ignored. Universally
/// administered addresses win over locally administered ones, then the lowest
/// address wins. Interface names only filter out loopback: on Windows the name
/// column follows link state and must not affect the choice.
pub fn select_primary(interfaces: &[InterfaceAddress]) -> Option<u64> {
    interfaces
        .iter()
        .filter(|(name, _)| name != "lo")
        .filter_map(|(_, text)| parse_mac(text))
        .filter(|mac| *mac != 0 && *mac != 0xFFFF_FFFF_FFFF)
        .min_by_key(|mac| (is_locally_administered(*mac), *mac))
}

fn is_locally_administered(mac: u64) -> bool {
    (mac >> 40) & 0x02 != 0
}
