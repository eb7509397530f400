use std::fs;

use super::InterfaceAddress;

const SYS_CLASS_NET: &str = "/sys/class/net";

/// Lists interfaces and their hardware addresses from `/sys/class/net`.
pub fn list_interfaces() -> Result<Vec<InterfaceAddress>, Box<dyn std::error::Error>> {
    let mut interfaces = Vec::new();

    for entry in fs::read_dir(SYS_CLASS_NET)?.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Ok(address) = fs::read_to_string(entry.path().join("address")) {
            interfaces.push((name, address.trim().to_string()));
        }
    }

    Ok(interfaces)
}
