use std::error::Error;
use std::process::Command;

use super::InterfaceAddress;

/// Lists interfaces and their hardware addresses from `ifconfig -a`.
pub fn list_interfaces() -> Result<Vec<InterfaceAddress>, Box<dyn Error>> {
    let output = Command::new("ifconfig").arg("-a").output()?;
    let result = String::from_utf8_lossy(&output.stdout);
    Ok(parse_ifconfig(&result))
}

/// Pairs each `ether` line with the interface header above it.
fn parse_ifconfig(text: &str) -> Vec<InterfaceAddress> {
    let mut interfaces = Vec::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        if !line.starts_with(char::is_whitespace) {
            current = line.split(':').next().map(|s| s.trim().to_string());
            continue;
        }

        let mut words = line.split_whitespace();
        if words.next() == Some("ether") {
            if let (Some(name), Some(address)) = (current.as_ref(), words.next()) {
                interfaces.push((name.clone(), address.to_string()));
            }
        }
    }

    interfaces
}
