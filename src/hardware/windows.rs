use std::process::Command;

use super::InterfaceAddress;

/// Lists adapters and their hardware addresses using `getmac`.
pub fn list_interfaces() -> Result<Vec<InterfaceAddress>, Box<dyn std::error::Error>> {
    let output = Command::new("getmac").args(["/fo", "csv", "/nh"]).output()?;
    let result = String::from_utf8_lossy(&output.stdout);
    Ok(parse_getmac(&result))
}

/// Parses `"AA-BB-CC-DD-EE-FF","\Device\Tcpip_{GUID}"` rows.
fn parse_getmac(text: &str) -> Vec<InterfaceAddress> {
    text.lines()
        .filter_map(|line| {
            let mut columns = line.split(',').map(|c| c.trim().trim_matches('"'));
            let address = columns.next()?.to_string();
            let transport = columns.next().unwrap_or("").to_string();
            Some((transport, address))
        })
        .collect()
}
